// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! Every user gesture (menu, toolbar, drop, key press) is turned into one
//! [`Command`] and handled by [`CarBrandsApp::dispatch`], which calls the
//! matching session transition. Slow work (decoding, the detection call,
//! the backend check) runs on a background thread and is polled each frame.

use crate::config::Settings;
use crate::error::AppError;
use crate::io::demo::{demo_image, DemoDetector};
use crate::io::detection_client::{analyze, Detector, HttpDetector};
use crate::io::{export, intake};
use crate::models::detection::{BrandList, DetectionResult, ServerStatus};
use crate::models::source::{DisplayHandle, FileCandidate, SourceImage};
use crate::session::{AnalysisTicket, Session};
use crate::ui::settings::{SettingsAction, SettingsPanel};
use crate::ui::viewer::{ViewerAction, ViewerModal, ZOOM_IN_STEP, ZOOM_OUT_STEP};
use crate::ui::{canvas, results, toolbar};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a notice stays on screen.
const NOTICE_TTL: Duration = Duration::from_secs(6);

/// One user action, independent of how it was delivered.
pub enum Command {
    OpenImage,
    LoadDemo,
    Submit(FileCandidate),
    Analyze,
    OpenViewer,
    CloseViewer,
    ZoomViewer(f32),
    ResetViewer,
    PanViewer(egui::Vec2),
    SaveExport,
    CopyJson,
    Clear,
    OpenSettings,
    ApplySettings { endpoint: String, demo_mode: bool },
    CheckBackend,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeLevel {
    Info,
    Error,
}

/// User-facing message shown in the status bar.
struct Notice {
    text: String,
    level: NoticeLevel,
    shown_at: Instant,
}

struct PendingAnalysis {
    ticket: AnalysisTicket,
    receiver: Receiver<DetectionResult>,
}

type BackendCheck = Result<(ServerStatus, BrandList), AppError>;

/// Status-bar text for a failed analysis, if `result` is one.
fn failure_notice(result: &DetectionResult) -> Option<String> {
    result.error.as_ref().map(|error| {
        format!(
            "Analysis failed: {}. Make sure the detection service is running.",
            error
        )
    })
}

/// Main application state.
pub struct CarBrandsApp {
    settings: Settings,
    session: Session,
    http: Arc<HttpDetector>,
    demo_mode: bool,

    /// Texture for the current preview, keyed by the session's display handle
    preview: Option<(DisplayHandle, egui::TextureHandle)>,

    viewer: ViewerModal,
    settings_panel: SettingsPanel,
    notices: Vec<Notice>,

    /// Receiver for background image decoding
    decoder: Option<Receiver<Result<SourceImage, AppError>>>,
    analysis: Option<PendingAnalysis>,
    backend_check: Option<Receiver<BackendCheck>>,
}

impl CarBrandsApp {
    /// Create a new application instance.
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        let http = Arc::new(HttpDetector::new(&settings)?);
        let settings_panel = SettingsPanel {
            endpoint_draft: settings.endpoint.clone(),
            ..Default::default()
        };
        Ok(Self {
            settings,
            session: Session::new(),
            http,
            demo_mode: false,
            preview: None,
            viewer: ViewerModal::default(),
            settings_panel,
            notices: Vec::new(),
            decoder: None,
            analysis: None,
            backend_check: None,
        })
    }

    fn detector(&self) -> Arc<dyn Detector> {
        if self.demo_mode {
            return Arc::new(DemoDetector::default());
        }
        self.http.clone()
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.notices.push(Notice {
            text: text.into(),
            level: NoticeLevel::Info,
            shown_at: Instant::now(),
        });
    }

    fn notify_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{}", text);
        self.notices.push(Notice {
            text,
            level: NoticeLevel::Error,
            shown_at: Instant::now(),
        });
    }

    /// Handle one command.
    pub fn dispatch(&mut self, command: Command, ctx: &egui::Context) {
        match command {
            Command::OpenImage => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", &["jpg", "jpeg", "png", "webp", "bmp", "gif"])
                    .pick_file()
                {
                    match intake::candidate_from_path(&path) {
                        Ok(candidate) => self.dispatch(Command::Submit(candidate), ctx),
                        Err(e) => self.notify_error(format!("Could not read {}: {}", path.display(), e)),
                    }
                }
            }
            Command::LoadDemo => match demo_image() {
                Ok(candidate) => self.dispatch(Command::Submit(candidate), ctx),
                Err(e) => self.notify_error(format!("Demo image failed: {}", e)),
            },
            Command::Submit(candidate) => self.submit(candidate),
            Command::Analyze => self.start_analysis(),
            Command::OpenViewer => {
                if !self.viewer.open(&self.session) {
                    log::debug!("Viewer needs both an image and a result");
                }
            }
            Command::CloseViewer => self.viewer.close(),
            Command::ZoomViewer(factor) => self.viewer.zoom_by(factor),
            Command::ResetViewer => self.viewer.reset(),
            Command::PanViewer(delta) => self.viewer.pan_by(delta),
            Command::SaveExport => self.save_export(),
            Command::CopyJson => self.copy_json(ctx),
            Command::Clear => {
                self.decoder = None;
                self.analysis = None;
                self.viewer.close();
                self.session.clear();
            }
            Command::OpenSettings => {
                self.settings_panel.endpoint_draft = self.settings.endpoint.clone();
                self.settings_panel.demo_mode = self.demo_mode;
                self.settings_panel.open = true;
            }
            Command::ApplySettings {
                endpoint,
                demo_mode,
            } => self.apply_settings(&endpoint, demo_mode),
            Command::CheckBackend => self.check_backend(),
            Command::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    /// Validate a file and decode it in the background.
    fn submit(&mut self, candidate: FileCandidate) {
        if let Err(e) = self.session.submit(&candidate) {
            self.notify_error(format!("Please choose an image file (JPG, PNG, WEBP). {}", e));
            return;
        }

        let (sender, receiver) = channel();
        // Replacing the receiver drops any decode still running for an older file
        self.decoder = Some(receiver);
        std::thread::spawn(move || {
            let _ = sender.send(intake::decode(candidate));
        });
    }

    fn start_analysis(&mut self) {
        let ticket = match self.session.begin_analysis() {
            Ok(ticket) => ticket,
            Err(e) => {
                log::warn!("Analyze ignored: {}", e);
                return;
            }
        };

        let (sender, receiver) = channel();
        let detector = self.detector();
        let upload = ticket.upload.clone();
        std::thread::spawn(move || {
            let _ = sender.send(analyze(detector.as_ref(), &upload));
        });
        self.analysis = Some(PendingAnalysis { ticket, receiver });
    }

    fn save_export(&mut self) {
        let (Some(loaded), Some(result)) = (self.session.image(), self.session.result()) else {
            return;
        };
        let default_name = export::export_file_name(result, export::ExportFormat::Png);
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"])
            .set_file_name(&default_name)
            .save_file()
        else {
            return;
        };

        match export::save_export(&loaded.source.pixels, result, &path) {
            Ok(()) => {
                log::info!("Exported detection image to {}", path.display());
                self.notify(format!("Saved {}", path.display()));
            }
            Err(e) => self.notify_error(format!("Failed to save image: {}", e)),
        }
    }

    fn copy_json(&mut self, ctx: &egui::Context) {
        let Some(result) = self.session.result() else {
            return;
        };
        match export::result_json(result) {
            Ok(json) => {
                ctx.output_mut(|o| o.copied_text = json);
                self.notify("Copied!");
            }
            Err(e) => self.notify_error(format!("Failed to serialize result: {}", e)),
        }
    }

    fn apply_settings(&mut self, endpoint: &str, demo_mode: bool) {
        let settings = match Settings::resolve(None, Some(endpoint)) {
            Ok(settings) => settings,
            Err(e) => {
                self.notify_error(format!("Invalid endpoint: {:#}", e));
                return;
            }
        };
        match HttpDetector::new(&settings) {
            Ok(http) => {
                log::info!("Detection endpoint set to {}", settings.endpoint);
                self.http = Arc::new(http);
                self.settings = settings;
                self.demo_mode = demo_mode;
                self.settings_panel.backend = None;
                self.notify("Settings applied");
            }
            Err(e) => self.notify_error(format!("Could not create HTTP client: {}", e)),
        }
    }

    fn check_backend(&mut self) {
        let (sender, receiver) = channel();
        let http = self.http.clone();
        std::thread::spawn(move || {
            let outcome = http.health().and_then(|status| Ok((status, http.brands()?)));
            let _ = sender.send(outcome);
        });
        self.backend_check = Some(receiver);
        self.settings_panel.checking = true;
    }

    /// Collect finished background work.
    fn poll_background(&mut self) {
        if let Some(ref receiver) = self.decoder {
            match receiver.try_recv() {
                Ok(Ok(source)) => {
                    self.decoder = None;
                    self.analysis = None;
                    self.viewer.close();
                    self.session.accept_decoded(source);
                }
                Ok(Err(e)) => {
                    self.decoder = None;
                    self.notify_error(format!("Image could not be loaded: {}", e));
                }
                Err(TryRecvError::Disconnected) => {
                    self.decoder = None;
                    self.notify_error("Image decoder stopped unexpectedly");
                }
                Err(TryRecvError::Empty) => {}
            }
        }

        if let Some(pending) = self.analysis.take() {
            let settled = match pending.receiver.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Disconnected) => {
                    Some(DetectionResult::failure("analysis worker stopped unexpectedly"))
                }
                Err(TryRecvError::Empty) => None,
            };
            match settled {
                Some(result) => {
                    let notice = failure_notice(&result);
                    if self.session.finish_analysis(pending.ticket, result) {
                        if let Some(notice) = notice {
                            self.notify_error(notice);
                        }
                    }
                }
                None => self.analysis = Some(pending),
            }
        }

        if let Some(ref receiver) = self.backend_check {
            if let Ok(outcome) = receiver.try_recv() {
                self.backend_check = None;
                self.settings_panel.checking = false;
                if let Err(e) = &outcome {
                    log::warn!("Backend check failed: {}", e);
                }
                self.settings_panel.backend = Some(outcome.map_err(|e| e.to_string()));
            }
        }
    }

    /// Keep the preview texture in step with the session's display handle.
    fn sync_preview(&mut self, ctx: &egui::Context) {
        let released = self.session.take_released();
        if let Some((handle, _)) = &self.preview {
            if released.contains(handle) || self.session.display_handle() != Some(*handle) {
                // Dropping the TextureHandle frees the GPU texture
                self.preview = None;
            }
        }

        if self.preview.is_none() {
            if let Some(loaded) = self.session.image() {
                let pixels = &loaded.source.pixels;
                let size = [pixels.width() as usize, pixels.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_raw());
                let texture = ctx.load_texture("preview", color_image, egui::TextureOptions::LINEAR);
                self.preview = Some((loaded.handle, texture));
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.decoder.is_some() || self.analysis.is_some() || self.backend_check.is_some()
    }

    fn collect_input(&self, ctx: &egui::Context, commands: &mut Vec<Command>) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        // Only the first dropped file is used
        if let Some(file) = dropped.first() {
            match intake::candidate_from_drop(file) {
                Ok(candidate) => commands.push(Command::Submit(candidate)),
                Err(e) => log::error!("Dropped file unreadable: {}", e),
            }
        }

        if ctx.wants_keyboard_input() {
            return;
        }
        if self.viewer.is_open() {
            ctx.input(|i| {
                if i.key_pressed(egui::Key::Escape) {
                    commands.push(Command::CloseViewer);
                }
                if i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals) {
                    commands.push(Command::ZoomViewer(ZOOM_IN_STEP));
                }
                if i.key_pressed(egui::Key::Minus) {
                    commands.push(Command::ZoomViewer(ZOOM_OUT_STEP));
                }
                if i.key_pressed(egui::Key::Num0) {
                    commands.push(Command::ResetViewer);
                }
            });
        } else if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::O)) {
            commands.push(Command::OpenImage);
        }
    }
}

impl eframe::App for CarBrandsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_background();
        self.sync_preview(ctx);

        // Request repaint while background work is pending (to update spinner)
        if self.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
        self.notices.retain(|n| n.shown_at.elapsed() < NOTICE_TTL);
        if !self.notices.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        let mut commands = Vec::new();
        self.collect_input(ctx, &mut commands);

        let controls = self.session.controls();
        let has_image = self.session.image().is_some();
        let analyzing = self.session.is_analyzing();

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        commands.push(Command::OpenImage);
                        ui.close_menu();
                    }
                    if ui.button("Load Demo Image").clicked() {
                        commands.push(Command::LoadDemo);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.add_enabled(controls.save, egui::Button::new("Save Result Image...")).clicked() {
                        commands.push(Command::SaveExport);
                        ui.close_menu();
                    }
                    if ui.add_enabled(controls.copy, egui::Button::new("Copy Result JSON")).clicked() {
                        commands.push(Command::CopyJson);
                        ui.close_menu();
                    }
                    if ui.add_enabled(has_image, egui::Button::new("Clear")).clicked() {
                        commands.push(Command::Clear);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Settings...").clicked() {
                        commands.push(Command::OpenSettings);
                        ui.close_menu();
                    }
                    if ui.button("Quit").clicked() {
                        commands.push(Command::Quit);
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.add_enabled(controls.view, egui::Button::new("Open Viewer")).clicked() {
                        commands.push(Command::OpenViewer);
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    ui.label(format!("CarBrands {}", env!("CARGO_PKG_VERSION")));
                    ui.label("Drop an image, press Analyze, inspect the box.");
                });
            });
        });

        // Toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            if let Some(command) = toolbar::show(ui, controls, analyzing, has_image) {
                commands.push(command);
            }
        });

        // Status bar with notices
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let source = if self.demo_mode {
                    "demo".to_string()
                } else {
                    self.http.base_url().to_string()
                };
                ui.label(egui::RichText::new(format!("Detector: {}", source)).weak());
                if self.decoder.is_some() {
                    ui.separator();
                    ui.spinner();
                    ui.label("Loading image...");
                }
                if let Some(notice) = self.notices.last() {
                    ui.separator();
                    let color = match notice.level {
                        NoticeLevel::Info => egui::Color32::from_rgb(0x22, 0xc5, 0x5e),
                        NoticeLevel::Error => egui::Color32::from_rgb(0xef, 0x44, 0x44),
                    };
                    ui.colored_label(color, &notice.text);
                }
            });
        });

        // Results panel (right side)
        egui::SidePanel::right("results")
            .default_width(260.0)
            .show(ctx, |ui| results::show(ui, self.session.result(), analyzing));

        // Main canvas (center)
        let files_hovered = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let view = canvas::CanvasView {
                    texture: self.preview.as_ref().map(|(_, texture)| texture),
                    natural_size: self.session.image().map(|l| l.source.natural_size()),
                    result: self.session.result(),
                    analyzing,
                    files_hovered,
                };
                canvas::show(ui, &view)
            })
            .inner;

        match canvas_action {
            canvas::CanvasAction::Browse => commands.push(Command::OpenImage),
            canvas::CanvasAction::OpenViewer => commands.push(Command::OpenViewer),
            canvas::CanvasAction::None => {}
        }

        match self.viewer.show(ctx) {
            ViewerAction::Close => commands.push(Command::CloseViewer),
            ViewerAction::Zoom(factor) => commands.push(Command::ZoomViewer(factor)),
            ViewerAction::Reset => commands.push(Command::ResetViewer),
            ViewerAction::Pan(delta) => commands.push(Command::PanViewer(delta)),
            ViewerAction::None => {}
        }

        match self.settings_panel.show(ctx) {
            SettingsAction::Apply {
                endpoint,
                demo_mode,
            } => commands.push(Command::ApplySettings {
                endpoint,
                demo_mode,
            }),
            SettingsAction::CheckBackend => commands.push(Command::CheckBackend),
            SettingsAction::None => {}
        }

        for command in commands {
            self.dispatch(command, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::source::Upload;
    use image::RgbaImage;

    fn source(name: &str) -> SourceImage {
        SourceImage {
            upload: Upload {
                file_name: name.to_string(),
                media_type: "image/png".to_string(),
                bytes: vec![0; 4],
            },
            pixels: RgbaImage::new(8, 8),
        }
    }

    #[test]
    fn test_failure_notice() {
        let notice = failure_notice(&DetectionResult::failure("API Error: 500")).unwrap();
        assert!(notice.starts_with("Analysis failed: API Error: 500"));

        let mut success = DetectionResult::failure("unused");
        success.brand = "Audi".into();
        success.error = None;
        assert!(failure_notice(&success).is_none());
    }

    #[test]
    fn test_discarded_failure_is_not_announced() {
        let mut session = Session::new();
        session.accept_decoded(source("a.png"));
        let ticket = session.begin_analysis().unwrap();
        session.clear();

        // Mirrors the poll loop: the notice is shown only for a stored result
        let result = DetectionResult::failure("connection refused");
        let notice = failure_notice(&result);
        assert!(notice.is_some());
        assert!(!session.finish_analysis(ticket, result));
    }
}
