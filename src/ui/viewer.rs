// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Full-resolution viewer modal.
//!
//! Opening composites the source image and its bounding box into a new
//! image at natural resolution. Zoom and pan only affect how that
//! composite is shown; the session is never touched.

use crate::render::composite::compose;
use crate::render::overlay::OverlayStyle;
use crate::session::Session;
use crate::util::geometry::fit_size;
use image::RgbaImage;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 5.0;
pub const ZOOM_IN_STEP: f32 = 1.2;
pub const ZOOM_OUT_STEP: f32 = 0.8;

/// Zoom factor and pan offset (screen points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    pub zoom: f32,
    pub pan: (f32, f32),
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: (0.0, 0.0),
        }
    }
}

impl ViewerState {
    /// Multiply the zoom by `factor`, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan.0 += dx;
        self.pan.1 += dy;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// User interaction inside the viewer window.
pub enum ViewerAction {
    None,
    Close,
    Zoom(f32),
    Reset,
    Pan(egui::Vec2),
}

/// Composite and captions captured when the viewer was opened.
struct OpenView {
    composite: RgbaImage,
    texture: Option<egui::TextureHandle>,
    brand: String,
    confidence: String,
    latency: String,
}

#[derive(Default)]
pub struct ViewerModal {
    state: ViewerState,
    view: Option<OpenView>,
}

impl ViewerModal {
    /// Open on the session's current image and result.
    ///
    /// No-op (returns `false`) unless both are present.
    pub fn open(&mut self, session: &Session) -> bool {
        let (Some(loaded), Some(result)) = (session.image(), session.result()) else {
            return false;
        };
        let pixels = &loaded.source.pixels;
        let style = OverlayStyle::VIEWER.for_resolution(pixels.dimensions());
        self.view = Some(OpenView {
            composite: compose(pixels, result, &style),
            texture: None,
            brand: result.brand.clone(),
            confidence: result.confidence_label(),
            latency: result.latency.clone(),
        });
        self.state.reset();
        log::info!("Viewer opened for {}", loaded.source.name());
        true
    }

    pub fn close(&mut self) {
        if self.view.take().is_some() {
            log::info!("Viewer closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.view.is_some()
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.state.zoom_by(factor);
    }

    pub fn pan_by(&mut self, delta: egui::Vec2) {
        self.state.pan_by(delta.x, delta.y);
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Draw the viewer window if it is open.
    pub fn show(&mut self, ctx: &egui::Context) -> ViewerAction {
        let state = self.state;
        let Some(view) = self.view.as_mut() else {
            return ViewerAction::None;
        };

        let texture = view.texture.get_or_insert_with(|| {
            let size = [view.composite.width() as usize, view.composite.height() as usize];
            let color_image =
                egui::ColorImage::from_rgba_unmultiplied(size, view.composite.as_raw());
            ctx.load_texture("viewer_composite", color_image, egui::TextureOptions::LINEAR)
        });
        let natural = view.composite.dimensions();

        let mut action = ViewerAction::None;
        let mut open = true;
        egui::Window::new("Image Viewer")
            .open(&mut open)
            .collapsible(false)
            .default_size([900.0, 650.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&view.brand).strong().size(18.0));
                    ui.separator();
                    ui.label(&view.confidence);
                    ui.separator();
                    ui.label(&view.latency);
                    ui.separator();
                    ui.label(format!("{}x{}", natural.0, natural.1));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("⟲ Reset").clicked() {
                            action = ViewerAction::Reset;
                        }
                        if ui.button("➖").clicked() {
                            action = ViewerAction::Zoom(ZOOM_OUT_STEP);
                        }
                        if ui.button("➕").clicked() {
                            action = ViewerAction::Zoom(ZOOM_IN_STEP);
                        }
                        ui.label(format!("{:.0}%", state.zoom * 100.0));
                    });
                });
                ui.separator();

                let area = ui.available_rect_before_wrap();
                let response = ui.allocate_rect(area, egui::Sense::drag());
                if response.dragged() {
                    action = ViewerAction::Pan(response.drag_delta());
                }

                let (fit_w, fit_h) = fit_size(natural, (area.width(), area.height()));
                let image_rect = egui::Rect::from_center_size(
                    area.center() + egui::vec2(state.pan.0, state.pan.1),
                    egui::vec2(fit_w, fit_h) * state.zoom,
                );
                ui.painter_at(area).image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            });

        if !open {
            action = ViewerAction::Close;
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detection::{BoundingBox, DetectionResult};
    use crate::models::source::{SourceImage, Upload};

    fn session_with(result: Option<DetectionResult>) -> Session {
        let mut session = Session::new();
        session.accept_decoded(SourceImage {
            upload: Upload {
                file_name: "car.png".into(),
                media_type: "image/png".into(),
                bytes: Vec::new(),
            },
            pixels: RgbaImage::new(320, 240),
        });
        if let Some(result) = result {
            let ticket = session.begin_analysis().unwrap();
            session.finish_analysis(ticket, result);
        }
        session
    }

    fn result() -> DetectionResult {
        DetectionResult {
            brand: "Honda".into(),
            confidence: 0.88,
            latency: "140ms".into(),
            bbox: BoundingBox::new(40.0, 100.0, 120.0, 80.0),
            model_info: None,
            error: None,
        }
    }

    #[test]
    fn test_open_requires_image_and_result() {
        let mut viewer = ViewerModal::default();
        assert!(!viewer.open(&Session::new()));
        assert!(!viewer.open(&session_with(None)));
        assert!(!viewer.is_open());

        assert!(viewer.open(&session_with(Some(result()))));
        assert!(viewer.is_open());
    }

    #[test]
    fn test_zoom_sequence_resets_to_one() {
        let mut viewer = ViewerModal::default();
        assert!(viewer.open(&session_with(Some(result()))));
        viewer.zoom_by(ZOOM_IN_STEP);
        viewer.zoom_by(ZOOM_OUT_STEP);
        viewer.pan_by(egui::vec2(15.0, -4.0));
        viewer.reset();
        assert_eq!(viewer.state().zoom, 1.0);
        assert_eq!(viewer.state().pan, (0.0, 0.0));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut state = ViewerState::default();
        for _ in 0..20 {
            state.zoom_by(ZOOM_IN_STEP);
        }
        assert_eq!(state.zoom, MAX_ZOOM);
        for _ in 0..20 {
            state.zoom_by(ZOOM_OUT_STEP);
        }
        assert_eq!(state.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_viewer_does_not_touch_session() {
        let session = session_with(Some(result()));
        let mut viewer = ViewerModal::default();
        viewer.open(&session);
        viewer.zoom_by(3.0);
        viewer.pan_by(egui::vec2(100.0, 100.0));
        viewer.close();
        assert_eq!(session.result(), Some(&result()));
        assert!(!viewer.is_open());
    }

    #[test]
    fn test_reopen_resets_zoom() {
        let session = session_with(Some(result()));
        let mut viewer = ViewerModal::default();
        viewer.open(&session);
        viewer.zoom_by(2.0);
        viewer.close();
        viewer.open(&session);
        assert_eq!(viewer.state(), ViewerState::default());
    }
}
