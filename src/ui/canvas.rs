// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drop zone, image preview and inline bounding-box overlay.
//!
//! The overlay is drawn by replaying the pure draw list from
//! [`crate::render::overlay`] onto the egui painter, scaled to wherever the
//! responsive layout put the preview this frame.

use crate::models::detection::DetectionResult;
use crate::render::overlay::{overlay_instructions, DrawOp, Geometry, OverlayStyle, Rgba};
use crate::util::geometry::fit_size;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    /// Empty drop zone clicked: open the file picker.
    Browse,
    /// Preview clicked while a result is shown.
    OpenViewer,
}

/// What the canvas needs to know about the session this frame.
pub struct CanvasView<'a> {
    pub texture: Option<&'a egui::TextureHandle>,
    pub natural_size: Option<(u32, u32)>,
    pub result: Option<&'a DetectionResult>,
    pub analyzing: bool,
    pub files_hovered: bool,
}

fn color(c: Rgba) -> egui::Color32 {
    let [r, g, b, a] = c.0;
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Replay draw instructions with the surface's top-left at `origin`.
pub fn paint_ops(painter: &egui::Painter, origin: egui::Pos2, ops: &[DrawOp]) {
    for op in ops {
        match op {
            // Immediate mode: every frame starts from an empty surface
            DrawOp::Clear => {}
            DrawOp::StrokeRect { rect, width, color: c } => {
                painter.rect_stroke(
                    egui::Rect::from_min_size(
                        origin + egui::vec2(rect.x, rect.y),
                        egui::vec2(rect.w, rect.h),
                    ),
                    0.0,
                    egui::Stroke::new(*width, color(*c)),
                );
            }
            DrawOp::FillRect { rect, color: c } => {
                painter.rect_filled(
                    egui::Rect::from_min_size(
                        origin + egui::vec2(rect.x, rect.y),
                        egui::vec2(rect.w, rect.h),
                    ),
                    0.0,
                    color(*c),
                );
            }
            DrawOp::Text {
                x,
                y,
                size,
                text,
                color: c,
            } => {
                painter.text(
                    origin + egui::vec2(*x, *y),
                    egui::Align2::LEFT_TOP,
                    text,
                    egui::FontId::proportional(*size),
                    color(*c),
                );
            }
        }
    }
}

/// Display the drop zone / preview area.
pub fn show(ui: &mut egui::Ui, view: &CanvasView<'_>) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);
        let area = ui.max_rect();

        if view.files_hovered {
            ui.painter().rect_stroke(
                area.shrink(4.0),
                8.0,
                egui::Stroke::new(2.0, color(Rgba::BOX)),
            );
        }

        match (view.texture, view.natural_size) {
            (Some(texture), Some(natural)) => {
                let (display_width, display_height) = fit_size(natural, (area.width(), area.height()));
                let image_rect = egui::Rect::from_center_size(
                    area.center(),
                    egui::vec2(display_width, display_height),
                );

                ui.painter().image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                if let Some(result) = view.result {
                    let geometry = Geometry {
                        surface: (display_width, display_height),
                        natural,
                    };
                    let ops = overlay_instructions(result, &geometry, &OverlayStyle::INLINE);
                    paint_ops(&ui.painter_at(area), image_rect.min, &ops);

                    let response = ui
                        .allocate_rect(image_rect, egui::Sense::click())
                        .on_hover_text("Click to open the full-resolution viewer");
                    if response.clicked() {
                        action = CanvasAction::OpenViewer;
                    }
                }

                if view.analyzing {
                    ui.painter().rect_filled(
                        image_rect,
                        0.0,
                        egui::Color32::from_black_alpha(96),
                    );
                    ui.painter().text(
                        image_rect.center(),
                        egui::Align2::CENTER_CENTER,
                        "Analyzing...",
                        egui::FontId::proportional(20.0),
                        egui::Color32::WHITE,
                    );
                }
            }
            _ => {
                let response = ui.allocate_rect(area, egui::Sense::click());
                if response.clicked() {
                    action = CanvasAction::Browse;
                }
                ui.painter().text(
                    area.center() - egui::vec2(0.0, 20.0),
                    egui::Align2::CENTER_CENTER,
                    "CarBrands",
                    egui::FontId::proportional(32.0),
                    egui::Color32::from_gray(200),
                );
                ui.painter().text(
                    area.center() + egui::vec2(0.0, 20.0),
                    egui::Align2::CENTER_CENTER,
                    "Drop an image here or click to browse (JPG, PNG, WEBP)",
                    egui::FontId::proportional(14.0),
                    egui::Color32::from_gray(160),
                );
            }
        }
    });

    action
}
