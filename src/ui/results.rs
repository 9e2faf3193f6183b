// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Results panel.
//!
//! Shows the brand, confidence, latency and tags of the current result.
//! The failure result goes through here too.

use crate::models::detection::DetectionResult;

/// Display the results panel.
pub fn show(ui: &mut egui::Ui, result: Option<&DetectionResult>, analyzing: bool) {
    ui.heading("Results");
    ui.separator();

    let Some(result) = result else {
        let hint = if analyzing {
            "Analysis in progress..."
        } else {
            "Load an image and press Analyze"
        };
        ui.label(egui::RichText::new(hint).weak());
        return;
    };

    let brand_color = if result.is_failure() {
        egui::Color32::from_rgb(0xef, 0x44, 0x44)
    } else {
        egui::Color32::from_rgb(0xff, 0x4f, 0xd8)
    };

    egui::Grid::new("result_fields")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Brand");
            ui.label(egui::RichText::new(&result.brand).size(20.0).strong().color(brand_color));
            ui.end_row();

            ui.label("Confidence");
            ui.label(result.confidence_label());
            ui.end_row();

            ui.label("Latency");
            ui.label(&result.latency);
            ui.end_row();
        });

    ui.add(
        egui::ProgressBar::new(result.confidence as f32)
            .text(result.confidence_label())
            .desired_width(ui.available_width()),
    );

    let tags = result.tags();
    if !tags.is_empty() {
        ui.add_space(8.0);
        ui.horizontal_wrapped(|ui| {
            for tag in &tags {
                egui::Frame::none()
                    .fill(egui::Color32::from_gray(60))
                    .rounding(8.0)
                    .inner_margin(egui::Margin::symmetric(8.0, 2.0))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(tag).small());
                    });
            }
        });
    }

    if let Some(error) = &result.error {
        ui.add_space(8.0);
        ui.colored_label(egui::Color32::from_rgb(0xef, 0x44, 0x44), error);
        ui.label(egui::RichText::new("Make sure the detection service is running.").weak());
    }
}
