// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Action toolbar.
//!
//! Every button is enabled strictly from the session's [`Controls`].

use crate::app::Command;
use crate::session::Controls;

/// Display the toolbar and return the command for a clicked button.
pub fn show(ui: &mut egui::Ui, controls: Controls, analyzing: bool, has_image: bool) -> Option<Command> {
    let mut command = None;
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("📂 Open").clicked() {
            command = Some(Command::OpenImage);
        }

        ui.separator();

        if ui.add_enabled(controls.analyze, egui::Button::new("🔬 Analyze")).clicked() {
            command = Some(Command::Analyze);
        }
        if ui.add_enabled(controls.view, egui::Button::new("🔍 View")).clicked() {
            command = Some(Command::OpenViewer);
        }
        if ui.add_enabled(controls.save, egui::Button::new("💾 Save")).clicked() {
            command = Some(Command::SaveExport);
        }
        if ui.add_enabled(controls.copy, egui::Button::new("📋 Copy JSON")).clicked() {
            command = Some(Command::CopyJson);
        }

        ui.separator();

        if ui.add_enabled(has_image, egui::Button::new("✖ Clear")).clicked() {
            command = Some(Command::Clear);
        }

        if analyzing {
            ui.separator();
            ui.spinner();
            ui.label(egui::RichText::new("Waiting for the detection service").italics().weak());
        }
    });
    command
}
