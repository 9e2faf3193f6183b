// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Settings window: detection endpoint, demo mode and a backend check.

use crate::models::detection::{BrandList, ServerStatus};

/// Editable copy of the settings plus the last backend check.
#[derive(Default)]
pub struct SettingsPanel {
    pub open: bool,
    pub endpoint_draft: String,
    pub demo_mode: bool,
    pub checking: bool,
    pub backend: Option<Result<(ServerStatus, BrandList), String>>,
}

pub enum SettingsAction {
    None,
    Apply { endpoint: String, demo_mode: bool },
    CheckBackend,
}

impl SettingsPanel {
    pub fn show(&mut self, ctx: &egui::Context) -> SettingsAction {
        let mut action = SettingsAction::None;
        let mut open = self.open;
        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Detection endpoint");
                ui.text_edit_singleline(&mut self.endpoint_draft);
                ui.checkbox(&mut self.demo_mode, "Demo mode (offline, random results)");

                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        action = SettingsAction::Apply {
                            endpoint: self.endpoint_draft.clone(),
                            demo_mode: self.demo_mode,
                        };
                    }
                    if ui.add_enabled(!self.checking, egui::Button::new("Check backend")).clicked() {
                        action = SettingsAction::CheckBackend;
                    }
                    if self.checking {
                        ui.spinner();
                    }
                });

                match &self.backend {
                    Some(Ok((status, brands))) => {
                        ui.separator();
                        ui.label(format!("{}: {}", status.status, status.message));
                        ui.label(format!(
                            "Model loaded: {}",
                            if status.model_loaded { "yes" } else { "no" }
                        ));
                        if let Some(max) = &status.max_file_size {
                            ui.label(format!("Max upload: {}", max));
                        }
                        ui.collapsing(format!("{} supported brands", brands.brands.len()), |ui| {
                            ui.label(brands.brands.join(", "));
                        });
                    }
                    Some(Err(e)) => {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(0xef, 0x44, 0x44), e);
                    }
                    None => {}
                }
            });
        self.open = open;
        action
    }
}
