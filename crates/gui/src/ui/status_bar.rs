use egui::Ui;

use crate::state::{AppState, ServiceStatus};

pub fn show(ui: &mut Ui, state: &AppState, endpoint: &str) {
    ui.horizontal(|ui| {
        ui.weak(format!("Parts: {}", state.editor.document().parts.len()));
        ui.separator();

        let warning_count = state.editor.warnings().len();
        if warning_count > 0 {
            ui.colored_label(
                egui::Color32::from_rgb(230, 180, 80),
                format!("Warnings: {warning_count}"),
            );
            ui.separator();
        }

        if state.chat.is_in_flight() {
            ui.spinner();
            ui.weak("Generating...");
            ui.separator();
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let color = match state.service_status {
                ServiceStatus::Online => egui::Color32::from_rgb(130, 255, 170),
                ServiceStatus::Offline => egui::Color32::from_rgb(255, 130, 130),
                ServiceStatus::Unknown => egui::Color32::GRAY,
            };
            ui.colored_label(color, state.service_status.label());
            ui.weak(endpoint);
        });
    });
}
