//! 3D viewport panel.

mod camera;
mod renderer;
pub use promptcad_gui_lib::viewport::mesh;

use egui::Ui;

use crate::ingest::CanonicalMesh;
pub use camera::{ArcBallCamera, ViewPreset};

/// 3D viewport panel with camera controls and software rendering
pub struct ViewportPanel {
    camera: ArcBallCamera,
    show_axes: bool,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            camera: ArcBallCamera::new(),
            show_axes: true,
        }
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    /// Draw the viewport and handle camera input.
    pub fn ui(&mut self, ui: &mut Ui, mesh: Option<&CanonicalMesh>) {
        self.toolbar(ui, mesh);

        let available = ui.available_size();
        let (rect, response) =
            ui.allocate_exact_size(available, egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(28, 30, 34));

        // Drag orbits; shift-drag pans; scroll zooms.
        if response.dragged() {
            let delta = response.drag_delta();
            if ui.input(|i| i.modifiers.shift) {
                let pan_speed = self.camera.distance * 0.002;
                self.camera.pan(-delta.x * pan_speed, delta.y * pan_speed);
            } else {
                self.camera.rotate(-delta.x * 0.5, delta.y * 0.5);
            }
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.camera.zoom(scroll * 0.002);
            }
        }

        if self.show_axes {
            renderer::paint_axes(&painter, rect, &self.camera);
        }
        match mesh {
            Some(mesh) => renderer::paint_mesh(&painter, rect, &self.camera, &mesh.data),
            None => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Upload a model or describe one in the chat",
                    egui::FontId::proportional(14.0),
                    egui::Color32::GRAY,
                );
            }
        }
    }

    fn toolbar(&mut self, ui: &mut Ui, mesh: Option<&CanonicalMesh>) {
        ui.horizontal(|ui| {
            if ui.button("Reset view").clicked() {
                self.reset_camera();
            }
            if ui.button("Fit").clicked() {
                if let Some(mesh) = mesh {
                    self.camera.fit(&mesh.bounds);
                }
            }
            ui.separator();
            for preset in ViewPreset::all() {
                if ui.button(preset.label()).clicked() {
                    self.camera.apply_preset(*preset);
                }
            }
            ui.separator();
            ui.checkbox(&mut self.show_axes, "Axes");
            if let Some(mesh) = mesh {
                ui.separator();
                ui.label(format!(
                    "{} · {} triangles",
                    mesh.name,
                    mesh.data.triangle_count()
                ));
            }
        });
    }
}

impl Default for ViewportPanel {
    fn default() -> Self {
        Self::new()
    }
}
