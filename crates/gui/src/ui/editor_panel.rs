use egui::Ui;

use shared::{DocPath, ExtrudeOperation, FieldValue, Segment};

use crate::state::AppState;

/// Editor requests the app layer must execute.
pub enum EditorAction {
    Regenerate,
    ExportDocument,
}

pub fn show(ui: &mut Ui, state: &mut AppState) -> Option<EditorAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.heading("Model");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .small_button("Reset")
                .on_hover_text("Back to the built-in template")
                .clicked()
            {
                state.editor.reset();
            }
            if ui.small_button("Export JSON").clicked() {
                action = Some(EditorAction::ExportDocument);
            }
        });
    });
    ui.separator();

    part_selector(ui, state);

    egui::ScrollArea::vertical()
        .id_salt("editor_scroll")
        .show(ui, |ui| {
            let Some(part_id) = state.editor.active_part_id().map(str::to_string) else {
                ui.weak("The document has no parts.");
                return;
            };

            coordinate_section(ui, state, &part_id);
            sketch_section(ui, state, &part_id);
            extrusion_section(ui, state, &part_id);
            warnings_section(ui, state);
        });

    ui.separator();
    let can_submit = !state.chat.is_in_flight();
    if ui
        .add_enabled(can_submit, egui::Button::new("Regenerate model"))
        .on_hover_text("Send the edited document to the generation service")
        .clicked()
    {
        action = Some(EditorAction::Regenerate);
    }

    action
}

fn part_selector(ui: &mut Ui, state: &mut AppState) {
    let part_ids: Vec<String> = state
        .editor
        .document()
        .part_ids()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let active = state
        .editor
        .active_part_id()
        .unwrap_or_default()
        .to_string();

    egui::ComboBox::from_label("Part")
        .selected_text(&active)
        .show_ui(ui, |ui| {
            for id in &part_ids {
                if ui.selectable_label(*id == active, id).clicked() {
                    state.editor.select_part(id);
                }
            }
        });
}

/// Drag value bound to one numeric document field. Edits go through
/// the path-addressed setter so snapshot isolation holds.
fn number_field(ui: &mut Ui, state: &mut AppState, label: &str, path: &DocPath) {
    let Ok(FieldValue::Number(current)) = state.editor.document().get(path) else {
        return;
    };
    let mut value = current;
    ui.label(label);
    if ui
        .add(egui::DragValue::new(&mut value).speed(0.01))
        .changed()
    {
        state.editor.update_number(path, &value.to_string());
    }
    ui.end_row();
}

fn coordinate_section(ui: &mut Ui, state: &mut AppState, part_id: &str) {
    ui.collapsing("Placement", |ui| {
        egui::Grid::new("coord_grid").num_columns(2).show(ui, |ui| {
            for (field, labels) in [
                ("Euler Angles", ["Rx (deg)", "Ry (deg)", "Rz (deg)"]),
                ("Translation Vector", ["Tx", "Ty", "Tz"]),
            ] {
                for (axis, label) in labels.iter().enumerate() {
                    let path = DocPath::coordinate_field(part_id, field, axis);
                    number_field(ui, state, label, &path);
                }
            }
        });
    });
}

fn sketch_section(ui: &mut Ui, state: &mut AppState, part_id: &str) {
    ui.collapsing("Sketch", |ui| {
        let Some(part) = state.editor.document().parts.get(part_id) else {
            return;
        };
        // Collect refs up front; edits below re-borrow the editor.
        let segments: Vec<(String, String, String, Segment)> = part
            .segments()
            .iter()
            .map(|r| {
                (
                    r.face_id.to_string(),
                    r.loop_id.to_string(),
                    r.segment_id.to_string(),
                    r.segment.clone(),
                )
            })
            .collect();
        let face_ids: Vec<String> = part.sketch.keys().map(str::to_string).collect();

        for (face, lp, seg_id, segment) in &segments {
            ui.horizontal(|ui| {
                ui.label(format!("{face}/{lp}/{seg_id}"));
                ui.weak(segment.kind());
                if ui.small_button("x").on_hover_text("Remove segment").clicked() {
                    state.editor.remove_segment(face, lp, seg_id);
                }
            });
            segment_fields(ui, state, part_id, face, lp, seg_id, segment);
        }

        for face in &face_ids {
            if ui.small_button(format!("Add loop to {face}")).clicked() {
                state.editor.add_loop(face);
            }
        }
    });
}

/// Exactly the fields the segment kind has: line start/end, arc
/// start/mid/end, circle center/radius.
fn segment_fields(
    ui: &mut Ui,
    state: &mut AppState,
    part_id: &str,
    face: &str,
    lp: &str,
    seg_id: &str,
    segment: &Segment,
) {
    let fields: &[(&str, bool)] = match segment {
        Segment::Line { .. } => &[("Start Point", true), ("End Point", true)],
        Segment::Arc { .. } => &[
            ("Start Point", true),
            ("Mid Point", true),
            ("End Point", true),
        ],
        Segment::Circle { .. } => &[("Center", true), ("Radius", false)],
    };

    egui::Grid::new(format!("seg_{face}_{lp}_{seg_id}"))
        .num_columns(2)
        .show(ui, |ui| {
            for (field, is_point) in fields {
                if *is_point {
                    for (axis, suffix) in ["x", "y"].iter().enumerate() {
                        let path =
                            DocPath::segment_field(part_id, face, lp, seg_id, field, Some(axis));
                        number_field(ui, state, &format!("{field} {suffix}"), &path);
                    }
                } else {
                    let path = DocPath::segment_field(part_id, face, lp, seg_id, field, None);
                    number_field(ui, state, field, &path);
                }
            }
        });
}

fn extrusion_section(ui: &mut Ui, state: &mut AppState, part_id: &str) {
    ui.collapsing("Extrusion", |ui| {
        egui::Grid::new("extrude_grid").num_columns(2).show(ui, |ui| {
            for (field, label) in [
                ("extrude_depth_towards_normal", "Depth (towards)"),
                ("extrude_depth_opposite_normal", "Depth (opposite)"),
                ("sketch_scale", "Sketch scale"),
            ] {
                let path = DocPath::extrusion_field(part_id, field);
                number_field(ui, state, label, &path);
            }
        });

        let path = DocPath::extrusion_field(part_id, "operation");
        if let Ok(FieldValue::Operation(current)) = state.editor.document().get(&path) {
            egui::ComboBox::from_label("Operation")
                .selected_text(current.label())
                .show_ui(ui, |ui| {
                    for op in ExtrudeOperation::all() {
                        if ui.selectable_label(*op == current, op.label()).clicked() {
                            state.editor.set_operation(&path, *op);
                        }
                    }
                });
        }
    });
}

fn warnings_section(ui: &mut Ui, state: &AppState) {
    let warnings = state.editor.warnings();
    if warnings.is_empty() {
        return;
    }
    ui.add_space(4.0);
    for warning in warnings {
        ui.colored_label(
            egui::Color32::from_rgb(230, 180, 80),
            format!("⚠ {warning}"),
        );
    }
}
