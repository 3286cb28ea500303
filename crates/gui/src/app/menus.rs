//! Application menu bar.

use eframe::egui;

use crate::export;
use crate::ingest::{self, CanonicalMesh, SourceFormat, MAX_UPLOAD_BYTES};
use crate::state::{AppState, DiskStorage, Storage, KEY_CHAT_HISTORY, KEY_DOCUMENT};
use crate::viewport::ViewportPanel;

pub fn file_menu(
    ui: &mut egui::Ui,
    state: &mut AppState,
    current_mesh: &mut Option<CanonicalMesh>,
    storage: &mut DiskStorage,
) {
    ui.menu_button("File", |ui| {
        if ui.button("New session").clicked() {
            state.editor.reset();
            state.chat.clear();
            *current_mesh = None;
            storage.clear(KEY_DOCUMENT);
            storage.clear(KEY_CHAT_HISTORY);
            ui.close_menu();
        }
        ui.separator();

        if ui.button("Open document...").clicked() {
            ui.close_menu();
            open_document(state);
        }
        if ui.button("Save document...").clicked() {
            ui.close_menu();
            export_document(state);
        }
        ui.separator();

        if ui.button("Import model...").clicked() {
            ui.close_menu();
            import_model(state, current_mesh);
        }
        if ui
            .add_enabled(current_mesh.is_some(), egui::Button::new("Export STL..."))
            .clicked()
        {
            ui.close_menu();
            if let Some(mesh) = current_mesh {
                export_stl(state, mesh);
            }
        }
        if ui
            .add_enabled(
                !state.chat.messages.is_empty(),
                egui::Button::new("Export chat..."),
            )
            .clicked()
        {
            ui.close_menu();
            export_chat_bundle(state);
        }
        ui.separator();

        if ui.button("Quit").clicked() {
            std::process::exit(0);
        }
    });
}

pub fn view_menu(ui: &mut egui::Ui, state: &mut AppState, viewport: &mut ViewportPanel) {
    ui.menu_button("View", |ui| {
        ui.checkbox(&mut state.panels.editor, "Model panel");
        ui.checkbox(&mut state.panels.chat, "Chat panel");
        ui.separator();
        if ui.button("Reset camera").clicked() {
            viewport.reset_camera();
            ui.close_menu();
        }
    });
}

fn open_document(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Open document")
        .add_filter("JSON", &["json"])
        .pick_file()
    else {
        return;
    };
    match std::fs::read_to_string(&path) {
        Ok(json) => match serde_json::from_str::<shared::CadDocument>(&json) {
            Ok(document) => {
                state.editor.replace_document(document);
                tracing::info!("loaded document from {}", path.display());
            }
            Err(e) => state.toast_error(format!("Not a valid document: {e}")),
        },
        Err(e) => state.toast_error(format!("Failed to read file: {e}")),
    }
}

pub fn export_document(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save document")
        .add_filter("JSON", &["json"])
        .set_file_name("model.json")
        .save_file()
    else {
        return;
    };
    match export::document_to_json(state.editor.document()) {
        Ok(json) => match std::fs::write(&path, json) {
            Ok(()) => state.toast(format!("Saved {}", path.display())),
            Err(e) => state.toast_error(format!("Failed to write file: {e}")),
        },
        Err(e) => state.toast_error(format!("Failed to serialize document: {e}")),
    }
}

pub fn export_chat_bundle(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export chat")
        .add_filter("JSON", &["json"])
        .set_file_name("chat.json")
        .save_file()
    else {
        return;
    };
    match export::chat_bundle_json(&state.chat.messages) {
        Ok(json) => match std::fs::write(&path, json) {
            Ok(()) => state.toast(format!("Saved {}", path.display())),
            Err(e) => state.toast_error(format!("Failed to write file: {e}")),
        },
        Err(e) => state.toast_error(format!("Failed to serialize chat: {e}")),
    }
}

fn export_stl(state: &mut AppState, mesh: &CanonicalMesh) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export STL")
        .add_filter("STL", &["stl"])
        .set_file_name(format!("{}.stl", mesh.name))
        .save_file()
    else {
        return;
    };
    let bytes = export::mesh_to_stl(&mesh.data);
    match std::fs::write(&path, bytes) {
        Ok(()) => state.toast(format!("Saved {}", path.display())),
        Err(e) => state.toast_error(format!("Failed to write file: {e}")),
    }
}

/// Upload boundary: extension allow-list and the size cap are checked
/// here, before ingestion runs.
fn import_model(state: &mut AppState, current_mesh: &mut Option<CanonicalMesh>) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Import model")
        .add_filter("3D models", &["stl", "obj", "fbx"])
        .pick_file()
    else {
        return;
    };

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = match SourceFormat::from_extension(extension) {
        Ok(format) => format,
        Err(e) => {
            state.toast_error(e.to_string());
            return;
        }
    };

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            state.toast_error(format!("Failed to read file: {e}"));
            return;
        }
    };
    if bytes.len() > MAX_UPLOAD_BYTES {
        state.toast_error(format!(
            "File exceeds the {}MB upload limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        ));
        return;
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    match ingest::ingest(&bytes, format, name) {
        Ok(mesh) => {
            state.toast(format!(
                "Imported {} ({} triangles)",
                mesh.name,
                mesh.data.triangle_count()
            ));
            *current_mesh = Some(mesh);
        }
        Err(e) => state.toast_error(format!("Import failed: {e}")),
    }
}
