mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::state`, `crate::ingest`,
// etc. resolve to the lib crate types everywhere in the binary.
pub use promptcad_gui_lib::export;
pub use promptcad_gui_lib::generate;
pub use promptcad_gui_lib::ingest;
pub use promptcad_gui_lib::state;

use app::PromptCadApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptcad_gui=info".into()),
        )
        .init();

    // Parse --model <path> argument
    let initial_document = parse_model_arg();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("PromptCAD — Text-to-CAD Studio")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "promptcad-gui",
        native_options,
        Box::new(move |cc| Ok(Box::new(PromptCadApp::new(cc, initial_document)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_model_arg() -> Option<shared::CadDocument> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--model" && i + 1 < args.len() {
            let path = &args[i + 1];
            match std::fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str(&json) {
                    Ok(document) => return Some(document),
                    Err(e) => tracing::error!("Failed to parse document {path}: {e}"),
                },
                Err(e) => tracing::error!("Failed to read {path}: {e}"),
            }
        }
        i += 1;
    }
    None
}
