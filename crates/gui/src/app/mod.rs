//! Main application module

mod menus;

use std::sync::mpsc;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::generate::enhance::{self, EnhanceUpdate};
use crate::generate::{GenerateError, GenerationClient, GenerationOutput};
use crate::ingest::{self, CanonicalMesh, SourceFormat};
use crate::state::{AppState, DiskStorage, PendingRequest, PreparedRequest, ServiceStatus};
use crate::ui::{chat_panel, editor_panel, status_bar, ChatAction, EditorAction};
use crate::viewport::ViewportPanel;

const HEALTH_PROBE_INTERVAL: Duration = Duration::from_secs(30);

/// Completed background work, polled once per frame.
enum TaskResult {
    Generation {
        prepared: PreparedRequest,
        result: Result<GenerationOutput, GenerateError>,
    },
    Enhance(EnhanceUpdate),
    Health(bool),
}

/// Main application
pub struct PromptCadApp {
    state: AppState,
    viewport: ViewportPanel,
    storage: DiskStorage,
    client: GenerationClient,
    runtime: tokio::runtime::Runtime,
    results_tx: mpsc::Sender<TaskResult>,
    results_rx: mpsc::Receiver<TaskResult>,
    /// Mesh currently shown in the viewport
    current_mesh: Option<CanonicalMesh>,
    last_health_probe: Option<Instant>,
}

impl PromptCadApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        initial_document: Option<shared::CadDocument>,
    ) -> Self {
        let storage = DiskStorage::new();
        let mut state = AppState::load_session(&storage);
        if let Some(document) = initial_document {
            state.editor.replace_document(document);
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("tokio runtime");
        let (results_tx, results_rx) = mpsc::channel();

        Self {
            state,
            viewport: ViewportPanel::new(),
            storage,
            client: GenerationClient::from_env(),
            runtime,
            results_tx,
            results_rx,
            current_mesh: None,
            last_health_probe: None,
        }
    }

    // ── Background task plumbing ──────────────────────────────

    fn spawn_generation(&self, ctx: &egui::Context, prepared: PreparedRequest) {
        let client = self.client.clone();
        let tx = self.results_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let result = match &prepared.request {
                PendingRequest::Prompt(prompt) => client.submit_prompt(prompt).await,
                PendingRequest::Document(document) => client.submit_document(document).await,
            };
            let _ = tx.send(TaskResult::Generation { prepared, result });
            ctx.request_repaint();
        });
    }

    /// Start a streaming prompt enhancement. The input field is locked
    /// while chunks rewrite it and restored verbatim on failure.
    fn spawn_enhance(&mut self, ctx: &egui::Context) {
        let original = self.state.chat.input.clone();
        if original.trim().is_empty() {
            return;
        }
        self.state.chat.enhancing = true;

        let client = self.client.clone();
        let tx = self.results_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let (chunks_tx, chunks_rx) = tokio::sync::mpsc::channel(16);
            let prompt = original.clone();
            let streamer = async move { client.enhance_prompt(&prompt, chunks_tx).await };
            let consumer = enhance::consume_stream(original, chunks_rx, |update| {
                let _ = tx.send(TaskResult::Enhance(update));
                ctx.request_repaint();
            });
            tokio::join!(streamer, consumer);
        });
    }

    fn spawn_health_probe(&mut self, ctx: &egui::Context) {
        self.last_health_probe = Some(Instant::now());
        let client = self.client.clone();
        let tx = self.results_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let ok = client.health().await.is_ok();
            let _ = tx.send(TaskResult::Health(ok));
            ctx.request_repaint();
        });
    }

    fn poll_results(&mut self) {
        while let Ok(task) = self.results_rx.try_recv() {
            match task {
                TaskResult::Generation { prepared, result } => {
                    self.apply_generation(prepared, result);
                }
                TaskResult::Enhance(update) => {
                    if let EnhanceUpdate::Failed { error, .. } = &update {
                        self.state.toast_error(format!("Enhancement failed: {error}"));
                    }
                    self.state.chat.apply_enhance(update);
                }
                TaskResult::Health(ok) => {
                    self.state.service_status = if ok {
                        ServiceStatus::Online
                    } else {
                        ServiceStatus::Offline
                    };
                }
            }
        }
    }

    /// Apply a finished generation: ingest the STL payload, replace
    /// the document wholesale, and resolve the chat placeholder. On
    /// any failure nothing is partially updated.
    fn apply_generation(
        &mut self,
        prepared: PreparedRequest,
        result: Result<GenerationOutput, GenerateError>,
    ) {
        let outcome = result.and_then(|output| {
            let mesh = ingest::ingest(&output.stl_bytes, SourceFormat::Stl, "generated")
                .map_err(|e| GenerateError::Decode(e.to_string()))?;
            Ok((mesh, output.document))
        });

        match outcome {
            Ok((mesh, document)) => {
                if let Some(doc) = &document {
                    self.state.editor.replace_document(doc.clone());
                }
                self.current_mesh = Some(mesh.clone());
                self.state.chat.apply_result(&prepared, Ok((mesh, document)));
                self.state.toast("Model generated");
            }
            Err(error) => {
                self.state.toast_error(error.to_string());
                self.state.chat.apply_result(&prepared, Err(error));
            }
        }
        self.state.save_session(&mut self.storage);
    }

    // ── User actions ──────────────────────────────────────────

    fn handle_chat_action(&mut self, ctx: &egui::Context, action: ChatAction) {
        match action {
            ChatAction::Submit => match self.state.chat.begin_prompt() {
                Ok(prepared) => self.spawn_generation(ctx, prepared),
                Err(error) => self.state.toast_error(error.to_string()),
            },
            ChatAction::Retry(message_id) => match self.state.chat.begin_retry(message_id) {
                Ok(prepared) => self.spawn_generation(ctx, prepared),
                Err(error) => self.state.toast_error(error.to_string()),
            },
            ChatAction::Enhance => self.spawn_enhance(ctx),
            ChatAction::ExportBundle => menus::export_chat_bundle(&mut self.state),
        }
    }

    fn handle_editor_action(&mut self, ctx: &egui::Context, action: EditorAction) {
        match action {
            EditorAction::Regenerate => {
                let document = self.state.editor.document().clone();
                match self.state.chat.begin_regenerate(document) {
                    Ok(prepared) => self.spawn_generation(ctx, prepared),
                    Err(error) => self.state.toast_error(error.to_string()),
                }
            }
            EditorAction::ExportDocument => menus::export_document(&mut self.state),
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        self.state.prune_toasts();
        if self.state.toasts.is_empty() {
            return;
        }
        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -32.0])
            .show(ctx, |ui| {
                for toast in &self.state.toasts {
                    let fill = if toast.is_error {
                        egui::Color32::from_rgba_premultiplied(90, 30, 30, 230)
                    } else {
                        egui::Color32::from_rgba_premultiplied(30, 60, 40, 230)
                    };
                    egui::Frame::NONE
                        .fill(fill)
                        .corner_radius(egui::CornerRadius::same(6))
                        .inner_margin(egui::Margin::symmetric(10, 6))
                        .show(ui, |ui| {
                            ui.label(&toast.text);
                        });
                }
            });
    }
}

impl eframe::App for PromptCadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results();

        let probe_due = self
            .last_health_probe
            .map_or(true, |t| t.elapsed() >= HEALTH_PROBE_INTERVAL);
        if probe_due {
            self.spawn_health_probe(ctx);
        }

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(
                    ui,
                    &mut self.state,
                    &mut self.current_mesh,
                    &mut self.storage,
                );
                menus::view_menu(ui, &mut self.state, &mut self.viewport);
            });
        });

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.state, self.client.base_url());
            });

        // ── Left panel: document editor ──────────────────────
        let mut editor_action = None;
        if self.state.panels.editor {
            egui::SidePanel::left("editor_panel")
                .default_width(280.0)
                .width_range(200.0..=460.0)
                .resizable(true)
                .frame(
                    egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                )
                .show(ctx, |ui| {
                    editor_action = editor_panel::show(ui, &mut self.state);
                });
        }

        // ── Right panel: chat ────────────────────────────────
        let mut chat_action = None;
        if self.state.panels.chat {
            egui::SidePanel::right("chat_panel")
                .default_width(300.0)
                .width_range(220.0..=500.0)
                .resizable(true)
                .frame(
                    egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                )
                .show(ctx, |ui| {
                    chat_action = chat_panel::show(ui, &mut self.state);
                });
        }

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.ui(ui, self.current_mesh.as_ref());
            });

        if let Some(action) = chat_action {
            self.handle_chat_action(ctx, action);
        }
        if let Some(action) = editor_action {
            self.handle_editor_action(ctx, action);
        }

        self.show_toasts(ctx);
    }

    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        self.state.save_session(&mut self.storage);
    }
}
