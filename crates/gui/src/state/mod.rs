pub mod chat;
pub mod editor;
pub mod persistence;

use std::time::{Duration, Instant};

pub use chat::{ChatMessage, ChatRole, ChatState, PendingRequest, PreparedRequest};
pub use editor::EditorState;
pub use persistence::{DiskStorage, MemoryStorage, Storage, KEY_CHAT_HISTORY, KEY_DOCUMENT};

use shared::CadDocument;

use crate::export;

/// Panel visibility flags
pub struct PanelVisibility {
    pub chat: bool,
    pub editor: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            chat: true,
            editor: true,
        }
    }
}

/// Connectivity to the generation service, fed by the health probe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl ServiceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceStatus::Unknown => "Checking...",
            ServiceStatus::Online => "Online",
            ServiceStatus::Offline => "Offline",
        }
    }
}

/// A transient non-blocking notification
pub struct Toast {
    pub text: String,
    pub is_error: bool,
    created: Instant,
}

const TOAST_LIFETIME: Duration = Duration::from_secs(5);

/// Combined application state
#[derive(Default)]
pub struct AppState {
    pub editor: EditorState,
    pub chat: ChatState,
    pub panels: PanelVisibility,
    pub service_status: ServiceStatus,
    pub toasts: Vec<Toast>,
}

impl AppState {
    pub fn toast(&mut self, text: impl Into<String>) {
        self.push_toast(text, false);
    }

    pub fn toast_error(&mut self, text: impl Into<String>) {
        self.push_toast(text, true);
    }

    fn push_toast(&mut self, text: impl Into<String>, is_error: bool) {
        self.toasts.push(Toast {
            text: text.into(),
            is_error,
            created: Instant::now(),
        });
    }

    /// Drop expired toasts. Called once per frame.
    pub fn prune_toasts(&mut self) {
        self.toasts
            .retain(|t| t.created.elapsed() < TOAST_LIFETIME);
    }

    /// Persist the working document and chat history.
    pub fn save_session(&self, storage: &mut dyn Storage) {
        if let Ok(json) = serde_json::to_string(self.editor.document()) {
            storage.save(KEY_DOCUMENT, &json);
        }
        if let Ok(json) = export::chat_history_json(&self.chat.messages) {
            storage.save(KEY_CHAT_HISTORY, &json);
        }
    }

    /// Restore a previous session. Missing or unreadable entries fall
    /// back to defaults instead of failing startup.
    pub fn load_session(storage: &dyn Storage) -> Self {
        let mut state = Self::default();
        if let Some(json) = storage.load(KEY_DOCUMENT) {
            match serde_json::from_str::<CadDocument>(&json) {
                Ok(document) => state.editor.replace_document(document),
                Err(error) => tracing::warn!(%error, "ignoring saved document"),
            }
        }
        if let Some(json) = storage.load(KEY_CHAT_HISTORY) {
            match export::chat_history_from_json(&json) {
                Ok(messages) => state.chat.messages = messages,
                Err(error) => tracing::warn!(%error, "ignoring saved chat history"),
            }
        }
        state
    }
}
