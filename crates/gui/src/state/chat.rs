//! Conversation state for the text-to-CAD chat.
//!
//! Pure state machine: submission produces a [`PreparedRequest`]
//! describing the network call the app layer must perform, and the
//! eventual outcome is applied back with [`ChatState::apply_result`].
//! At most one request is in flight per thread; a second submission is
//! rejected, not queued, so the history stays append-only and ordered.

use chrono::{DateTime, Utc};
use shared::CadDocument;
use uuid::Uuid;

use crate::generate::{validate_prompt, GenerateError};
use crate::ingest::CanonicalMesh;

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// The request content preserved for one-click retry. Prompts are kept
/// in their original unprocessed form so the retried request is
/// byte-identical to the first attempt.
#[derive(Debug, Clone)]
pub enum PendingRequest {
    Prompt(String),
    Document(CadDocument),
}

/// A single chat message
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub mesh: Option<CanonicalMesh>,
    pub document: Option<CadDocument>,
    pub is_error: bool,
    pub retry: Option<PendingRequest>,
}

impl ChatMessage {
    fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            mesh: None,
            document: None,
            is_error: false,
            retry: None,
        }
    }
}

/// A request the app layer must now execute. `epoch` and `message_id`
/// route the response back to the placeholder assistant message even
/// if the thread was cleared in the meantime.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub epoch: u64,
    pub message_id: Uuid,
    pub request: PendingRequest,
}

#[derive(Default)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub input: String,
    /// True while a streaming prompt enhancement is rewriting the
    /// input field. The input is read-only to the user meanwhile.
    pub enhancing: bool,
    in_flight: bool,
    epoch: u64,
}

impl ChatState {
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Submit the current input as a prompt. On success the input is
    /// cleared, a user message and a placeholder assistant message are
    /// appended, and the request to execute is returned.
    pub fn begin_prompt(&mut self) -> Result<PreparedRequest, GenerateError> {
        let prompt = self.input.trim().to_string();
        self.begin(PendingRequest::Prompt(prompt))
            .inspect(|_| self.input.clear())
    }

    /// Submit a document for regeneration after an editor change.
    pub fn begin_regenerate(
        &mut self,
        document: CadDocument,
    ) -> Result<PreparedRequest, GenerateError> {
        self.begin(PendingRequest::Document(document))
    }

    /// Re-run the request preserved on a failed assistant message.
    pub fn begin_retry(&mut self, message_id: Uuid) -> Result<PreparedRequest, GenerateError> {
        let request = self
            .messages
            .iter()
            .find(|m| m.id == message_id)
            .and_then(|m| m.retry.clone())
            .ok_or_else(|| GenerateError::Validation("nothing to retry".to_string()))?;
        self.begin(request)
    }

    fn begin(&mut self, request: PendingRequest) -> Result<PreparedRequest, GenerateError> {
        if self.in_flight {
            return Err(GenerateError::Validation(
                "a generation is already in progress".to_string(),
            ));
        }
        let (user_text, placeholder) = match &request {
            PendingRequest::Prompt(prompt) => {
                validate_prompt(prompt)?;
                (prompt.clone(), "Generating a model for your prompt...")
            }
            PendingRequest::Document(_) => (
                "Regenerate from the edited model".to_string(),
                "Rebuilding the model from your edits...",
            ),
        };

        self.messages.push(ChatMessage::new(ChatRole::User, user_text));
        let assistant = ChatMessage::new(ChatRole::Assistant, placeholder);
        let message_id = assistant.id;
        self.messages.push(assistant);
        self.in_flight = true;

        Ok(PreparedRequest {
            epoch: self.epoch,
            message_id,
            request,
        })
    }

    /// Apply the outcome of a prepared request, replacing the
    /// placeholder message in place. Responses from a cleared thread
    /// (stale epoch) are dropped.
    pub fn apply_result(
        &mut self,
        prepared: &PreparedRequest,
        result: Result<(CanonicalMesh, Option<CadDocument>), GenerateError>,
    ) {
        if prepared.epoch != self.epoch {
            tracing::debug!("dropping response for a cleared thread");
            return;
        }
        self.in_flight = false;
        let Some(message) = self.messages.iter_mut().find(|m| m.id == prepared.message_id)
        else {
            return;
        };
        match result {
            Ok((mesh, document)) => {
                message.text = format!(
                    "Generated a model with {} triangles.",
                    mesh.data.triangle_count()
                );
                message.mesh = Some(mesh);
                message.document = document;
                message.is_error = false;
                message.retry = None;
            }
            Err(error) => {
                message.text = format!("{error}. {}", error.remediation());
                message.is_error = true;
                message.retry = Some(prepared.request.clone());
            }
        }
        message.timestamp = Utc::now();
    }

    /// Clear the thread. Bumping the epoch makes any in-flight
    /// response stale so it cannot resurrect old history.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.input.clear();
        self.in_flight = false;
        self.enhancing = false;
        self.epoch += 1;
    }

    /// Fold a streaming enhancement update into the input field.
    pub fn apply_enhance(&mut self, update: crate::generate::enhance::EnhanceUpdate) {
        use crate::generate::enhance::EnhanceUpdate;
        match update {
            EnhanceUpdate::Partial(text) => self.input = text,
            EnhanceUpdate::Done(text) => {
                self.input = text;
                self.enhancing = false;
            }
            EnhanceUpdate::Failed { original, error } => {
                self.input = original;
                self.enhancing = false;
                tracing::warn!(%error, "prompt enhancement failed");
            }
        }
    }
}
