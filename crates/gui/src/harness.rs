//! Headless test harness for driving the application without a window.
//!
//! Wraps the editor, chat, and an in-memory store, and plays the role
//! of the network layer by applying mock generation outcomes. Used by
//! integration tests to exercise full flows with no GL context and no
//! running service.

use shared::CadDocument;

use crate::fixtures;
use crate::generate::GenerateError;
use crate::ingest::{self, CanonicalMesh, SourceFormat};
use crate::state::{AppState, MemoryStorage, PreparedRequest};

/// Headless harness over the full application state
pub struct TestHarness {
    pub state: AppState,
    pub storage: MemoryStorage,
    last_mesh: Option<CanonicalMesh>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            state: AppState::default(),
            storage: MemoryStorage::default(),
            last_mesh: None,
        }
    }

    // ── Ingestion ─────────────────────────────────────────────

    /// Ingest raw bytes as an upload would, remembering the result as
    /// the currently displayed mesh.
    pub fn upload(
        &mut self,
        bytes: &[u8],
        format: SourceFormat,
        name: &str,
    ) -> Result<&CanonicalMesh, ingest::IngestError> {
        let mesh = ingest::ingest(bytes, format, name)?;
        self.last_mesh = Some(mesh);
        Ok(self.last_mesh.as_ref().unwrap())
    }

    pub fn displayed_mesh(&self) -> Option<&CanonicalMesh> {
        self.last_mesh.as_ref()
    }

    // ── Chat round trips with a mocked service ────────────────

    /// Submit a prompt. Returns the prepared request the app layer
    /// would now execute, or the local validation error.
    pub fn submit_prompt(&mut self, prompt: &str) -> Result<PreparedRequest, GenerateError> {
        self.state.chat.input = prompt.to_string();
        self.state.chat.begin_prompt()
    }

    /// Complete a request as the service would on success: the mesh is
    /// displayed and the response document replaces the editor's
    /// document wholesale.
    pub fn resolve_success(
        &mut self,
        prepared: &PreparedRequest,
        stl_bytes: &[u8],
        document: Option<CadDocument>,
    ) -> Result<(), ingest::IngestError> {
        let mesh = ingest::ingest(stl_bytes, SourceFormat::Stl, "generated")?;
        if let Some(doc) = &document {
            self.state.editor.replace_document(doc.clone());
        }
        self.last_mesh = Some(mesh.clone());
        self.state.chat.apply_result(prepared, Ok((mesh, document)));
        Ok(())
    }

    /// Complete a request as a failure. The displayed mesh and the
    /// document are left untouched.
    pub fn resolve_failure(&mut self, prepared: &PreparedRequest, error: GenerateError) {
        self.state.chat.apply_result(prepared, Err(error));
    }

    /// Shorthand: successful round trip returning a small box mesh and
    /// the template document.
    pub fn resolve_with_box(&mut self, prepared: &PreparedRequest) {
        let stl = fixtures::box_stl(2.0, 2.0, 2.0);
        self.resolve_success(prepared, &stl, Some(CadDocument::template()))
            .expect("box fixture must ingest");
    }

    // ── Persistence ───────────────────────────────────────────

    pub fn save_session(&mut self) {
        self.state.save_session(&mut self.storage);
    }

    pub fn reload_session(&mut self) {
        self.state = AppState::load_session(&self.storage);
        self.last_mesh = None;
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_upload_displays_mesh() {
        let mut harness = TestHarness::new();
        let bytes = fixtures::box_stl(4.0, 1.0, 1.0);
        harness.upload(&bytes, SourceFormat::Stl, "bar").unwrap();
        assert!(harness.displayed_mesh().is_some());
    }

    #[test]
    fn test_mocked_round_trip_replaces_document() {
        let mut harness = TestHarness::new();
        let prepared = harness.submit_prompt("a cube 10x10x10").unwrap();
        harness.resolve_with_box(&prepared);

        assert_eq!(harness.state.chat.messages.len(), 2);
        assert!(harness.state.chat.messages[1].mesh.is_some());
        assert_eq!(harness.state.editor.document(), &CadDocument::template());
    }

    #[test]
    fn test_session_survives_reload() {
        let mut harness = TestHarness::new();
        let prepared = harness.submit_prompt("a cube").unwrap();
        harness.resolve_with_box(&prepared);
        harness.save_session();
        harness.reload_session();
        assert_eq!(harness.state.chat.messages.len(), 2);
    }
}
