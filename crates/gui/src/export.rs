//! Export of meshes, documents, and chat history.
//!
//! Meshes serialize to binary STL, documents to pretty-printed JSON,
//! and the whole conversation to a JSON bundle stamped with an
//! ISO-8601 export time. The chat record format doubles as the
//! persisted session format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::CadDocument;
use uuid::Uuid;

use crate::state::{ChatMessage, ChatRole};
use crate::viewport::mesh::MeshData;

/// Binary STL: 80-byte header, u32 triangle count, then 50 bytes per
/// triangle (normal, three vertices, attribute count).
pub fn mesh_to_stl(mesh: &MeshData) -> Vec<u8> {
    let triangle_count = mesh.triangle_count();
    let mut bytes = Vec::with_capacity(84 + triangle_count * 50);
    let mut header = [0u8; 80];
    let tag = b"Exported from PromptCAD";
    header[..tag.len()].copy_from_slice(tag);
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(&(triangle_count as u32).to_le_bytes());

    for tri in mesh.indices.chunks_exact(3) {
        let a = mesh.position(tri[0] as usize);
        let b = mesh.position(tri[1] as usize);
        let c = mesh.position(tri[2] as usize);
        let normal = (b - a).cross(c - a).normalize_or_zero();

        for component in [normal.x, normal.y, normal.z] {
            bytes.extend_from_slice(&component.to_le_bytes());
        }
        for vertex in [a, b, c] {
            for component in [vertex.x, vertex.y, vertex.z] {
                bytes.extend_from_slice(&component.to_le_bytes());
            }
        }
        bytes.extend_from_slice(&0u16.to_le_bytes());
    }
    bytes
}

/// Document JSON for download, pretty-printed with the exact wire
/// field names.
pub fn document_to_json(document: &CadDocument) -> serde_json::Result<String> {
    serde_json::to_string_pretty(document)
}

/// One chat message in its serialized form. Attached meshes are
/// dropped (they are large and reproducible from the document); the
/// attached document travels with the message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: Uuid,
    pub role: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<CadDocument>,
    #[serde(default)]
    pub is_error: bool,
}

impl From<&ChatMessage> for ChatRecord {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id,
            role: match message.role {
                ChatRole::User => "user".to_string(),
                ChatRole::Assistant => "assistant".to_string(),
            },
            text: message.text.clone(),
            timestamp: message.timestamp,
            document: message.document.clone(),
            is_error: message.is_error,
        }
    }
}

impl ChatRecord {
    fn into_message(self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            role: if self.role == "assistant" {
                ChatRole::Assistant
            } else {
                ChatRole::User
            },
            text: self.text,
            timestamp: self.timestamp,
            mesh: None,
            document: self.document,
            is_error: self.is_error,
            retry: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatBundle {
    exported_at: DateTime<Utc>,
    messages: Vec<ChatRecord>,
}

/// Full conversation as a downloadable JSON bundle.
pub fn chat_bundle_json(messages: &[ChatMessage]) -> serde_json::Result<String> {
    let bundle = ChatBundle {
        exported_at: Utc::now(),
        messages: messages.iter().map(ChatRecord::from).collect(),
    };
    serde_json::to_string_pretty(&bundle)
}

/// Compact message list for session persistence.
pub fn chat_history_json(messages: &[ChatMessage]) -> serde_json::Result<String> {
    let records: Vec<ChatRecord> = messages.iter().map(ChatRecord::from).collect();
    serde_json::to_string(&records)
}

pub fn chat_history_from_json(json: &str) -> serde_json::Result<Vec<ChatMessage>> {
    let records: Vec<ChatRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(ChatRecord::into_message).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::ingest::{self, SourceFormat};

    #[test]
    fn test_stl_export_re_ingests() {
        let mesh = fixtures::canonical_box("box");
        let bytes = mesh_to_stl(&mesh.data);
        assert_eq!(bytes.len(), 84 + mesh.data.triangle_count() * 50);

        let again = ingest::ingest(&bytes, SourceFormat::Stl, "again").unwrap();
        assert_eq!(again.data.triangle_count(), mesh.data.triangle_count());
    }

    #[test]
    fn test_document_json_uses_wire_names() {
        let json = document_to_json(&CadDocument::template()).unwrap();
        assert!(json.contains("\"Euler Angles\""));
        assert!(json.contains("\"extrude_depth_towards_normal\""));
    }

    #[test]
    fn test_chat_bundle_carries_export_timestamp() {
        let mut state = crate::state::ChatState::default();
        state.input = "a cube".to_string();
        state.begin_prompt().unwrap();

        let json = chat_bundle_json(&state.messages).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["exported_at"].is_string());
        assert_eq!(value["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_history_round_trip_preserves_order_and_roles() {
        let mut state = crate::state::ChatState::default();
        state.input = "a cube".to_string();
        let prepared = state.begin_prompt().unwrap();
        let mesh = fixtures::canonical_box("box");
        state.apply_result(&prepared, Ok((mesh, Some(CadDocument::template()))));

        let json = chat_history_json(&state.messages).unwrap();
        let restored = chat_history_from_json(&json).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[0].role, ChatRole::User);
        assert_eq!(restored[1].role, ChatRole::Assistant);
        assert!(restored[1].document.is_some());
        // The mesh is intentionally not persisted.
        assert!(restored[1].mesh.is_none());
    }
}
