//! Structural editing session over one document.
//!
//! The editor owns the application's document and an active-part
//! cursor. Field edits go through the path-addressed `set` so every
//! change produces a fresh document and never aliases the previous
//! snapshot.

use shared::{
    validate, CadDocument, DocPath, FieldValue, Loop, Part, Segment, ValidityWarning,
};

pub struct EditorState {
    document: CadDocument,
    active_part: String,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::with_document(CadDocument::template())
    }
}

impl EditorState {
    pub fn with_document(document: CadDocument) -> Self {
        let active_part = document
            .part_ids()
            .first()
            .map(|id| id.to_string())
            .unwrap_or_default();
        Self {
            document,
            active_part,
        }
    }

    pub fn document(&self) -> &CadDocument {
        &self.document
    }

    /// The active part id, clamped to the first part if the cursor no
    /// longer resolves. While parts exist this never returns None.
    pub fn active_part_id(&self) -> Option<&str> {
        if self.document.parts.contains_key(&self.active_part) {
            return Some(&self.active_part);
        }
        self.document.parts.first().map(|(id, _)| id)
    }

    pub fn active_part(&self) -> Option<&Part> {
        self.active_part_id()
            .and_then(|id| self.document.parts.get(id))
    }

    /// Select a part. Unknown ids fall back to the first part rather
    /// than leaving the editor without a cursor.
    pub fn select_part(&mut self, id: &str) {
        if self.document.parts.contains_key(id) {
            self.active_part = id.to_string();
        } else if let Some((first, _)) = self.document.parts.first() {
            tracing::warn!(part = id, "unknown part selected, clamping to first");
            self.active_part = first.to_string();
        }
    }

    /// Set a numeric field from text input. Unparseable or non-finite
    /// input is rejected and the prior value stays in place.
    pub fn update_number(&mut self, path: &DocPath, text: &str) -> bool {
        let Ok(value) = text.trim().parse::<f64>() else {
            return false;
        };
        if !value.is_finite() {
            return false;
        }
        match self.document.set(path, FieldValue::Number(value)) {
            Ok(updated) => {
                self.document = updated;
                true
            }
            Err(error) => {
                tracing::warn!(%path, %error, "numeric edit failed");
                false
            }
        }
    }

    pub fn set_operation(&mut self, path: &DocPath, operation: shared::ExtrudeOperation) -> bool {
        match self.document.set(path, FieldValue::Operation(operation)) {
            Ok(updated) => {
                self.document = updated;
                true
            }
            Err(error) => {
                tracing::warn!(%path, %error, "operation edit failed");
                false
            }
        }
    }

    /// Append an empty loop to a face of the active part. The loop id
    /// follows the `loop_N` convention of existing documents.
    pub fn add_loop(&mut self, face_id: &str) -> bool {
        let Some(part_id) = self.active_part_id().map(str::to_string) else {
            return false;
        };
        let Some(face) = self
            .document
            .parts
            .get_mut(&part_id)
            .and_then(|p| p.sketch.get_mut(face_id))
        else {
            return false;
        };
        let loop_id = format!("loop_{}", face.len() + 1);
        face.insert(loop_id, Loop::new());
        true
    }

    /// Remove one segment. Leaving a loop or face empty is allowed;
    /// it surfaces as a validity warning, not a blocked edit.
    pub fn remove_segment(&mut self, face_id: &str, loop_id: &str, segment_id: &str) -> bool {
        let Some(part_id) = self.active_part_id().map(str::to_string) else {
            return false;
        };
        self.document
            .parts
            .get_mut(&part_id)
            .and_then(|p| p.sketch.get_mut(face_id))
            .and_then(|f| f.get_mut(loop_id))
            .and_then(|l| l.remove(segment_id))
            .is_some()
    }

    /// Append a segment to a loop of the active part.
    pub fn add_segment(&mut self, face_id: &str, loop_id: &str, segment: Segment) -> bool {
        let Some(part_id) = self.active_part_id().map(str::to_string) else {
            return false;
        };
        let Some(lp) = self
            .document
            .parts
            .get_mut(&part_id)
            .and_then(|p| p.sketch.get_mut(face_id))
            .and_then(|f| f.get_mut(loop_id))
        else {
            return false;
        };
        let segment_id = format!("{}_{}", segment.kind(), lp.len() + 1);
        lp.insert(segment_id, segment);
        true
    }

    /// Replace the document wholesale with the built-in template.
    pub fn reset(&mut self) {
        self.replace_document(CadDocument::template());
    }

    /// Replace the document wholesale, for example from a generation
    /// response. Unsaved edits lose to the incoming document.
    pub fn replace_document(&mut self, document: CadDocument) {
        self.document = document;
        if self.active_part_id().is_none() {
            self.active_part.clear();
        }
        if let Some(id) = self.active_part_id().map(str::to_string) {
            self.active_part = id;
        }
    }

    /// Soft validity warnings for the current document. These inform
    /// the user before submission without blocking any edit.
    pub fn warnings(&self) -> Vec<ValidityWarning> {
        validate(&self.document)
    }
}
