//! Path-addressed access to document fields.
//!
//! A `DocPath` navigates part → sub-structure → field → index, matching
//! the nesting of the wire format. Resolution fails loudly with
//! `DocError::PathNotFound` instead of auto-creating intermediate
//! structure: silent creation would mask editor bugs that produce
//! malformed documents.

use std::fmt;

use thiserror::Error;

use crate::{CadDocument, ExtrudeOperation, Segment};

/// One step of a document path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// Object key (part id, section name, wire field name)
    Key(String),
    /// Array index into a coordinate pair/triple
    Index(usize),
}

/// A full path from the document root to one editable field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocPath(pub Vec<PathStep>);

impl DocPath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(PathStep::Key(key.into()));
        self
    }

    pub fn index(mut self, idx: usize) -> Self {
        self.0.push(PathStep::Index(idx));
        self
    }

    /// `<part>/coordinate_system/<field>/<axis>`
    pub fn coordinate_field(part: &str, field: &str, axis: usize) -> Self {
        Self::new()
            .key(part)
            .key("coordinate_system")
            .key(field)
            .index(axis)
    }

    /// `<part>/extrusion/<field>`
    pub fn extrusion_field(part: &str, field: &str) -> Self {
        Self::new().key(part).key("extrusion").key(field)
    }

    /// `<part>/sketch/<face>/<loop>/<segment>/<field>[/<axis>]`
    pub fn segment_field(
        part: &str,
        face: &str,
        lp: &str,
        segment: &str,
        field: &str,
        axis: Option<usize>,
    ) -> Self {
        let path = Self::new()
            .key(part)
            .key("sketch")
            .key(face)
            .key(lp)
            .key(segment)
            .key(field);
        match axis {
            Some(i) => path.index(i),
            None => path,
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match step {
                PathStep::Key(k) => f.write_str(k)?,
                PathStep::Index(n) => write!(f, "{n}")?,
            }
        }
        Ok(())
    }
}

/// Value of one addressable document field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Operation(ExtrudeOperation),
}

/// Document access errors
#[derive(Debug, Error)]
pub enum DocError {
    #[error("path not found: {0}")]
    PathNotFound(String),
    #[error("path {path} holds {found}, not {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Resolved mutable leaf
enum LeafMut<'a> {
    Number(&'a mut f64),
    Operation(&'a mut ExtrudeOperation),
}

fn not_found(path: &DocPath) -> DocError {
    DocError::PathNotFound(path.to_string())
}

/// Pull one coordinate component out of a fixed-size array
fn component<const N: usize>(arr: &[f64; N], idx: usize, path: &DocPath) -> Result<f64, DocError> {
    arr.get(idx).copied().ok_or_else(|| not_found(path))
}

fn component_mut<'a, const N: usize>(
    arr: &'a mut [f64; N],
    idx: usize,
    path: &DocPath,
) -> Result<&'a mut f64, DocError> {
    arr.get_mut(idx).ok_or_else(|| not_found(path))
}

impl CadDocument {
    /// Read the field addressed by `path`.
    pub fn get(&self, path: &DocPath) -> Result<FieldValue, DocError> {
        let steps = &path.0;
        let part = match steps.first() {
            Some(PathStep::Key(id)) => self.parts.get(id).ok_or_else(|| not_found(path))?,
            _ => return Err(not_found(path)),
        };
        let section = match steps.get(1) {
            Some(PathStep::Key(s)) => s.as_str(),
            _ => return Err(not_found(path)),
        };

        match section {
            "coordinate_system" => {
                let (field, axis) = match (steps.get(2), steps.get(3), steps.len()) {
                    (Some(PathStep::Key(f)), Some(PathStep::Index(i)), 4) => (f.as_str(), *i),
                    _ => return Err(not_found(path)),
                };
                let arr = match field {
                    "Euler Angles" => &part.coordinate_system.euler_angles,
                    "Translation Vector" => &part.coordinate_system.translation,
                    _ => return Err(not_found(path)),
                };
                Ok(FieldValue::Number(component(arr, axis, path)?))
            }
            "extrusion" => {
                let field = match (steps.get(2), steps.len()) {
                    (Some(PathStep::Key(f)), 3) => f.as_str(),
                    _ => return Err(not_found(path)),
                };
                let ext = &part.extrusion;
                match field {
                    "extrude_depth_towards_normal" => {
                        Ok(FieldValue::Number(ext.extrude_depth_towards_normal))
                    }
                    "extrude_depth_opposite_normal" => {
                        Ok(FieldValue::Number(ext.extrude_depth_opposite_normal))
                    }
                    "sketch_scale" => Ok(FieldValue::Number(ext.sketch_scale)),
                    "operation" => Ok(FieldValue::Operation(ext.operation)),
                    _ => Err(not_found(path)),
                }
            }
            "sketch" => {
                let (face_id, loop_id, seg_id) = match (steps.get(2), steps.get(3), steps.get(4)) {
                    (
                        Some(PathStep::Key(f)),
                        Some(PathStep::Key(l)),
                        Some(PathStep::Key(s)),
                    ) => (f.as_str(), l.as_str(), s.as_str()),
                    _ => return Err(not_found(path)),
                };
                let segment = part
                    .sketch
                    .get(face_id)
                    .and_then(|f| f.get(loop_id))
                    .and_then(|l| l.get(seg_id))
                    .ok_or_else(|| not_found(path))?;
                segment_get(segment, &steps[5..], path)
            }
            _ => Err(not_found(path)),
        }
    }

    /// Produce a new document with the field addressed by `path`
    /// replaced by `value`. The receiver is untouched: the whole tree is
    /// owned, so cloning gives the caller a snapshot with no aliasing
    /// back into `self`.
    pub fn set(&self, path: &DocPath, value: FieldValue) -> Result<CadDocument, DocError> {
        let mut next = self.clone();
        match (next.resolve_mut(path)?, value) {
            (LeafMut::Number(slot), FieldValue::Number(n)) => *slot = n,
            (LeafMut::Operation(slot), FieldValue::Operation(op)) => *slot = op,
            (LeafMut::Number(_), FieldValue::Operation(_)) => {
                return Err(DocError::TypeMismatch {
                    path: path.to_string(),
                    expected: "a number",
                    found: "an operation",
                })
            }
            (LeafMut::Operation(_), FieldValue::Number(_)) => {
                return Err(DocError::TypeMismatch {
                    path: path.to_string(),
                    expected: "an operation",
                    found: "a number",
                })
            }
        }
        Ok(next)
    }

    fn resolve_mut(&mut self, path: &DocPath) -> Result<LeafMut<'_>, DocError> {
        let steps = &path.0;
        let part = match steps.first() {
            Some(PathStep::Key(id)) => self.parts.get_mut(id).ok_or_else(|| not_found(path))?,
            _ => return Err(not_found(path)),
        };
        let section = match steps.get(1) {
            Some(PathStep::Key(s)) => s.as_str(),
            _ => return Err(not_found(path)),
        };

        match section {
            "coordinate_system" => {
                let (field, axis) = match (steps.get(2), steps.get(3), steps.len()) {
                    (Some(PathStep::Key(f)), Some(PathStep::Index(i)), 4) => (f.as_str(), *i),
                    _ => return Err(not_found(path)),
                };
                let arr = match field {
                    "Euler Angles" => &mut part.coordinate_system.euler_angles,
                    "Translation Vector" => &mut part.coordinate_system.translation,
                    _ => return Err(not_found(path)),
                };
                Ok(LeafMut::Number(component_mut(arr, axis, path)?))
            }
            "extrusion" => {
                let field = match (steps.get(2), steps.len()) {
                    (Some(PathStep::Key(f)), 3) => f.as_str(),
                    _ => return Err(not_found(path)),
                };
                let ext = &mut part.extrusion;
                match field {
                    "extrude_depth_towards_normal" => {
                        Ok(LeafMut::Number(&mut ext.extrude_depth_towards_normal))
                    }
                    "extrude_depth_opposite_normal" => {
                        Ok(LeafMut::Number(&mut ext.extrude_depth_opposite_normal))
                    }
                    "sketch_scale" => Ok(LeafMut::Number(&mut ext.sketch_scale)),
                    "operation" => Ok(LeafMut::Operation(&mut ext.operation)),
                    _ => Err(not_found(path)),
                }
            }
            "sketch" => {
                let (face_id, loop_id, seg_id) = match (steps.get(2), steps.get(3), steps.get(4)) {
                    (
                        Some(PathStep::Key(f)),
                        Some(PathStep::Key(l)),
                        Some(PathStep::Key(s)),
                    ) => (f.clone(), l.clone(), s.clone()),
                    _ => return Err(not_found(path)),
                };
                let segment = part
                    .sketch
                    .get_mut(&face_id)
                    .and_then(|f| f.get_mut(&loop_id))
                    .and_then(|l| l.get_mut(&seg_id))
                    .ok_or_else(|| not_found(path))?;
                segment_leaf_mut(segment, &steps[5..], path)
            }
            _ => Err(not_found(path)),
        }
    }
}

fn segment_get(
    segment: &Segment,
    rest: &[PathStep],
    path: &DocPath,
) -> Result<FieldValue, DocError> {
    match (segment, rest) {
        (Segment::Circle { radius, .. }, [PathStep::Key(f)]) if f == "Radius" => {
            Ok(FieldValue::Number(*radius))
        }
        (Segment::Circle { center, .. }, [PathStep::Key(f), PathStep::Index(i)])
            if f == "Center" =>
        {
            Ok(FieldValue::Number(component(center, *i, path)?))
        }
        (
            Segment::Line { start, end },
            [PathStep::Key(f), PathStep::Index(i)],
        ) => {
            let arr = match f.as_str() {
                "Start Point" => start,
                "End Point" => end,
                _ => return Err(not_found(path)),
            };
            Ok(FieldValue::Number(component(arr, *i, path)?))
        }
        (
            Segment::Arc { start, mid, end },
            [PathStep::Key(f), PathStep::Index(i)],
        ) => {
            let arr = match f.as_str() {
                "Start Point" => start,
                "Mid Point" => mid,
                "End Point" => end,
                _ => return Err(not_found(path)),
            };
            Ok(FieldValue::Number(component(arr, *i, path)?))
        }
        _ => Err(not_found(path)),
    }
}

fn segment_leaf_mut<'a>(
    segment: &'a mut Segment,
    rest: &[PathStep],
    path: &DocPath,
) -> Result<LeafMut<'a>, DocError> {
    match (segment, rest) {
        (Segment::Circle { radius, .. }, [PathStep::Key(f)]) if f == "Radius" => {
            Ok(LeafMut::Number(radius))
        }
        (Segment::Circle { center, .. }, [PathStep::Key(f), PathStep::Index(i)])
            if f == "Center" =>
        {
            Ok(LeafMut::Number(component_mut(center, *i, path)?))
        }
        (
            Segment::Line { start, end },
            [PathStep::Key(f), PathStep::Index(i)],
        ) => {
            let arr = match f.as_str() {
                "Start Point" => start,
                "End Point" => end,
                _ => return Err(not_found(path)),
            };
            Ok(LeafMut::Number(component_mut(arr, *i, path)?))
        }
        (
            Segment::Arc { start, mid, end },
            [PathStep::Key(f), PathStep::Index(i)],
        ) => {
            let arr = match f.as_str() {
                "Start Point" => start,
                "Mid Point" => mid,
                "End Point" => end,
                _ => return Err(not_found(path)),
            };
            Ok(LeafMut::Number(component_mut(arr, *i, path)?))
        }
        _ => Err(not_found(path)),
    }
}
