//! Soft document validation.
//!
//! These checks mirror what the generation service relies on (chained,
//! closed loops; positive scale) but are surfaced as warnings only:
//! intermediate editing states are allowed to be invalid, and the
//! editor never blocks a mutation because of them.

use std::fmt;

use crate::{CadDocument, Segment};

/// Distance below which two chain endpoints count as coincident
const CHAIN_TOLERANCE: f64 = 1e-6;

/// One validity finding. Ordered by document position.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidityWarning {
    EmptyPart {
        part: String,
    },
    EmptyFace {
        part: String,
        face: String,
    },
    EmptyLoop {
        part: String,
        face: String,
        lp: String,
    },
    /// Segment endpoints inside a loop do not chain into a closed ring
    OpenLoop {
        part: String,
        face: String,
        lp: String,
    },
    /// A circle mixed into a loop with chained segments
    MixedLoop {
        part: String,
        face: String,
        lp: String,
    },
    NonPositiveScale {
        part: String,
        scale: f64,
    },
    NegativeDepth {
        part: String,
        field: &'static str,
        depth: f64,
    },
}

impl fmt::Display for ValidityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityWarning::EmptyPart { part } => {
                write!(f, "{part}: sketch has no faces")
            }
            ValidityWarning::EmptyFace { part, face } => {
                write!(f, "{part}/{face}: face has no loops")
            }
            ValidityWarning::EmptyLoop { part, face, lp } => {
                write!(f, "{part}/{face}/{lp}: loop has no segments")
            }
            ValidityWarning::OpenLoop { part, face, lp } => {
                write!(f, "{part}/{face}/{lp}: loop is not closed")
            }
            ValidityWarning::MixedLoop { part, face, lp } => {
                write!(f, "{part}/{face}/{lp}: circle mixed with chained segments")
            }
            ValidityWarning::NonPositiveScale { part, scale } => {
                write!(f, "{part}: sketch_scale must be positive (got {scale})")
            }
            ValidityWarning::NegativeDepth { part, field, depth } => {
                write!(f, "{part}: {field} must be non-negative (got {depth})")
            }
        }
    }
}

fn close(a: [f64; 2], b: [f64; 2]) -> bool {
    (a[0] - b[0]).abs() <= CHAIN_TOLERANCE && (a[1] - b[1]).abs() <= CHAIN_TOLERANCE
}

/// Collect every validity warning in the document.
pub fn validate(doc: &CadDocument) -> Vec<ValidityWarning> {
    let mut warnings = Vec::new();

    for (part_id, part) in doc.parts.iter() {
        if part.sketch.is_empty() {
            warnings.push(ValidityWarning::EmptyPart {
                part: part_id.to_string(),
            });
        }

        for (face_id, face) in part.sketch.iter() {
            if face.is_empty() {
                warnings.push(ValidityWarning::EmptyFace {
                    part: part_id.to_string(),
                    face: face_id.to_string(),
                });
            }

            for (loop_id, lp) in face.iter() {
                if lp.is_empty() {
                    warnings.push(ValidityWarning::EmptyLoop {
                        part: part_id.to_string(),
                        face: face_id.to_string(),
                        lp: loop_id.to_string(),
                    });
                    continue;
                }
                check_loop(part_id, face_id, loop_id, lp, &mut warnings);
            }
        }

        let ext = &part.extrusion;
        if ext.sketch_scale <= 0.0 {
            warnings.push(ValidityWarning::NonPositiveScale {
                part: part_id.to_string(),
                scale: ext.sketch_scale,
            });
        }
        for (field, depth) in [
            ("extrude_depth_towards_normal", ext.extrude_depth_towards_normal),
            ("extrude_depth_opposite_normal", ext.extrude_depth_opposite_normal),
        ] {
            if depth < 0.0 {
                warnings.push(ValidityWarning::NegativeDepth {
                    part: part_id.to_string(),
                    field,
                    depth,
                });
            }
        }
    }

    warnings
}

fn check_loop(
    part_id: &str,
    face_id: &str,
    loop_id: &str,
    lp: &crate::Loop,
    warnings: &mut Vec<ValidityWarning>,
) {
    let chained: Vec<&Segment> = lp
        .iter()
        .map(|(_, s)| s)
        .filter(|s| !matches!(s, Segment::Circle { .. }))
        .collect();
    let circles = lp.len() - chained.len();

    // A lone circle is a complete loop by itself.
    if circles > 0 && !chained.is_empty() {
        warnings.push(ValidityWarning::MixedLoop {
            part: part_id.to_string(),
            face: face_id.to_string(),
            lp: loop_id.to_string(),
        });
    }

    if chained.is_empty() {
        return;
    }

    let mut ok = true;
    for pair in chained.windows(2) {
        match (pair[0].chain_end(), pair[1].chain_start()) {
            (Some(end), Some(start)) if close(end, start) => {}
            _ => ok = false,
        }
    }
    // The last segment must chain back to the first.
    match (
        chained[chained.len() - 1].chain_end(),
        chained[0].chain_start(),
    ) {
        (Some(end), Some(start)) if close(end, start) => {}
        _ => ok = false,
    }

    if !ok {
        warnings.push(ValidityWarning::OpenLoop {
            part: part_id.to_string(),
            face: face_id.to_string(),
            lp: loop_id.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CadDocument, Face, Loop, OrderedMap, Part, Segment};

    fn line(start: [f64; 2], end: [f64; 2]) -> Segment {
        Segment::Line { start, end }
    }

    fn doc_with_loop(lp: Loop) -> CadDocument {
        let mut face = Face::new();
        face.insert("loop_1", lp);
        let mut sketch = OrderedMap::new();
        sketch.insert("face_1", face);
        let mut doc = CadDocument::default();
        doc.parts.insert(
            "part_1",
            Part {
                sketch,
                ..Part::default()
            },
        );
        doc
    }

    #[test]
    fn test_template_clean() {
        assert!(validate(&CadDocument::template()).is_empty());
    }

    #[test]
    fn test_open_loop_flagged() {
        let mut lp = Loop::new();
        lp.insert("line_1", line([0.0, 0.0], [1.0, 0.0]));
        lp.insert("line_2", line([1.0, 0.0], [1.0, 1.0]));
        // Missing the segment back to the origin.
        let doc = doc_with_loop(lp);
        let warnings = validate(&doc);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ValidityWarning::OpenLoop { .. })));
    }

    #[test]
    fn test_disconnected_segments_flagged() {
        let mut lp = Loop::new();
        lp.insert("line_1", line([0.0, 0.0], [1.0, 0.0]));
        lp.insert("line_2", line([5.0, 5.0], [0.0, 0.0]));
        let doc = doc_with_loop(lp);
        let warnings = validate(&doc);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ValidityWarning::OpenLoop { .. })));
    }

    #[test]
    fn test_lone_circle_is_closed() {
        let mut lp = Loop::new();
        lp.insert(
            "circle_1",
            Segment::Circle {
                center: [0.0, 0.0],
                radius: 1.0,
            },
        );
        let doc = doc_with_loop(lp);
        assert!(validate(&doc).is_empty());
    }

    #[test]
    fn test_circle_mixed_with_lines_flagged() {
        let mut lp = Loop::new();
        lp.insert("line_1", line([0.0, 0.0], [1.0, 0.0]));
        lp.insert("line_2", line([1.0, 0.0], [0.0, 0.0]));
        lp.insert(
            "circle_1",
            Segment::Circle {
                center: [0.5, 0.5],
                radius: 0.1,
            },
        );
        let doc = doc_with_loop(lp);
        let warnings = validate(&doc);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ValidityWarning::MixedLoop { .. })));
    }

    #[test]
    fn test_empty_face_flagged() {
        let mut sketch = OrderedMap::new();
        sketch.insert("face_1", Face::new());
        let mut doc = CadDocument::default();
        doc.parts.insert(
            "part_1",
            Part {
                sketch,
                ..Part::default()
            },
        );
        let warnings = validate(&doc);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ValidityWarning::EmptyFace { .. })));
    }

    #[test]
    fn test_empty_loop_flagged() {
        let doc = doc_with_loop(Loop::new());
        let warnings = validate(&doc);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ValidityWarning::EmptyLoop { .. })));
    }

    #[test]
    fn test_extrusion_bounds_flagged() {
        let mut doc = CadDocument::template();
        {
            let part = doc.parts.get_mut("part_1").unwrap();
            part.extrusion.sketch_scale = 0.0;
            part.extrusion.extrude_depth_opposite_normal = -1.0;
        }
        let warnings = validate(&doc);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ValidityWarning::NonPositiveScale { .. })));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ValidityWarning::NegativeDepth { .. })));
    }
}
