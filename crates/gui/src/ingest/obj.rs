//! Wavefront OBJ decoder.
//!
//! Handles `v` and `f` statements; `f` entries may be `v`, `v/vt`,
//! `v/vt/vn` or `v//vn` and may use negative (relative) indices.
//! Polygons with more than three vertices are fan-triangulated.
//! Everything else (`vn`, `vt`, `g`, `usemtl`, …) is skipped — normals
//! are recomputed after canonicalization anyway.

use super::{IngestError, MeshDecoder, RawGeometry};

pub struct ObjDecoder;

fn malformed(lineno: usize, reason: impl Into<String>) -> IngestError {
    IngestError::Malformed {
        format: "OBJ",
        reason: format!("line {}: {}", lineno, reason.into()),
    }
}

impl MeshDecoder for ObjDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RawGeometry, IngestError> {
        let text = std::str::from_utf8(bytes).map_err(|_| IngestError::Malformed {
            format: "OBJ",
            reason: "invalid UTF-8".to_string(),
        })?;

        let mut positions: Vec<f32> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();

        for (i, line) in text.lines().enumerate() {
            let lineno = i + 1;
            let line = line.split('#').next().unwrap_or("").trim();
            let mut words = line.split_whitespace();
            match words.next() {
                Some("v") => {
                    for _ in 0..3 {
                        let word = words
                            .next()
                            .ok_or_else(|| malformed(lineno, "vertex needs 3 coordinates"))?;
                        let value: f32 = word
                            .parse()
                            .map_err(|_| malformed(lineno, format!("bad number '{word}'")))?;
                        positions.push(value);
                    }
                }
                Some("f") => {
                    let vertex_count = positions.len() / 3;
                    let mut face: Vec<u32> = Vec::new();
                    for word in words {
                        face.push(parse_face_index(word, vertex_count, lineno)?);
                    }
                    if face.len() < 3 {
                        return Err(malformed(lineno, "face needs at least 3 vertices"));
                    }
                    for k in 1..face.len() - 1 {
                        indices.extend_from_slice(&[face[0], face[k], face[k + 1]]);
                    }
                }
                _ => {}
            }
        }

        Ok(RawGeometry {
            positions,
            normals: None,
            indices: Some(indices),
        })
    }
}

/// Resolve one `f` entry to a zero-based position index.
fn parse_face_index(word: &str, vertex_count: usize, lineno: usize) -> Result<u32, IngestError> {
    let first = word.split('/').next().unwrap_or("");
    let idx: i64 = first
        .parse()
        .map_err(|_| malformed(lineno, format!("bad face index '{word}'")))?;

    let resolved = if idx > 0 {
        idx - 1
    } else if idx < 0 {
        // Negative indices count back from the most recent vertex.
        vertex_count as i64 + idx
    } else {
        return Err(malformed(lineno, "face index 0 is not valid"));
    };

    if resolved < 0 || resolved >= vertex_count as i64 {
        return Err(malformed(
            lineno,
            format!("face index {idx} out of range ({vertex_count} vertices)"),
        ));
    }
    Ok(resolved as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let raw = ObjDecoder.decode(obj.as_bytes()).unwrap();
        assert_eq!(raw.positions.len(), 9);
        assert_eq!(raw.indices.as_deref(), Some(&[0, 1, 2][..]));
    }

    #[test]
    fn test_quad_fan_triangulated() {
        let obj = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let raw = ObjDecoder.decode(obj.as_bytes()).unwrap();
        assert_eq!(raw.indices.as_deref(), Some(&[0, 1, 2, 0, 2, 3][..]));
    }

    #[test]
    fn test_slash_forms_and_comments() {
        let obj = "# a comment\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2/1/1 3/1\n";
        let raw = ObjDecoder.decode(obj.as_bytes()).unwrap();
        assert_eq!(raw.indices.as_deref(), Some(&[0, 1, 2][..]));
    }

    #[test]
    fn test_negative_indices() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let raw = ObjDecoder.decode(obj.as_bytes()).unwrap();
        assert_eq!(raw.indices.as_deref(), Some(&[0, 1, 2][..]));
    }

    #[test]
    fn test_out_of_range_index() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        assert!(matches!(
            ObjDecoder.decode(obj.as_bytes()),
            Err(IngestError::Malformed { .. })
        ));
    }

    #[test]
    fn test_short_face() {
        let obj = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(matches!(
            ObjDecoder.decode(obj.as_bytes()),
            Err(IngestError::Malformed { .. })
        ));
    }
}
