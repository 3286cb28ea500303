//! STL decoder (binary and ASCII).

use super::{IngestError, MeshDecoder, RawGeometry};

pub struct StlDecoder;

fn malformed(reason: impl Into<String>) -> IngestError {
    IngestError::Malformed {
        format: "STL",
        reason: reason.into(),
    }
}

impl MeshDecoder for StlDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RawGeometry, IngestError> {
        if looks_ascii(bytes) {
            decode_ascii(bytes)
        } else {
            decode_binary(bytes)
        }
    }
}

/// Binary files may also start with "solid" in the 80-byte comment
/// header, so require an actual `facet` keyword before treating the
/// input as ASCII.
fn looks_ascii(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    text.trim_start().starts_with("solid") && text.contains("facet")
}

fn decode_binary(bytes: &[u8]) -> Result<RawGeometry, IngestError> {
    if bytes.len() < 84 {
        return Err(malformed("too small for header + triangle count"));
    }

    let count =
        u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    // 50 bytes per triangle: normal + 3 vertices + attribute count
    let expected = 84 + count * 50;
    if bytes.len() < expected {
        return Err(malformed(format!(
            "truncated: {} triangles need {} bytes, got {}",
            count,
            expected,
            bytes.len()
        )));
    }

    let mut positions = Vec::with_capacity(count * 9);
    let mut normals = Vec::with_capacity(count * 9);
    let mut offset = 84;
    for _ in 0..count {
        let n = read_vec3(bytes, offset);
        offset += 12;
        for _ in 0..3 {
            let v = read_vec3(bytes, offset);
            offset += 12;
            positions.extend_from_slice(&v);
            normals.extend_from_slice(&n);
        }
        offset += 2; // attribute byte count
    }

    Ok(RawGeometry {
        positions,
        normals: Some(normals),
        indices: None,
    })
}

fn decode_ascii(bytes: &[u8]) -> Result<RawGeometry, IngestError> {
    let text = std::str::from_utf8(bytes).map_err(|_| malformed("invalid UTF-8"))?;

    let mut positions = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let mut words = line.split_whitespace();
        if words.next() != Some("vertex") {
            continue;
        }
        for _ in 0..3 {
            let word = words
                .next()
                .ok_or_else(|| malformed(format!("line {}: short vertex", lineno + 1)))?;
            let value: f32 = word
                .parse()
                .map_err(|_| malformed(format!("line {}: bad number '{word}'", lineno + 1)))?;
            positions.push(value);
        }
    }

    if positions.len() % 9 != 0 {
        return Err(malformed("vertex count is not a multiple of 3"));
    }

    Ok(RawGeometry {
        positions,
        normals: None,
        indices: None,
    })
}

fn read_vec3(bytes: &[u8], offset: usize) -> [f32; 3] {
    let f = |o: usize| {
        f32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]])
    };
    [f(offset), f(offset + 4), f(offset + 8)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_binary_triangle() {
        let bytes = fixtures::binary_stl(&[[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        let raw = StlDecoder.decode(&bytes).unwrap();
        assert_eq!(raw.positions.len(), 9);
        assert_eq!(&raw.positions[3..6], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_binary_truncated() {
        let mut bytes = fixtures::binary_stl(&[[[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]]);
        bytes.truncate(100);
        assert!(matches!(
            StlDecoder.decode(&bytes),
            Err(IngestError::Malformed { .. })
        ));
    }

    #[test]
    fn test_too_small_for_header() {
        assert!(matches!(
            StlDecoder.decode(&[0u8; 10]),
            Err(IngestError::Malformed { .. })
        ));
    }

    #[test]
    fn test_ascii_triangle() {
        let text = "\
solid tri
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid tri
";
        let raw = StlDecoder.decode(text.as_bytes()).unwrap();
        assert_eq!(raw.positions.len(), 9);
        assert_eq!(&raw.positions[6..9], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_ascii_bad_number() {
        let text = "solid x\nfacet normal 0 0 1\nvertex 0 zero 0\nendfacet\nendsolid";
        assert!(matches!(
            StlDecoder.decode(text.as_bytes()),
            Err(IngestError::Malformed { .. })
        ));
    }

    #[test]
    fn test_binary_with_solid_comment_header() {
        // Header text starts with "solid" but there is no ASCII body.
        let tri = [[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]];
        let mut bytes = fixtures::binary_stl(&tri);
        bytes[..5].copy_from_slice(b"solid");
        let raw = StlDecoder.decode(&bytes).unwrap();
        assert_eq!(raw.positions.len(), 9);
    }
}
