//! Factory functions for creating test data.
//!
//! Builds raw mesh files (STL, FBX), canonical meshes, and mock
//! generation-service payloads used by unit tests and the headless
//! harness.

use crate::ingest::{self, CanonicalMesh, SourceFormat};
use shared::CadDocument;

// ── Binary STL builders ─────────────────────────────────────────

/// Serialize triangles into a binary STL buffer. Facet normals are
/// written as zero; the ingestion pipeline recomputes them anyway.
pub fn binary_stl(triangles: &[[[f32; 3]; 3]]) -> Vec<u8> {
    let mut bytes = vec![0u8; 80];
    bytes.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
    for tri in triangles {
        for _ in 0..3 {
            bytes.extend_from_slice(&0f32.to_le_bytes());
        }
        for vertex in tri {
            for &coord in vertex {
                bytes.extend_from_slice(&coord.to_le_bytes());
            }
        }
        bytes.extend_from_slice(&0u16.to_le_bytes());
    }
    bytes
}

/// Axis-aligned box of the given dimensions, centered at the origin,
/// as 12 binary STL triangles.
pub fn box_stl(w: f32, h: f32, d: f32) -> Vec<u8> {
    let (x, y, z) = (w / 2.0, h / 2.0, d / 2.0);
    let corners = [
        [-x, -y, -z],
        [x, -y, -z],
        [x, y, -z],
        [-x, y, -z],
        [-x, -y, z],
        [x, -y, z],
        [x, y, z],
        [-x, y, z],
    ];
    let quads: [[usize; 4]; 6] = [
        [0, 3, 2, 1], // -z
        [4, 5, 6, 7], // +z
        [0, 1, 5, 4], // -y
        [2, 3, 7, 6], // +y
        [0, 4, 7, 3], // -x
        [1, 2, 6, 5], // +x
    ];
    let mut triangles = Vec::with_capacity(12);
    for [a, b, c, d] in quads {
        triangles.push([corners[a], corners[b], corners[c]]);
        triangles.push([corners[a], corners[c], corners[d]]);
    }
    binary_stl(&triangles)
}

/// A small already-canonicalized mesh, for code paths that need a mesh
/// without running the ingestion pipeline.
pub fn canonical_box(name: &str) -> CanonicalMesh {
    ingest::ingest(&box_stl(2.0, 2.0, 2.0), SourceFormat::Stl, name)
        .expect("box fixture must ingest")
}

// ── Binary FBX builder ──────────────────────────────────────────

/// Minimal binary FBX 7.4 file containing a single geometry node with
/// the given vertex and polygon-index arrays.
pub fn binary_fbx(vertices: &[f64], polygon: &[i32]) -> Vec<u8> {
    let mut vertex_payload = Vec::new();
    for v in vertices {
        vertex_payload.extend_from_slice(&v.to_le_bytes());
    }
    let mut index_payload = Vec::new();
    for i in polygon {
        index_payload.extend_from_slice(&i.to_le_bytes());
    }

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"Kaydara FBX Binary  \x00\x1a\x00");
    bytes.extend_from_slice(&7400u32.to_le_bytes());

    // Geometry node wrapping the two arrays plus the child sentinel.
    let geometry_start = bytes.len();
    let geometry_header = 4 * 3 + 1 + b"Geometry".len();
    let vertices_len = fbx_leaf_len(b"Vertices", &vertex_payload);
    let indices_len = fbx_leaf_len(b"PolygonVertexIndex", &index_payload);
    let geometry_end =
        geometry_start + geometry_header + vertices_len + indices_len + 13;

    bytes.extend_from_slice(&(geometry_end as u32).to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes()); // no direct properties
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.push(b"Geometry".len() as u8);
    bytes.extend_from_slice(b"Geometry");

    fbx_leaf_node(&mut bytes, b"Vertices", b'd', &vertex_payload);
    fbx_leaf_node(&mut bytes, b"PolygonVertexIndex", b'i', &index_payload);
    bytes.extend_from_slice(&[0u8; 13]); // child sentinel
    debug_assert_eq!(bytes.len(), geometry_end);

    bytes.extend_from_slice(&[0u8; 13]); // top-level sentinel
    bytes
}

fn fbx_leaf_len(name: &[u8], payload: &[u8]) -> usize {
    4 * 3 + 1 + name.len() + 1 + 12 + payload.len()
}

fn fbx_leaf_node(bytes: &mut Vec<u8>, name: &[u8], code: u8, payload: &[u8]) {
    let elem = if code == b'd' { 8 } else { 4 };
    let end_offset = bytes.len() + fbx_leaf_len(name, payload);
    let prop_list_len = 1 + 12 + payload.len();
    bytes.extend_from_slice(&(end_offset as u32).to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&(prop_list_len as u32).to_le_bytes());
    bytes.push(name.len() as u8);
    bytes.extend_from_slice(name);
    bytes.push(code);
    bytes.extend_from_slice(&((payload.len() / elem) as u32).to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes()); // encoding: raw
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
}

// ── Mock generation-service payloads ────────────────────────────

use base64::Engine as _;

/// Successful `/api/generate-stl` response body wrapping the given
/// document and STL bytes.
pub fn service_success_json(document: &CadDocument, stl: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(stl);
    serde_json::json!({
        "success": true,
        "stl_data": encoded,
        "model_response": document,
        "timestamp": "2025-01-01T00:00:00",
        "input_text": "a rectangular plate"
    })
    .to_string()
}

/// Failed service response with a human-readable error.
pub fn service_failure_json(message: &str) -> String {
    serde_json::json!({
        "success": false,
        "error": message,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_stl_has_twelve_triangles() {
        let bytes = box_stl(1.0, 1.0, 1.0);
        assert_eq!(bytes.len(), 84 + 12 * 50);
        let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]);
        assert_eq!(count, 12);
    }

    #[test]
    fn test_canonical_box_is_centered() {
        let mesh = canonical_box("box");
        let center = mesh.bounds.center();
        assert!(center.length() < 1e-4);
    }
}
