//! Mesh ingestion pipeline.
//!
//! Converts an uploaded model file into a `CanonicalMesh`: decode per
//! format, validate, center the bounding box on the origin, scale the
//! largest dimension to `TARGET_SIZE`, and recompute normals from the
//! final geometry. Every format comes out looking the same to the
//! viewer.

mod fbx;
mod obj;
mod stl;

use std::fmt;

use thiserror::Error;

use crate::viewport::mesh::{compute_vertex_normals, Aabb, MeshData};

/// Uniform size of an ingested model: the largest bounding-box
/// dimension is scaled to exactly this. Matches the default camera
/// framing, which is never auto-fitted.
pub const TARGET_SIZE: f32 = 5.0;

/// Upload size cap, enforced at the boundary before ingestion runs
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Recognized model file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Stl,
    Obj,
    Fbx,
}

impl SourceFormat {
    /// Map a file extension (case-insensitive, no dot) to a format.
    pub fn from_extension(ext: &str) -> Result<SourceFormat, IngestError> {
        match ext.to_ascii_lowercase().as_str() {
            "stl" => Ok(SourceFormat::Stl),
            "obj" => Ok(SourceFormat::Obj),
            "fbx" => Ok(SourceFormat::Fbx),
            other => Err(IngestError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Stl => "stl",
            SourceFormat::Obj => "obj",
            SourceFormat::Fbx => "fbx",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceFormat::Stl => "STL",
            SourceFormat::Obj => "OBJ",
            SourceFormat::Fbx => "FBX",
        })
    }
}

/// Ingestion failures
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file is empty")]
    EmptyInput,
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("malformed {format} data: {reason}")]
    Malformed {
        format: &'static str,
        reason: String,
    },
    #[error("decoded geometry has no vertex positions")]
    EmptyGeometry,
    #[error("bounding box has zero extent on all axes")]
    DegenerateGeometry,
}

/// Decoder output before canonicalization. Decoder-provided normals are
/// carried but always discarded: some decoders omit them, others
/// compute them pre-normalization.
#[derive(Debug, Default)]
pub struct RawGeometry {
    pub positions: Vec<f32>,
    pub normals: Option<Vec<f32>>,
    /// None means unindexed triangle soup (consecutive vertex triples)
    pub indices: Option<Vec<u32>>,
}

/// Stateless bytes → geometry decoder, one per format
pub trait MeshDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RawGeometry, IngestError>;
}

fn decoder_for(format: SourceFormat) -> &'static dyn MeshDecoder {
    match format {
        SourceFormat::Stl => &stl::StlDecoder,
        SourceFormat::Obj => &obj::ObjDecoder,
        SourceFormat::Fbx => &fbx::FbxDecoder,
    }
}

/// A mesh in canonical form: centered at the origin, largest dimension
/// equal to `TARGET_SIZE`, normals recomputed from final geometry.
#[derive(Debug, Clone)]
pub struct CanonicalMesh {
    pub name: String,
    pub source_format: SourceFormat,
    pub data: MeshData,
    pub bounds: Aabb,
}

/// Run the full pipeline on raw file bytes.
pub fn ingest(bytes: &[u8], format: SourceFormat, name: &str) -> Result<CanonicalMesh, IngestError> {
    if bytes.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    let raw = decoder_for(format).decode(bytes)?;
    if raw.positions.is_empty() {
        return Err(IngestError::EmptyGeometry);
    }

    let mut positions = raw.positions;
    let indices = raw
        .indices
        .unwrap_or_else(|| (0..(positions.len() / 3) as u32).collect());

    let bounds = Aabb::from_positions(&positions).ok_or(IngestError::EmptyGeometry)?;
    if bounds.is_degenerate() {
        return Err(IngestError::DegenerateGeometry);
    }

    // Center on the origin, then scale uniformly (aspect preserved).
    let center = bounds.center();
    let scale = TARGET_SIZE / bounds.max_dimension();
    for chunk in positions.chunks_exact_mut(3) {
        chunk[0] = (chunk[0] - center.x) * scale;
        chunk[1] = (chunk[1] - center.y) * scale;
        chunk[2] = (chunk[2] - center.z) * scale;
    }

    let normals = compute_vertex_normals(&positions, &indices);
    let bounds = Aabb::from_positions(&positions).ok_or(IngestError::EmptyGeometry)?;

    tracing::info!(
        "ingested {} mesh '{}': {} vertices, {} triangles",
        format,
        name,
        positions.len() / 3,
        indices.len() / 3
    );

    Ok(CanonicalMesh {
        name: name.to_string(),
        source_format: format,
        data: MeshData {
            positions,
            normals,
            indices,
        },
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(SourceFormat::from_extension("STL").unwrap(), SourceFormat::Stl);
        assert_eq!(SourceFormat::from_extension("obj").unwrap(), SourceFormat::Obj);
        assert_eq!(SourceFormat::from_extension("Fbx").unwrap(), SourceFormat::Fbx);
        assert!(matches!(
            SourceFormat::from_extension("gltf"),
            Err(IngestError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            ingest(&[], SourceFormat::Stl, "x"),
            Err(IngestError::EmptyInput)
        ));
    }

    #[test]
    fn test_ingest_centers_and_scales() {
        let bytes = fixtures::box_stl(10.0, 2.0, 4.0);
        let mesh = ingest(&bytes, SourceFormat::Stl, "box").unwrap();

        let c = mesh.bounds.center();
        assert!(c.length() < 1e-4, "center {c:?} not at origin");
        assert!((mesh.bounds.max_dimension() - TARGET_SIZE).abs() < 1e-4);

        // Aspect ratio preserved: 10:2:4 → 5:1:2.
        let s = mesh.bounds.size();
        assert!((s.x - 5.0).abs() < 1e-4);
        assert!((s.y - 1.0).abs() < 1e-4);
        assert!((s.z - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_ingest_recomputes_unit_normals() {
        let bytes = fixtures::box_stl(3.0, 3.0, 3.0);
        let mesh = ingest(&bytes, SourceFormat::Stl, "box").unwrap();
        assert_eq!(mesh.data.normals.len(), mesh.data.positions.len());
        for chunk in mesh.data.normals.chunks_exact(3) {
            let len = (chunk[0] * chunk[0] + chunk[1] * chunk[1] + chunk[2] * chunk[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_degenerate_geometry_rejected() {
        // Every vertex at the same point: zero extent on all axes.
        let bytes = fixtures::binary_stl(&[[[1.0, 1.0, 1.0]; 3]]);
        assert!(matches!(
            ingest(&bytes, SourceFormat::Stl, "point"),
            Err(IngestError::DegenerateGeometry)
        ));
    }

    #[test]
    fn test_zero_triangle_stl_is_empty_geometry() {
        let bytes = fixtures::binary_stl(&[]);
        assert!(matches!(
            ingest(&bytes, SourceFormat::Stl, "empty"),
            Err(IngestError::EmptyGeometry)
        ));
    }
}
