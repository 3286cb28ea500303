//! Integration tests for mesh ingestion.
//!
//! End-to-end: raw file bytes -> ingest -> validated canonical mesh.

use promptcad_gui_lib::fixtures;
use promptcad_gui_lib::ingest::{self, IngestError, SourceFormat, TARGET_SIZE};
use promptcad_gui_lib::validation::MeshValidator;

/// Upload a binary STL spanning x in [0,10], y in [0,2], z in [0,4]:
/// the result is centered at the origin with the largest dimension
/// scaled from 10 to 5, so every axis shrinks by the same 0.5 factor.
#[test]
fn test_stl_upload_normalizes_scale_and_center() {
    let mut bytes = fixtures::box_stl(10.0, 2.0, 4.0);
    // Shift the box so it spans [0,10]x[0,2]x[0,4] instead of being
    // origin-centered; the offset must not survive ingestion.
    {
        let tri_count = 12;
        for t in 0..tri_count {
            for v in 0..3 {
                let base = 84 + t * 50 + 12 + v * 12;
                for (axis, offset) in [5.0f32, 1.0, 2.0].iter().enumerate() {
                    let at = base + axis * 4;
                    let old = f32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
                    bytes[at..at + 4].copy_from_slice(&(old + offset).to_le_bytes());
                }
            }
        }
    }

    let mesh = ingest::ingest(&bytes, SourceFormat::Stl, "plate").unwrap();

    assert!(mesh.bounds.center().length() < 1e-4);
    assert!((mesh.bounds.max_dimension() - TARGET_SIZE).abs() < 1e-3);
    let size = mesh.bounds.size();
    // 10x2x4 at scale 0.5 on every axis.
    assert!((size.x - 5.0).abs() < 1e-3);
    assert!((size.y - 1.0).abs() < 1e-3);
    assert!((size.z - 2.0).abs() < 1e-3);

    let errors = MeshValidator::new(&mesh.data).validate_all();
    assert!(errors.is_empty(), "validation errors: {errors:?}");
}

#[test]
fn test_obj_and_fbx_come_out_identical_to_stl() {
    let stl = ingest::ingest(
        &fixtures::box_stl(2.0, 2.0, 2.0),
        SourceFormat::Stl,
        "a",
    )
    .unwrap();

    let obj_text = "\
v 0 0 0\nv 2 0 0\nv 2 2 0\nv 0 2 0\n\
v 0 0 2\nv 2 0 2\nv 2 2 2\nv 0 2 2\n\
f 1 4 3 2\nf 5 6 7 8\nf 1 2 6 5\nf 3 4 8 7\nf 1 5 8 4\nf 2 3 7 6\n";
    let obj = ingest::ingest(obj_text.as_bytes(), SourceFormat::Obj, "b").unwrap();

    assert_eq!(stl.bounds.size(), obj.bounds.size());
    assert!((obj.bounds.max_dimension() - TARGET_SIZE).abs() < 1e-3);

    let vertices = [
        0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0, 2.0, 0.0,
    ];
    let polygon = [0, 1, 2, !3];
    let fbx_bytes = fixtures::binary_fbx(&vertices, &polygon);
    let fbx = ingest::ingest(&fbx_bytes, SourceFormat::Fbx, "c").unwrap();
    assert!((fbx.bounds.max_dimension() - TARGET_SIZE).abs() < 1e-3);
}

#[test]
fn test_empty_bytes_rejected_before_decoding() {
    assert!(matches!(
        ingest::ingest(&[], SourceFormat::Stl, "x"),
        Err(IngestError::EmptyInput)
    ));
}

#[test]
fn test_point_cloud_collapsed_to_origin_is_degenerate() {
    let bytes = fixtures::binary_stl(&[[[2.0, 2.0, 2.0]; 3]]);
    assert!(matches!(
        ingest::ingest(&bytes, SourceFormat::Stl, "x"),
        Err(IngestError::DegenerateGeometry)
    ));
}

#[test]
fn test_decoder_normals_are_always_recomputed() {
    // Binary STL facet normals are written as zero by the fixture;
    // the canonical mesh must still have unit normals everywhere.
    let bytes = fixtures::box_stl(1.0, 2.0, 3.0);
    let mesh = ingest::ingest(&bytes, SourceFormat::Stl, "n").unwrap();
    let validator = MeshValidator::new(&mesh.data);
    assert!(validator.are_normals_normalized(1e-3));
}
