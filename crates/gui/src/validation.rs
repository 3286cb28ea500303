//! Mesh validation utilities.
//!
//! `MeshValidator` checks the invariants ingestion is supposed to
//! establish: buffer strides, in-range indices, unit normals, and the
//! centered-at-origin / target-size normalization.

use crate::ingest::TARGET_SIZE;
use crate::viewport::mesh::{Aabb, MeshData};

/// Validator for `MeshData` integrity checks.
pub struct MeshValidator<'a> {
    mesh: &'a MeshData,
}

impl<'a> MeshValidator<'a> {
    pub fn new(mesh: &'a MeshData) -> Self {
        Self { mesh }
    }

    /// Check that position and normal buffers are multiples of 3 and
    /// the same length.
    pub fn is_stride_valid(&self) -> bool {
        self.mesh.positions.len() % 3 == 0
            && self.mesh.normals.len() == self.mesh.positions.len()
    }

    /// Check that the index buffer length is a multiple of 3.
    pub fn is_index_stride_valid(&self) -> bool {
        self.mesh.indices.len() % 3 == 0
    }

    /// Check that all indices are within the valid vertex range.
    pub fn are_indices_in_range(&self) -> bool {
        let max_idx = self.mesh.vertex_count() as u32;
        self.mesh.indices.iter().all(|&i| i < max_idx)
    }

    /// Check that all vertex normals have unit length (within epsilon).
    pub fn are_normals_normalized(&self, epsilon: f32) -> bool {
        (0..self.mesh.vertex_count())
            .all(|i| (self.mesh.normal(i).length() - 1.0).abs() <= epsilon)
    }

    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_positions(&self.mesh.positions)
    }

    /// Check the normalization contract: bounding box centered at the
    /// origin with its largest dimension at the target size.
    pub fn is_normalized(&self, tolerance: f32) -> bool {
        let Some(aabb) = self.aabb() else {
            return false;
        };
        aabb.center().length() <= tolerance
            && (aabb.max_dimension() - TARGET_SIZE).abs() <= tolerance
    }

    /// Run all checks and return a list of error messages. An empty
    /// list means the mesh is valid.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.is_stride_valid() {
            errors.push("position/normal buffer stride mismatch".to_string());
        }
        if !self.is_index_stride_valid() {
            errors.push("index count is not a multiple of 3".to_string());
        }
        if !self.are_indices_in_range() {
            errors.push("index out of vertex range".to_string());
        }
        if !self.are_normals_normalized(1e-3) {
            errors.push("non-unit vertex normal".to_string());
        }
        if !self.is_normalized(1e-3) {
            errors.push("mesh is not centered and scaled to target size".to_string());
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_ingested_mesh_passes_all_checks() {
        let mesh = fixtures::canonical_box("box");
        let validator = MeshValidator::new(&mesh.data);
        assert_eq!(validator.validate_all(), Vec::<String>::new());
    }

    #[test]
    fn test_out_of_range_index_is_reported() {
        let mut mesh = fixtures::canonical_box("box").data;
        mesh.indices[0] = mesh.vertex_count() as u32 + 7;
        let validator = MeshValidator::new(&mesh);
        assert!(validator
            .validate_all()
            .iter()
            .any(|e| e.contains("index out of vertex range")));
    }

    #[test]
    fn test_denormalized_mesh_is_reported() {
        let mut mesh = fixtures::canonical_box("box").data;
        for p in &mut mesh.positions {
            *p += 2.0;
        }
        let validator = MeshValidator::new(&mesh);
        assert!(!validator.is_normalized(1e-3));
    }
}
