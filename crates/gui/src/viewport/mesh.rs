//! CPU-side mesh buffers and geometry helpers.

use glam::Vec3;

/// Triangle mesh data: separate position/normal buffers plus indices.
/// 3 floats per vertex in each buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::new(
            self.positions[i * 3],
            self.positions[i * 3 + 1],
            self.positions[i * 3 + 2],
        )
    }

    pub fn normal(&self, i: usize) -> Vec3 {
        Vec3::new(
            self.normals[i * 3],
            self.normals[i * 3 + 1],
            self.normals[i * 3 + 2],
        )
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Compute from a flat position buffer. None when the buffer is empty.
    pub fn from_positions(positions: &[f32]) -> Option<Aabb> {
        if positions.len() < 3 {
            return None;
        }
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for chunk in positions.chunks_exact(3) {
            let v = Vec3::new(chunk[0], chunk[1], chunk[2]);
            min = min.min(v);
            max = max.max(v);
        }
        Some(Aabb { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest extent across the three axes
    pub fn max_dimension(&self) -> f32 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }

    /// True when the box has no extent on any axis
    pub fn is_degenerate(&self) -> bool {
        self.max_dimension() <= f32::EPSILON
    }
}

/// Recompute per-vertex normals from triangle geometry.
///
/// Face normals are accumulated area-weighted (unnormalized cross
/// product) and normalized per vertex. Vertices referenced by no
/// triangle get a +Z normal so the buffer is always unit-length.
pub fn compute_vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = positions.len() / 3;
    let mut acc = vec![Vec3::ZERO; vertex_count];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
            continue;
        }
        let p0 = Vec3::new(positions[i0 * 3], positions[i0 * 3 + 1], positions[i0 * 3 + 2]);
        let p1 = Vec3::new(positions[i1 * 3], positions[i1 * 3 + 1], positions[i1 * 3 + 2]);
        let p2 = Vec3::new(positions[i2 * 3], positions[i2 * 3 + 1], positions[i2 * 3 + 2]);
        let n = (p1 - p0).cross(p2 - p0);
        acc[i0] += n;
        acc[i1] += n;
        acc[i2] += n;
    }

    let mut normals = Vec::with_capacity(positions.len());
    for n in acc {
        let n = if n.length_squared() > 1e-12 {
            n.normalize()
        } else {
            Vec3::Z
        };
        normals.extend_from_slice(&[n.x, n.y, n.z]);
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_positions() {
        let positions = [0.0, 0.0, 0.0, 2.0, 4.0, -1.0, 1.0, 1.0, 1.0];
        let aabb = Aabb::from_positions(&positions).unwrap();
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 4.0, 1.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(aabb.max_dimension(), 4.0);
        assert!(!aabb.is_degenerate());
    }

    #[test]
    fn test_aabb_empty_buffer() {
        assert!(Aabb::from_positions(&[]).is_none());
    }

    #[test]
    fn test_aabb_single_point_is_degenerate() {
        let aabb = Aabb::from_positions(&[1.0, 2.0, 3.0]).unwrap();
        assert!(aabb.is_degenerate());
    }

    #[test]
    fn test_normals_flat_triangle() {
        // Triangle in the XY plane, CCW: normal is +Z.
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let indices = [0, 1, 2];
        let normals = compute_vertex_normals(&positions, &indices);
        assert_eq!(normals.len(), 9);
        for chunk in normals.chunks_exact(3) {
            assert!((chunk[0]).abs() < 1e-6);
            assert!((chunk[1]).abs() < 1e-6);
            assert!((chunk[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        let positions = [
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0,
        ];
        let indices = [0, 1, 2, 0, 2, 3, 0, 3, 1];
        let normals = compute_vertex_normals(&positions, &indices);
        for chunk in normals.chunks_exact(3) {
            let len = (chunk[0] * chunk[0] + chunk[1] * chunk[1] + chunk[2] * chunk[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_unreferenced_vertex_gets_fallback_normal() {
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 9.0, 9.0, 9.0];
        let indices = [0, 1, 2];
        let normals = compute_vertex_normals(&positions, &indices);
        assert_eq!(&normals[9..12], &[0.0, 0.0, 1.0]);
    }
}
