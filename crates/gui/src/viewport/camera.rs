use glam::{Mat4, Vec3};

use super::mesh::Aabb;

/// Named view presets reachable from the viewport toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPreset {
    Front,
    Top,
    Right,
    Isometric,
}

impl ViewPreset {
    pub fn label(&self) -> &'static str {
        match self {
            ViewPreset::Front => "Front",
            ViewPreset::Top => "Top",
            ViewPreset::Right => "Right",
            ViewPreset::Isometric => "Iso",
        }
    }

    pub fn all() -> &'static [ViewPreset] {
        &[
            ViewPreset::Front,
            ViewPreset::Top,
            ViewPreset::Right,
            ViewPreset::Isometric,
        ]
    }
}

/// Arc-ball camera for the 3D viewport.
///
/// The default distance frames a mesh normalized to the 5-unit target
/// size; ingestion guarantees that scale, so the camera never needs to
/// auto-fit on load.
pub struct ArcBallCamera {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians)
    pub pitch: f32,
    /// Distance from target
    pub distance: f32,
    /// Camera target point
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov: f32,
}

const DEFAULT_YAW: f32 = 0.6;
const DEFAULT_PITCH: f32 = 0.4;
const DEFAULT_DISTANCE: f32 = 9.0;

impl ArcBallCamera {
    pub fn new() -> Self {
        Self {
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            distance: DEFAULT_DISTANCE,
            target: Vec3::ZERO,
            fov: 45.0_f32.to_radians(),
        }
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx.to_radians();
        self.pitch = (self.pitch + dy.to_radians()).clamp(-1.5, 1.5);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta)).clamp(0.5, 100.0);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let right = self.right_vector();
        let up = self.up_vector();
        self.target += right * dx + up * dy;
    }

    /// Back to the default framing
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Frame a bounding box: retarget to its center and back off far
    /// enough that the whole box fits the field of view.
    pub fn fit(&mut self, aabb: &Aabb) {
        self.target = aabb.center();
        let radius = aabb.size().length() * 0.5;
        if radius > 0.0 {
            self.distance = (radius / (self.fov * 0.5).tan() * 1.2).clamp(0.5, 100.0);
        }
    }

    pub fn apply_preset(&mut self, preset: ViewPreset) {
        let (yaw, pitch) = match preset {
            ViewPreset::Front => (0.0, 0.0),
            ViewPreset::Top => (0.0, 1.5),
            ViewPreset::Right => (std::f32::consts::FRAC_PI_2, 0.0),
            ViewPreset::Isometric => (DEFAULT_YAW, DEFAULT_PITCH),
        };
        self.yaw = yaw;
        self.pitch = pitch;
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let cy = self.yaw.cos();
        let sy = self.yaw.sin();
        let cp = self.pitch.cos();
        let sp = self.pitch.sin();

        self.target
            + Vec3::new(
                self.distance * cp * sy,
                self.distance * sp,
                self.distance * cp * cy,
            )
    }

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, aspect, 0.1, 200.0)
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn right_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        fwd.cross(Vec3::Y).normalize_or_zero()
    }

    fn up_vector(&self) -> Vec3 {
        let fwd = (self.target - self.eye_position()).normalize_or_zero();
        self.right_vector().cross(fwd).normalize_or_zero()
    }
}

impl Default for ArcBallCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = ArcBallCamera::new();
        camera.rotate(0.0, 10_000.0);
        assert!(camera.pitch <= 1.5);
        camera.rotate(0.0, -20_000.0);
        assert!(camera.pitch >= -1.5);
    }

    #[test]
    fn test_zoom_stays_in_range() {
        let mut camera = ArcBallCamera::new();
        camera.zoom(0.99);
        camera.zoom(0.99);
        camera.zoom(0.99);
        assert!(camera.distance >= 0.5);
        camera.zoom(-1000.0);
        assert!(camera.distance <= 100.0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut camera = ArcBallCamera::new();
        camera.rotate(30.0, 10.0);
        camera.zoom(0.5);
        camera.pan(1.0, 2.0);
        camera.reset();
        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.distance, DEFAULT_DISTANCE);
    }

    #[test]
    fn test_fit_targets_box_center() {
        let mut camera = ArcBallCamera::new();
        let aabb = Aabb {
            min: Vec3::new(1.0, 1.0, 1.0),
            max: Vec3::new(3.0, 3.0, 3.0),
        };
        camera.fit(&aabb);
        assert_eq!(camera.target, Vec3::new(2.0, 2.0, 2.0));
        assert!(camera.distance > 0.5);
    }
}
