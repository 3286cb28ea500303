//! Software mesh renderer drawing through the egui painter.
//!
//! Triangles are projected with the camera's view-projection matrix,
//! backface-culled, flat-shaded against a fixed light, depth-sorted,
//! and painted back to front. Plenty for previewing generated models
//! without owning a GL context.

use egui::{Color32, Pos2, Rect, Stroke};
use glam::{Mat4, Vec3, Vec4};

use super::mesh::MeshData;
use super::ArcBallCamera;

const BASE_COLOR: Vec3 = Vec3::new(0.62, 0.68, 0.78);
const LIGHT_DIR: Vec3 = Vec3::new(0.4, 0.8, 0.45);
const AMBIENT: f32 = 0.35;

struct ProjectedTriangle {
    points: [Pos2; 3],
    depth: f32,
    color: Color32,
}

/// Paint a mesh into `rect`.
pub fn paint_mesh(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera, mesh: &MeshData) {
    let aspect = rect.width() / rect.height().max(1.0);
    let vp = camera.view_projection(aspect);
    let eye = camera.eye_position();
    let light = LIGHT_DIR.normalize();

    let mut triangles = Vec::with_capacity(mesh.triangle_count());
    for tri in mesh.indices.chunks_exact(3) {
        let a = mesh.position(tri[0] as usize);
        let b = mesh.position(tri[1] as usize);
        let c = mesh.position(tri[2] as usize);

        let normal = (b - a).cross(c - a).normalize_or_zero();
        let center = (a + b + c) / 3.0;
        if normal.dot(eye - center) <= 0.0 {
            continue; // facing away
        }

        let Some((pa, da)) = project(vp, a, rect) else { continue };
        let Some((pb, _)) = project(vp, b, rect) else { continue };
        let Some((pc, _)) = project(vp, c, rect) else { continue };

        let diffuse = normal.dot(light).max(0.0);
        let shade = (AMBIENT + (1.0 - AMBIENT) * diffuse).min(1.0);
        let rgb = BASE_COLOR * shade;
        let color = Color32::from_rgb(
            (rgb.x * 255.0) as u8,
            (rgb.y * 255.0) as u8,
            (rgb.z * 255.0) as u8,
        );

        triangles.push(ProjectedTriangle {
            points: [pa, pb, pc],
            depth: da,
            color,
        });
    }

    // Painter's algorithm: farthest first.
    triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    for tri in triangles {
        painter.add(egui::Shape::convex_polygon(
            tri.points.to_vec(),
            tri.color,
            Stroke::NONE,
        ));
    }
}

/// Paint the world axes as short colored lines from the origin.
pub fn paint_axes(painter: &egui::Painter, rect: Rect, camera: &ArcBallCamera) {
    let aspect = rect.width() / rect.height().max(1.0);
    let vp = camera.view_projection(aspect);
    let axes = [
        (Vec3::X, Color32::from_rgb(220, 80, 80)),
        (Vec3::Y, Color32::from_rgb(90, 200, 90)),
        (Vec3::Z, Color32::from_rgb(90, 120, 230)),
    ];
    let Some((origin, _)) = project(vp, Vec3::ZERO, rect) else {
        return;
    };
    for (dir, color) in axes {
        if let Some((tip, _)) = project(vp, dir * 3.0, rect) {
            painter.line_segment([origin, tip], Stroke::new(1.5, color));
        }
    }
}

/// Project a world point into screen space. Returns the screen
/// position and a depth value for sorting; None behind the camera.
fn project(vp: Mat4, point: Vec3, rect: Rect) -> Option<(Pos2, f32)> {
    let clip = vp * Vec4::new(point.x, point.y, point.z, 1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    let x = rect.center().x + ndc.x * rect.width() * 0.5;
    let y = rect.center().y - ndc.y * rect.height() * 0.5;
    Some((egui::pos2(x, y), ndc.z))
}
