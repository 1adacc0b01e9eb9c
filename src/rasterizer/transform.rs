//! Vertex stage: world space through view space to screen space

use super::camera::Camera;
use super::types::{ScreenVertex, Vertex};

/// Project world-space vertices to screen space.
///
/// Per vertex: view transform, perspective divide by view-space z, FOV and
/// aspect-ratio scale, then NDC-to-pixel mapping with y flipped for the
/// top-left screen origin. The view-space depth is kept unmodified in `z`
/// for the depth test and perspective correction downstream.
///
/// Output length and order match the input; color and UV pass through.
///
/// Precondition: no vertex lies exactly on the camera plane (view-space
/// z of zero). Such a vertex divides by zero here; the rasterizer's depth
/// guard later rejects the non-finite triangle.
pub fn project_vertices(
    vertices: &[Vertex],
    camera: &Camera,
    width: usize,
    height: usize,
) -> Vec<ScreenVertex> {
    let aspect_ratio = width as f32 / height as f32;
    let mut out = Vec::with_capacity(vertices.len());

    for vertex in vertices {
        let view = camera.view_matrix.transform_point(vertex.position);

        let mut x = view.x / view.z;
        let mut y = view.y / view.z;

        x /= aspect_ratio * camera.fov;
        y /= camera.fov;

        out.push(ScreenVertex {
            x: (x + 1.0) / 2.0 * width as f32,
            y: (1.0 - y) / 2.0 * height as f32,
            z: view.z,
            color: vertex.color,
            uv: vertex.uv,
        });
    }

    out
}
