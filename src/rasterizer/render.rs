//! Rasterizer core: depth-tested, perspective-correct triangle filling

use super::camera::Camera;
use super::math::Vec2;
use super::mesh::Mesh;
use super::transform::project_vertices;
use super::types::{Rgb, ScreenVertex, Texture};

/// Signed areas below this are treated as zero (degenerate triangle)
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Framebuffer for software rendering: packed RGBA color plus a float
/// depth buffer. The depth buffer holds the smallest accepted depth per
/// pixel for the current frame, `INFINITY` where nothing has been drawn.
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub depth: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            depth: vec![f32::INFINITY; width * height],
            width,
            height,
        }
    }

    /// Reset for a new frame: fill color with the background and depth
    /// with `INFINITY`
    pub fn clear(&mut self, background: Rgb) {
        let bytes = background.to_bytes();
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&bytes);
        }
        self.depth.fill(f32::INFINITY);
    }

    pub fn color_at(&self, x: usize, y: usize) -> [u8; 4] {
        let idx = (y * self.width + x) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }
}

/// Per-call render counters. Degenerate or malformed triangles are
/// recoverable skips; the counters surface them without logging from the
/// pixel loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Triangles assembled from the index buffer
    pub triangles: usize,
    /// Triangles that reached the pixel loop
    pub drawn: usize,
    /// Back-facing triangles rejected by winding
    pub culled: usize,
    /// Degenerate triangles (zero area, camera-plane depth) and
    /// out-of-range indices
    pub skipped: usize,
}

/// Render a mesh through the camera into the framebuffer.
///
/// Transforms all vertices to screen space, assembles triangles per the
/// mesh topology, and rasterizes each one with depth testing. When a
/// texture is bound, fragments sample it at perspective-correct UVs;
/// otherwise vertex colors are interpolated, equally perspective-correct.
pub fn render_mesh(
    fb: &mut Framebuffer,
    mesh: &Mesh,
    camera: &Camera,
    texture: Option<&Texture>,
) -> RenderStats {
    let screen_vertices = project_vertices(&mesh.vertices, camera, fb.width, fb.height);
    let mut stats = RenderStats::default();

    for [i0, i1, i2] in mesh.triangles() {
        stats.triangles += 1;
        let fetched = (
            screen_vertices.get(i0 as usize),
            screen_vertices.get(i1 as usize),
            screen_vertices.get(i2 as usize),
        );
        let (Some(v0), Some(v1), Some(v2)) = fetched else {
            stats.skipped += 1;
            continue;
        };
        match rasterize_triangle(fb, v0, v1, v2, texture) {
            TriangleOutcome::Drawn => stats.drawn += 1,
            TriangleOutcome::Culled => stats.culled += 1,
            TriangleOutcome::Degenerate => stats.skipped += 1,
        }
    }

    stats
}

enum TriangleOutcome {
    Drawn,
    Culled,
    Degenerate,
}

/// Edge function: signed parallelogram area of edge (a -> b) against
/// point p. Positive when p lies on the triangle's interior side for the
/// accepted winding.
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).cross(p - a)
}

/// Rasterize one screen-space triangle into the framebuffer.
///
/// Every pixel of the clamped bounding box is tested with the three edge
/// functions; a pixel is covered iff all three are strictly positive, so
/// edge-on pixels and back faces never write. Depth is the reciprocal-
/// weighted perspective-correct interpolation of view-space z, compared
/// strictly against the depth buffer.
fn rasterize_triangle(
    fb: &mut Framebuffer,
    v0: &ScreenVertex,
    v1: &ScreenVertex,
    v2: &ScreenVertex,
    texture: Option<&Texture>,
) -> TriangleOutcome {
    let p0 = v0.xy();
    let p1 = v1.xy();
    let p2 = v2.xy();

    // Guard the two divisors of the inner loop up front so neither NaN
    // nor infinity can reach the depth buffer and poison later frames'
    // comparisons at that pixel.
    let total_area = edge(p0, p1, p2);
    if !total_area.is_finite() || total_area.abs() <= DEGENERATE_EPSILON {
        return TriangleOutcome::Degenerate;
    }
    if total_area < 0.0 {
        // opposite winding: no pixel can pass the strictly-positive test
        return TriangleOutcome::Culled;
    }
    for z in [v0.z, v1.z, v2.z] {
        if !z.is_finite() || z.abs() <= DEGENERATE_EPSILON {
            return TriangleOutcome::Degenerate;
        }
    }

    let min_x = (p0.x.min(p1.x).min(p2.x) as i32).clamp(0, fb.width as i32 - 1);
    let max_x = (p0.x.max(p1.x).max(p2.x) as i32).clamp(0, fb.width as i32 - 1);
    let min_y = (p0.y.min(p1.y).min(p2.y) as i32).clamp(0, fb.height as i32 - 1);
    let max_y = (p0.y.max(p1.y).max(p2.y) as i32).clamp(0, fb.height as i32 - 1);

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let pixel = Vec2::new(px as f32, py as f32);

            let e0 = edge(p1, p2, pixel);
            let e1 = edge(p2, p0, pixel);
            let e2 = edge(p0, p1, pixel);

            if e0 > 0.0 && e1 > 0.0 && e2 > 0.0 {
                // barycentric weights: each edge value over the total
                // area, summing to one by construction
                let w0 = e0 / total_area;
                let w1 = e1 / total_area;
                let w2 = e2 / total_area;

                let depth = 1.0 / (w0 / v0.z + w1 / v1.z + w2 / v2.z);

                let idx = py as usize * fb.width + px as usize;
                if depth < fb.depth[idx] {
                    fb.depth[idx] = depth;

                    let color = match texture {
                        Some(tex) => {
                            let uv = (v0.uv / v0.z * w0
                                + v1.uv / v1.z * w1
                                + v2.uv / v2.z * w2)
                                * depth;
                            tex.sample(uv)
                        }
                        None => {
                            (v0.color * (w0 / v0.z)
                                + v1.color * (w1 / v1.z)
                                + v2.color * (w2 / v2.z))
                                * depth
                        }
                    };

                    let bytes = color.max_to_one().to_bytes();
                    fb.pixels[idx * 4..idx * 4 + 4].copy_from_slice(&bytes);
                }
            }
        }
    }

    TriangleOutcome::Drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::math::Vec3;

    const BACKGROUND: Rgb = Rgb { r: 0.39, g: 0.39, b: 0.39 };

    fn screen_vertex(x: f32, y: f32, z: f32, color: Rgb, uv: Vec2) -> ScreenVertex {
        ScreenVertex { x, y, z, color, uv }
    }

    fn white_triangle() -> [ScreenVertex; 3] {
        [
            screen_vertex(400.0, 100.0, 1.0, Rgb::WHITE, Vec2::default()),
            screen_vertex(600.0, 500.0, 1.0, Rgb::WHITE, Vec2::default()),
            screen_vertex(200.0, 500.0, 1.0, Rgb::WHITE, Vec2::default()),
        ]
    }

    #[test]
    fn test_inside_pixel_is_colored_outside_stays_background() {
        let mut fb = Framebuffer::new(800, 600);
        fb.clear(BACKGROUND);
        let [v0, v1, v2] = white_triangle();
        let outcome = rasterize_triangle(&mut fb, &v0, &v1, &v2, None);
        assert!(matches!(outcome, TriangleOutcome::Drawn));

        assert_eq!(fb.color_at(400, 300), [255, 255, 255, 255]);
        // outside the bounding box entirely
        assert_eq!(fb.color_at(10, 10), BACKGROUND.to_bytes());
        // inside the bounding box but outside the edges
        assert_eq!(fb.color_at(210, 110), BACKGROUND.to_bytes());
        assert!(fb.depth_at(210, 110).is_infinite());
    }

    #[test]
    fn test_barycentric_weights_sum_to_one_inside() {
        let [v0, v1, v2] = white_triangle();
        let (p0, p1, p2) = (v0.xy(), v1.xy(), v2.xy());
        let total_area = edge(p0, p1, p2);
        for (px, py) in [(400, 300), (399, 480), (550, 495), (401, 102)] {
            let pixel = Vec2::new(px as f32, py as f32);
            let e0 = edge(p1, p2, pixel);
            let e1 = edge(p2, p0, pixel);
            let e2 = edge(p0, p1, pixel);
            assert!(e0 > 0.0 && e1 > 0.0 && e2 > 0.0, "pixel must be inside");
            let sum = (e0 + e1 + e2) / total_area;
            assert!((sum - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_uv_interpolation_recovers_vertex_uvs() {
        let mut texels = vec![Rgb::BLACK; 16];
        texels[0] = Rgb::RED; // texel (0,0)
        texels[3] = Rgb::GREEN; // texel (3,0)
        texels[12] = Rgb::BLUE; // texel (0,3)
        let tex = Texture::from_texels(4, 4, texels).unwrap();

        let v0 = screen_vertex(0.0, 0.0, 1.0, Rgb::WHITE, Vec2::new(0.0, 0.0));
        let v1 = screen_vertex(100.0, 0.0, 1.0, Rgb::WHITE, Vec2::new(1.0, 0.0));
        let v2 = screen_vertex(0.0, 100.0, 1.0, Rgb::WHITE, Vec2::new(0.0, 1.0));

        let mut fb = Framebuffer::new(128, 128);
        fb.clear(BACKGROUND);
        rasterize_triangle(&mut fb, &v0, &v1, &v2, Some(&tex));

        // pixels hugging each vertex sample that vertex's texel
        assert_eq!(fb.color_at(1, 1), Rgb::RED.to_bytes());
        assert_eq!(fb.color_at(97, 1), Rgb::GREEN.to_bytes());
        assert_eq!(fb.color_at(1, 97), Rgb::BLUE.to_bytes());
    }

    #[test]
    fn test_depth_buffer_keeps_nearest_write() {
        let far = [
            screen_vertex(400.0, 100.0, 10.0, Rgb::RED, Vec2::default()),
            screen_vertex(600.0, 500.0, 10.0, Rgb::RED, Vec2::default()),
            screen_vertex(200.0, 500.0, 10.0, Rgb::RED, Vec2::default()),
        ];
        let near = [
            screen_vertex(400.0, 100.0, 5.0, Rgb::GREEN, Vec2::default()),
            screen_vertex(600.0, 500.0, 5.0, Rgb::GREEN, Vec2::default()),
            screen_vertex(200.0, 500.0, 5.0, Rgb::GREEN, Vec2::default()),
        ];

        // far then near: the near write replaces and depth decreases
        let mut fb = Framebuffer::new(800, 600);
        fb.clear(BACKGROUND);
        rasterize_triangle(&mut fb, &far[0], &far[1], &far[2], None);
        let depth_after_far = fb.depth_at(400, 300);
        rasterize_triangle(&mut fb, &near[0], &near[1], &near[2], None);
        assert_eq!(fb.color_at(400, 300), Rgb::GREEN.to_bytes());
        assert!(fb.depth_at(400, 300) < depth_after_far);

        // near then far: the far triangle loses the depth test
        let mut fb = Framebuffer::new(800, 600);
        fb.clear(BACKGROUND);
        rasterize_triangle(&mut fb, &near[0], &near[1], &near[2], None);
        rasterize_triangle(&mut fb, &far[0], &far[1], &far[2], None);
        assert_eq!(fb.color_at(400, 300), Rgb::GREEN.to_bytes());
    }

    #[test]
    fn test_degenerate_triangle_writes_nothing() {
        let mut fb = Framebuffer::new(64, 64);
        fb.clear(BACKGROUND);
        let before = fb.pixels.clone();

        let v0 = screen_vertex(10.0, 10.0, 1.0, Rgb::WHITE, Vec2::default());
        let v1 = screen_vertex(20.0, 20.0, 1.0, Rgb::WHITE, Vec2::default());
        let v2 = screen_vertex(30.0, 30.0, 1.0, Rgb::WHITE, Vec2::default());
        let outcome = rasterize_triangle(&mut fb, &v0, &v1, &v2, None);

        assert!(matches!(outcome, TriangleOutcome::Degenerate));
        assert_eq!(fb.pixels, before);
        assert!(fb.depth.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_camera_plane_vertex_is_skipped_without_nan() {
        let mut fb = Framebuffer::new(64, 64);
        fb.clear(BACKGROUND);
        let v0 = screen_vertex(5.0, 5.0, 0.0, Rgb::WHITE, Vec2::default());
        let v1 = screen_vertex(50.0, 10.0, 1.0, Rgb::WHITE, Vec2::default());
        let v2 = screen_vertex(10.0, 50.0, 1.0, Rgb::WHITE, Vec2::default());
        let outcome = rasterize_triangle(&mut fb, &v0, &v1, &v2, None);
        assert!(matches!(outcome, TriangleOutcome::Degenerate));
        assert!(fb.depth.iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn test_opposite_winding_is_culled() {
        let mut fb = Framebuffer::new(800, 600);
        fb.clear(BACKGROUND);
        let [v0, v1, v2] = white_triangle();
        // swap two vertices to flip the winding
        let outcome = rasterize_triangle(&mut fb, &v0, &v2, &v1, None);
        assert!(matches!(outcome, TriangleOutcome::Culled));
        assert_eq!(fb.color_at(400, 300), BACKGROUND.to_bytes());
    }

    #[test]
    fn test_offscreen_bounding_box_is_clamped() {
        let mut fb = Framebuffer::new(64, 64);
        fb.clear(BACKGROUND);
        // spills past the right and bottom edges: must not panic and must
        // still fill the visible corner
        let v0 = screen_vertex(32.0, -20.0, 1.0, Rgb::WHITE, Vec2::default());
        let v1 = screen_vertex(120.0, 80.0, 1.0, Rgb::WHITE, Vec2::default());
        let v2 = screen_vertex(-20.0, 80.0, 1.0, Rgb::WHITE, Vec2::default());
        rasterize_triangle(&mut fb, &v0, &v1, &v2, None);
        assert_eq!(fb.color_at(32, 40), [255, 255, 255, 255]);
    }

    #[test]
    fn test_render_mesh_stats_and_idempotence() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, -10.0), 60.0);
        let mesh = Mesh::grid_strip();
        let texture = Texture::checkerboard(16, 16, Rgb::WHITE, Rgb::BLUE);

        let mut fb1 = Framebuffer::new(320, 240);
        fb1.clear(BACKGROUND);
        let stats = render_mesh(&mut fb1, &mesh, &camera, Some(&texture));
        assert_eq!(stats.triangles, 12);
        assert_eq!(stats.drawn + stats.culled + stats.skipped, 12);
        assert!(stats.drawn > 0);

        let mut fb2 = Framebuffer::new(320, 240);
        fb2.clear(BACKGROUND);
        let stats2 = render_mesh(&mut fb2, &mesh, &camera, Some(&texture));
        assert_eq!(stats, stats2);
        assert_eq!(fb1.pixels, fb2.pixels);
    }

    #[test]
    fn test_render_mesh_skips_out_of_range_indices() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, -10.0), 60.0);
        let mut mesh = Mesh::grid_list();
        mesh.indices[0] = 99;
        let mut fb = Framebuffer::new(64, 64);
        fb.clear(BACKGROUND);
        let stats = render_mesh(&mut fb, &mesh, &camera, None);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.triangles, 8);
    }
}
