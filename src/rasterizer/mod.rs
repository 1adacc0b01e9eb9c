//! Software triangle rasterizer
//!
//! World-space meshes flow one way per frame: camera view transform and
//! projection, primitive assembly from indexed topologies, then the
//! per-triangle bounding-box loop with edge-function coverage, depth
//! testing, and perspective-correct attribute interpolation.

mod camera;
mod math;
mod mesh;
mod render;
mod transform;
mod types;

pub use camera::Camera;
pub use math::{Transform, Vec2, Vec3};
pub use mesh::{Mesh, PrimitiveTopology, Triangles};
pub use render::{render_mesh, Framebuffer, RenderStats};
pub use transform::project_vertices;
pub use types::{Rgb, ScreenVertex, Texture, Vertex};

/// Default framebuffer dimensions
pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 480;
