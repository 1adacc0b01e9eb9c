//! Mesh data and primitive assembly

use super::math::{Vec2, Vec3};
use super::types::{Rgb, Vertex};
use serde::{Deserialize, Serialize};

/// How the index buffer groups vertices into triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    /// Fixed groups of three indices, no reuse across groups
    TriangleList,
    /// Each index after the first two closes a triangle with its two
    /// predecessors, alternating winding
    TriangleStrip,
}

/// An indexed mesh. Plain data: construction and (de)serialization are
/// independent of the rasterizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub topology: PrimitiveTopology,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, topology: PrimitiveTopology) -> Self {
        Self {
            vertices,
            indices,
            topology,
        }
    }

    /// Load a mesh from a RON string
    pub fn from_ron_str(source: &str) -> Result<Self, String> {
        ron::from_str(source).map_err(|e| format!("Failed to parse mesh: {}", e))
    }

    /// Load a mesh from a RON file on disk
    pub fn from_ron_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_ron_str(&source)
    }

    pub fn to_ron_string(&self) -> Result<String, String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| format!("Failed to serialize mesh: {}", e))
    }

    /// Number of triangles the index buffer assembles into
    pub fn triangle_count(&self) -> usize {
        match self.topology {
            PrimitiveTopology::TriangleList => self.indices.len() / 3,
            PrimitiveTopology::TriangleStrip => self.indices.len().saturating_sub(2),
        }
    }

    /// Iterate the assembled triangles as vertex-index triples.
    ///
    /// Strip triangles swap their 2nd and 3rd index on odd positions so
    /// every triangle keeps the same winding.
    pub fn triangles(&self) -> Triangles<'_> {
        Triangles {
            indices: &self.indices,
            topology: self.topology,
            cursor: 0,
        }
    }

    /// 3x3 grid of vertices spanning [-3, 3] at z = -2, assembled as a
    /// triangle strip with a degenerate bridge between the two rows
    pub fn grid_strip() -> Self {
        Self::new(
            grid_vertices(),
            vec![3, 0, 4, 1, 5, 2, 2, 6, 6, 3, 7, 4, 8, 5],
            PrimitiveTopology::TriangleStrip,
        )
    }

    /// The same 3x3 grid assembled as a triangle list
    pub fn grid_list() -> Self {
        Self::new(
            grid_vertices(),
            vec![
                3, 0, 1, 1, 4, 3, 4, 1, 2, 2, 5, 4, //
                6, 3, 4, 4, 7, 6, 7, 4, 5, 5, 8, 7,
            ],
            PrimitiveTopology::TriangleList,
        )
    }
}

fn grid_vertices() -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(9);
    for row in 0..3 {
        for col in 0..3 {
            let u = col as f32 * 0.5;
            let v = row as f32 * 0.5;
            vertices.push(Vertex::new(
                Vec3::new(-3.0 + col as f32 * 3.0, 3.0 - row as f32 * 3.0, -2.0),
                Rgb::WHITE,
                Vec2::new(u, v),
            ));
        }
    }
    vertices
}

/// Iterator over assembled triangle index triples
pub struct Triangles<'a> {
    indices: &'a [u32],
    topology: PrimitiveTopology,
    cursor: usize,
}

impl Iterator for Triangles<'_> {
    type Item = [u32; 3];

    fn next(&mut self) -> Option<[u32; 3]> {
        match self.topology {
            PrimitiveTopology::TriangleList => {
                let chunk = self.indices.get(self.cursor..self.cursor + 3)?;
                self.cursor += 3;
                Some([chunk[0], chunk[1], chunk[2]])
            }
            PrimitiveTopology::TriangleStrip => {
                let window = self.indices.get(self.cursor..self.cursor + 3)?;
                let triangle = if self.cursor % 2 == 0 {
                    [window[0], window[1], window[2]]
                } else {
                    [window[0], window[2], window[1]]
                };
                self.cursor += 1;
                Some(triangle)
            }
        }
    }
}
