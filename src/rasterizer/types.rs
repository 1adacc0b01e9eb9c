//! Core types for the rasterizer

use super::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Normalized float RGB color carried through the pipeline.
///
/// Channels live in `[0, 1]` until interpolation pushes them past it;
/// `max_to_one` brings a color back into range before packing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };
    pub const RED: Rgb = Rgb { r: 1.0, g: 0.0, b: 0.0 };
    pub const GREEN: Rgb = Rgb { r: 0.0, g: 1.0, b: 0.0 };
    pub const BLUE: Rgb = Rgb { r: 0.0, g: 0.0, b: 1.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Rescale the whole color by `1/max_channel` when any channel exceeds 1,
    /// preserving hue instead of clipping channels independently.
    pub fn max_to_one(self) -> Self {
        let max = self.r.max(self.g).max(self.b);
        if max > 1.0 {
            Self {
                r: self.r / max,
                g: self.g / max,
                b: self.b / max,
            }
        } else {
            self
        }
    }

    /// Pack to 8-bit RGBA for the framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0) as u8,
            (self.g.clamp(0.0, 1.0) * 255.0) as u8,
            (self.b.clamp(0.0, 1.0) * 255.0) as u8,
            255,
        ]
    }
}

impl Default for Rgb {
    // Unlit geometry renders white, not invisible black
    fn default() -> Self {
        Rgb::WHITE
    }
}

impl std::ops::Add for Rgb {
    type Output = Rgb;
    fn add(self, other: Rgb) -> Rgb {
        Rgb {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl std::ops::Mul<f32> for Rgb {
    type Output = Rgb;
    fn mul(self, s: f32) -> Rgb {
        Rgb {
            r: self.r * s,
            g: self.g * s,
            b: self.b * s,
        }
    }
}

/// A world-space vertex: position, color, texture coordinate
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    #[serde(default)]
    pub color: Rgb,
    #[serde(default)]
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, color: Rgb, uv: Vec2) -> Self {
        Self { position, color, uv }
    }

    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            color: Rgb::WHITE,
            uv: Vec2::default(),
        }
    }
}

/// A vertex after projection: pixel coordinates plus retained view-space
/// depth. Kept as a distinct type so screen positions cannot be mistaken
/// for world positions.
///
/// `z` is the unmodified view-space depth, reused both as the depth-test
/// key and as the perspective-correction divisor.
#[derive(Debug, Clone, Copy)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color: Rgb,
    pub uv: Vec2,
}

impl ScreenVertex {
    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Decoded texture: immutable texel grid sampled by the rasterizer
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    texels: Vec<Rgb>,
}

impl Texture {
    /// Load a texture from an image file on disk
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;
        Ok(Self::from_image(img))
    }

    fn from_image(img: image::DynamicImage) -> Self {
        use image::GenericImageView;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();
        let texels = rgba
            .pixels()
            .map(|p| Rgb::from_bytes(p[0], p[1], p[2]))
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            texels,
        }
    }

    /// Build a texture from explicit texels. Fails when the dimensions do
    /// not match the texel count.
    pub fn from_texels(width: usize, height: usize, texels: Vec<Rgb>) -> Result<Self, String> {
        if texels.len() != width * height {
            return Err(format!(
                "Texel count {} does not match {}x{}",
                texels.len(),
                width,
                height
            ));
        }
        Ok(Self { width, height, texels })
    }

    /// Procedural checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Rgb, color2: Rgb) -> Self {
        let mut texels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                texels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, texels }
    }

    /// Procedural UV debug grid: red/green gradient across U/V with
    /// darkened cell borders
    pub fn uv_grid(width: usize, height: usize) -> Self {
        let mut texels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let u = x as f32 / width as f32;
                let v = y as f32 / height as f32;
                let border = x % 32 == 0 || y % 32 == 0;
                let shade = if border { 0.25 } else { 1.0 };
                texels.push(Rgb::new(u, v, 0.5) * shade);
            }
        }
        Self { width, height, texels }
    }

    /// Nearest-neighbor sample at a normalized coordinate.
    ///
    /// Out-of-range coordinates clamp to the edge texel.
    pub fn sample(&self, uv: Vec2) -> Rgb {
        let x = ((uv.x * self.width as f32) as isize).clamp(0, self.width as isize - 1);
        let y = ((uv.y * self.height as f32) as isize).clamp(0, self.height as isize - 1);
        self.texels[y as usize * self.width + x as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_to_one_preserves_hue() {
        let c = Rgb::new(2.0, 1.0, 0.5).max_to_one();
        assert!((c.r - 1.0).abs() < 1e-5);
        assert!((c.g - 0.5).abs() < 1e-5);
        assert!((c.b - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_max_to_one_in_range_untouched() {
        let c = Rgb::new(0.2, 0.9, 0.4);
        assert_eq!(c.max_to_one(), c);
    }

    #[test]
    fn test_sample_top_left() {
        let mut texels = vec![Rgb::BLACK; 16];
        texels[0] = Rgb::RED;
        let tex = Texture::from_texels(4, 4, texels).unwrap();
        assert_eq!(tex.sample(Vec2::new(0.0, 0.0)), Rgb::RED);
    }

    #[test]
    fn test_sample_near_one_hits_last_texel() {
        let mut texels = vec![Rgb::BLACK; 16];
        texels[15] = Rgb::GREEN;
        let tex = Texture::from_texels(4, 4, texels).unwrap();
        assert_eq!(tex.sample(Vec2::new(0.999, 0.999)), Rgb::GREEN);
    }

    #[test]
    fn test_sample_out_of_range_clamps() {
        let mut texels = vec![Rgb::BLACK; 16];
        texels[0] = Rgb::RED;
        texels[15] = Rgb::GREEN;
        let tex = Texture::from_texels(4, 4, texels).unwrap();
        assert_eq!(tex.sample(Vec2::new(-3.0, -0.5)), Rgb::RED);
        assert_eq!(tex.sample(Vec2::new(1.5, 42.0)), Rgb::GREEN);
    }

    #[test]
    fn test_from_texels_dimension_mismatch() {
        assert!(Texture::from_texels(3, 3, vec![Rgb::BLACK; 8]).is_err());
    }
}
