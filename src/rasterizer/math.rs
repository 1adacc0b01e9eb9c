//! Vector and transform math for 3D rendering

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UNIT_X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const UNIT_Y: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const UNIT_Z: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

/// 2D Vector (screen positions and texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 2D cross product (signed parallelogram area of the two vectors)
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        Vec2 {
            x: self.x * s,
            y: self.y * s,
        }
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, s: f32) -> Vec2 {
        Vec2 {
            x: self.x / s,
            y: self.y / s,
        }
    }
}

/// Affine 3D transform: three basis columns plus a translation.
///
/// A point transforms as `x_axis*p.x + y_axis*p.y + z_axis*p.z + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
    pub translation: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x_axis: Vec3::UNIT_X,
        y_axis: Vec3::UNIT_Y,
        z_axis: Vec3::UNIT_Z,
        translation: Vec3::ZERO,
    };

    pub fn from_basis(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3, translation: Vec3) -> Self {
        Self {
            x_axis,
            y_axis,
            z_axis,
            translation,
        }
    }

    /// Rotation around the world X axis
    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x_axis: Vec3::UNIT_X,
            y_axis: Vec3::new(0.0, c, s),
            z_axis: Vec3::new(0.0, -s, c),
            translation: Vec3::ZERO,
        }
    }

    /// Rotation around the world Y axis
    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            x_axis: Vec3::new(c, 0.0, -s),
            y_axis: Vec3::UNIT_Y,
            z_axis: Vec3::new(s, 0.0, c),
            translation: Vec3::ZERO,
        }
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.x_axis * p.x + self.y_axis * p.y + self.z_axis * p.z + self.translation
    }

    /// Transform a direction, ignoring translation
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.x_axis * v.x + self.y_axis * v.y + self.z_axis * v.z
    }

    /// Inverse of a rigid transform (orthonormal basis): transposed rotation,
    /// back-rotated negated translation.
    pub fn inverse_rigid(&self) -> Self {
        let t = self.translation;
        Self {
            x_axis: Vec3::new(self.x_axis.x, self.y_axis.x, self.z_axis.x),
            y_axis: Vec3::new(self.x_axis.y, self.y_axis.y, self.z_axis.y),
            z_axis: Vec3::new(self.x_axis.z, self.y_axis.z, self.z_axis.z),
            translation: Vec3::new(-self.x_axis.dot(t), -self.y_axis.dot(t), -self.z_axis.dot(t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let c = Vec3::UNIT_X.cross(Vec3::UNIT_Y);
        assert!((c.z - 1.0).abs() < 0.001);
        assert!(c.x.abs() < 0.001 && c.y.abs() < 0.001);
    }

    #[test]
    fn test_vec2_cross_sign() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(0.0, 1.0);
        assert!(a.cross(b) > 0.0);
        assert!(b.cross(a) < 0.0);
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        let r = Transform::rotation_y(std::f32::consts::FRAC_PI_2);
        let v = r.transform_vector(Vec3::UNIT_Z);
        assert!((v.x - 1.0).abs() < 1e-5);
        assert!(v.z.abs() < 1e-5);
    }

    #[test]
    fn test_inverse_rigid_round_trip() {
        let r = Transform::rotation_y(0.7);
        let m = Transform::from_basis(r.x_axis, r.y_axis, r.z_axis, Vec3::new(1.0, -2.0, 3.0));
        let p = Vec3::new(0.5, 4.0, -1.5);
        let back = m.inverse_rigid().transform_point(m.transform_point(p));
        assert!((back - p).len() < 1e-4);
    }
}
