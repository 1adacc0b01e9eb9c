//! Camera state: position, orientation, and the derived view transform

use super::math::{Transform, Vec3};

/// Camera with an orthonormal basis derived from `forward` alone.
///
/// `forward` is the only persistent orientation state; `right` and `up`
/// are recomputed from it against the world up axis every time the view
/// matrix is rebuilt.
#[derive(Debug, Clone)]
pub struct Camera {
    pub origin: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    /// Field of view in degrees
    pub fov_angle: f32,
    /// Projection scale: tan(fov_angle / 2)
    pub fov: f32,
    pub view_matrix: Transform,
    pub inv_view_matrix: Transform,
}

impl Camera {
    pub fn new(origin: Vec3, fov_angle: f32) -> Self {
        let mut camera = Self {
            origin,
            forward: Vec3::UNIT_Z,
            up: Vec3::UNIT_Y,
            right: Vec3::UNIT_X,
            fov_angle,
            fov: (fov_angle.to_radians() / 2.0).tan(),
            view_matrix: Transform::IDENTITY,
            inv_view_matrix: Transform::IDENTITY,
        };
        camera.calculate_view_matrix();
        camera
    }

    pub fn set_fov_angle(&mut self, fov_angle: f32) {
        self.fov_angle = fov_angle;
        self.fov = (fov_angle.to_radians() / 2.0).tan();
    }

    /// Rebuild the orthonormal basis from `forward` and derive the view
    /// matrix as the rigid inverse of the camera-to-world transform.
    pub fn calculate_view_matrix(&mut self) {
        self.right = Vec3::UNIT_Y.cross(self.forward).normalize();
        self.up = self.forward.cross(self.right).normalize();
        self.inv_view_matrix =
            Transform::from_basis(self.right, self.up, self.forward, self.origin);
        self.view_matrix = self.inv_view_matrix.inverse_rigid();
    }

    /// Move along the camera's own axes (x = right, y = up, z = forward)
    pub fn move_local(&mut self, delta: Vec3) {
        self.origin = self.origin
            + self.right * delta.x
            + self.up * delta.y
            + self.forward * delta.z;
    }

    /// Rotate `forward` by a yaw around world Y followed by a pitch around
    /// world X. The basis catches up on the next `calculate_view_matrix`.
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        let rotation_y = Transform::rotation_y(yaw);
        let rotation_x = Transform::rotation_x(pitch);
        self.forward = rotation_y
            .transform_vector(rotation_x.transform_vector(self.forward))
            .normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fov_scale() {
        let camera = Camera::new(Vec3::ZERO, 90.0);
        assert!((camera.fov - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_basis_is_right_handed() {
        let camera = Camera::new(Vec3::ZERO, 60.0);
        assert!((camera.right - Vec3::UNIT_X).len() < 1e-5);
        assert!((camera.up - Vec3::UNIT_Y).len() < 1e-5);
        let cross = camera.right.cross(camera.up);
        assert!((cross - camera.forward).len() < 1e-5);
    }

    #[test]
    fn test_view_matrix_maps_world_to_view() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, -10.0), 60.0);
        let view = camera.view_matrix.transform_point(Vec3::new(0.0, 0.0, -2.0));
        assert!((view - Vec3::new(0.0, 0.0, 8.0)).len() < 1e-4);
    }

    #[test]
    fn test_basis_follows_forward_after_rotate() {
        let mut camera = Camera::new(Vec3::ZERO, 60.0);
        camera.rotate(std::f32::consts::FRAC_PI_2, 0.0);
        camera.calculate_view_matrix();
        assert!((camera.forward - Vec3::UNIT_X).len() < 1e-5);
        // basis stays orthonormal
        assert!(camera.right.dot(camera.forward).abs() < 1e-5);
        assert!(camera.up.dot(camera.forward).abs() < 1e-5);
    }
}
