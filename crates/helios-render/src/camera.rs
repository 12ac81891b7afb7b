//! Perspective camera for view and projection matrix generation.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Uniform buffer for the camera, 80 bytes: view-projection matrix plus the
/// world-space camera position (needed for specular shading).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = camera position, w = padding.
    pub camera_pos: [f32; 4],
}

/// A perspective camera that generates view and projection matrices.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Eye position in world space.
    pub position: Vec3,
    /// The point the camera looks at.
    pub target: Vec3,
    /// Up reference vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Compute the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Compute the projection matrix with reverse-Z.
    pub fn projection_matrix(&self) -> Mat4 {
        // Reverse-Z: near plane maps to z=1, far plane maps to z=0.
        // This is handled by swapping near/far in the projection matrix.
        Mat4::perspective_rh(
            self.fov_y,
            self.aspect_ratio,
            self.far,  // swapped: far as "near" parameter
            self.near, // swapped: near as "far" parameter
        )
    }

    /// Compute the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Update the aspect ratio after a resize.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        self.aspect_ratio = width / height;
    }

    /// Convert the camera to a uniform suitable for GPU upload.
    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            camera_pos: [self.position.x, self.position.y, self.position.z, 0.0],
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 50.0, 100.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_values() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 50.0, 100.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert!((camera.fov_y - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
    }

    #[test]
    fn test_set_aspect_ratio() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1920.0, 1080.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect_ratio(800.0, 800.0);
        assert!((camera.aspect_ratio - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix_moves_origin_along_view_axis() {
        let camera = Camera::default();
        // The origin (the camera's target) must land on the -Z view axis at
        // the eye-to-target distance.
        let view_origin = camera.view_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let distance = camera.position.length();
        assert!(view_origin.x.abs() < 1e-4);
        assert!(view_origin.y.abs() < 1e-4);
        assert!((view_origin.z + distance).abs() < 1e-3);
    }

    #[test]
    fn test_reverse_z_depth_ordering() {
        let camera = Camera {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            ..Camera::default()
        };
        let vp = camera.view_projection_matrix();

        // A near point projects to higher NDC depth than a far point.
        let near_point = vp * glam::Vec4::new(0.0, 0.0, 9.0, 1.0);
        let far_point = vp * glam::Vec4::new(0.0, 0.0, -200.0, 1.0);
        let near_depth = near_point.z / near_point.w;
        let far_depth = far_point.z / far_point.w;
        assert!(
            near_depth > far_depth,
            "reverse-Z: near {near_depth} should exceed far {far_depth}"
        );
    }

    #[test]
    fn test_uniform_layout() {
        // mat4x4 (64 bytes) + vec4 (16 bytes)
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::offset_of!(CameraUniform, camera_pos), 64);
    }

    #[test]
    fn test_to_uniform_is_pure() {
        let camera = Camera::default();
        let a = camera.to_uniform();
        let b = camera.to_uniform();
        assert_eq!(bytemuck::bytes_of(&a), bytemuck::bytes_of(&b));
    }

    #[test]
    fn test_view_projection_combines_correctly() {
        let camera = Camera::default();
        let vp = camera.view_projection_matrix();
        let expected = camera.projection_matrix() * camera.view_matrix();
        for col in 0..4 {
            for row in 0..4 {
                assert!(
                    (vp.col(col)[row] - expected.col(col)[row]).abs() < 1e-6,
                    "mismatch at col={col}, row={row}"
                );
            }
        }
    }
}
