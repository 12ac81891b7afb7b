//! The scene's light rig: one shadow-casting point light at the origin, a
//! warm ambient term, and two directional fills from opposing diagonals.
//!
//! CPU structs describe the lights; [`LightRig::to_uniform`] packs them into
//! the single std140-compatible uniform the lit shader consumes.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Point light with a finite range, inverse-distance falloff, and shadows.
#[derive(Clone, Debug)]
pub struct PointLight {
    /// Position in scene units.
    pub position: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Scalar intensity multiplier.
    pub intensity: f32,
    /// Maximum radius of effect. Beyond this distance, contribution is zero.
    pub range: f32,
}

/// Uniform ambient term applied to every lit surface.
#[derive(Clone, Debug)]
pub struct AmbientLight {
    /// Linear RGB color.
    pub color: Vec3,
    /// Scalar intensity multiplier.
    pub intensity: f32,
}

/// Infinitely-distant directional light.
#[derive(Clone, Debug)]
pub struct DirectionalLight {
    /// Normalized direction pointing FROM the light toward the scene.
    pub direction: Vec3,
    /// Linear RGB color.
    pub color: Vec3,
    /// Scalar intensity multiplier.
    pub intensity: f32,
}

impl DirectionalLight {
    /// Build a light shining from `position` toward the origin.
    pub fn from_position(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            direction: (-position).normalize(),
            color,
            intensity,
        }
    }
}

/// The complete four-light rig.
#[derive(Clone, Debug)]
pub struct LightRig {
    /// Shadow-casting sun light at the origin.
    pub point: PointLight,
    /// Warm ambient fill.
    pub ambient: AmbientLight,
    /// Two directional fills so no planet face is fully unlit.
    pub directionals: [DirectionalLight; 2],
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            point: PointLight {
                position: Vec3::ZERO,
                color: Vec3::ONE,
                intensity: 1.5,
                range: 500.0,
            },
            ambient: AmbientLight {
                color: Vec3::new(1.0, 1.0, 0.0),
                intensity: 0.6,
            },
            directionals: [
                DirectionalLight::from_position(Vec3::new(50.0, 50.0, 50.0), Vec3::ONE, 0.3),
                DirectionalLight::from_position(Vec3::new(-50.0, -50.0, -50.0), Vec3::ONE, 0.2),
            ],
        }
    }
}

impl LightRig {
    /// Pack the rig into the GPU uniform.
    pub fn to_uniform(&self) -> LightRigUniform {
        let dir = |d: &DirectionalLight| {
            (
                [d.direction.x, d.direction.y, d.direction.z, d.intensity],
                [d.color.x, d.color.y, d.color.z, 0.0],
            )
        };
        let (dir0_direction_intensity, dir0_color) = dir(&self.directionals[0]);
        let (dir1_direction_intensity, dir1_color) = dir(&self.directionals[1]);

        LightRigUniform {
            point_position_range: [
                self.point.position.x,
                self.point.position.y,
                self.point.position.z,
                self.point.range,
            ],
            point_color_intensity: [
                self.point.color.x,
                self.point.color.y,
                self.point.color.z,
                self.point.intensity,
            ],
            ambient_color_intensity: [
                self.ambient.color.x,
                self.ambient.color.y,
                self.ambient.color.z,
                self.ambient.intensity,
            ],
            dir0_direction_intensity,
            dir0_color,
            dir1_direction_intensity,
            dir1_color,
        }
    }
}

/// GPU-side light rig, 112 bytes, std140-compatible.
///
/// Bound at `@group(1) @binding(0)` visible to `ShaderStages::FRAGMENT`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightRigUniform {
    /// xyz = point light position, w = range.
    pub point_position_range: [f32; 4],
    /// xyz = point light color, w = intensity.
    pub point_color_intensity: [f32; 4],
    /// xyz = ambient color, w = intensity.
    pub ambient_color_intensity: [f32; 4],
    /// xyz = first fill direction (normalized), w = intensity.
    pub dir0_direction_intensity: [f32; 4],
    /// xyz = first fill color, w = padding.
    pub dir0_color: [f32; 4],
    /// xyz = second fill direction (normalized), w = intensity.
    pub dir1_direction_intensity: [f32; 4],
    /// xyz = second fill color, w = padding.
    pub dir1_color: [f32; 4],
}
