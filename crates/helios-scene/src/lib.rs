//! Scene model for the Helios solar-system viewer: the celestial-body
//! configuration table, per-body orbital state and the per-tick update,
//! procedural geometry, the background starfield, and the light rig.
//!
//! This crate is pure CPU state and math — no GPU types. The renderer
//! consumes its mesh data and uniform structs.

pub mod bodies;
pub mod geometry;
pub mod lights;
pub mod starfield;

pub use bodies::{
    BodyConfig, BodyState, PLANETS, SUN_COLOR, SUN_RADIUS, SUN_SPIN_SPEED, SceneError, SolarSystem,
};
pub use geometry::{MeshData, RING_HALF_WIDTH, RING_SEGMENTS, SPHERE_SEGMENTS, orbit_ring, uv_sphere};
pub use lights::{AmbientLight, DirectionalLight, LightRig, LightRigUniform, PointLight};
pub use starfield::{STARFIELD_EXTENT, StarfieldGenerator};
