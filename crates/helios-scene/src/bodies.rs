//! Celestial body configuration and per-tick orbital state.
//!
//! [`PLANETS`] is the static eight-planet table; [`SolarSystem`] owns one
//! [`BodyState`] per configured body and advances them all in
//! [`step`](SolarSystem::step), the single mutation point for orbital state.

use glam::Vec3;
use rand::Rng;

/// Sun sphere radius in scene units.
pub const SUN_RADIUS: f32 = 8.0;

/// Sun surface color, rgb(255, 231, 48).
pub const SUN_COLOR: [f32; 3] = rgb(0xffe730);

/// Sun self-rotation increment in radians per simulation tick.
pub const SUN_SPIN_SPEED: f32 = 0.005;

/// Convert a 24-bit hex color to normalized RGB components.
const fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Static visual and motion parameters for one celestial body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyConfig {
    /// Display name.
    pub name: &'static str,
    /// Surface color, normalized RGB.
    pub color: [f32; 3],
    /// Render radius in scene units. Must be positive.
    pub radius: f32,
    /// Orbital distance from the origin in scene units. Must be positive.
    pub orbital_distance: f32,
    /// Orbital angle increment in radians per simulation tick. Non-negative;
    /// zero is a valid "frozen" body.
    pub orbital_speed: f32,
    /// Self-rotation increment in radians per simulation tick. Non-negative.
    pub rotation_speed: f32,
}

/// The eight planets, in creation/display order.
pub const PLANETS: [BodyConfig; 8] = [
    BodyConfig {
        name: "Mercury",
        color: rgb(0x8c7853),
        radius: 1.5,
        orbital_distance: 15.0,
        orbital_speed: 0.02,
        rotation_speed: 0.01,
    },
    BodyConfig {
        name: "Venus",
        color: rgb(0xffc649),
        radius: 2.0,
        orbital_distance: 20.0,
        orbital_speed: 0.015,
        rotation_speed: 0.008,
    },
    BodyConfig {
        name: "Earth",
        color: rgb(0x6b93d6),
        radius: 2.2,
        orbital_distance: 25.0,
        orbital_speed: 0.012,
        rotation_speed: 0.01,
    },
    BodyConfig {
        name: "Mars",
        color: rgb(0xcd5c5c),
        radius: 1.8,
        orbital_distance: 30.0,
        orbital_speed: 0.01,
        rotation_speed: 0.009,
    },
    BodyConfig {
        name: "Jupiter",
        color: rgb(0xd8ca9d),
        radius: 5.0,
        orbital_distance: 45.0,
        orbital_speed: 0.008,
        rotation_speed: 0.02,
    },
    BodyConfig {
        name: "Saturn",
        color: rgb(0xfad5a5),
        radius: 4.5,
        orbital_distance: 60.0,
        orbital_speed: 0.006,
        rotation_speed: 0.018,
    },
    BodyConfig {
        name: "Uranus",
        color: rgb(0x4fd0e7),
        radius: 3.0,
        orbital_distance: 75.0,
        orbital_speed: 0.004,
        rotation_speed: 0.012,
    },
    BodyConfig {
        name: "Neptune",
        color: rgb(0x4b70dd),
        radius: 2.8,
        orbital_distance: 90.0,
        orbital_speed: 0.003,
        rotation_speed: 0.011,
    },
];

/// Errors produced when constructing a scene from body configuration.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// A body config failed validation.
    #[error("invalid body config for {name}: {reason}")]
    InvalidBody {
        /// Name of the offending body.
        name: &'static str,
        /// Human-readable description of the violated constraint.
        reason: &'static str,
    },
}

impl BodyConfig {
    /// Validate the numeric constraints: radius and distance strictly
    /// positive, speeds non-negative, all values finite.
    pub fn validate(&self) -> Result<(), SceneError> {
        let invalid = |reason| SceneError::InvalidBody {
            name: self.name,
            reason,
        };

        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(invalid("radius must be a positive finite number"));
        }
        if !self.orbital_distance.is_finite() || self.orbital_distance <= 0.0 {
            return Err(invalid("orbital distance must be a positive finite number"));
        }
        if !self.orbital_speed.is_finite() || self.orbital_speed < 0.0 {
            return Err(invalid("orbital speed must be a non-negative finite number"));
        }
        if !self.rotation_speed.is_finite() || self.rotation_speed < 0.0 {
            return Err(invalid("rotation speed must be a non-negative finite number"));
        }
        Ok(())
    }
}

/// Mutable per-body orbital state.
///
/// `orbit_angle` is unbounded: it grows monotonically and is never wrapped,
/// since only its sine/cosine feed the rendered position.
#[derive(Clone, Debug)]
pub struct BodyState {
    /// The static configuration this state was created from.
    pub config: BodyConfig,
    /// Current orbital angle in radians. Randomized at creation, then
    /// advanced by `orbital_speed` each tick.
    pub orbit_angle: f32,
    /// Current self-rotation angle in radians.
    pub spin_angle: f32,
}

impl BodyState {
    /// Create a state from a config with a uniformly random initial angle
    /// in [0, 2π).
    pub fn new(config: BodyConfig, rng: &mut impl Rng) -> Self {
        Self {
            config,
            orbit_angle: rng.random::<f32>() * std::f32::consts::TAU,
            spin_angle: 0.0,
        }
    }

    /// Advance one tick: orbital angle then self-rotation.
    pub fn step(&mut self) {
        self.orbit_angle += self.config.orbital_speed;
        self.spin_angle += self.config.rotation_speed;
    }

    /// The body's position, fully determined by angle and distance.
    /// All orbits are coplanar in the XZ plane.
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.orbit_angle.cos() * self.config.orbital_distance,
            0.0,
            self.orbit_angle.sin() * self.config.orbital_distance,
        )
    }
}

/// The complete animated system: the sun's spin plus one [`BodyState`] per
/// configured planet.
#[derive(Clone, Debug)]
pub struct SolarSystem {
    /// Sun self-rotation angle in radians.
    pub sun_spin: f32,
    /// Planet states, in configuration order.
    pub bodies: Vec<BodyState>,
}

impl SolarSystem {
    /// Build the system from a configuration table, validating every entry.
    pub fn new(configs: &[BodyConfig], rng: &mut impl Rng) -> Result<Self, SceneError> {
        for config in configs {
            config.validate()?;
        }
        Ok(Self {
            sun_spin: 0.0,
            bodies: configs.iter().map(|&c| BodyState::new(c, rng)).collect(),
        })
    }

    /// Advance the whole system by one tick: sun spin, then every body.
    pub fn step(&mut self) {
        self.sun_spin += SUN_SPIN_SPEED;
        for body in &mut self.bodies {
            body.step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_planet_table_has_eight_entries() {
        assert_eq!(PLANETS.len(), 8);
        for config in &PLANETS {
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_position_determined_by_angle_and_distance() {
        let mut state = BodyState::new(PLANETS[0], &mut test_rng());
        state.orbit_angle = 1.25;
        let d = state.config.orbital_distance;
        let pos = state.position();
        assert_eq!(pos.x, 1.25f32.cos() * d);
        assert_eq!(pos.y, 0.0);
        assert_eq!(pos.z, 1.25f32.sin() * d);
    }

    #[test]
    fn test_angle_advances_monotonically() {
        let mut state = BodyState::new(PLANETS[2], &mut test_rng());
        state.orbit_angle = 0.0;
        let speed = state.config.orbital_speed;
        for k in 1..=1000u32 {
            state.step();
            assert!(
                (state.orbit_angle - k as f32 * speed).abs() < 1e-3,
                "after {k} ticks expected {}, got {}",
                k as f32 * speed,
                state.orbit_angle
            );
        }
    }

    #[test]
    fn test_angle_is_unbounded() {
        let mut state = BodyState::new(PLANETS[0], &mut test_rng());
        state.orbit_angle = 0.0;
        // 400 ticks at 0.02 rad exceeds a full revolution; no wraparound.
        for _ in 0..400 {
            state.step();
        }
        assert!(state.orbit_angle > std::f32::consts::TAU);
    }

    #[test]
    fn test_zero_speed_body_is_frozen() {
        let config = BodyConfig {
            orbital_speed: 0.0,
            rotation_speed: 0.0,
            ..PLANETS[0]
        };
        config.validate().unwrap();
        let mut state = BodyState::new(config, &mut test_rng());
        let before = state.position();
        state.step();
        assert_eq!(state.position(), before);
    }

    #[test]
    fn test_initial_angle_in_range() {
        let mut rng = test_rng();
        for _ in 0..100 {
            let state = BodyState::new(PLANETS[0], &mut rng);
            assert!(state.orbit_angle >= 0.0);
            assert!(state.orbit_angle < std::f32::consts::TAU);
        }
    }

    #[test]
    fn test_system_step_advances_sun_and_bodies() {
        let mut system = SolarSystem::new(&PLANETS, &mut test_rng()).unwrap();
        let start_angles: Vec<f32> = system.bodies.iter().map(|b| b.orbit_angle).collect();

        system.step();

        assert_eq!(system.sun_spin, SUN_SPIN_SPEED);
        for (body, start) in system.bodies.iter().zip(&start_angles) {
            assert_eq!(body.orbit_angle, start + body.config.orbital_speed);
        }
    }

    #[test]
    fn test_first_tick_from_zero_matches_expected_positions() {
        // From angle 0, after one tick: sun spin 0.005, Mercury (speed 0.02,
        // distance 15) at roughly (14.997, 0, 0.300).
        let mut system = SolarSystem::new(&PLANETS, &mut test_rng()).unwrap();
        for body in &mut system.bodies {
            body.orbit_angle = 0.0;
        }

        system.step();

        assert!((system.sun_spin - 0.005).abs() < 1e-7);
        let mercury = &system.bodies[0];
        let pos = mercury.position();
        assert!((pos.x - 14.997).abs() < 1e-3, "x = {}", pos.x);
        assert_eq!(pos.y, 0.0);
        assert!((pos.z - 0.300).abs() < 1e-3, "z = {}", pos.z);
    }

    #[test]
    fn test_position_is_pure() {
        let mut state = BodyState::new(PLANETS[4], &mut test_rng());
        state.orbit_angle = 2.5;
        // No mutation between calls: identical results.
        assert_eq!(state.position(), state.position());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let config = BodyConfig {
            radius: -1.0,
            ..PLANETS[0]
        };
        assert!(matches!(
            config.validate(),
            Err(SceneError::InvalidBody { name: "Mercury", .. })
        ));
    }

    #[test]
    fn test_non_finite_distance_rejected() {
        let config = BodyConfig {
            orbital_distance: f32::NAN,
            ..PLANETS[3]
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_speed_rejected() {
        let config = BodyConfig {
            orbital_speed: -0.01,
            ..PLANETS[1]
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_system_rejects_invalid_member() {
        let mut configs = PLANETS.to_vec();
        configs[5].orbital_distance = 0.0;
        assert!(SolarSystem::new(&configs, &mut test_rng()).is_err());
    }

    #[test]
    fn test_sun_constants() {
        assert_eq!(SUN_RADIUS, 8.0);
        assert_eq!(SUN_SPIN_SPEED, 0.005);
        // rgb(255, 231, 48)
        assert!((SUN_COLOR[0] - 1.0).abs() < 1e-6);
        assert!((SUN_COLOR[1] - 231.0 / 255.0).abs() < 1e-6);
        assert!((SUN_COLOR[2] - 48.0 / 255.0).abs() < 1e-6);
    }
}
