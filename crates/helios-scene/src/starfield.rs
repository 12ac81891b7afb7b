//! Background starfield: deterministic uniform point placement inside a
//! cube, rendered as fixed-size point sprites.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Half-extent of the starfield cube: coordinates are uniform in
/// [-1000, 1000] on each axis.
pub const STARFIELD_EXTENT: f32 = 1000.0;

/// Generates a deterministic star catalog from a seed.
pub struct StarfieldGenerator {
    seed: u64,
    star_count: u32,
}

impl StarfieldGenerator {
    /// Create a new generator with the given seed and star count.
    pub fn new(seed: u64, star_count: u32) -> Self {
        Self { seed, star_count }
    }

    /// Generate the star positions. Deterministic for a given seed.
    pub fn generate(&self) -> Vec<glam::Vec3> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut stars = Vec::with_capacity(self.star_count as usize);

        for _ in 0..self.star_count {
            stars.push(glam::Vec3::new(
                (rng.random::<f32>() - 0.5) * 2.0 * STARFIELD_EXTENT,
                (rng.random::<f32>() - 0.5) * 2.0 * STARFIELD_EXTENT,
                (rng.random::<f32>() - 0.5) * 2.0 * STARFIELD_EXTENT,
            ));
        }

        stars
    }
}
