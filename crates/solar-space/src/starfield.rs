//! Procedural starfield: deterministic star placement on a large sphere
//! around the system, with colors drawn from weighted stellar classes.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A single background star.
#[derive(Clone, Debug)]
pub struct StarPoint {
    /// World-space position on the sky sphere.
    pub position: glam::Vec3,
    /// Brightness in [0.2, 1.0].
    pub brightness: f32,
    pub color: [f32; 3],
}

/// Coarse stellar type used to pick a star's tint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StellarClass {
    /// ~70% of stars.
    WhiteBlue,
    /// ~15%.
    YellowOrange,
    /// ~10%.
    Red,
    /// ~5%.
    Blue,
}

impl StellarClass {
    /// Map a uniform roll in [0, 1) onto the weighted classes.
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.70 {
            Self::WhiteBlue
        } else if roll < 0.85 {
            Self::YellowOrange
        } else if roll < 0.95 {
            Self::Red
        } else {
            Self::Blue
        }
    }

    /// Tint for this class. `variation` picks a shade and must lie in [0.7, 1.0].
    pub fn color(self, variation: [f32; 3]) -> [f32; 3] {
        let [a, b, c] = variation;
        match self {
            Self::WhiteBlue => [a, b, (c * 1.1).min(1.0)],
            Self::YellowOrange => [0.9 + a * 0.1, 0.7 + b * 0.3, 0.4 + c * 0.2],
            Self::Red => [0.8 + a * 0.2, 0.3 + b * 0.3, 0.2 + c * 0.2],
            Self::Blue => [0.4 + a * 0.2, 0.6 + b * 0.3, 0.9 + c * 0.1],
        }
    }
}

/// Generates a deterministic star catalog from a seed.
pub struct StarfieldGenerator {
    seed: u64,
    star_count: u32,
    radius: f32,
}

impl StarfieldGenerator {
    pub fn new(seed: u64, star_count: u32, radius: f32) -> Self {
        Self {
            seed,
            star_count,
            radius,
        }
    }

    /// Generate the star catalog. Deterministic for a given seed.
    pub fn generate(&self) -> Vec<StarPoint> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut stars = Vec::with_capacity(self.star_count as usize);

        for _ in 0..self.star_count {
            // Uniform on the sphere: uniform azimuth, uniform cos(polar).
            let theta = rng.random::<f32>() * std::f32::consts::TAU;
            let phi = (1.0 - 2.0 * rng.random::<f32>()).acos();
            let direction =
                glam::Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());

            let class = StellarClass::from_roll(rng.random());
            let variation = [
                rng.random_range(0.7..1.0),
                rng.random_range(0.7..1.0),
                rng.random_range(0.7..1.0),
            ];

            stars.push(StarPoint {
                position: direction * self.radius,
                brightness: rng.random_range(0.2..=1.0),
                color: class.color(variation),
            });
        }

        log::info!(
            "Generated starfield: {} stars at radius {}",
            self.star_count,
            self.radius
        );
        stars
    }
}
