//! Shooting stars: a fixed-capacity pool of short-lived line particles.
//!
//! Each update integrates every live particle, drops those whose lifetime
//! has run out, and spawns at most one replacement once the spawn timer
//! passes `1 / capacity` seconds. The pool never exceeds its capacity and
//! the order of live particles carries no meaning.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use solar_render::LineVertex;

/// Shooting-star pool configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ShootingStarConfig {
    /// Maximum number of live particles.
    pub capacity: usize,
    /// Base speed in units per second; each spawn jitters it by 0.8–1.2×.
    pub speed: f32,
    /// Distance from head to tail.
    pub tail_length: f32,
    /// Spawn positions are uniform in `[-spawn_extent, spawn_extent]^3`.
    pub spawn_extent: f32,
    pub min_lifetime: f32,
    pub max_lifetime: f32,
    /// Start with a full pool instead of filling it over time.
    pub prefill: bool,
    pub seed: u64,
}

impl Default for ShootingStarConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            speed: 50.0,
            tail_length: 5.0,
            spawn_extent: 100.0,
            min_lifetime: 2.0,
            max_lifetime: 5.0,
            prefill: true,
            seed: 0xC0FF_EE00,
        }
    }
}

/// One live shooting star.
#[derive(Clone, Debug, PartialEq)]
pub struct ShootingStar {
    pub position: Vec3,
    /// Unit direction of travel.
    pub direction: Vec3,
    pub color: Vec3,
    pub speed: f32,
    /// Seconds since spawn.
    pub lifetime: f32,
    pub max_lifetime: f32,
}

impl ShootingStar {
    /// Opacity, fading linearly from 1 at spawn to 0 at expiry.
    pub fn alpha(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime >= self.max_lifetime
    }

    /// Tail end of the streak, `tail_length` behind the head.
    pub fn tail(&self, tail_length: f32) -> Vec3 {
        self.position - self.direction * tail_length
    }
}

/// The shooting-star pool with its own seeded generator.
pub struct ParticleField {
    config: ShootingStarConfig,
    stars: Vec<ShootingStar>,
    since_spawn: f32,
    rng: ChaCha8Rng,
}

impl ParticleField {
    pub fn new(mut config: ShootingStarConfig) -> Self {
        if config.min_lifetime > config.max_lifetime {
            std::mem::swap(&mut config.min_lifetime, &mut config.max_lifetime);
        }
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut field = Self {
            stars: Vec::with_capacity(config.capacity),
            config,
            since_spawn: 0.0,
            rng,
        };
        if field.config.prefill {
            while field.stars.len() < field.config.capacity {
                let star = field.random_star();
                field.stars.push(star);
            }
        }
        log::debug!(
            "Shooting stars: capacity {}, {} prefilled",
            field.config.capacity,
            field.stars.len()
        );
        field
    }

    /// Advance the pool by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.since_spawn += dt;

        for star in &mut self.stars {
            star.position += star.direction * star.speed * dt;
            star.lifetime += dt;
        }
        self.stars.retain(|star| !star.is_expired());

        if self.stars.len() < self.config.capacity && self.since_spawn > self.spawn_interval() {
            let star = self.random_star();
            self.stars.push(star);
            self.since_spawn = 0.0;
        }
    }

    /// Add a specific particle if the pool has room. Returns whether it was added.
    pub fn inject(&mut self, star: ShootingStar) -> bool {
        if self.stars.len() >= self.config.capacity {
            return false;
        }
        self.stars.push(star);
        true
    }

    /// Minimum simulated time between two spawns.
    pub fn spawn_interval(&self) -> f32 {
        if self.config.capacity == 0 {
            f32::INFINITY
        } else {
            1.0 / self.config.capacity as f32
        }
    }

    pub fn stars(&self) -> &[ShootingStar] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn config(&self) -> &ShootingStarConfig {
        &self.config
    }

    /// Rebuild line vertices into `out`: head then tail for every live
    /// particle, each carrying that particle's alpha.
    pub fn write_vertices(&self, out: &mut Vec<LineVertex>) {
        out.clear();
        for star in &self.stars {
            let color = star.color.extend(star.alpha()).to_array();
            out.push(LineVertex {
                position: star.position.to_array(),
                color,
            });
            out.push(LineVertex {
                position: star.tail(self.config.tail_length).to_array(),
                color,
            });
        }
    }

    fn random_star(&mut self) -> ShootingStar {
        let e = self.config.spawn_extent.abs();
        let position = if e > 0.0 {
            Vec3::new(
                self.rng.random_range(-e..=e),
                self.rng.random_range(-e..=e),
                self.rng.random_range(-e..=e),
            )
        } else {
            Vec3::ZERO
        };

        let direction = loop {
            let v = Vec3::new(
                self.rng.random_range(-1.0..=1.0),
                self.rng.random_range(-1.0..=1.0),
                self.rng.random_range(-1.0..=1.0),
            );
            if let Some(dir) = v.try_normalize() {
                break dir;
            }
        };

        // Warm white to orange.
        let color = Vec3::new(
            self.rng.random_range(0.7..=1.0),
            self.rng.random_range(0.7..=1.0) * 0.6,
            0.3,
        );

        let speed = self.config.speed * (0.8 + 0.4 * self.rng.random::<f32>());
        let max_lifetime = self
            .rng
            .random_range(self.config.min_lifetime..=self.config.max_lifetime);

        ShootingStar {
            position,
            direction,
            color,
            speed,
            lifetime: 0.0,
            max_lifetime,
        }
    }
}
