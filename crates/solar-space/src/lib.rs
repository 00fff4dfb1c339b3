//! Space content: procedural body geometry, the background starfield, and
//! shooting stars, with the renderers for the latter two.

pub mod geometry;
pub mod particle_renderer;
pub mod particles;
pub mod star_renderer;
pub mod starfield;

pub use geometry::{
    ORBIT_SEGMENTS, RING_SEGMENTS, SPHERE_RINGS, SPHERE_SEGMENTS, build_orbit_path, build_ring,
    build_sphere,
};
pub use particle_renderer::ShootingStarRenderer;
pub use particles::{ParticleField, ShootingStar, ShootingStarConfig};
pub use star_renderer::{STAR_SHADER_SOURCE, StarInstance, StarfieldRenderer};
pub use starfield::{StarPoint, StarfieldGenerator, StellarClass};
