//! Procedural geometry for bodies, rings, and orbit guides.
//!
//! All generators emit non-indexed [`SceneVertex`] lists centered on the
//! origin, ready for [`solar_render::BufferAllocator::create_vertex_mesh`].
//! Triangles wind counter-clockwise when seen from their front side.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use solar_render::SceneVertex;

/// Longitude subdivisions of a body sphere.
pub const SPHERE_SEGMENTS: u32 = 30;
/// Latitude subdivisions of a body sphere.
pub const SPHERE_RINGS: u32 = 20;
/// Upper bounds on configured tessellation.
pub const MAX_SPHERE_SEGMENTS: u32 = 256;
pub const MAX_SPHERE_RINGS: u32 = 128;
/// Angular subdivisions of a planetary ring.
pub const RING_SEGMENTS: u32 = 60;
/// Angular subdivisions of an orbit guide.
pub const ORBIT_SEGMENTS: u32 = 100;

const ORBIT_COLOR: [f32; 3] = [0.3, 0.3, 0.3];

fn vertex(position: Vec3, color: Vec3, uv: Vec2, normal: Vec3) -> SceneVertex {
    SceneVertex {
        position: position.to_array(),
        color: color.to_array(),
        uv: uv.to_array(),
        normal: normal.to_array(),
    }
}

/// UV-sphere of `radius`, two triangles per (ring, segment) cell, so
/// `segments * rings * 6` vertices. Tessellation is clamped to
/// `3..=MAX_SPHERE_SEGMENTS` by `2..=MAX_SPHERE_RINGS`.
///
/// `u` runs with longitude and `v` from the north pole (0) to the south
/// pole (1). Normals are the normalized positions.
pub fn build_sphere(radius: f32, color: Vec3, segments: u32, rings: u32) -> Vec<SceneVertex> {
    let segments = segments.clamp(3, MAX_SPHERE_SEGMENTS);
    let rings = rings.clamp(2, MAX_SPHERE_RINGS);
    let mut vertices = Vec::with_capacity(segments as usize * rings as usize * 6);

    let point = |ring: u32, segment: u32| {
        let theta = ring as f32 / rings as f32 * PI;
        let phi = segment as f32 / segments as f32 * TAU;
        let normal = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
        let uv = Vec2::new(segment as f32 / segments as f32, ring as f32 / rings as f32);
        vertex(normal * radius, color, uv, normal)
    };

    for i in 0..rings {
        for j in 0..segments {
            let a = point(i, j);
            let b = point(i, j + 1);
            let c = point(i + 1, j);
            let d = point(i + 1, j + 1);
            vertices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }

    vertices
}

/// Flat annulus in the XZ-plane between `inner` and `outer`, facing +Y.
///
/// `u` runs around the ring, `v` is 1 on the outer edge and 0 on the inner.
pub fn build_ring(inner: f32, outer: f32, color: Vec3) -> Vec<SceneVertex> {
    let mut vertices = Vec::with_capacity((RING_SEGMENTS * 6) as usize);

    for i in 0..RING_SEGMENTS {
        let u1 = i as f32 / RING_SEGMENTS as f32;
        let u2 = (i + 1) as f32 / RING_SEGMENTS as f32;
        let (s1, c1) = (u1 * TAU).sin_cos();
        let (s2, c2) = (u2 * TAU).sin_cos();

        let outer1 = vertex(Vec3::new(outer * c1, 0.0, outer * s1), color, Vec2::new(u1, 1.0), Vec3::Y);
        let inner1 = vertex(Vec3::new(inner * c1, 0.0, inner * s1), color, Vec2::new(u1, 0.0), Vec3::Y);
        let outer2 = vertex(Vec3::new(outer * c2, 0.0, outer * s2), color, Vec2::new(u2, 1.0), Vec3::Y);
        let inner2 = vertex(Vec3::new(inner * c2, 0.0, inner * s2), color, Vec2::new(u2, 0.0), Vec3::Y);

        vertices.extend_from_slice(&[outer1, inner1, outer2, inner1, inner2, outer2]);
    }

    vertices
}

/// Closed circle of `radius` in the XZ-plane, as a line strip whose last
/// point repeats the first.
pub fn build_orbit_path(radius: f32) -> Vec<SceneVertex> {
    (0..=ORBIT_SEGMENTS)
        .map(|i| {
            let (s, c) = (i as f32 / ORBIT_SEGMENTS as f32 * TAU).sin_cos();
            vertex(
                Vec3::new(radius * c, 0.0, radius * s),
                Vec3::from_array(ORBIT_COLOR),
                Vec2::ZERO,
                Vec3::Y,
            )
        })
        .collect()
}
