//! Orbiting bodies and their hierarchical transforms.
//!
//! One data type covers the sun, planets, and moons. A body's local matrix is
//! `RotY(orbit) * T(orbit_radius, 0, 0) * RotY(rotation)`; its world matrix is
//! the parent's world matrix times its local one, so moons circle a moving,
//! spinning parent. The sun is the degenerate case with an identity matrix.

use glam::{Mat4, Vec3};

use crate::simulation::SimulationState;

const MIN_RADIUS: f32 = 1e-3;

/// What a body is, which decides how it is shaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyRole {
    /// Emissive, never orbits, never casts shadows.
    Star,
    Planet,
    Moon,
}

/// Which texture file a body samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Moon,
    Rings,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 11] = [
        TextureSlot::Sun,
        TextureSlot::Mercury,
        TextureSlot::Venus,
        TextureSlot::Earth,
        TextureSlot::Mars,
        TextureSlot::Jupiter,
        TextureSlot::Saturn,
        TextureSlot::Uranus,
        TextureSlot::Neptune,
        TextureSlot::Moon,
        TextureSlot::Rings,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Sun => "sun.jpg",
            Self::Mercury => "mercury.jpg",
            Self::Venus => "venus.jpg",
            Self::Earth => "earth.jpg",
            Self::Mars => "mars.jpg",
            Self::Jupiter => "jupiter.jpg",
            Self::Saturn => "saturn.jpg",
            Self::Uranus => "uranus.jpg",
            Self::Neptune => "neptune.jpg",
            Self::Moon => "moon.jpg",
            Self::Rings => "rings.jpg",
        }
    }
}

/// A flat ring around a planet. Drawn with the planet's world matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingInfo {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub texture: TextureSlot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitingBody {
    pub name: String,
    pub role: BodyRole,
    pub radius: f32,
    /// Distance from the parent's origin along local X at angle 0.
    pub orbit_radius: f32,
    /// Radians per second.
    pub orbit_speed: f32,
    /// Radians per second.
    pub rotation_speed: f32,
    pub orbit_angle: f32,
    pub rotation_angle: f32,
    pub color: Vec3,
    pub texture: TextureSlot,
    pub ring: Option<RingInfo>,
    pub children: Vec<OrbitingBody>,
}

impl OrbitingBody {
    /// A stationary emissive body at the origin.
    pub fn star(name: &str, radius: f32, color: Vec3, texture: TextureSlot) -> Self {
        Self::new(name, BodyRole::Star, radius, color, texture, 0.0, 0.0, 0.0)
    }

    pub fn planet(
        name: &str,
        color: Vec3,
        radius: f32,
        orbit_radius: f32,
        orbit_speed: f32,
        rotation_speed: f32,
        texture: TextureSlot,
    ) -> Self {
        Self::new(
            name,
            BodyRole::Planet,
            radius,
            color,
            texture,
            orbit_radius,
            orbit_speed,
            rotation_speed,
        )
    }

    pub fn moon(
        name: &str,
        color: Vec3,
        radius: f32,
        orbit_radius: f32,
        orbit_speed: f32,
        rotation_speed: f32,
    ) -> Self {
        Self::new(
            name,
            BodyRole::Moon,
            radius,
            color,
            TextureSlot::Moon,
            orbit_radius,
            orbit_speed,
            rotation_speed,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        name: &str,
        role: BodyRole,
        radius: f32,
        color: Vec3,
        texture: TextureSlot,
        orbit_radius: f32,
        orbit_speed: f32,
        rotation_speed: f32,
    ) -> Self {
        if radius < MIN_RADIUS {
            log::warn!("Body {name}: radius {radius} raised to {MIN_RADIUS}");
        }
        Self {
            name: name.to_owned(),
            role,
            radius: radius.max(MIN_RADIUS),
            orbit_radius: orbit_radius.max(0.0),
            orbit_speed,
            rotation_speed,
            orbit_angle: 0.0,
            rotation_angle: 0.0,
            color,
            texture,
            ring: None,
            children: Vec::new(),
        }
    }

    pub fn with_ring(mut self, inner_radius: f32, outer_radius: f32, texture: TextureSlot) -> Self {
        self.ring = Some(RingInfo {
            inner_radius,
            outer_radius,
            texture,
        });
        self
    }

    pub fn with_moon(mut self, moon: OrbitingBody) -> Self {
        self.children.push(moon);
        self
    }

    /// Advance orbit and spin angles, then every child.
    pub fn advance(&mut self, dt: f32, state: &SimulationState) {
        let step = state.kinematic_dt(dt);
        if self.role != BodyRole::Star {
            self.orbit_angle += self.orbit_speed * step;
            self.rotation_angle += self.rotation_speed * step;
        }
        for child in &mut self.children {
            child.advance(dt, state);
        }
    }

    /// Transform relative to the parent body.
    pub fn local_matrix(&self) -> Mat4 {
        if self.role == BodyRole::Star {
            return Mat4::IDENTITY;
        }
        Mat4::from_rotation_y(self.orbit_angle)
            * Mat4::from_translation(Vec3::new(self.orbit_radius, 0.0, 0.0))
            * Mat4::from_rotation_y(self.rotation_angle)
    }

    /// Append this body and its descendants, parents first.
    pub fn collect_transforms<'a>(
        &'a self,
        parent_world: Mat4,
        parent: Option<usize>,
        out: &mut Vec<BodyTransform<'a>>,
    ) {
        let world = parent_world * self.local_matrix();
        let index = out.len();
        out.push(BodyTransform {
            body: self,
            world,
            parent,
        });
        for child in &self.children {
            child.collect_transforms(world, Some(index), out);
        }
    }

    /// This body plus all descendants.
    pub fn body_count(&self) -> usize {
        1 + self.children.iter().map(OrbitingBody::body_count).sum::<usize>()
    }
}

/// A body with its world matrix for the current frame.
#[derive(Clone, Copy, Debug)]
pub struct BodyTransform<'a> {
    pub body: &'a OrbitingBody,
    pub world: Mat4,
    /// Index of the parent entry in the same list.
    pub parent: Option<usize>,
}

impl BodyTransform<'_> {
    pub fn position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}
