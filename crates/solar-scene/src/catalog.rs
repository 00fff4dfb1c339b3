//! The standard set of bodies: one sun, eight planets, a ringed sixth
//! planet, and seven moons spread over the third to fifth planets.

use glam::{Mat4, Vec3};

use crate::body::{BodyTransform, OrbitingBody, TextureSlot};
use crate::simulation::SimulationState;

pub struct SolarSystem {
    pub sun: OrbitingBody,
    pub planets: Vec<OrbitingBody>,
}

impl SolarSystem {
    pub fn standard() -> Self {
        let sun = OrbitingBody::star("Sun", 3.0, Vec3::new(1.0, 0.95, 0.7), TextureSlot::Sun);

        let planets = vec![
            OrbitingBody::planet(
                "Mercury",
                Vec3::new(0.7, 0.4, 0.2),
                0.38,
                12.0,
                0.5,
                3.0,
                TextureSlot::Mercury,
            ),
            OrbitingBody::planet(
                "Venus",
                Vec3::new(1.0, 0.8, 0.4),
                0.95,
                19.0,
                0.4,
                2.4,
                TextureSlot::Venus,
            ),
            OrbitingBody::planet(
                "Earth",
                Vec3::new(0.2, 0.6, 1.0),
                1.0,
                26.0,
                0.3,
                2.0,
                TextureSlot::Earth,
            )
            .with_moon(OrbitingBody::moon("Moon", Vec3::splat(0.8), 0.27, 2.0, 1.0, 2.5)),
            OrbitingBody::planet(
                "Mars",
                Vec3::new(0.8, 0.3, 0.1),
                0.53,
                34.0,
                0.25,
                1.8,
                TextureSlot::Mars,
            )
            .with_moon(OrbitingBody::moon("Phobos", Vec3::splat(0.6), 0.15, 1.0, 1.25, 3.0))
            .with_moon(OrbitingBody::moon("Deimos", Vec3::splat(0.5), 0.12, 1.5, 0.875, 2.8)),
            OrbitingBody::planet(
                "Jupiter",
                Vec3::new(0.9, 0.7, 0.5),
                2.5,
                50.0,
                0.15,
                1.2,
                TextureSlot::Jupiter,
            )
            .with_moon(OrbitingBody::moon("Io", Vec3::new(1.0, 0.9, 0.7), 0.29, 3.5, 0.5, 1.5))
            .with_moon(OrbitingBody::moon("Europa", Vec3::new(0.8, 0.8, 0.9), 0.25, 4.5, 0.375, 1.2))
            .with_moon(OrbitingBody::moon("Ganymede", Vec3::splat(0.7), 0.42, 5.5, 0.3, 1.0))
            .with_moon(OrbitingBody::moon("Callisto", Vec3::splat(0.6), 0.38, 7.0, 0.2, 0.8)),
            OrbitingBody::planet(
                "Saturn",
                Vec3::new(0.8, 0.6, 0.4),
                2.0,
                70.0,
                0.10,
                1.0,
                TextureSlot::Saturn,
            )
            .with_ring(2.5, 4.0, TextureSlot::Rings),
            OrbitingBody::planet(
                "Uranus",
                Vec3::new(0.6, 0.8, 1.0),
                1.2,
                90.0,
                0.075,
                0.8,
                TextureSlot::Uranus,
            ),
            OrbitingBody::planet(
                "Neptune",
                Vec3::new(0.2, 0.4, 0.8),
                1.2,
                110.0,
                0.05,
                0.7,
                TextureSlot::Neptune,
            ),
        ];

        let system = Self { sun, planets };
        log::info!(
            "Solar system: {} planets, {} bodies",
            system.planet_count(),
            system.body_count()
        );
        system
    }

    pub fn advance(&mut self, dt: f32, state: &SimulationState) {
        self.sun.advance(dt, state);
        for planet in &mut self.planets {
            planet.advance(dt, state);
        }
    }

    /// World transforms for every body: the sun, then each planet followed
    /// by its moons. The order is stable for the life of the system.
    pub fn transforms(&self) -> Vec<BodyTransform<'_>> {
        let mut out = Vec::with_capacity(self.body_count());
        self.sun.collect_transforms(Mat4::IDENTITY, None, &mut out);
        for planet in &self.planets {
            planet.collect_transforms(Mat4::IDENTITY, None, &mut out);
        }
        out
    }

    pub fn planet_count(&self) -> usize {
        self.planets.len()
    }

    pub fn body_count(&self) -> usize {
        self.sun.body_count()
            + self
                .planets
                .iter()
                .map(OrbitingBody::body_count)
                .sum::<usize>()
    }

    /// World position and radius of a planet. Out-of-range indices clamp to
    /// the last planet; `None` only when there are no planets.
    pub fn planet_position(&self, index: usize) -> Option<(Vec3, f32)> {
        let last = self.planets.len().checked_sub(1)?;
        let planet = &self.planets[index.min(last)];
        let position = planet.local_matrix().transform_point3(Vec3::ZERO);
        Some((position, planet.radius))
    }

    pub fn orbit_radii(&self) -> impl Iterator<Item = f32> + '_ {
        self.planets.iter().map(|p| p.orbit_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyRole;

    #[test]
    fn test_standard_catalogue_shape() {
        let system = SolarSystem::standard();
        assert_eq!(system.planet_count(), 8);
        assert_eq!(system.body_count(), 1 + 8 + 7);
        let moons: Vec<usize> = system.planets.iter().map(|p| p.children.len()).collect();
        assert_eq!(moons, vec![0, 0, 1, 2, 4, 0, 0, 0]);
        let ringed: Vec<&str> = system
            .planets
            .iter()
            .filter(|p| p.ring.is_some())
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(ringed, vec!["Saturn"]);
    }

    #[test]
    fn test_orbits_increase_outward() {
        let system = SolarSystem::standard();
        let radii: Vec<f32> = system.orbit_radii().collect();
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_transforms_order_parents_first() {
        let system = SolarSystem::standard();
        let transforms = system.transforms();
        assert_eq!(transforms.len(), system.body_count());
        assert_eq!(transforms[0].body.role, BodyRole::Star);
        assert_eq!(transforms[0].world, Mat4::IDENTITY);
        for (i, t) in transforms.iter().enumerate() {
            match t.body.role {
                BodyRole::Moon => {
                    let parent = t.parent.expect("moon has a parent");
                    assert!(parent < i);
                    assert_eq!(transforms[parent].body.role, BodyRole::Planet);
                }
                _ => assert!(t.parent.is_none()),
            }
        }
    }

    #[test]
    fn test_earth_orbit_after_ten_seconds() {
        let mut system = SolarSystem::standard();
        system.advance(10.0, &SimulationState::default());
        assert!((system.planets[2].orbit_angle - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_sun_stays_fixed() {
        let mut system = SolarSystem::standard();
        system.advance(123.0, &SimulationState::default());
        assert_eq!(system.transforms()[0].world, Mat4::IDENTITY);
    }

    #[test]
    fn test_moons_track_their_planets() {
        let mut system = SolarSystem::standard();
        let state = SimulationState::default();
        for _ in 0..200 {
            system.advance(0.05, &state);
            let transforms = system.transforms();
            for t in transforms.iter().filter(|t| t.body.role == BodyRole::Moon) {
                let parent = &transforms[t.parent.expect("parent")];
                let d = t.position().distance(parent.position());
                assert!(
                    d <= t.body.orbit_radius + 1e-3,
                    "{} drifted {d} from {}",
                    t.body.name,
                    parent.body.name
                );
            }
        }
    }

    #[test]
    fn test_planet_position_clamps_index() {
        let system = SolarSystem::standard();
        let (last, radius) = system.planet_position(7).expect("planet");
        let (clamped, _) = system.planet_position(99).expect("planet");
        assert_eq!(last, clamped);
        assert_eq!(radius, 1.2);
        assert!((last - Vec3::new(110.0, 0.0, 0.0)).length() < 1e-4);

        let empty = SolarSystem {
            sun: system.sun.clone(),
            planets: Vec::new(),
        };
        assert!(empty.planet_position(0).is_none());
    }
}
