//! Phong material model.
//!
//! [`PhongMaterial`] holds the per-body ambient/diffuse/specular coefficients.
//! [`PhongMaterial::shade`] is the CPU reference of the lit branch of the
//! scene shader, used by tests to pin down how shadowing combines with the
//! three terms.

/// Ambient, diffuse, and specular reflectance with a shininess exponent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhongMaterial {
    pub ambient: glam::Vec3,
    pub diffuse: glam::Vec3,
    pub specular: glam::Vec3,
    pub shininess: f32,
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self::planet()
    }
}

impl PhongMaterial {
    /// Planets, rings, and moons: mostly diffuse with a faint highlight.
    pub fn planet() -> Self {
        Self {
            ambient: glam::Vec3::splat(0.05),
            diffuse: glam::Vec3::splat(0.9),
            specular: glam::Vec3::splat(0.2),
            shininess: 32.0,
        }
    }

    /// Brushed-metal look for the spacecraft.
    pub fn ship() -> Self {
        Self {
            ambient: glam::Vec3::new(0.08, 0.08, 0.10),
            diffuse: glam::Vec3::new(0.95, 0.95, 1.0),
            specular: glam::Vec3::new(0.6, 0.6, 0.8),
            shininess: 64.0,
        }
    }

    /// The sun skips the lighting model; these values only fill the uniform.
    pub fn sun() -> Self {
        Self {
            ambient: glam::Vec3::ZERO,
            diffuse: glam::Vec3::ONE,
            specular: glam::Vec3::ZERO,
            shininess: 16.0,
        }
    }

    /// Shade one surface point.
    ///
    /// `to_light` and `to_eye` point away from the surface; `shadow` is the
    /// PCF shadow factor in `[0, 1]`. Ambient is never shadowed.
    pub fn shade(
        &self,
        base_color: glam::Vec3,
        light_color: glam::Vec3,
        normal: glam::Vec3,
        to_light: glam::Vec3,
        to_eye: glam::Vec3,
        shadow: f32,
    ) -> glam::Vec3 {
        let n = normal.normalize_or_zero();
        let l = to_light.normalize_or_zero();
        let v = to_eye.normalize_or_zero();

        let ambient = self.ambient * light_color;
        let n_dot_l = n.dot(l).max(0.0);
        let diffuse = self.diffuse * light_color * n_dot_l;
        let reflected = glam::Vec3::reflect(-l, n);
        let spec = v.dot(reflected).max(0.0).powf(self.shininess);
        let specular = self.specular * light_color * spec;

        base_color * (ambient + (1.0 - shadow.clamp(0.0, 1.0)) * (diffuse + specular))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_presets() {
        let planet = PhongMaterial::planet();
        assert_eq!(planet.shininess, 32.0);
        assert_eq!(planet.diffuse, Vec3::splat(0.9));

        let ship = PhongMaterial::ship();
        assert_eq!(ship.shininess, 64.0);
        assert!(ship.specular.z > ship.specular.x, "bluish highlight");

        assert_eq!(PhongMaterial::default(), planet);
    }

    #[test]
    fn test_full_shadow_leaves_only_ambient() {
        let m = PhongMaterial::planet();
        let c = m.shade(Vec3::ONE, Vec3::ONE, Vec3::Y, Vec3::Y, Vec3::Y, 1.0);
        assert!((c - m.ambient).length() < 1e-6);
    }

    #[test]
    fn test_unshadowed_head_on_light() {
        let m = PhongMaterial::planet();
        // Normal, light, and eye aligned: n·l = 1 and the reflection hits the eye.
        let c = m.shade(Vec3::ONE, Vec3::ONE, Vec3::Y, Vec3::Y, Vec3::Y, 0.0);
        let expected = m.ambient + m.diffuse + m.specular;
        assert!((c - expected).length() < 1e-5);
    }

    #[test]
    fn test_back_facing_surface_gets_ambient_only() {
        let m = PhongMaterial::planet();
        let c = m.shade(Vec3::ONE, Vec3::ONE, Vec3::Y, Vec3::NEG_Y, Vec3::Y, 0.0);
        assert!((c - m.ambient).length() < 1e-6);
    }

    #[test]
    fn test_half_shadow_halves_direct_terms() {
        let m = PhongMaterial::planet();
        let lit = m.shade(Vec3::ONE, Vec3::ONE, Vec3::Y, Vec3::Y, Vec3::Y, 0.0);
        let half = m.shade(Vec3::ONE, Vec3::ONE, Vec3::Y, Vec3::Y, Vec3::Y, 0.5);
        let direct = lit - m.ambient;
        assert!((half - (m.ambient + direct * 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_base_color_modulates_result() {
        let m = PhongMaterial::planet();
        let c = m.shade(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::ONE,
            Vec3::Y,
            Vec3::Y,
            Vec3::X,
            0.0,
        );
        assert!(c.x > 0.0);
        assert_eq!(c.y, 0.0);
        assert_eq!(c.z, 0.0);
    }
}
