//! Shadow mapping for the directional light.
//!
//! One square depth texture is rendered from the light's point of view each
//! frame through an orthographic projection that covers the whole system.
//! The lit pass projects every fragment into that map and averages a 3×3
//! block of depth comparisons (percentage-closer filtering).
//!
//! The map stores conventional depth (clear 1.0, nearer is smaller), so a
//! fragment is occluded when its biased light-space depth exceeds the stored
//! value. [`shadow_factor`] is the CPU reference of the shader's lookup.

use bytemuck::{Pod, Zeroable};

/// Shadow-map configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowSettings {
    /// Whether the lit pass samples the map at all.
    pub enabled: bool,
    /// Width and height of the square depth texture.
    pub resolution: u32,
    /// Distance of the light's eye from the origin along `-direction`.
    pub light_distance: f32,
    /// Half-width of the orthographic box in light space.
    pub ortho_half_extent: f32,
    pub near: f32,
    pub far: f32,
    /// Slope term of the depth bias.
    pub bias_slope: f32,
    /// Lower bound of the depth bias.
    pub bias_min: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            resolution: 2048,
            light_distance: 160.0,
            ortho_half_extent: 150.0,
            near: 1.0,
            far: 400.0,
            bias_slope: 0.0008,
            bias_min: 0.0004,
        }
    }
}

/// GPU-side shadow uniform, 80 bytes.
///
/// Bound at `@group(1) @binding(0)` of the scene pipeline, next to the depth texture.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ShadowUniform {
    /// World to light clip space.
    pub light_space: [[f32; 4]; 4],
    /// x = bias slope, y = bias min, z = enabled (0/1), w = resolution.
    pub params: [f32; 4],
}

impl ShadowUniform {
    pub fn new(light_space: glam::Mat4, settings: &ShadowSettings) -> Self {
        Self {
            light_space: light_space.to_cols_array_2d(),
            params: [
                settings.bias_slope,
                settings.bias_min,
                if settings.enabled { 1.0 } else { 0.0 },
                settings.resolution as f32,
            ],
        }
    }
}

/// Shadow map GPU resources: a depth texture written by the depth pass and
/// read with `textureLoad` by the lit pass.
pub struct ShadowMap {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    resolution: u32,
}

impl ShadowMap {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Conventional depth: 1.0 is the far plane.
    pub const CLEAR_VALUE: f32 = 1.0;

    pub const COMPARE_FUNCTION: wgpu::CompareFunction = wgpu::CompareFunction::Less;

    pub fn new(device: &wgpu::Device, resolution: u32) -> Self {
        let resolution = resolution.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow-map"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("shadow-map-view"),
            ..Default::default()
        });

        Self {
            texture,
            view,
            resolution,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }
}

/// Build the light's view-projection: an eye at `-direction * light_distance`
/// looking at the origin, with a fixed orthographic box.
pub fn light_space_matrix(direction: glam::Vec3, settings: &ShadowSettings) -> glam::Mat4 {
    let dir = direction.try_normalize().unwrap_or(glam::Vec3::NEG_Y);
    let up = if dir.cross(glam::Vec3::Y).length_squared() < 1e-6 {
        glam::Vec3::Z
    } else {
        glam::Vec3::Y
    };
    let eye = -dir * settings.light_distance;
    let view = glam::Mat4::look_at_rh(eye, glam::Vec3::ZERO, up);
    let e = settings.ortho_half_extent;
    let proj = glam::Mat4::orthographic_rh(-e, e, -e, e, settings.near, settings.far);
    proj * view
}

/// Depth bias that grows as the surface turns away from the light:
/// `max(slope * (1 - max(N·L, 0)), min)`.
pub fn slope_scaled_bias(normal: glam::Vec3, to_light: glam::Vec3, slope: f32, min: f32) -> f32 {
    let n_dot_l = normal.normalize_or_zero().dot(to_light.normalize_or_zero()).max(0.0);
    (slope * (1.0 - n_dot_l)).max(min)
}

/// Project a world position into shadow-map space: `(u, v, depth)` with uv in
/// texture orientation (v grows downward). `None` when outside the light's
/// frustum, which counts as unshadowed.
pub fn project_to_shadow_map(light_space: glam::Mat4, world: glam::Vec3) -> Option<glam::Vec3> {
    let clip = light_space * world.extend(1.0);
    if clip.w.abs() < f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if ndc.z > 1.0 {
        return None;
    }
    let uv = glam::Vec2::new(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
        return None;
    }
    Some(uv.extend(ndc.z))
}

/// Read access to a square depth image.
pub trait DepthMap {
    fn resolution(&self) -> u32;

    /// Stored depth at texel `(x, y)`; both coordinates are in range.
    fn depth_at(&self, x: u32, y: u32) -> f32;
}

/// A CPU depth image, row-major.
#[derive(Clone, Debug)]
pub struct DepthImage {
    resolution: u32,
    depths: Vec<f32>,
}

impl DepthImage {
    /// An image cleared to `depth`.
    pub fn new(resolution: u32, depth: f32) -> Self {
        let resolution = resolution.max(1);
        Self {
            resolution,
            depths: vec![depth; (resolution * resolution) as usize],
        }
    }

    /// Write one texel. Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: u32, y: u32, depth: f32) {
        if x < self.resolution && y < self.resolution {
            self.depths[(y * self.resolution + x) as usize] = depth;
        }
    }
}

impl DepthMap for DepthImage {
    fn resolution(&self) -> u32 {
        self.resolution
    }

    fn depth_at(&self, x: u32, y: u32) -> f32 {
        self.depths[(y * self.resolution + x) as usize]
    }
}

/// Fraction of the 3×3 neighborhood around the fragment's texel that occludes it.
///
/// Returns exactly 0.0 when the fragment falls outside the light frustum or
/// shadows are disabled. Neighbor coordinates are clamped to the map edge.
pub fn shadow_factor(
    map: &impl DepthMap,
    light_space: glam::Mat4,
    world: glam::Vec3,
    normal: glam::Vec3,
    to_light: glam::Vec3,
    settings: &ShadowSettings,
) -> f32 {
    if !settings.enabled {
        return 0.0;
    }
    let Some(coords) = project_to_shadow_map(light_space, world) else {
        return 0.0;
    };

    let bias = slope_scaled_bias(normal, to_light, settings.bias_slope, settings.bias_min);
    let res = map.resolution();
    let max = res.saturating_sub(1) as i64;
    let cx = ((coords.x * res as f32) as i64).clamp(0, max);
    let cy = ((coords.y * res as f32) as i64).clamp(0, max);

    let mut occluded = 0u32;
    for dy in -1..=1 {
        for dx in -1..=1 {
            let x = (cx + dx).clamp(0, max) as u32;
            let y = (cy + dy).clamp(0, max) as u32;
            if coords.z - bias > map.depth_at(x, y) {
                occluded += 1;
            }
        }
    }
    occluded as f32 / 9.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    fn straight_down() -> (Mat4, ShadowSettings) {
        let settings = ShadowSettings::default();
        (light_space_matrix(Vec3::NEG_Y, &settings), settings)
    }

    #[test]
    fn test_uniform_layout_is_80_bytes() {
        assert_eq!(std::mem::size_of::<ShadowUniform>(), 80);
        assert_eq!(std::mem::offset_of!(ShadowUniform, params), 64);
        let u = ShadowUniform::new(Mat4::IDENTITY, &ShadowSettings::default());
        assert_eq!(u.params, [0.0008, 0.0004, 1.0, 2048.0]);
    }

    #[test]
    fn test_origin_projects_to_map_center() {
        let settings = ShadowSettings::default();
        let m = light_space_matrix(Vec3::new(0.3, -0.6, 0.2), &settings);
        let p = project_to_shadow_map(m, Vec3::ZERO).unwrap();
        assert!((p.x - 0.5).abs() < 1e-5 && (p.y - 0.5).abs() < 1e-5);
        // Eye sits light_distance away; depth is (160 - 1) / (400 - 1).
        assert!((p.z - 159.0 / 399.0).abs() < 1e-4, "z = {}", p.z);
    }

    #[test]
    fn test_nearer_to_light_is_smaller_depth() {
        let (m, _) = straight_down();
        let high = project_to_shadow_map(m, Vec3::new(0.0, 50.0, 0.0)).unwrap();
        let low = project_to_shadow_map(m, Vec3::new(0.0, -50.0, 0.0)).unwrap();
        assert!(high.z < low.z);
    }

    #[test]
    fn test_beyond_far_plane_is_outside() {
        let (m, _) = straight_down();
        // Eye at y = 160, far = 400: anything below y = -240 is past the far plane.
        assert!(project_to_shadow_map(m, Vec3::new(0.0, -300.0, 0.0)).is_none());
    }

    #[test]
    fn test_outside_ortho_box_is_outside() {
        let (m, _) = straight_down();
        assert!(project_to_shadow_map(m, Vec3::new(200.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_bias_bounds() {
        let min = slope_scaled_bias(Vec3::Y, Vec3::Y, 0.0008, 0.0004);
        assert!((min - 0.0004).abs() < 1e-9, "facing the light uses the floor");
        let grazing = slope_scaled_bias(Vec3::Y, Vec3::X, 0.0008, 0.0004);
        assert!((grazing - 0.0008).abs() < 1e-9);
        let behind = slope_scaled_bias(Vec3::Y, Vec3::NEG_Y, 0.0008, 0.0004);
        assert!((behind - 0.0008).abs() < 1e-9, "N·L is clamped at zero");
    }

    #[test]
    fn test_factor_zero_beyond_far_plane_even_with_occluders() {
        let (m, settings) = straight_down();
        // Every texel stores the nearest possible depth.
        let map = DepthImage::new(16, 0.0);
        let f = shadow_factor(&map, m, Vec3::new(0.0, -300.0, 0.0), Vec3::Y, Vec3::Y, &settings);
        assert_eq!(f, 0.0);
    }

    #[test]
    fn test_factor_one_under_full_occluder() {
        let (m, settings) = straight_down();
        let map = DepthImage::new(16, 0.0);
        let f = shadow_factor(&map, m, Vec3::ZERO, Vec3::Y, Vec3::Y, &settings);
        assert_eq!(f, 1.0);
    }

    #[test]
    fn test_factor_zero_on_cleared_map() {
        let (m, settings) = straight_down();
        let map = DepthImage::new(16, ShadowMap::CLEAR_VALUE);
        let f = shadow_factor(&map, m, Vec3::ZERO, Vec3::Y, Vec3::Y, &settings);
        assert_eq!(f, 0.0);
    }

    #[test]
    fn test_self_depth_is_not_occluded_thanks_to_bias() {
        let (m, settings) = straight_down();
        let p = project_to_shadow_map(m, Vec3::ZERO).unwrap();
        let map = DepthImage::new(16, p.z);
        let f = shadow_factor(&map, m, Vec3::ZERO, Vec3::Y, Vec3::Y, &settings);
        assert_eq!(f, 0.0);
    }

    #[test]
    fn test_pcf_partial_coverage() {
        let (m, settings) = straight_down();
        let res = 16;
        let mut map = DepthImage::new(res, 1.0);
        let p = project_to_shadow_map(m, Vec3::ZERO).unwrap();
        let cx = (p.x * res as f32) as u32;
        let cy = (p.y * res as f32) as u32;
        // Occlude one column of the 3×3 block.
        for dy in 0..3 {
            map.set(cx - 1, cy + dy - 1, 0.0);
        }
        let f = shadow_factor(&map, m, Vec3::ZERO, Vec3::Y, Vec3::Y, &settings);
        assert!((f - 3.0 / 9.0).abs() < 1e-6, "f = {f}");
    }

    #[test]
    fn test_disabled_shadows_are_never_applied() {
        let (m, mut settings) = straight_down();
        settings.enabled = false;
        let map = DepthImage::new(16, 0.0);
        assert_eq!(
            shadow_factor(&map, m, Vec3::ZERO, Vec3::Y, Vec3::Y, &settings),
            0.0
        );
    }

    #[test]
    fn test_vertical_light_does_not_degenerate() {
        let m = light_space_matrix(Vec3::NEG_Y, &ShadowSettings::default());
        assert!(m.is_finite());
    }
}
