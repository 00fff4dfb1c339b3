//! View and reverse-Z projection for the main pass.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Group 0, binding 0 of every main-pass pipeline.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye position, w unused.
    pub position: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        aspect_ratio: f32,
    },
}

/// Eye position plus viewing direction. The controller in the player crate
/// produces both every frame; this type only turns them into matrices.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Unit view direction.
    pub front: Vec3,
    /// Unit up vector, never parallel to `front`.
    pub up: Vec3,
    pub projection: Projection,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn perspective(fov_y_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            projection: Projection::Perspective {
                fov_y: fov_y_degrees.to_radians(),
                aspect_ratio,
            },
            near,
            far,
        }
    }

    /// Aim along `forward`. When `forward` is (anti)parallel to `up`, +Z
    /// stands in for up; a zero `forward` is ignored.
    pub fn look_to(&mut self, forward: Vec3, up: Vec3) {
        let Some(front) = forward.try_normalize() else {
            return;
        };
        let up = if front.cross(up).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            up
        };
        // Re-orthogonalize so `up` is exact for view_matrix.
        let right = front.cross(up).normalize();
        self.front = front;
        self.up = right.cross(front);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.front, self.up)
    }

    /// Near maps to depth 1 and far to depth 0.
    pub fn projection_matrix(&self) -> Mat4 {
        let Projection::Perspective {
            fov_y,
            aspect_ratio,
        } = self.projection;
        Mat4::perspective_rh(fov_y, aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Aspect ratio from a surface size; zero height is treated as 1.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        let Projection::Perspective { aspect_ratio, .. } = &mut self.projection;
        *aspect_ratio = width / height.max(1.0);
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(45.0, 16.0 / 9.0, 0.1, 5000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn ndc(camera: &Camera, world: Vec3) -> Vec3 {
        let clip = camera.view_projection_matrix() * world.extend(1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = Camera::default();
        assert_eq!(camera.front, Vec3::NEG_Z);
        let Projection::Perspective { fov_y, .. } = camera.projection;
        assert!((fov_y - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn test_look_to_keeps_up_vertical_plane() {
        let mut camera = Camera::default();
        let dir = Vec3::new(1.0, -0.5, 0.25).normalize();
        camera.look_to(dir, Vec3::Y);
        assert!((camera.front - dir).length() < 1e-6);
        assert!(camera.front.cross(camera.up).y.abs() < 1e-6);
        assert!(camera.up.dot(camera.front).abs() < 1e-6);
    }

    #[test]
    fn test_look_straight_up_is_finite() {
        let mut camera = Camera::default();
        camera.look_to(Vec3::Y, Vec3::Y);
        assert!(camera.view_matrix().is_finite());
        assert_eq!(camera.front, Vec3::Y);
    }

    #[test]
    fn test_zero_direction_is_ignored() {
        let mut camera = Camera::default();
        camera.look_to(Vec3::ZERO, Vec3::Y);
        assert_eq!(camera.front, Vec3::NEG_Z);
    }

    #[test]
    fn test_point_ahead_projects_to_center() {
        let mut camera = Camera::default();
        camera.position = Vec3::new(0.0, 10.0, 40.0);
        camera.look_to(-camera.position, Vec3::Y);
        let p = ndc(&camera, Vec3::ZERO);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn test_reverse_z_range() {
        let camera = Camera::default();
        let proj = camera.projection_matrix();
        let near = proj * Vec4::new(0.0, 0.0, -camera.near, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -camera.far, 1.0);
        assert!((near.z / near.w - 1.0).abs() < 1e-4);
        assert!((far.z / far.w).abs() < 1e-4);
    }

    #[test]
    fn test_aspect_from_surface() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1600.0, 0.0);
        assert_eq!(
            camera.projection,
            Projection::Perspective {
                fov_y: 45f32.to_radians(),
                aspect_ratio: 1600.0
            }
        );
    }

    #[test]
    fn test_uniform_is_80_bytes_with_eye() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        let camera = Camera {
            position: Vec3::new(1.0, 2.0, 3.0),
            ..Camera::default()
        };
        assert_eq!(camera.to_uniform().position, [1.0, 2.0, 3.0, 1.0]);
    }
}
