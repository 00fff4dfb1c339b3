//! Main-pass depth with reverse-Z: near maps to 1.0 and far to 0.0, which
//! spreads float precision across the 0.1..5000 view range.

pub struct DepthBuffer {
    pub view: wgpu::TextureView,
    size: (u32, u32),
}

impl DepthBuffer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    /// The far plane.
    pub const CLEAR_VALUE: f32 = 0.0;
    pub const COMPARE: wgpu::CompareFunction = wgpu::CompareFunction::GreaterEqual;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = (width.max(1), height.max(1));
        let view = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("main-depth"),
                size: wgpu::Extent3d {
                    width: size.0,
                    height: size.1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: Self::FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&Default::default());
        Self { view, size }
    }

    /// Reallocate when the surface size changes.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.size != (width.max(1), height.max(1)) {
            *self = Self::new(device, width, height);
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

/// Reverse-Z depth test for a main-pass pipeline. Opaque geometry writes
/// depth; blended overlays (stars, trails) only test against it.
pub fn reverse_z_state(format: wgpu::TextureFormat, write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: write,
        depth_compare: DepthBuffer::COMPARE,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    #[test]
    fn test_overlay_state_tests_without_writing() {
        let state = reverse_z_state(DepthBuffer::FORMAT, false);
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::GreaterEqual);
        assert!(reverse_z_state(DepthBuffer::FORMAT, true).depth_write_enabled);
    }

    #[test]
    fn test_resize_reallocates_on_change_only() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut depth = DepthBuffer::new(&device, 800, 600);
        depth.resize(&device, 800, 600);
        assert_eq!(depth.size(), (800, 600));
        depth.resize(&device, 1920, 1080);
        assert_eq!(depth.size(), (1920, 1080));
    }

    #[test]
    fn test_minimized_window_keeps_one_texel() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        assert_eq!(DepthBuffer::new(&device, 0, 0).size(), (1, 1));
    }
}
