//! Per-frame command recording.
//!
//! A [`FrameEncoder`] holds the swapchain image and one command encoder.
//! The renderer opens the shadow depth pass and then the lit color pass on
//! it, and [`FrameEncoder::submit`] presents the result.

/// Deep-space blue used when no clear color is configured.
pub const SPACE_BLACK: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.05,
    a: 1.0,
};

fn cleared_depth(view: &wgpu::TextureView, value: f32) -> wgpu::RenderPassDepthStencilAttachment<'_> {
    wgpu::RenderPassDepthStencilAttachment {
        view,
        depth_ops: Some(wgpu::Operations {
            load: wgpu::LoadOp::Clear(value),
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
    }
}

/// Describes a color pass onto the swapchain image.
#[derive(Debug, Clone)]
pub struct RenderPassBuilder<'v> {
    clear_color: wgpu::Color,
    depth: Option<(&'v wgpu::TextureView, f32)>,
    label: &'static str,
}

impl Default for RenderPassBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'v> RenderPassBuilder<'v> {
    pub fn new() -> Self {
        Self {
            clear_color: SPACE_BLACK,
            depth: None,
            label: "color-pass",
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Depth attachment, cleared to `clear_value` when the pass opens.
    pub fn depth(mut self, view: &'v wgpu::TextureView, clear_value: f32) -> Self {
        self.depth = Some((view, clear_value));
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }
}

pub struct FrameEncoder {
    encoder: wgpu::CommandEncoder,
    frame: wgpu::SurfaceTexture,
    frame_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(device: &wgpu::Device, frame: wgpu::SurfaceTexture) -> Self {
        let frame_view = frame.texture.create_view(&Default::default());
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame"),
        });
        Self {
            encoder,
            frame,
            frame_view,
        }
    }

    /// Open a color pass on the swapchain image.
    pub fn begin_render_pass(&mut self, builder: &RenderPassBuilder<'_>) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(builder.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.frame_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(builder.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: builder
                .depth
                .map(|(view, clear)| cleared_depth(view, clear)),
            ..Default::default()
        })
    }

    /// Open a pass with no color target that only writes `depth_view`. The
    /// viewport covers the whole attachment, so the shadow map's resolution
    /// applies as is.
    pub fn begin_depth_pass(
        &mut self,
        label: &'static str,
        depth_view: &wgpu::TextureView,
        clear_value: f32,
    ) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[],
            depth_stencil_attachment: Some(cleared_depth(depth_view, clear_value)),
            ..Default::default()
        })
    }

    /// Submit everything recorded and present the frame.
    pub fn submit(self, queue: &wgpu::Queue) {
        queue.submit([self.encoder.finish()]);
        self.frame.present();
    }
}
