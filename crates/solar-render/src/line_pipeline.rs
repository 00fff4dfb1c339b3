//! Shooting-star trails: unlit line segments with per-vertex alpha, blended
//! over the scene. Depth is tested but not written, so a faded tail never
//! hides what is behind it.

use std::num::NonZeroU64;

use crate::buffer::LineVertex;
use crate::camera::CameraUniform;
use crate::depth::reverse_z_state;

pub struct LinePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
}

impl LinePipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("line-camera-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(size_of::<CameraUniform>() as u64),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line-pipeline-layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_trail"),
                buffers: &[LineVertex::layout()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(reverse_z_state(depth_format, false)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_trail"),
                targets: &[Some(wgpu::ColorTargetState {
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    ..surface_format.into()
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            camera_bind_group_layout,
        }
    }

    pub fn create_camera_bind_group(
        &self,
        device: &wgpu::Device,
        camera_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("line-camera-bind-group"),
            layout: &self.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        })
    }
}

/// Positions are world space; color alpha fades from head to tail.
pub const LINE_SHADER_SOURCE: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
};

@group(0) @binding(0) var<uniform> camera: Camera;

struct TrailVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct TrailFragment {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_trail(v: TrailVertex) -> TrailFragment {
    return TrailFragment(camera.view_proj * vec4<f32>(v.position, 1.0), v.color);
}

@fragment
fn fs_trail(f: TrailFragment) -> @location(0) vec4<f32> {
    return f.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;
    use crate::shader::validate_wgsl;

    #[test]
    fn test_line_shader_validates() {
        assert!(validate_wgsl("line", LINE_SHADER_SOURCE).is_ok());
    }

    #[test]
    fn test_line_pipeline_creation() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line"),
            source: wgpu::ShaderSource::Wgsl(LINE_SHADER_SOURCE.into()),
        });
        let _pipeline = LinePipeline::new(
            &device,
            &shader,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            crate::DepthBuffer::FORMAT,
        );
    }
}
