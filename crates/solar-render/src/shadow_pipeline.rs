//! Occluders drawn from the light into the shadow map.
//!
//! Depth only, conventional range (clear 1.0, `Less`). The model bind group
//! is the one the lit pass uses, so the shader declares the full `Model`
//! block even though it reads only `world`.

use std::num::NonZeroU64;

use solar_lighting::ShadowMap;

use crate::buffer::{MeshBuffer, SceneVertex};
use crate::scene_pipeline::ModelBinding;

pub const SHADOW_SHADER_SOURCE: &str = r#"
@group(0) @binding(0) var<uniform> light_view_proj: mat4x4<f32>;

struct Model {
    world: mat4x4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    mode: u32,
    use_texture: u32,
    vertex_color_mix: f32,
    _pad: f32,
};

@group(1) @binding(0) var<uniform> model: Model;

@vertex
fn vs_shadow(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return light_view_proj * model.world * vec4<f32>(position, 1.0);
}
"#;

/// How an occluder's faces are culled in the depth pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasterShape {
    /// Spheres and the ship. Front faces are culled to keep acne off the lit side.
    Closed,
    /// Ring annuli, which have no back to fall back on.
    Flat,
}

pub struct ShadowPipeline {
    closed: wgpu::RenderPipeline,
    flat: wgpu::RenderPipeline,
    pub light_bind_group_layout: wgpu::BindGroupLayout,
}

impl ShadowPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        depth_format: wgpu::TextureFormat,
        model_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let light_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shadow light"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(size_of::<[[f32; 4]; 4]>() as u64),
                    },
                    count: None,
                }],
            });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow"),
            bind_group_layouts: &[&light_bind_group_layout, model_bind_group_layout],
            immediate_size: 0,
        });

        let depth_only = |label: &str, cull_mode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_shadow"),
                    buffers: &[SceneVertex::layout()],
                    compilation_options: Default::default(),
                },
                primitive: wgpu::PrimitiveState {
                    cull_mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: depth_format,
                    depth_write_enabled: true,
                    depth_compare: ShadowMap::COMPARE_FUNCTION,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                fragment: None,
                multiview_mask: None,
                cache: None,
            })
        };

        Self {
            closed: depth_only("shadow closed", Some(wgpu::Face::Front)),
            flat: depth_only("shadow flat", None),
            light_bind_group_layout,
        }
    }

    /// Bind group over a buffer holding the light-space matrix.
    pub fn create_light_bind_group(
        &self,
        device: &wgpu::Device,
        light_matrix: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow light"),
            layout: &self.light_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_matrix.as_entire_binding(),
            }],
        })
    }

    fn pipeline(&self, shape: CasterShape) -> &wgpu::RenderPipeline {
        match shape {
            CasterShape::Closed => &self.closed,
            CasterShape::Flat => &self.flat,
        }
    }

    /// Draw one occluder. The light bind group (group 0) must already be set.
    pub fn draw<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        shape: CasterShape,
        model: &'a ModelBinding,
        mesh: &'a MeshBuffer,
    ) {
        pass.set_pipeline(self.pipeline(shape));
        pass.set_bind_group(1, &model.bind_group, &[]);
        mesh.bind(pass);
        mesh.draw(pass);
    }
}
