//! Background stars drawn as instanced billboards of constant pixel size
//! (`1.5 + 3 * brightness`), faded to soft round points.

use bytemuck::{Pod, Zeroable};
use solar_render::{ShaderError, reverse_z_state, validate_wgsl};
use wgpu::util::DeviceExt;

use crate::starfield::StarPoint;

pub const STAR_SHADER_SOURCE: &str = r#"
struct Sky {
    view_proj: mat4x4<f32>,
    // xy = viewport in pixels
    viewport: vec4<f32>,
};

@group(0) @binding(0) var<uniform> sky: Sky;

struct Star {
    @location(0) center: vec3<f32>,
    @location(1) brightness: f32,
    @location(2) color: vec3<f32>,
};

struct Sprite {
    @builtin(position) clip: vec4<f32>,
    @location(0) corner: vec2<f32>,
    @location(1) color: vec3<f32>,
    @location(2) brightness: f32,
};

@vertex
fn vs_star(@builtin(vertex_index) vi: u32, star: Star) -> Sprite {
    // Two triangles covering [-1, 1]^2.
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0), vec2<f32>(1.0, -1.0), vec2<f32>(1.0, 1.0),
        vec2<f32>(1.0, 1.0), vec2<f32>(-1.0, 1.0), vec2<f32>(-1.0, -1.0),
    );
    let corner = corners[vi];
    let clip = sky.view_proj * vec4<f32>(star.center, 1.0);
    let size_px = 1.5 + star.brightness * 3.0;
    // Pixels to NDC, pre-multiplied by w to survive the perspective divide.
    let offset = corner * size_px / sky.viewport.xy * clip.w;
    return Sprite(vec4<f32>(clip.xy + offset, clip.zw), corner, star.color, star.brightness);
}

@fragment
fn fs_star(s: Sprite) -> @location(0) vec4<f32> {
    let falloff = 1.0 - smoothstep(0.0, 0.5, length(s.corner) * 0.5);
    return vec4<f32>(s.color * s.brightness * 1.2, falloff * s.brightness);
}
"#;

/// One star as instance data.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct StarInstance {
    pub position: [f32; 3],
    pub brightness: f32,
    pub color: [f32; 3],
    pub _padding: f32,
}

impl StarInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x3];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: size_of::<StarInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &Self::ATTRIBUTES,
    };
}

impl From<&StarPoint> for StarInstance {
    fn from(star: &StarPoint) -> Self {
        Self {
            position: star.position.to_array(),
            brightness: star.brightness,
            color: star.color,
            _padding: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct SkyUniform {
    view_proj: [[f32; 4]; 4],
    viewport: [f32; 4],
}

impl SkyUniform {
    fn new(view_proj: glam::Mat4, (width, height): (u32, u32)) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            viewport: [width.max(1) as f32, height.max(1) as f32, 0.0, 0.0],
        }
    }
}

/// Stars are uploaded once; only the camera uniform changes per frame.
pub struct StarfieldRenderer {
    pipeline: wgpu::RenderPipeline,
    instances: wgpu::Buffer,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    star_count: u32,
}

impl StarfieldRenderer {
    /// Fails if the star shader does not validate.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        stars: &[StarPoint],
    ) -> Result<Self, ShaderError> {
        validate_wgsl("starfield", STAR_SHADER_SOURCE)?;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("starfield"),
            source: wgpu::ShaderSource::Wgsl(STAR_SHADER_SOURCE.into()),
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("starfield"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(size_of::<SkyUniform>() as u64),
                },
                count: None,
            }],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("starfield"),
            layout: Some(&device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("starfield"),
                bind_group_layouts: &[&layout],
                immediate_size: 0,
            })),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_star"),
                buffers: &[StarInstance::LAYOUT],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(reverse_z_state(depth_format, false)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_star"),
                targets: &[Some(wgpu::ColorTargetState {
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    ..surface_format.into()
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let mut data: Vec<StarInstance> = stars.iter().map(StarInstance::from).collect();
        let star_count = data.len() as u32;
        if data.is_empty() {
            // Zero-sized vertex buffers are invalid.
            data.push(StarInstance::zeroed());
        }
        let instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("starfield instances"),
            contents: bytemuck::cast_slice(&data),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("starfield sky"),
            contents: bytemuck::bytes_of(&SkyUniform::new(glam::Mat4::IDENTITY, (1, 1))),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("starfield"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });

        log::info!("Starfield uploaded: {star_count} stars");

        Ok(Self {
            pipeline,
            instances,
            uniform,
            bind_group,
            star_count,
        })
    }

    pub fn update(&self, queue: &wgpu::Queue, view_proj: glam::Mat4, viewport: (u32, u32)) {
        queue.write_buffer(&self.uniform, 0, bytemuck::bytes_of(&SkyUniform::new(view_proj, viewport)));
    }

    /// Draw every star. Goes first in the lit pass, without depth writes.
    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if self.star_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.instances.slice(..));
        pass.draw(0..6, 0..self.star_count);
    }

    pub fn star_count(&self) -> u32 {
        self.star_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_shader_validates() {
        assert!(validate_wgsl("starfield", STAR_SHADER_SOURCE).is_ok());
    }

    #[test]
    fn test_instance_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<StarInstance>(), 32);
        assert_eq!(std::mem::offset_of!(StarInstance, brightness), 12);
        assert_eq!(std::mem::offset_of!(StarInstance, color), 16);
        assert_eq!(StarInstance::LAYOUT.array_stride, 32);
    }

    #[test]
    fn test_uniform_size() {
        assert_eq!(std::mem::size_of::<SkyUniform>(), 80);
    }

    #[test]
    fn test_instance_from_star_point() {
        let star = StarPoint {
            position: glam::Vec3::new(1.0, 2.0, 3.0),
            brightness: 0.5,
            color: [0.9, 0.8, 0.7],
        };
        let instance = StarInstance::from(&star);
        assert_eq!(instance.position, [1.0, 2.0, 3.0]);
        assert_eq!(instance.brightness, 0.5);
        assert_eq!(instance.color, [0.9, 0.8, 0.7]);
    }
}
