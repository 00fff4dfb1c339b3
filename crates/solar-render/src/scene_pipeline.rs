//! Scene pipeline: Phong shading with a PCF shadow lookup, an emissive
//! branch for the sun, and an unlit branch for orbit guides.
//!
//! Bind groups:
//! - group 0: camera uniform (binding 0) and directional light (binding 1)
//! - group 1: shadow uniform (binding 0) and shadow depth texture (binding 1)
//! - group 2: per-draw [`ModelUniform`]
//! - group 3: body texture and sampler, laid out by [`crate::TextureCache`]
//!
//! One shader backs three pipeline variants selected by [`PrimitiveKind`].

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use solar_lighting::PhongMaterial;

use crate::buffer::{MeshBuffer, SceneVertex};
use crate::depth::reverse_z_state;

/// Which branch of the fragment shader a draw takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum ShadingMode {
    /// Ambient + (1 - shadow) * (diffuse + specular).
    Lit = 0,
    /// Screen-space glow; ignores light, normals, and shadow.
    Emissive = 1,
    /// Flat base color.
    Unlit = 2,
}

/// Pipeline variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Closed meshes with back-face culling.
    Triangles,
    /// Flat geometry visible from both sides (rings).
    DoubleSided,
    /// Closed polylines (orbit guides).
    LineStrip,
}

/// Per-draw uniform, 128 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ModelUniform {
    pub world: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// xyz = specular reflectance, w = shininess.
    pub specular: [f32; 4],
    pub mode: u32,
    pub use_texture: u32,
    /// 0 = texture only, 1 = vertex color only.
    pub vertex_color_mix: f32,
    pub _pad: f32,
}

impl ModelUniform {
    pub fn new(
        world: glam::Mat4,
        material: &PhongMaterial,
        mode: ShadingMode,
        use_texture: bool,
        vertex_color_mix: f32,
    ) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            ambient: material.ambient.extend(0.0).to_array(),
            diffuse: material.diffuse.extend(0.0).to_array(),
            specular: material.specular.extend(material.shininess).to_array(),
            mode: mode as u32,
            use_texture: u32::from(use_texture),
            vertex_color_mix: vertex_color_mix.clamp(0.0, 1.0),
            _pad: 0.0,
        }
    }
}

/// A model uniform buffer and its group 2 bind group.
pub struct ModelBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ModelBinding {
    pub fn write(&self, queue: &wgpu::Queue, uniform: &ModelUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }
}

/// Layout of the per-draw model uniform, shared with the shadow pipeline.
pub fn model_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("scene-model-bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(128), // ModelUniform
            },
            count: None,
        }],
    })
}

/// Scene rendering pipelines and their bind group layouts.
pub struct ScenePipeline {
    triangles: wgpu::RenderPipeline,
    double_sided: wgpu::RenderPipeline,
    line_strip: wgpu::RenderPipeline,
    /// Camera + light (group 0).
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    /// Shadow uniform + depth texture (group 1).
    pub shadow_bind_group_layout: wgpu::BindGroupLayout,
    /// Per-draw model uniform (group 2).
    pub model_bind_group_layout: wgpu::BindGroupLayout,
}

impl ScenePipeline {
    /// Build all variants from an already validated shader module.
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        texture_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("scene-frame-bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: NonZeroU64::new(80), // CameraUniform
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: NonZeroU64::new(32), // DirectionalLightUniform
                        },
                        count: None,
                    },
                ],
            });

        let shadow_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("scene-shadow-bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: NonZeroU64::new(80), // ShadowUniform
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                ],
            });

        let model_bind_group_layout = model_bind_group_layout(device);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene-pipeline-layout"),
            bind_group_layouts: &[
                &frame_bind_group_layout,
                &shadow_bind_group_layout,
                &model_bind_group_layout,
                texture_bind_group_layout,
            ],
            immediate_size: 0,
        });

        let build = |label: &str, kind: PrimitiveKind| {
            let (topology, cull_mode) = match kind {
                PrimitiveKind::Triangles => {
                    (wgpu::PrimitiveTopology::TriangleList, Some(wgpu::Face::Back))
                }
                PrimitiveKind::DoubleSided => (wgpu::PrimitiveTopology::TriangleList, None),
                PrimitiveKind::LineStrip => (wgpu::PrimitiveTopology::LineStrip, None),
            };

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[SceneVertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(reverse_z_state(depth_format, true)),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
        };

        let triangles = build("scene-pipeline", PrimitiveKind::Triangles);
        let double_sided = build("scene-pipeline-double-sided", PrimitiveKind::DoubleSided);
        let line_strip = build("scene-pipeline-lines", PrimitiveKind::LineStrip);

        Self {
            triangles,
            double_sided,
            line_strip,
            frame_bind_group_layout,
            shadow_bind_group_layout,
            model_bind_group_layout,
        }
    }

    pub fn pipeline(&self, kind: PrimitiveKind) -> &wgpu::RenderPipeline {
        match kind {
            PrimitiveKind::Triangles => &self.triangles,
            PrimitiveKind::DoubleSided => &self.double_sided,
            PrimitiveKind::LineStrip => &self.line_strip,
        }
    }

    /// Group 0 bind group over the camera and light uniform buffers.
    pub fn create_frame_bind_group(
        &self,
        device: &wgpu::Device,
        camera_buffer: &wgpu::Buffer,
        light_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene-frame-bind-group"),
            layout: &self.frame_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Group 1 bind group over the shadow uniform and the shadow map.
    pub fn create_shadow_bind_group(
        &self,
        device: &wgpu::Device,
        shadow_buffer: &wgpu::Buffer,
        shadow_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene-shadow-bind-group"),
            layout: &self.shadow_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: shadow_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadow_view),
                },
            ],
        })
    }

    /// Allocate a model uniform buffer with its bind group.
    pub fn create_model_binding(&self, device: &wgpu::Device, label: &str) -> ModelBinding {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<ModelUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        ModelBinding { buffer, bind_group }
    }
}

/// Draw one mesh with its model and texture bind groups. Groups 0 and 1
/// must already be set on the pass.
pub fn draw_scene_mesh<'a>(
    render_pass: &mut wgpu::RenderPass<'a>,
    pipeline: &'a ScenePipeline,
    kind: PrimitiveKind,
    model: &'a ModelBinding,
    texture_bind_group: &'a wgpu::BindGroup,
    mesh: &'a MeshBuffer,
) {
    render_pass.set_pipeline(pipeline.pipeline(kind));
    render_pass.set_bind_group(2, &model.bind_group, &[]);
    render_pass.set_bind_group(3, texture_bind_group, &[]);
    mesh.bind(render_pass);
    mesh.draw(render_pass);
}

/// WGSL source for the scene pipeline.
pub const SCENE_SHADER_SOURCE: &str = r#"
const MODE_LIT: u32 = 0u;
const MODE_EMISSIVE: u32 = 1u;
const MODE_UNLIT: u32 = 2u;

struct CameraUniform {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

struct DirectionalLight {
    direction_intensity: vec4<f32>,
    color_padding: vec4<f32>,
};

struct ShadowUniforms {
    light_space: mat4x4<f32>,
    // x = bias slope, y = bias min, z = enabled, w = resolution
    params: vec4<f32>,
};

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

@group(0) @binding(0)
var<uniform> camera: CameraUniform;

@group(0) @binding(1)
var<uniform> light: DirectionalLight;

@group(1) @binding(0)
var<uniform> shadow_uniforms: ShadowUniforms;

@group(1) @binding(1)
var shadow_map: texture_depth_2d;

@group(2) @binding(0)
var<uniform> model: Model;

@group(3) @binding(0)
var body_texture: texture_2d<f32>;

@group(3) @binding(1)
var body_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world = model.world * vec4<f32>(in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = camera.view_proj * world;
    out.world_position = world.xyz;
    out.color = in.color;
    out.uv = in.uv;
    // Bodies are scaled uniformly, so the world matrix transforms normals.
    out.normal = (model.world * vec4<f32>(in.normal, 0.0)).xyz;
    return out;
}

// Fraction of the 3x3 texel block around the fragment that occludes it.
fn shadow_factor(world_position: vec3<f32>, normal: vec3<f32>, to_light: vec3<f32>) -> f32 {
    if (shadow_uniforms.params.z < 0.5) {
        return 0.0;
    }
    let clip = shadow_uniforms.light_space * vec4<f32>(world_position, 1.0);
    let ndc = clip.xyz / clip.w;
    if (ndc.z > 1.0) {
        return 0.0;
    }
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    if (any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0))) {
        return 0.0;
    }

    let bias = max(shadow_uniforms.params.x * (1.0 - max(dot(normal, to_light), 0.0)), shadow_uniforms.params.y);
    let res = i32(shadow_uniforms.params.w);
    let max_coord = vec2<i32>(res - 1);
    let center = clamp(vec2<i32>(uv * f32(res)), vec2<i32>(0), max_coord);

    var occluded = 0.0;
    for (var dy = -1; dy <= 1; dy++) {
        for (var dx = -1; dx <= 1; dx++) {
            let coord = clamp(center + vec2<i32>(dx, dy), vec2<i32>(0), max_coord);
            let stored = textureLoad(shadow_map, coord, 0);
            if (ndc.z - bias > stored) {
                occluded += 1.0;
            }
        }
    }
    return occluded / 9.0;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let tex = textureSample(body_texture, body_sampler, in.uv);

    var base = in.color;
    if (model.use_texture != 0u) {
        base = mix(tex.rgb, in.color, model.vertex_color_mix);
    }

    if (model.mode == MODE_EMISSIVE) {
        let glow = 1.5 + 0.3 * sin(in.clip_position.x * 0.01) * cos(in.clip_position.y * 0.01);
        return vec4<f32>(mix(base * glow, vec3<f32>(1.0, 0.9, 0.6), 0.3), 1.0);
    }
    if (model.mode == MODE_UNLIT) {
        return vec4<f32>(base, 1.0);
    }

    let n = normalize(in.normal);
    let l = normalize(-light.direction_intensity.xyz);
    let v = normalize(camera.position.xyz - in.world_position);
    let light_color = light.color_padding.rgb * light.direction_intensity.w;

    let ambient = model.ambient.rgb * light_color;
    let n_dot_l = max(dot(n, l), 0.0);
    let diffuse = model.diffuse.rgb * light_color * n_dot_l;
    let r = reflect(-l, n);
    let spec = pow(max(dot(v, r), 0.0), model.specular.w);
    let specular = model.specular.rgb * light_color * spec;

    let shadow_amount = shadow_factor(in.world_position, n, l);
    let lit = ambient + (1.0 - shadow_amount) * (diffuse + specular);
    return vec4<f32>(base * lit, 1.0);
}
"#;
