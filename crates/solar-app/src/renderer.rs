//! Per-frame scene rendering.
//!
//! Each frame records two passes into one encoder: a depth-only pass from
//! the light into the shadow map, then the lit pass to the swapchain that
//! samples it. Body meshes are built once at startup in the order of
//! [`SolarSystem::transforms`], so per-frame work is uniform writes only.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use solar_assets::{MeshData, TextureImage, load_texture_or_checkerboard};
use solar_config::Config;
use solar_lighting::{
    DirectionalLight, PhongMaterial, ShadowMap, ShadowSettings, ShadowUniform, light_space_matrix,
};
use solar_render::{
    BodyTexture, BufferAllocator, Camera, CasterShape, DepthBuffer, FrameEncoder, IndexData,
    LINE_SHADER_SOURCE, LinePipeline, MeshBuffer, ModelBinding, ModelUniform, PrimitiveKind,
    RenderContext, RenderPassBuilder, SCENE_SHADER_SOURCE, SHADOW_SHADER_SOURCE, ScenePipeline,
    SceneVertex, ShaderLibrary, ShadingMode, ShadowPipeline, SurfaceError, TextureCache,
    TextureUpload, draw_scene_mesh,
};
use solar_scene::{BodyRole, BodyTransform, RingInfo, SolarSystem, TextureSlot};
use solar_space::{
    ParticleField, ShootingStarRenderer, StarPoint, StarfieldRenderer, build_orbit_path,
    build_ring, build_sphere,
};
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::error::AppError;
use crate::settings;

const WHITE_TEXTURE: &str = "white";

/// Everything the renderer reads from the simulation for one frame.
pub struct FrameScene<'a> {
    pub camera: &'a Camera,
    pub system: &'a SolarSystem,
    pub ship_world: Mat4,
    pub particles: &'a ParticleField,
    /// Drives the light's orbit.
    pub elapsed: f32,
}

/// Indices into [`SolarSystem::transforms`] grouped by how they are drawn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct DrawLists {
    suns: Vec<usize>,
    planets: Vec<usize>,
    moons: Vec<usize>,
    /// Planets that carry a ring.
    ringed: Vec<usize>,
}

impl DrawLists {
    fn from_transforms(transforms: &[BodyTransform<'_>]) -> Self {
        let mut lists = Self::default();
        for (i, t) in transforms.iter().enumerate() {
            match t.body.role {
                BodyRole::Star => lists.suns.push(i),
                BodyRole::Planet => lists.planets.push(i),
                BodyRole::Moon => lists.moons.push(i),
            }
            if t.body.ring.is_some() {
                lists.ringed.push(i);
            }
        }
        lists
    }

    /// Bodies drawn into the shadow map. The sun is the light, so it never occludes.
    fn shadow_casters(&self) -> impl Iterator<Item = usize> + '_ {
        self.planets.iter().chain(&self.moons).copied()
    }
}

/// One mesh with its own uniform slot and material.
struct Drawable {
    mesh: MeshBuffer,
    model: ModelBinding,
    texture: Arc<BodyTexture>,
    material: PhongMaterial,
    mode: ShadingMode,
    textured: bool,
}

impl Drawable {
    fn write(&self, queue: &wgpu::Queue, world: Mat4, vertex_color_mix: f32) {
        let uniform = ModelUniform::new(
            world,
            &self.material,
            self.mode,
            self.textured,
            vertex_color_mix,
        );
        self.model.write(queue, &uniform);
    }

    fn draw<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        pipeline: &'a ScenePipeline,
        kind: PrimitiveKind,
    ) {
        draw_scene_mesh(
            pass,
            pipeline,
            kind,
            &self.model,
            &self.texture.bind_group,
            &self.mesh,
        );
    }
}

struct FrameBuffers {
    camera: wgpu::Buffer,
    light: wgpu::Buffer,
    shadow: wgpu::Buffer,
    light_matrix: wgpu::Buffer,
}

impl FrameBuffers {
    fn new(device: &wgpu::Device, camera: &Camera, light: &DirectionalLight) -> Self {
        let uniform = |label: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };
        Self {
            camera: uniform("camera-uniform", bytemuck::bytes_of(&camera.to_uniform())),
            light: uniform("light-uniform", bytemuck::bytes_of(&light.to_uniform())),
            shadow: uniform(
                "shadow-uniform",
                bytemuck::bytes_of(&ShadowUniform::new(Mat4::IDENTITY, &ShadowSettings::default())),
            ),
            light_matrix: uniform(
                "light-space-matrix",
                bytemuck::bytes_of(&Mat4::IDENTITY.to_cols_array_2d()),
            ),
        }
    }
}

pub struct SceneRenderer {
    scene_pipeline: ScenePipeline,
    shadow_pipeline: ShadowPipeline,
    line_pipeline: LinePipeline,
    starfield: StarfieldRenderer,
    shooting_stars: ShootingStarRenderer,
    depth: DepthBuffer,
    shadow_map: ShadowMap,
    shadow_settings: ShadowSettings,
    light: DirectionalLight,
    buffers: FrameBuffers,
    frame_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    light_bind_group: wgpu::BindGroup,
    line_camera_bind_group: wgpu::BindGroup,
    lists: DrawLists,
    /// Aligned with [`SolarSystem::transforms`].
    bodies: Vec<Drawable>,
    /// Paired with `lists.ringed`.
    rings: Vec<Drawable>,
    orbits: Vec<Drawable>,
    ship: Drawable,
    // Owns the sampler and layout the body textures were created against.
    _textures: TextureCache,
    clear_color: wgpu::Color,
    vertex_color_mix: f32,
}

impl SceneRenderer {
    /// Compile every shader, upload textures and meshes, and allocate the
    /// frame resources. Shader failures are returned; missing assets are not.
    pub fn new(
        gpu: &RenderContext,
        config: &Config,
        system: &SolarSystem,
        ship_mesh: &MeshData,
        stars: &[StarPoint],
    ) -> Result<Self, AppError> {
        let device = &gpu.device;
        let (width, height) = gpu.size();

        let mut shaders = ShaderLibrary::new();
        let scene_shader = shaders.load_from_source(device, "scene", SCENE_SHADER_SOURCE)?;
        let shadow_shader = shaders.load_from_source(device, "shadow", SHADOW_SHADER_SOURCE)?;
        let line_shader = shaders.load_from_source(device, "line", LINE_SHADER_SOURCE)?;

        let mut textures = TextureCache::new(device);
        let scene_pipeline = ScenePipeline::new(
            device,
            &scene_shader,
            gpu.surface_format,
            DepthBuffer::FORMAT,
            textures.layout(),
        );
        let shadow_pipeline = ShadowPipeline::new(
            device,
            &shadow_shader,
            ShadowMap::FORMAT,
            &scene_pipeline.model_bind_group_layout,
        );
        let line_pipeline =
            LinePipeline::new(device, &line_shader, gpu.surface_format, DepthBuffer::FORMAT);
        let starfield =
            StarfieldRenderer::new(device, gpu.surface_format, DepthBuffer::FORMAT, stars)?;
        let shooting_stars = ShootingStarRenderer::new(device, config.particles.capacity);

        let shadow_settings = settings::shadow_settings(config);
        let shadow_map = ShadowMap::new(device, shadow_settings.resolution);
        let depth = DepthBuffer::new(device, width, height);

        let light = DirectionalLight::default();
        let camera = settings::projection_camera(config, width, height);
        let buffers = FrameBuffers::new(device, &camera, &light);
        let frame_bind_group =
            scene_pipeline.create_frame_bind_group(device, &buffers.camera, &buffers.light);
        let shadow_bind_group =
            scene_pipeline.create_shadow_bind_group(device, &buffers.shadow, &shadow_map.view);
        let light_bind_group =
            shadow_pipeline.create_light_bind_group(device, &buffers.light_matrix);
        let line_camera_bind_group = line_pipeline.create_camera_bind_group(device, &buffers.camera);

        let white = upload(&mut textures, gpu, WHITE_TEXTURE, &TextureImage::solid([255; 3]))?;
        let mut body_texture = |slot: TextureSlot| {
            let image = load_texture_or_checkerboard(&config.assets.texture_path(slot.file_name()));
            upload(&mut textures, gpu, slot.file_name(), &image)
        };

        let allocator = BufferAllocator::new(device);
        let transforms = system.transforms();
        let lists = DrawLists::from_transforms(&transforms);
        let (segments, rings_count) = (config.render.sphere_segments, config.render.sphere_rings);

        let mut bodies = Vec::with_capacity(transforms.len());
        for t in &transforms {
            let body = t.body;
            let (material, mode) = match body.role {
                BodyRole::Star => (PhongMaterial::sun(), ShadingMode::Emissive),
                BodyRole::Planet | BodyRole::Moon => (PhongMaterial::planet(), ShadingMode::Lit),
            };
            let vertices = build_sphere(body.radius, body.color, segments, rings_count);
            bodies.push(Drawable {
                mesh: allocator.create_vertex_mesh(&body.name, &vertices),
                model: scene_pipeline.create_model_binding(device, &body.name),
                texture: body_texture(body.texture)?,
                material,
                mode,
                textured: true,
            });
        }

        let mut rings = Vec::with_capacity(lists.ringed.len());
        for &i in &lists.ringed {
            let body = transforms[i].body;
            let Some(ring) = body.ring else { continue };
            let label = format!("{}-ring", body.name);
            let vertices = ring_vertices(&ring);
            rings.push(Drawable {
                mesh: allocator.create_vertex_mesh(&label, &vertices),
                model: scene_pipeline.create_model_binding(device, &label),
                texture: body_texture(ring.texture)?,
                material: PhongMaterial::planet(),
                mode: ShadingMode::Lit,
                textured: true,
            });
        }

        let orbits = system
            .orbit_radii()
            .enumerate()
            .map(|(i, radius)| {
                let label = format!("orbit-{i}");
                Drawable {
                    mesh: allocator.create_vertex_mesh(&label, &build_orbit_path(radius)),
                    model: scene_pipeline.create_model_binding(device, &label),
                    texture: Arc::clone(&white),
                    material: PhongMaterial::planet(),
                    mode: ShadingMode::Unlit,
                    textured: false,
                }
            })
            .collect::<Vec<_>>();

        let ship = Drawable {
            mesh: allocator.create_mesh(
                "ship",
                &ship_mesh.vertices,
                IndexData::U32(&ship_mesh.indices),
            ),
            model: scene_pipeline.create_model_binding(device, "ship"),
            texture: white,
            material: PhongMaterial::ship(),
            mode: ShadingMode::Lit,
            textured: false,
        };

        info!(
            "Scene renderer ready: {} bodies, {} rings, {} orbits, {} stars, ship {} triangles",
            bodies.len(),
            rings.len(),
            orbits.len(),
            starfield.star_count(),
            ship_mesh.triangle_count()
        );

        Ok(Self {
            scene_pipeline,
            shadow_pipeline,
            line_pipeline,
            starfield,
            shooting_stars,
            depth,
            shadow_map,
            shadow_settings,
            light,
            buffers,
            frame_bind_group,
            shadow_bind_group,
            light_bind_group,
            line_camera_bind_group,
            lists,
            bodies,
            rings,
            orbits,
            ship,
            _textures: textures,
            clear_color: settings::clear_color(config),
            vertex_color_mix: config.render.vertex_color_mix,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
    }

    pub fn shadows_enabled(&self) -> bool {
        self.shadow_settings.enabled
    }

    /// Upload this frame's uniforms and particles, then record and submit
    /// the shadow pass followed by the lit pass.
    pub fn render(&mut self, gpu: &RenderContext, scene: &FrameScene<'_>) -> Result<(), SurfaceError> {
        self.update_uniforms(gpu, scene);

        let surface_texture = gpu.get_current_texture()?;
        let mut frame = FrameEncoder::new(&gpu.device, surface_texture);

        if self.shadow_settings.enabled {
            let mut pass =
                frame.begin_depth_pass("shadow-pass", &self.shadow_map.view, ShadowMap::CLEAR_VALUE);
            self.record_shadow_pass(&mut pass);
        }

        {
            let builder = RenderPassBuilder::new()
                .clear_color(self.clear_color)
                .depth(&self.depth.view, DepthBuffer::CLEAR_VALUE)
                .label("lit-pass");
            let mut pass = frame.begin_render_pass(&builder);
            self.record_lit_pass(&mut pass);
        }

        frame.submit(&gpu.queue);
        Ok(())
    }

    fn update_uniforms(&mut self, gpu: &RenderContext, scene: &FrameScene<'_>) {
        let queue = &gpu.queue;

        self.light.update(scene.elapsed);
        queue.write_buffer(&self.buffers.light, 0, bytemuck::bytes_of(&self.light.to_uniform()));

        let camera_uniform = scene.camera.to_uniform();
        queue.write_buffer(&self.buffers.camera, 0, bytemuck::bytes_of(&camera_uniform));

        let light_space = light_space_matrix(self.light.direction, &self.shadow_settings);
        queue.write_buffer(
            &self.buffers.shadow,
            0,
            bytemuck::bytes_of(&ShadowUniform::new(light_space, &self.shadow_settings)),
        );
        queue.write_buffer(
            &self.buffers.light_matrix,
            0,
            bytemuck::bytes_of(&light_space.to_cols_array_2d()),
        );

        let transforms = scene.system.transforms();
        for (drawable, t) in self.bodies.iter().zip(&transforms) {
            drawable.write(queue, t.world, self.vertex_color_mix);
        }
        // Rings ride on the planet's full world matrix, spin included.
        for (drawable, &i) in self.rings.iter().zip(&self.lists.ringed) {
            if let Some(t) = transforms.get(i) {
                drawable.write(queue, t.world, self.vertex_color_mix);
            }
        }
        for orbit in &self.orbits {
            orbit.write(queue, Mat4::IDENTITY, 0.0);
        }
        self.ship.write(queue, scene.ship_world, 0.0);

        let view_proj = Mat4::from_cols_array_2d(&camera_uniform.view_proj);
        self.starfield.update(queue, view_proj, gpu.size());
        let segments = self.shooting_stars.upload(queue, scene.particles);
        debug!("Shooting-star vertices: {segments}");
    }

    fn record_shadow_pass<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        let casters = &self.shadow_pipeline;
        pass.set_bind_group(0, &self.light_bind_group, &[]);
        for i in self.lists.shadow_casters() {
            let body = &self.bodies[i];
            casters.draw(pass, CasterShape::Closed, &body.model, &body.mesh);
        }
        for ring in &self.rings {
            casters.draw(pass, CasterShape::Flat, &ring.model, &ring.mesh);
        }
        casters.draw(pass, CasterShape::Closed, &self.ship.model, &self.ship.mesh);
    }

    fn record_lit_pass<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        self.starfield.render(pass);
        self.shooting_stars
            .draw(pass, &self.line_pipeline, &self.line_camera_bind_group);

        let pipeline = &self.scene_pipeline;
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_bind_group(1, &self.shadow_bind_group, &[]);

        for &i in &self.lists.suns {
            self.bodies[i].draw(pass, pipeline, PrimitiveKind::Triangles);
        }
        for orbit in &self.orbits {
            orbit.draw(pass, pipeline, PrimitiveKind::LineStrip);
        }
        for &i in &self.lists.planets {
            self.bodies[i].draw(pass, pipeline, PrimitiveKind::Triangles);
        }
        for ring in &self.rings {
            ring.draw(pass, pipeline, PrimitiveKind::DoubleSided);
        }
        for &i in &self.lists.moons {
            self.bodies[i].draw(pass, pipeline, PrimitiveKind::Triangles);
        }
        self.ship.draw(pass, pipeline, PrimitiveKind::Triangles);
    }
}

/// Rings are white under their texture, whatever the planet's tint.
fn ring_vertices(ring: &RingInfo) -> Vec<SceneVertex> {
    build_ring(ring.inner_radius, ring.outer_radius, Vec3::ONE)
}

fn upload(
    textures: &mut TextureCache,
    gpu: &RenderContext,
    name: &str,
    image: &TextureImage,
) -> Result<Arc<BodyTexture>, AppError> {
    let upload = TextureUpload {
        name,
        rgba: &image.rgba,
        width: image.width,
        height: image.height,
        mipmaps: true,
    };
    Ok(textures.get_or_upload(&gpu.device, &gpu.queue, &upload)?)
}
