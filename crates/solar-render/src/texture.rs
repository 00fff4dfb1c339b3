//! Body textures on the GPU.
//!
//! [`TextureCache`] uploads each named RGBA8 image once, builds its mip chain
//! with a linear blit, and returns an [`Arc<BodyTexture>`] whose bind group
//! fills the scene pipeline's texture slot. Bodies that name the same file
//! share one allocation.

use std::collections::HashMap;
use std::sync::Arc;

/// Decoded pixels waiting for upload. `rgba` is tightly packed, four bytes
/// per texel, top row first.
#[derive(Clone, Copy, Debug)]
pub struct TextureUpload<'a> {
    pub name: &'a str,
    pub rgba: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub mipmaps: bool,
}

/// An uploaded texture and the bind group that samples it.
pub struct BodyTexture {
    pub texture: wgpu::Texture,
    pub bind_group: wgpu::BindGroup,
    pub size: (u32, u32),
    pub mip_levels: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture '{name}' has {actual} bytes, {width}x{height} RGBA8 needs {expected}")]
    DataSizeMismatch {
        name: String,
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture '{name}' has zero size ({width}x{height})")]
    ZeroDimensions { name: String, width: u32, height: u32 },
}

const BYTES_PER_TEXEL: u32 = 4;

/// Levels in a full chain down to 1×1.
fn mip_levels_for(width: u32, height: u32) -> u32 {
    u32::BITS - width.max(height).max(1).leading_zeros()
}

fn check_upload(upload: &TextureUpload<'_>) -> Result<(), TextureError> {
    let TextureUpload {
        name,
        rgba,
        width,
        height,
        ..
    } = *upload;
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions {
            name: name.to_owned(),
            width,
            height,
        });
    }
    let expected = (width * height * BYTES_PER_TEXEL) as usize;
    if rgba.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            name: name.to_owned(),
            actual: rgba.len(),
            expected,
            width,
            height,
        });
    }
    Ok(())
}

/// Bind group layout: filterable 2D texture at 0, filtering sampler at 1.
fn sampled_texture_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn sampled_texture_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

pub(crate) const MIP_BLIT_SHADER_SOURCE: &str = r#"
@group(0) @binding(0) var source: texture_2d<f32>;
@group(0) @binding(1) var bilinear: sampler;

struct Blit {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_blit(@builtin(vertex_index) index: u32) -> Blit {
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    let p = corners[index];
    var out: Blit;
    out.clip = vec4<f32>(p, 0.0, 1.0);
    out.uv = vec2<f32>(p.x * 0.5 + 0.5, 0.5 - p.y * 0.5);
    return out;
}

@fragment
fn fs_blit(in: Blit) -> @location(0) vec4<f32> {
    return textureSample(source, bilinear, in.uv);
}
"#;

/// Halves one mip level into the next with a bilinear fetch. The sRGB view
/// makes the filter average in linear space.
struct MipBlitter {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl MipBlitter {
    fn new(device: &wgpu::Device) -> Self {
        let layout = sampled_texture_layout(device, "mip-blit-layout");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mip-blit-shader"),
            source: wgpu::ShaderSource::Wgsl(MIP_BLIT_SHADER_SOURCE.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mip-blit-pipeline-layout"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mip-blit-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_blit"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_blit"),
                targets: &[Some(TextureCache::FORMAT.into())],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mip-blit-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            pipeline,
            layout,
            sampler,
        }
    }

    fn level_view(texture: &wgpu::Texture, level: u32) -> wgpu::TextureView {
        texture.create_view(&wgpu::TextureViewDescriptor {
            base_mip_level: level,
            mip_level_count: Some(1),
            ..Default::default()
        })
    }

    fn fill_chain(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        levels: u32,
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mip-blit-encoder"),
        });
        for level in 1..levels {
            let source = Self::level_view(texture, level - 1);
            let target = Self::level_view(texture, level);
            let bind_group = sampled_texture_bind_group(
                device,
                "mip-blit-bind-group",
                &self.layout,
                &source,
                &self.sampler,
            );
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mip-blit-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                ..Default::default()
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Name-keyed cache of body textures sharing one repeat sampler and layout.
pub struct TextureCache {
    entries: HashMap<String, Arc<BodyTexture>>,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    blitter: MipBlitter,
}

impl TextureCache {
    /// Every body texture is sRGB RGBA8.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    pub fn new(device: &wgpu::Device) -> Self {
        // Planet maps wrap in longitude; ring strips repeat along the band.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("body-texture-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });
        Self {
            entries: HashMap::new(),
            layout: sampled_texture_layout(device, "body-texture-layout"),
            sampler,
            blitter: MipBlitter::new(device),
        }
    }

    /// Upload `upload` under its name, or return the texture already cached
    /// under that name.
    pub fn get_or_upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        upload: &TextureUpload<'_>,
    ) -> Result<Arc<BodyTexture>, TextureError> {
        if let Some(cached) = self.entries.get(upload.name) {
            return Ok(Arc::clone(cached));
        }
        check_upload(upload)?;

        let TextureUpload {
            name,
            rgba,
            width,
            height,
            mipmaps,
        } = *upload;
        let mip_levels = if mipmaps { mip_levels_for(width, height) } else { 1 };
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size: extent,
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        queue.write_texture(
            texture.as_image_copy(),
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * BYTES_PER_TEXEL),
                rows_per_image: None,
            },
            extent,
        );
        if mip_levels > 1 {
            self.blitter.fill_chain(device, queue, &texture, mip_levels);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = sampled_texture_bind_group(
            device,
            &format!("{name}-texture"),
            &self.layout,
            &view,
            &self.sampler,
        );
        let body_texture = Arc::new(BodyTexture {
            texture,
            bind_group,
            size: (width, height),
            mip_levels,
        });
        self.entries.insert(name.to_owned(), Arc::clone(&body_texture));
        log::info!("Uploaded texture '{name}' {width}x{height}, {mip_levels} mip levels");
        Ok(body_texture)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layout of the scene pipeline's texture group.
    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;
    use crate::shader::validate_wgsl;

    fn upload<'a>(name: &'a str, rgba: &'a [u8], width: u32, height: u32) -> TextureUpload<'a> {
        TextureUpload {
            name,
            rgba,
            width,
            height,
            mipmaps: true,
        }
    }

    #[test]
    fn test_mip_levels_reach_one_texel() {
        assert_eq!(mip_levels_for(1, 1), 1);
        assert_eq!(mip_levels_for(4, 4), 3);
        assert_eq!(mip_levels_for(2048, 1024), 12);
        // Non-power-of-two maps round down at each level.
        assert_eq!(mip_levels_for(1000, 500), 10);
    }

    #[test]
    fn test_blit_shader_is_valid_wgsl() {
        assert!(validate_wgsl("mip-blit", MIP_BLIT_SHADER_SOURCE).is_ok());
    }

    #[test]
    fn test_upload_checks() {
        assert!(check_upload(&upload("ok", &[0; 64], 4, 4)).is_ok());
        assert!(matches!(
            check_upload(&upload("short", &[0; 60], 4, 4)),
            Err(TextureError::DataSizeMismatch { expected: 64, actual: 60, .. })
        ));
        assert!(matches!(
            check_upload(&upload("empty", &[], 0, 4)),
            Err(TextureError::ZeroDimensions { .. })
        ));
    }

    #[test]
    fn test_same_name_uploads_once() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut cache = TextureCache::new(&device);
        let texels = [200u8; 16];
        let first = cache
            .get_or_upload(&device, &queue, &upload("moon.jpg", &texels, 2, 2))
            .unwrap();
        let second = cache
            .get_or_upload(&device, &queue, &upload("moon.jpg", &texels, 2, 2))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_mip_chain_is_built() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let mut cache = TextureCache::new(&device);
        let texels = vec![255u8; 64 * 32 * 4];
        let texture = cache
            .get_or_upload(&device, &queue, &upload("rings.jpg", &texels, 64, 32))
            .unwrap();
        assert_eq!(texture.mip_levels, 7);
        assert_eq!(texture.size, (64, 32));
        assert_eq!(texture.texture.mip_level_count(), 7);
    }
}
