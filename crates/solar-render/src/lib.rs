//! wgpu rendering: surface management, frame encoding, shader validation,
//! mesh buffers, textures, and the scene/shadow/line pipelines.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod line_pipeline;
pub mod pass;
pub mod scene_pipeline;
pub mod shader;
pub mod shadow_pipeline;
pub mod texture;

pub use buffer::{
    BufferAllocator, DoubleBufferedVertices, IndexData, MeshBuffer, SceneVertex,
    LineVertex,
};
pub use camera::{Camera, CameraUniform, Projection};
pub use depth::{DepthBuffer, reverse_z_state};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use line_pipeline::{LINE_SHADER_SOURCE, LinePipeline};
pub use pass::{FrameEncoder, RenderPassBuilder, SPACE_BLACK};
pub use scene_pipeline::{
    ModelBinding, ModelUniform, PrimitiveKind, SCENE_SHADER_SOURCE, ScenePipeline, ShadingMode,
    draw_scene_mesh, model_bind_group_layout,
};
pub use shader::{ShaderError, ShaderLibrary, validate_wgsl};
pub use shadow_pipeline::{CasterShape, SHADOW_SHADER_SOURCE, ShadowPipeline};
pub use texture::{BodyTexture, TextureCache, TextureError, TextureUpload};
