use solar_config::ConfigError;
use solar_render::{RenderContextError, ShaderError, TextureError};

/// Fatal application errors. Anything here ends the event loop.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("render context: {0}")]
    RenderContext(#[from] RenderContextError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("texture upload failed: {0}")]
    Texture(#[from] TextureError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
}
