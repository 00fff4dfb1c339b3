//! Best-effort asset loading. Every public loader has a deterministic
//! fallback, so a missing or corrupt file degrades visuals but never stops
//! the viewer.

mod error;
mod mesh;
mod texture;

pub use error::AssetError;
pub use mesh::{MeshData, fallback_ship, load_obj, load_ship_or_fallback};
pub use texture::{CHECKER_DARK, CHECKER_LIGHT, TextureImage, checkerboard, load_texture, load_texture_or_checkerboard};
