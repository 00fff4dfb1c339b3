//! Directional light, Phong materials, and shadow mapping.

mod directional;
pub mod phong;
mod shadow;

pub use directional::{
    DirectionalLight, DirectionalLightUniform, LIGHT_ORBIT_RATE, orbiting_light_direction,
};
pub use phong::PhongMaterial;
pub use shadow::{
    DepthImage, DepthMap, ShadowMap, ShadowSettings, ShadowUniform, light_space_matrix,
    project_to_shadow_map, shadow_factor, slope_scaled_bias,
};
