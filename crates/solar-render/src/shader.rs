//! WGSL modules, checked with naga before the device sees them.
//!
//! A shader that fails to parse or validate becomes
//! [`ShaderError::CompilationFailed`] carrying naga's annotated source
//! excerpt, and startup stops there.

use std::collections::HashMap;
use std::sync::Arc;

use naga::valid::{Capabilities, ValidationFlags, Validator};

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("shader '{name}' does not compile:\n{message}")]
    CompilationFailed { name: String, message: String },

    #[error("shader '{name}' was never loaded")]
    NotLoaded { name: String },
}

impl ShaderError {
    fn compile(name: &str, message: String) -> Self {
        Self::CompilationFailed {
            name: name.to_owned(),
            message,
        }
    }
}

/// Parse and validate `source`; the module is returned for inspection.
pub fn validate_wgsl(name: &str, source: &str) -> Result<naga::Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ShaderError::compile(name, e.emit_to_string(source)))?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ShaderError::compile(name, e.emit_to_string(source)))?;
    Ok(module)
}

/// Compiled modules by name.
#[derive(Default)]
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `source` and create its module under `name`, replacing any
    /// module already loaded under that name.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let module = validate_wgsl(name, source)?;
        log::debug!(
            "Shader '{name}': {} entry points, {} globals",
            module.entry_points.len(),
            module.global_variables.len()
        );

        let compiled = Arc::new(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        }));
        if self.modules.insert(name.to_owned(), Arc::clone(&compiled)).is_some() {
            log::info!("Reloaded shader '{name}'");
        } else {
            log::info!("Compiled shader '{name}'");
        }
        Ok(compiled)
    }

    pub fn get(&self, name: &str) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| ShaderError::NotLoaded {
                name: name.to_owned(),
            })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    const FLAT_RED: &str = r#"
        @vertex
        fn vs_main(@builtin(vertex_index) i: u32) -> @builtin(position) vec4<f32> {
            return vec4<f32>(f32(i), 0.0, 0.0, 1.0);
        }

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 0.0, 0.0, 1.0);
        }
    "#;

    const UNKNOWN_NAME: &str = r#"
        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return sun_glow;
        }
    "#;

    const WRONG_TYPE: &str = r#"
        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            let x: f32 = 1u;
            return vec4<f32>(x);
        }
    "#;

    #[test]
    fn test_valid_source_exposes_entry_points() {
        let module = validate_wgsl("flat", FLAT_RED).unwrap();
        let names: Vec<_> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["vs_main", "fs_main"]);
    }

    #[test]
    fn test_diagnostic_names_the_bad_identifier() {
        match validate_wgsl("glow", UNKNOWN_NAME) {
            Err(ShaderError::CompilationFailed { name, message }) => {
                assert_eq!(name, "glow");
                assert!(message.contains("sun_glow"), "{message}");
            }
            other => panic!("expected a compile failure, got {other:?}"),
        }
    }

    #[test]
    fn test_type_errors_fail_validation() {
        assert!(matches!(
            validate_wgsl("typed", WRONG_TYPE),
            Err(ShaderError::CompilationFailed { .. })
        ));
    }

    #[test]
    fn test_missing_module_is_an_error() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert!(matches!(library.get("scene"), Err(ShaderError::NotLoaded { .. })));
    }

    #[test]
    fn test_library_rejects_then_accepts() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        assert!(library.load_from_source(&device, "glow", UNKNOWN_NAME).is_err());
        assert!(library.is_empty());

        let loaded = library.load_from_source(&device, "flat", FLAT_RED).unwrap();
        assert!(Arc::ptr_eq(&loaded, &library.get("flat").unwrap()));
        assert_eq!(library.len(), 1);
    }
}
