//! Galaxy shader program: source, validation and compilation

use galaxy_generator::{GalaxyError, GalaxyResult};
use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

/// WGSL for both vertex variants and the shared fragment stage
pub const GALAXY_SHADER: &str = include_str!("shaders/galaxy.wgsl");

pub const VS_BAKED: &str = "vs_baked";
pub const VS_ANIMATED: &str = "vs_animated";
pub const FS_MAIN: &str = "fs_main";

/// Parse and validate WGSL with naga, so errors carry source locations
/// instead of surfacing as a device validation panic.
pub fn validate_wgsl(source: &str) -> GalaxyResult<naga::Module> {
    let module = wgsl::parse_str(source)
        .map_err(|err| GalaxyError::ShaderCompile(err.emit_to_string(source)))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|err| GalaxyError::ShaderCompile(format!("{err}")))?;

    Ok(module)
}

/// Validate `source`, then build a shader module on `device`.
pub fn compile_shader(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> GalaxyResult<wgpu::ShaderModule> {
    validate_wgsl(source)?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(GalaxyError::ShaderCompile(err.to_string()));
    }

    log::debug!("Compiled shader module '{}'", label);
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_galaxy_shader_validates() {
        let module = validate_wgsl(GALAXY_SHADER).unwrap();
        let names: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        for entry in [VS_BAKED, VS_ANIMATED, FS_MAIN] {
            assert!(names.contains(&entry), "missing entry point {entry}");
        }
    }

    #[test]
    fn test_broken_shader_is_compile_error() {
        let err = validate_wgsl("@vertex fn main() -> @builtin(position) vec4<f32> { return 1; }")
            .unwrap_err();
        assert!(matches!(err, GalaxyError::ShaderCompile(_)));
        assert!(!err.is_rejection());
    }
}
