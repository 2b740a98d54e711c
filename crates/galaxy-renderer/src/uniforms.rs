//! Uniform block shared by both vertex stages and the fragment stage

use bytemuck::{Pod, Zeroable};
use galaxy_scene::FrameState;

/// Matches `struct Galaxy` in `galaxy.wgsl` (96 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GalaxyUniform {
    pub view_proj: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub size: f32,
    pub randomness: f32,
    pub rotation_speed: f32,
    pub attenuation: f32,
    pub _padding: f32,
}

impl GalaxyUniform {
    pub fn from_frame(frame: &FrameState) -> Self {
        Self {
            view_proj: frame.view_proj.to_cols_array_2d(),
            resolution: frame.resolution(),
            time: frame.time,
            size: frame.point_size(),
            randomness: frame.randomness,
            rotation_speed: frame.rotation_speed,
            attenuation: frame.attenuation(),
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_generator::JitterMode;

    #[test]
    fn test_size_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<GalaxyUniform>(), 96);
        assert_eq!(std::mem::size_of::<GalaxyUniform>() % 16, 0);
    }

    #[test]
    fn test_from_frame() {
        let frame = FrameState {
            time: 3.0,
            width: 800,
            height: 600,
            pixel_ratio: 2.0,
            randomness: 0.2,
            rotation_speed: 0.05,
            mode: JitterMode::Gpu,
            ..Default::default()
        };
        let uniform = GalaxyUniform::from_frame(&frame);
        assert_eq!(uniform.resolution, [800.0, 600.0]);
        assert_eq!(uniform.time, 3.0);
        assert_eq!(uniform.size, 60.0);
        assert_eq!(uniform.attenuation, 300.0);
        assert_eq!(uniform.view_proj, glam::Mat4::IDENTITY.to_cols_array_2d());
    }
}
