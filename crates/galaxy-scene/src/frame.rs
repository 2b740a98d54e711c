//! Per-frame render state

use crate::VisualId;
use galaxy_generator::{GalaxyParams, JitterMode, ANIMATED_POINT_SIZE, MAX_PIXEL_RATIO};
use glam::Mat4;

/// Everything a frame needs besides the scene itself
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Seconds since start
    pub time: f32,
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
    pub view_proj: Mat4,
    pub size: f32,
    pub randomness: f32,
    pub rotation_speed: f32,
    pub mode: JitterMode,
    pub active: Option<VisualId>,
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            time: 0.0,
            width: 1,
            height: 1,
            pixel_ratio: 1.0,
            view_proj: Mat4::IDENTITY,
            size: 0.0,
            randomness: 0.0,
            rotation_speed: 0.0,
            mode: JitterMode::Baked,
            active: None,
        }
    }
}

impl FrameState {
    pub(crate) fn apply_params(&mut self, params: &GalaxyParams, active: VisualId) {
        self.size = params.size;
        self.randomness = params.randomness;
        self.rotation_speed = params.rotation_speed();
        self.mode = params.jitter_mode;
        self.active = Some(active);
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.pixel_ratio = pixel_ratio.clamp(f32::EPSILON, MAX_PIXEL_RATIO);
    }

    /// Point size uniform: world-space size for baked galaxies,
    /// device pixels for animated ones.
    pub fn point_size(&self) -> f32 {
        match self.mode {
            JitterMode::Baked => self.size,
            JitterMode::Gpu => ANIMATED_POINT_SIZE * self.pixel_ratio,
        }
    }

    /// Pixels per world unit at distance 1 (half the viewport height)
    pub fn attenuation(&self) -> f32 {
        self.height as f32 * 0.5
    }

    /// Model rotation about Y at the current time
    pub fn rotation(&self) -> f32 {
        self.time * self.rotation_speed
    }

    pub fn resolution(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}
