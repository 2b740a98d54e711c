//! Constants shared by the generator, the scene and the renderer

/// Largest particle count a single regeneration may request (2^24).
///
/// At 12 bytes per three-wide channel this keeps every attribute buffer
/// under 256 MiB, the default `max_buffer_size` of most WebGPU adapters.
pub const MAX_PARTICLES: usize = 1 << 24;

/// Floats per position, color and jitter element
pub const VEC3_COMPONENTS: usize = 3;

/// Point size multiplier of the GPU-animated variant, in device pixels
pub const ANIMATED_POINT_SIZE: f32 = 30.0;

/// Model rotation about Y, in radians per second per unit of spin
pub const ROTATION_RATE: f32 = 0.05;

/// Upper bound for the device pixel ratio fed into point sizes
pub const MAX_PIXEL_RATIO: f32 = 2.0;

// Parameter defaults (baked variant)
pub const DEFAULT_COUNT: i64 = 100_000;
pub const DEFAULT_SIZE: f32 = 0.01;
pub const DEFAULT_RADIUS: f32 = 5.0;
pub const DEFAULT_BRANCHES: i64 = 5;
pub const DEFAULT_SPIN: f32 = 1.0;
/// Baked jitter is multiplied by this, so it sets the arm thickness
/// directly. An unscaled offset of up to 1 corresponds to 1.0 here.
pub const DEFAULT_RANDOMNESS: f32 = 0.2;
pub const DEFAULT_RANDOMNESS_POWER: f32 = 3.0;
pub const DEFAULT_INSIDE_COLOR: &str = "#ff6030";
pub const DEFAULT_OUTSIDE_COLOR: &str = "#1b3984";

// Parameter defaults that differ for the GPU-animated variant
pub const ANIMATED_COUNT: i64 = 300_000;
pub const ANIMATED_RADIUS: f32 = 7.0;
