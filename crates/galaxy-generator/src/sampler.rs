//! Per-particle attribute sampling
//!
//! Every particle sits on one of `branches` rays from the origin, at a random
//! distance from the center, pushed off the ray by a jitter whose magnitude is
//! sharpened toward zero by `randomness_power`.

use crate::{GalaxyParams, JitterMode, Rgb};
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;
use std::num::NonZeroU32;

/// Random draws consumed by [`sample`] for each particle
pub const DRAWS_PER_PARTICLE: usize = 8;

/// Attributes of one particle, computed on demand and never stored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRecord {
    /// Distance from the galactic center, in [0, radius)
    pub radius: f32,
    pub branch_angle: f32,
    pub spin_angle: f32,
    /// Unscaled offset, each axis in (-1, 1)
    pub jitter: Vec3,
    /// Position uploaded to the GPU (jitter included only in baked mode)
    pub position: Vec3,
    pub color: Rgb,
    /// Point size factor in [0, 1), used by the GPU-animated mode
    pub scale: f32,
}

/// Sample particle `i`.
///
/// Draw order: radius, then magnitude and sign for x, y and z, then scale.
pub fn sample<R: Rng + ?Sized>(i: usize, params: &GalaxyParams, rng: &mut R) -> ParticleRecord {
    let radius = params.radius * rng.random::<f32>();

    let jx = jitter_axis(rng, params.randomness_power);
    let jy = jitter_axis(rng, params.randomness_power);
    let jz = jitter_axis(rng, params.randomness_power);
    let jitter = Vec3::new(jx, jy, jz);

    let scale = rng.random::<f32>();

    let branch_angle = branch_angle(i, params.branches);
    let spin_angle = radius * params.effective_spin();
    let angle = branch_angle + spin_angle;
    let on_arm = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);

    let position = match params.jitter_mode {
        JitterMode::Baked => on_arm + jitter * params.randomness,
        JitterMode::Gpu => on_arm,
    };

    ParticleRecord {
        radius,
        branch_angle,
        spin_angle,
        jitter,
        position,
        color: radial_color(
            params.inside_color,
            params.outside_color,
            radius / params.radius,
        ),
        scale,
    }
}

/// Angle of the arm that particle `i` belongs to
pub fn branch_angle(i: usize, branches: NonZeroU32) -> f32 {
    let branches = branches.get() as usize;
    (i % branches) as f32 / branches as f32 * TAU
}

/// Linear gradient from `inside` (center) to `outside` (rim).
pub fn radial_color(inside: Rgb, outside: Rgb, fraction: f32) -> Rgb {
    inside.lerp(outside, fraction.clamp(0.0, 1.0))
}

fn jitter_axis<R: Rng + ?Sized>(rng: &mut R, power: f32) -> f32 {
    let magnitude = rng.random::<f32>().powf(power);
    if rng.random_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}
