//! Flat attribute buffers for a whole galaxy

use crate::constants::{MAX_PARTICLES, VEC3_COMPONENTS};
use crate::{sample, GalaxyError, GalaxyParams, GalaxyResult, JitterMode};
use rand::Rng;
use std::time::Instant;

/// Per-particle attribute channels, ready for upload.
///
/// Three-wide channels store particle `i` at `[3i, 3i + 3)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    /// Only present in [`JitterMode::Gpu`]
    pub scales: Option<Vec<f32>>,
    /// Only present in [`JitterMode::Gpu`]; unscaled offsets
    pub jitter: Option<Vec<f32>>,
    pub mode: JitterMode,
}

impl GalaxyBuffers {
    pub fn count(&self) -> usize {
        self.positions.len() / VEC3_COMPONENTS
    }

    /// Size in bytes of the largest channel (a three-wide one)
    pub fn vec3_channel_bytes(&self) -> u64 {
        std::mem::size_of_val(self.positions.as_slice()) as u64
    }
}

/// Sample every particle once and write its attributes in index order.
pub fn build<R: Rng + ?Sized>(params: &GalaxyParams, rng: &mut R) -> GalaxyResult<GalaxyBuffers> {
    let count = params.count;
    if count > MAX_PARTICLES {
        return Err(GalaxyError::AllocationFailure {
            count,
            reason: format!("exceeds the maximum of {MAX_PARTICLES} particles"),
        });
    }

    let start = Instant::now();
    let animated = params.jitter_mode.is_gpu();

    let mut positions = allocate(count, VEC3_COMPONENTS)?;
    let mut colors = allocate(count, VEC3_COMPONENTS)?;
    let mut scales = if animated {
        Some(allocate(count, 1)?)
    } else {
        None
    };
    let mut jitter = if animated {
        Some(allocate(count, VEC3_COMPONENTS)?)
    } else {
        None
    };

    for i in 0..count {
        let particle = sample(i, params, rng);
        positions.extend_from_slice(&particle.position.to_array());
        colors.extend_from_slice(&particle.color.to_array());
        if let Some(scales) = scales.as_mut() {
            scales.push(particle.scale);
        }
        if let Some(jitter) = jitter.as_mut() {
            jitter.extend_from_slice(&particle.jitter.to_array());
        }
    }

    log::debug!(
        "Built {} particle buffers ({:?}) in {:.2} ms",
        count,
        params.jitter_mode,
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(GalaxyBuffers {
        positions,
        colors,
        scales,
        jitter,
        mode: params.jitter_mode,
    })
}

fn allocate(count: usize, width: usize) -> GalaxyResult<Vec<f32>> {
    let len = count
        .checked_mul(width)
        .ok_or_else(|| GalaxyError::AllocationFailure {
            count,
            reason: "element count overflows usize".to_string(),
        })?;
    let mut channel = Vec::new();
    channel
        .try_reserve_exact(len)
        .map_err(|e| GalaxyError::AllocationFailure {
            count,
            reason: e.to_string(),
        })?;
    Ok(channel)
}
