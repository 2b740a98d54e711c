//! Galaxy parameters: the committed snapshot and its validated form

use crate::constants::*;
use crate::{GalaxyError, GalaxyResult, Rgb};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Where the per-particle jitter offset is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterMode {
    /// Jitter and spin are baked into positions on the CPU.
    #[default]
    Baked,
    /// Positions stay on the branch rays; the vertex stage adds
    /// `jitter * randomness` and scales points by a per-particle factor.
    Gpu,
}

impl JitterMode {
    pub fn is_gpu(self) -> bool {
        self == JitterMode::Gpu
    }
}

/// Parameter snapshot as committed by the UI or read from a config file.
///
/// Nothing here is trusted: `validate` turns it into [`GalaxyParams`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterSet {
    pub count: i64,
    pub size: f32,
    pub radius: f32,
    pub branches: i64,
    /// Radians of twist per unit of radius
    pub spin: f32,
    pub randomness: f32,
    pub randomness_power: f32,
    pub inside_color: String,
    pub outside_color: String,
    pub jitter_mode: JitterMode,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            size: DEFAULT_SIZE,
            radius: DEFAULT_RADIUS,
            branches: DEFAULT_BRANCHES,
            spin: DEFAULT_SPIN,
            randomness: DEFAULT_RANDOMNESS,
            randomness_power: DEFAULT_RANDOMNESS_POWER,
            inside_color: DEFAULT_INSIDE_COLOR.to_string(),
            outside_color: DEFAULT_OUTSIDE_COLOR.to_string(),
            jitter_mode: JitterMode::Baked,
        }
    }
}

impl ParameterSet {
    /// Defaults of the GPU-animated variant (no spin, jitter on the GPU).
    pub fn animated() -> Self {
        Self {
            count: ANIMATED_COUNT,
            radius: ANIMATED_RADIUS,
            spin: 0.0,
            jitter_mode: JitterMode::Gpu,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> GalaxyResult<GalaxyParams> {
        if self.count < 1 {
            return Err(GalaxyError::invalid(
                "count",
                format!("must be at least 1, got {}", self.count),
            ));
        }
        let count = usize::try_from(self.count).map_err(|_| GalaxyError::AllocationFailure {
            count: usize::MAX,
            reason: format!("{} does not fit the address space", self.count),
        })?;

        let branches = u32::try_from(self.branches)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| {
                GalaxyError::invalid(
                    "branches",
                    format!("must be between 1 and {}, got {}", u32::MAX, self.branches),
                )
            })?;

        positive("size", self.size)?;
        positive("radius", self.radius)?;
        finite("spin", self.spin)?;
        finite("randomness", self.randomness)?;
        if self.randomness < 0.0 {
            return Err(GalaxyError::invalid(
                "randomness",
                format!("must not be negative, got {}", self.randomness),
            ));
        }
        finite("randomnessPower", self.randomness_power)?;
        if self.randomness_power < 1.0 {
            return Err(GalaxyError::invalid(
                "randomnessPower",
                format!("must be at least 1, got {}", self.randomness_power),
            ));
        }

        Ok(GalaxyParams {
            count,
            size: self.size,
            radius: self.radius,
            branches,
            spin: self.spin,
            randomness: self.randomness,
            randomness_power: self.randomness_power,
            inside_color: self.inside_color.parse()?,
            outside_color: self.outside_color.parse()?,
            jitter_mode: self.jitter_mode,
        })
    }
}

fn finite(field: &'static str, value: f32) -> GalaxyResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GalaxyError::invalid(field, format!("must be finite, got {value}")))
    }
}

fn positive(field: &'static str, value: f32) -> GalaxyResult<()> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(GalaxyError::invalid(field, format!("must be positive, got {value}")))
    }
}

/// Validated parameters. Generation only runs on this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GalaxyParams {
    pub count: usize,
    pub size: f32,
    pub radius: f32,
    pub branches: NonZeroU32,
    pub spin: f32,
    pub randomness: f32,
    pub randomness_power: f32,
    pub inside_color: Rgb,
    pub outside_color: Rgb,
    pub jitter_mode: JitterMode,
}

impl GalaxyParams {
    /// Spin as applied to positions: the GPU variant keeps particles on straight rays.
    pub fn effective_spin(&self) -> f32 {
        match self.jitter_mode {
            JitterMode::Baked => self.spin,
            JitterMode::Gpu => 0.0,
        }
    }

    /// Angular speed of the whole model about Y, in radians per second
    pub fn rotation_speed(&self) -> f32 {
        self.effective_spin() * ROTATION_RATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let params = ParameterSet::default().validate().unwrap();
        assert_eq!(params.count, 100_000);
        assert_eq!(params.branches.get(), 5);
        assert_eq!(params.randomness, 0.2);
        assert_eq!(params.inside_color, Rgb::from_u8(0xff, 0x60, 0x30));
        assert_eq!(params.jitter_mode, JitterMode::Baked);

        let animated = ParameterSet::animated().validate().unwrap();
        assert_eq!(animated.count, 300_000);
        assert_eq!(animated.spin, 0.0);
        assert!(animated.jitter_mode.is_gpu());
    }

    #[test]
    fn test_rejects_non_positive_count() {
        for count in [0, -5] {
            let set = ParameterSet {
                count,
                ..Default::default()
            };
            assert!(matches!(
                set.validate(),
                Err(GalaxyError::InvalidParameter { field: "count", .. })
            ));
        }
    }

    #[test]
    fn test_rejects_zero_branches() {
        let set = ParameterSet {
            branches: 0,
            ..Default::default()
        };
        assert!(matches!(
            set.validate(),
            Err(GalaxyError::InvalidParameter { field: "branches", .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_floats() {
        let cases = [
            ParameterSet {
                size: 0.0,
                ..Default::default()
            },
            ParameterSet {
                radius: -1.0,
                ..Default::default()
            },
            ParameterSet {
                spin: f32::NAN,
                ..Default::default()
            },
            ParameterSet {
                randomness: -0.1,
                ..Default::default()
            },
            ParameterSet {
                randomness_power: 0.5,
                ..Default::default()
            },
            ParameterSet {
                radius: f32::INFINITY,
                ..Default::default()
            },
        ];
        for set in cases {
            let err = set.validate().unwrap_err();
            assert!(err.is_rejection(), "{set:?} gave {err}");
        }
    }

    #[test]
    fn test_rejects_bad_color() {
        let set = ParameterSet {
            outside_color: "#zz0000".into(),
            ..Default::default()
        };
        assert_eq!(
            set.validate(),
            Err(GalaxyError::InvalidColor("#zz0000".into()))
        );
    }

    #[test]
    fn test_gpu_mode_ignores_spin() {
        let params = ParameterSet {
            spin: 2.0,
            jitter_mode: JitterMode::Gpu,
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(params.effective_spin(), 0.0);
        assert_eq!(params.rotation_speed(), 0.0);

        let baked = ParameterSet {
            spin: 2.0,
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert!((baked.rotation_speed() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_json_camel_case_names_and_defaults() {
        let set: ParameterSet = serde_json::from_str(
            r##"{
                "count": 2000,
                "randomnessPower": 4,
                "insideColor": "#ffffff",
                "jitterMode": "gpu"
            }"##,
        )
        .unwrap();
        assert_eq!(set.count, 2000);
        assert_eq!(set.randomness_power, 4.0);
        assert_eq!(set.inside_color, "#ffffff");
        assert_eq!(set.jitter_mode, JitterMode::Gpu);
        assert_eq!(set.radius, DEFAULT_RADIUS);
    }
}
