//! Error types for galaxy generation

use thiserror::Error;

/// Result type for generation and regeneration
pub type GalaxyResult<T> = Result<T, GalaxyError>;

/// Errors that can occur while generating or uploading a galaxy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GalaxyError {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("invalid color `{0}`: expected #rgb or #rrggbb")]
    InvalidColor(String),

    #[error("cannot allocate buffers for {count} particles: {reason}")]
    AllocationFailure { count: usize, reason: String },

    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("visual {0} is already in the scene")]
    DuplicateVisual(u64),
}

impl GalaxyError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        GalaxyError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// True when a commit was refused and the previous galaxy stays displayed.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GalaxyError::InvalidParameter { .. }
                | GalaxyError::InvalidColor(_)
                | GalaxyError::AllocationFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections() {
        assert!(GalaxyError::invalid("count", "must be positive").is_rejection());
        assert!(GalaxyError::InvalidColor("blue-ish".into()).is_rejection());
        assert!(!GalaxyError::ShaderCompile("boom".into()).is_rejection());
        assert!(!GalaxyError::DuplicateVisual(3).is_rejection());
    }

    #[test]
    fn test_display_names_field() {
        let err = GalaxyError::invalid("branches", "must be at least 1, got 0");
        assert_eq!(
            err.to_string(),
            "invalid parameter `branches`: must be at least 1, got 0"
        );
    }
}
