//! # Galaxy Generator
//!
//! CPU side of the procedural galaxy: parameter validation, per-particle
//! attribute sampling and flat attribute buffers ready for GPU upload.

pub mod buffers;
pub mod color;
pub mod constants;
pub mod error;
pub mod params;
pub mod sampler;

pub use buffers::*;
pub use color::*;
pub use constants::*;
pub use error::*;
pub use params::*;
pub use sampler::*;
