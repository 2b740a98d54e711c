//! # Galaxy Scene
//!
//! Owns the active galaxy resource and drives regeneration and per-frame state.

pub mod controller;
pub mod frame;
pub mod resource;

#[cfg(test)]
mod testing;

pub use controller::*;
pub use frame::*;
pub use resource::*;
