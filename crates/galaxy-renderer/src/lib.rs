//! # Galaxy Renderer
//!
//! wgpu backend for the galaxy: shader program, GPU resources and the orbit camera.

pub mod camera;
pub mod galaxy;
pub mod renderer;
pub mod shader;
pub mod uniforms;

pub use camera::*;
pub use galaxy::*;
pub use renderer::*;
pub use shader::*;
pub use uniforms::*;
