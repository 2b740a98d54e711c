//! GPU-side galaxy: attribute buffers plus its material uniforms

use crate::GalaxyUniform;
use galaxy_generator::JitterMode;
use galaxy_scene::{GalaxyResource, VisualId};

/// Vertex buffers and uniform bind group of one generated galaxy.
///
/// Attributes advance per instance; every instance is one particle quad.
pub struct GpuGalaxy {
    pub(crate) id: VisualId,
    pub(crate) count: u32,
    pub(crate) mode: JitterMode,
    pub(crate) position_buffer: wgpu::Buffer,
    pub(crate) color_buffer: wgpu::Buffer,
    /// `Some` in GPU-animated mode only
    pub(crate) scale_buffer: Option<wgpu::Buffer>,
    /// `Some` in GPU-animated mode only
    pub(crate) jitter_buffer: Option<wgpu::Buffer>,
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
}

impl GpuGalaxy {
    pub fn instance_count(&self) -> u32 {
        self.count
    }

    pub(crate) fn write_uniform(&self, queue: &wgpu::Queue, uniform: &GalaxyUniform) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    pub(crate) fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.color_buffer.slice(..));
        if let (Some(scales), Some(jitter)) = (&self.scale_buffer, &self.jitter_buffer) {
            render_pass.set_vertex_buffer(2, scales.slice(..));
            render_pass.set_vertex_buffer(3, jitter.slice(..));
        }
    }

    /// Free the GPU memory now instead of waiting for the last reference to drop.
    pub(crate) fn destroy(self) {
        self.position_buffer.destroy();
        self.color_buffer.destroy();
        if let Some(buffer) = &self.scale_buffer {
            buffer.destroy();
        }
        if let Some(buffer) = &self.jitter_buffer {
            buffer.destroy();
        }
        self.uniform_buffer.destroy();
    }
}

impl GalaxyResource for GpuGalaxy {
    fn id(&self) -> VisualId {
        self.id
    }

    fn particle_count(&self) -> usize {
        self.count as usize
    }

    fn mode(&self) -> JitterMode {
        self.mode
    }
}

/// Per-instance vertex layouts, one buffer per attribute channel
pub(crate) mod layout {
    pub const POSITION: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    pub const COLOR: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
    pub const SCALE: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32];
    pub const JITTER: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![3 => Float32x3];

    pub fn instance(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
        let stride: u64 = attributes.iter().map(|a| a.format.size()).sum();
        wgpu::VertexBufferLayout {
            array_stride: stride,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes,
        }
    }
}
