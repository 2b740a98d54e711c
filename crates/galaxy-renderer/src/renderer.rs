//! Galaxy rendering system

use crate::galaxy::layout;
use crate::shader::{compile_shader, FS_MAIN, GALAXY_SHADER, VS_ANIMATED, VS_BAKED};
use crate::{GalaxyUniform, GpuGalaxy};
use bytemuck::Zeroable;
use galaxy_generator::{GalaxyBuffers, GalaxyError, GalaxyParams, GalaxyResult, JitterMode};
use galaxy_scene::{FrameState, GalaxyResource, ResourceFactory, Scene, VisualId};
use wgpu::util::DeviceExt;

/// Overlapping particles add up instead of occluding each other
const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

fn color_target(format: wgpu::TextureFormat) -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format,
        blend: Some(ADDITIVE_BLENDING),
        write_mask: wgpu::ColorWrites::ALL,
    }
}

/// No depth attachment: particles never occlude each other
fn depth_state() -> Option<wgpu::DepthStencilState> {
    None
}

/// Owns the galaxy pipelines and creates [`GpuGalaxy`] resources
pub struct GalaxyRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    baked_pipeline: wgpu::RenderPipeline,
    animated_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    next_id: u64,
}

impl GalaxyRenderer {
    /// Compile the shader program and build both pipelines.
    ///
    /// A shader that fails to build is a fatal [`GalaxyError::ShaderCompile`].
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        format: wgpu::TextureFormat,
    ) -> GalaxyResult<Self> {
        let shader = compile_shader(&device, "Galaxy Shader", GALAXY_SHADER)?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Galaxy Bind Group Layout"),
            entries: &[
                // Galaxy (Uniform) - Binding 0
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Galaxy Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let baked_buffers = [
            layout::instance(&layout::POSITION),
            layout::instance(&layout::COLOR),
        ];
        let animated_buffers = [
            layout::instance(&layout::POSITION),
            layout::instance(&layout::COLOR),
            layout::instance(&layout::SCALE),
            layout::instance(&layout::JITTER),
        ];

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let baked_pipeline = Self::create_pipeline(
            &device,
            "Galaxy Baked Pipeline",
            &pipeline_layout,
            &shader,
            VS_BAKED,
            &baked_buffers,
            format,
        );
        let animated_pipeline = Self::create_pipeline(
            &device,
            "Galaxy Animated Pipeline",
            &pipeline_layout,
            &shader,
            VS_ANIMATED,
            &animated_buffers,
            format,
        );
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(GalaxyError::ShaderCompile(err.to_string()));
        }

        log::info!("✓ Galaxy pipelines ready ({:?})", format);

        Ok(Self {
            device,
            queue,
            baked_pipeline,
            animated_pipeline,
            bind_group_layout,
            next_id: 0,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        label: &str,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        vertex_entry: &str,
        buffers: &[wgpu::VertexBufferLayout<'_>],
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(vertex_entry),
                buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(FS_MAIN),
                targets: &[Some(color_target(format))],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: depth_state(),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn pipeline(&self, mode: JitterMode) -> &wgpu::RenderPipeline {
        match mode {
            JitterMode::Baked => &self.baked_pipeline,
            JitterMode::Gpu => &self.animated_pipeline,
        }
    }

    fn vertex_buffer(&self, label: &str, contents: &[f32]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(contents),
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    /// Draw every visual in `scene` into `view`, clearing it first.
    pub fn render_frame(
        &self,
        frame: &FrameState,
        scene: &Scene<GpuGalaxy>,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) {
        let uniform = GalaxyUniform::from_frame(frame);
        for galaxy in scene.iter() {
            galaxy.write_uniform(&self.queue, &uniform);
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Galaxy Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for galaxy in scene.iter() {
            render_pass.set_pipeline(self.pipeline(galaxy.mode()));
            galaxy.bind(&mut render_pass);
            render_pass.draw(0..6, 0..galaxy.instance_count());
        }
    }
}

impl ResourceFactory for GalaxyRenderer {
    type Resource = GpuGalaxy;

    fn create(
        &mut self,
        buffers: &GalaxyBuffers,
        params: &GalaxyParams,
    ) -> GalaxyResult<GpuGalaxy> {
        let count = buffers.count();
        let max_buffer_size = self.device.limits().max_buffer_size;
        if buffers.vec3_channel_bytes() > max_buffer_size {
            return Err(GalaxyError::AllocationFailure {
                count,
                reason: format!(
                    "{} bytes per channel exceeds the device limit of {} bytes",
                    buffers.vec3_channel_bytes(),
                    max_buffer_size
                ),
            });
        }
        let instances = u32::try_from(count).map_err(|_| GalaxyError::AllocationFailure {
            count,
            reason: "instance count does not fit in u32".to_string(),
        })?;

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let position_buffer = self.vertex_buffer("Galaxy Position Buffer", &buffers.positions);
        let color_buffer = self.vertex_buffer("Galaxy Color Buffer", &buffers.colors);
        let scale_buffer = buffers
            .scales
            .as_deref()
            .map(|scales| self.vertex_buffer("Galaxy Scale Buffer", scales));
        let jitter_buffer = buffers
            .jitter
            .as_deref()
            .map(|jitter| self.vertex_buffer("Galaxy Jitter Buffer", jitter));

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Galaxy Uniform Buffer"),
                contents: bytemuck::cast_slice(&[GalaxyUniform::zeroed()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Galaxy Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        self.next_id += 1;
        let galaxy = GpuGalaxy {
            id: VisualId(self.next_id),
            count: instances,
            mode: buffers.mode,
            position_buffer,
            color_buffer,
            scale_buffer,
            jitter_buffer,
            uniform_buffer,
            bind_group,
        };

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            galaxy.destroy();
            return Err(GalaxyError::AllocationFailure {
                count,
                reason: err.to_string(),
            });
        }

        log::debug!(
            "Uploaded galaxy {} ({} instances, {} branches, {:?})",
            galaxy.id,
            instances,
            params.branches,
            galaxy.mode
        );
        Ok(galaxy)
    }

    fn dispose(&mut self, resource: GpuGalaxy) {
        log::debug!("Destroying galaxy {} buffers", resource.id);
        resource.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_target_blends_additively() {
        let target = color_target(wgpu::TextureFormat::Bgra8Unorm);
        let additive = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        };
        assert_eq!(
            target.blend,
            Some(wgpu::BlendState {
                color: additive,
                alpha: additive,
            })
        );
        assert_eq!(target.format, wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(target.write_mask, wgpu::ColorWrites::ALL);
    }

    #[test]
    fn test_pipelines_have_no_depth_attachment() {
        assert!(depth_state().is_none());
    }
}
