use egui::{Context, Response};
use egui_wgpu::{Renderer, RendererOptions};
use egui_winit::State;
use galaxy_generator::{JitterMode, ParameterSet, Rgb};
use wgpu::{Device, TextureFormat};
use winit::{event::WindowEvent, window::Window};

pub struct UiState {
    pub fps: f32,
    pub frame_time: f32,
    pub particle_count: usize,
    pub generation: u64,
    /// Parameters being edited; only applied once committed
    pub draft: ParameterSet,
    /// Set when an edit finished and the draft should be regenerated
    pub commit_requested: bool,
    pub last_error: Option<String>,
}

impl UiState {
    pub fn new(draft: ParameterSet) -> Self {
        Self {
            fps: 0.0,
            frame_time: 0.0,
            particle_count: 0,
            generation: 0,
            draft,
            commit_requested: false,
            last_error: None,
        }
    }

    /// Mark the draft for regeneration when `response` ends an edit.
    ///
    /// Slider drags commit on release, clicks and typed values right away.
    fn commit_on_finish(&mut self, response: &Response) {
        if response.drag_stopped() || (response.changed() && !response.dragged()) {
            self.commit_requested = true;
        }
    }
}

pub struct Gui {
    context: Context,
    state: State,
    renderer: Renderer,
}

impl Gui {
    pub fn new(device: &Device, output_color_format: TextureFormat, window: &Window) -> Self {
        let context = Context::default();
        let id = context.viewport_id();

        let state = State::new(
            context.clone(),
            id,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );

        let renderer = Renderer::new(
            device,
            output_color_format,
            RendererOptions {
                msaa_samples: 1,
                depth_stencil_format: None,
                dithering: false,
                ..Default::default()
            },
        );

        Self {
            context,
            state,
            renderer,
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    pub fn wants_pointer(&self) -> bool {
        self.context.wants_pointer_input()
    }

    /// Draw the panels on top of `view`. Returns extra command buffers to submit.
    pub fn render(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        view: &wgpu::TextureView,
        ui_state: &mut UiState,
    ) -> Vec<wgpu::CommandBuffer> {
        let raw_input = self.state.take_egui_input(window);

        let full_output = self.context.run(raw_input, |ctx| {
            Self::ui(ctx, ui_state);
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = window.inner_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }

        let command_buffers = self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.renderer
                .render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        command_buffers
    }

    fn ui(ctx: &Context, state: &mut UiState) {
        // Diagnostics Panel (Top Left)
        egui::Window::new("Diagnostics")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.1}", state.fps));
                ui.label(format!("Frame Time: {:.2} ms", state.frame_time));
                ui.label(format!("Particles: {}", state.particle_count));
                ui.label(format!("Generation: {}", state.generation));
            });

        // Galaxy Controls (Top Right)
        egui::Window::new("Galaxy")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                let animated = state.draft.jitter_mode.is_gpu();

                ui.heading("Shape");
                let r = ui.add(
                    egui::Slider::new(&mut state.draft.count, 100..=1_000_000)
                        .step_by(100.0)
                        .text("Count"),
                );
                state.commit_on_finish(&r);
                if !animated {
                    let r = ui.add(
                        egui::Slider::new(&mut state.draft.size, 0.001..=0.1)
                            .step_by(0.001)
                            .text("Size"),
                    );
                    state.commit_on_finish(&r);
                }
                let r = ui.add(
                    egui::Slider::new(&mut state.draft.radius, 1.0..=20.0)
                        .step_by(0.1)
                        .text("Radius"),
                );
                state.commit_on_finish(&r);
                let r = ui.add(
                    egui::Slider::new(&mut state.draft.branches, 2..=20).text("Branches"),
                );
                state.commit_on_finish(&r);
                if !animated {
                    let r = ui.add(
                        egui::Slider::new(&mut state.draft.spin, -5.0..=5.0)
                            .step_by(0.001)
                            .text("Spin"),
                    );
                    state.commit_on_finish(&r);
                }

                ui.separator();
                ui.heading("Randomness");
                let r = ui.add(
                    egui::Slider::new(&mut state.draft.randomness, 0.0..=2.0)
                        .step_by(0.001)
                        .text("Randomness"),
                );
                state.commit_on_finish(&r);
                let r = ui.add(
                    egui::Slider::new(&mut state.draft.randomness_power, 1.0..=10.0)
                        .step_by(0.001)
                        .text("Power"),
                );
                state.commit_on_finish(&r);

                ui.separator();
                ui.heading("Colors");
                color_row(ui, state, "Inside", |p| &mut p.inside_color);
                color_row(ui, state, "Outside", |p| &mut p.outside_color);

                ui.separator();
                let mut gpu = animated;
                if ui.checkbox(&mut gpu, "Animate jitter on GPU").changed() {
                    state.draft.jitter_mode = if gpu {
                        JitterMode::Gpu
                    } else {
                        JitterMode::Baked
                    };
                    state.commit_requested = true;
                }
                if ui.button("Regenerate").clicked() {
                    state.commit_requested = true;
                }

                if let Some(error) = &state.last_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, error);
                }
            });
    }
}

/// Color picker bound to a hex string of the draft.
fn color_row(
    ui: &mut egui::Ui,
    state: &mut UiState,
    label: &str,
    field: impl Fn(&mut ParameterSet) -> &mut String,
) {
    let hex = field(&mut state.draft);
    let Ok(color) = hex.parse::<Rgb>() else {
        ui.label(format!("{label}: {hex} (invalid)"));
        return;
    };

    let byte = |c: f32| (c * 255.0).round() as u8;
    let mut srgb = [byte(color.r), byte(color.g), byte(color.b)];
    ui.horizontal(|ui| {
        ui.label(label);
        if ui.color_edit_button_srgb(&mut srgb).changed() {
            *field(&mut state.draft) = Rgb::from_u8(srgb[0], srgb[1], srgb[2]).to_hex();
            state.commit_requested = true;
        }
    });
}
