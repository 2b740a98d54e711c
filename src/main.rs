//! Procedural Galaxy Generator
//!
//! Generates a spiral galaxy point cloud from a handful of parameters and
//! regenerates it whenever an edit is committed in the side panel.

mod config;
mod error;
mod gui;

use clap::Parser;
use config::Args;
use error::AppError;
use galaxy_generator::ParameterSet;
use galaxy_renderer::{Camera, GalaxyRenderer};
use galaxy_scene::GalaxyController;
use gui::{Gui, UiState};
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const ROTATE_SPEED: f32 = 0.005;
const ZOOM_SPEED: f32 = 0.5;

/// Surface configuration for the first supported format and alpha mode.
///
/// Colors are authored and blended in linear space, so a non-sRGB format
/// that stores them as-is is preferred.
fn surface_config(
    caps: &wgpu::SurfaceCapabilities,
    width: u32,
    height: u32,
) -> Result<wgpu::SurfaceConfiguration, AppError> {
    let format = caps
        .formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| caps.formats.first())
        .copied()
        .ok_or(AppError::SurfaceUnsupported("texture format"))?;
    let alpha_mode = caps
        .alpha_modes
        .first()
        .copied()
        .ok_or(AppError::SurfaceUnsupported("alpha mode"))?;

    Ok(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    })
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    controller: GalaxyController<GalaxyRenderer, StdRng>,
    camera: Camera,

    gui: Gui,
    ui_state: UiState,

    start_time: Instant,
    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(
        window: Arc<Window>,
        params: ParameterSet,
        rng: StdRng,
    ) -> Result<Self, AppError> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance.create_surface(window.clone())?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        // Create device and queue
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let config = surface_config(&surface_caps, size.width, size.height)?;
        surface.configure(&device, &config);

        // Shader failures are fatal here: there is no previous program to fall back to
        let renderer = GalaxyRenderer::new(device.clone(), queue.clone(), config.format)?;
        log::info!("✓ Renderer initialized");

        let mut controller = GalaxyController::new(renderer, rng);
        controller.on_resize(config.width, config.height, window.scale_factor() as f32);
        controller.on_parameters_committed(&params)?;

        let camera = Camera::new(config.width, config.height);

        let gui = Gui::new(&device, config.format, &window);
        let mut ui_state = UiState::new(params);
        ui_state.particle_count = controller.params().map(|p| p.count).unwrap_or_default();
        ui_state.generation = controller.generation();

        Ok(Self {
            surface,
            device,
            queue,
            config,
            controller,
            camera,
            gui,
            ui_state,
            start_time: Instant::now(),
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.camera.resize(new_size.width, new_size.height);
            self.controller
                .on_resize(new_size.width, new_size.height, scale_factor as f32);
        }
    }

    /// Apply the draft parameters if the panel committed an edit.
    ///
    /// Runs between frames, so the next frame sees either the new galaxy or,
    /// if the commit was rejected, the unchanged previous one.
    fn apply_commit(&mut self) {
        if !std::mem::take(&mut self.ui_state.commit_requested) {
            return;
        }
        match self.controller.on_parameters_committed(&self.ui_state.draft) {
            Ok(()) => {
                self.ui_state.last_error = None;
                self.ui_state.generation = self.controller.generation();
                self.ui_state.particle_count = self
                    .controller
                    .params()
                    .map(|p| p.count)
                    .unwrap_or_default();
            }
            Err(e) => self.ui_state.last_error = Some(e.to_string()),
        }
    }

    fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        // Track frame time
        let now = Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }
        let average = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        self.ui_state.frame_time = average;
        self.ui_state.fps = if average > 0.0 { 1000.0 / average } else { 0.0 };

        self.controller
            .set_view_projection(self.camera.build_view_projection_matrix());
        self.controller.tick(self.start_time.elapsed().as_secs_f32());

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.controller.factory().render_frame(
            self.controller.frame(),
            self.controller.scene(),
            &mut encoder,
            &view,
        );

        let gui_buffers = self.gui.render(
            &self.device,
            &self.queue,
            &mut encoder,
            window,
            &view,
            &mut self.ui_state,
        );

        self.queue
            .submit(gui_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        self.apply_commit();
        Ok(())
    }
}

#[derive(Default)]
struct App {
    args: Args,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    /// Error that stopped the event loop
    fatal: Option<AppError>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attributes = Window::default_attributes()
            .with_title("Galaxy Generator")
            .with_inner_size(winit::dpi::LogicalSize::new(1600, 900));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        self.window = Some(window.clone());

        let params = self.args.initial_parameters()?;
        let rng = self.args.rng();
        self.gpu_state = Some(pollster::block_on(GpuState::new(window, params, rng))?);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Handle GUI events
        if let (Some(gpu_state), Some(window)) = (&mut self.gpu_state, &self.window) {
            if gpu_state.gui.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.controller.clear();
                }
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let (Some(gpu_state), Some(window)) = (&mut self.gpu_state, &self.window) {
                    gpu_state.resize(physical_size, window.scale_factor());
                }
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let (Some(gpu_state), Some(window)) = (&mut self.gpu_state, &self.window) {
                    gpu_state.resize(window.inner_size(), scale_factor);
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let over_ui = self
                    .gpu_state
                    .as_ref()
                    .is_some_and(|s| s.gui.wants_pointer());
                self.mouse_pressed = state == ElementState::Pressed && !over_ui;
                if !self.mouse_pressed {
                    self.last_mouse_pos = None;
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let (Some(gpu_state), Some((last_x, last_y))) =
                        (&mut self.gpu_state, self.last_mouse_pos)
                    {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        gpu_state.camera.rotate(dx * ROTATE_SPEED, dy * ROTATE_SPEED);
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    let scroll = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                    };
                    gpu_state.camera.zoom(-scroll * ZOOM_SPEED);
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(gpu_state), Some(window)) = (&mut self.gpu_state, &self.window) {
                    match gpu_state.render(window) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(window.inner_size(), window.scale_factor());
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Surface out of memory");
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("Surface error: {:?}", e),
                    }
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        args,
        ..Default::default()
    };
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting galaxy generator...");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: Vec<wgpu::TextureFormat>) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            ..Default::default()
        }
    }

    #[test]
    fn test_surface_config_prefers_non_srgb() {
        let caps = caps(vec![
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
        ]);
        let config = surface_config(&caps, 0, 720).unwrap();
        assert_eq!(config.format, wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(config.alpha_mode, wgpu::CompositeAlphaMode::Opaque);
        assert_eq!((config.width, config.height), (1, 720));
    }

    #[test]
    fn test_surface_config_falls_back_to_srgb() {
        let caps = caps(vec![wgpu::TextureFormat::Rgba8UnormSrgb]);
        let config = surface_config(&caps, 800, 600).unwrap();
        assert_eq!(config.format, wgpu::TextureFormat::Rgba8UnormSrgb);
    }

    #[test]
    fn test_empty_capabilities_are_errors() {
        assert!(matches!(
            surface_config(&caps(vec![]), 800, 600),
            Err(AppError::SurfaceUnsupported("texture format"))
        ));

        let no_alpha = wgpu::SurfaceCapabilities {
            formats: vec![wgpu::TextureFormat::Bgra8Unorm],
            ..Default::default()
        };
        assert!(matches!(
            surface_config(&no_alpha, 800, 600),
            Err(AppError::SurfaceUnsupported("alpha mode"))
        ));
    }
}
