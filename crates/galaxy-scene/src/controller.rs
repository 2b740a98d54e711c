//! Galaxy regeneration and frame updates

use crate::{FrameState, ResourceFactory, ResourceSlot, Scene};
use galaxy_generator::{build, GalaxyParams, GalaxyResult, ParameterSet};
use glam::Mat4;
use rand::Rng;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// No galaxy has been generated yet
    Uninitialized,
    Ready,
}

/// Owns the active galaxy and regenerates it on every committed edit.
///
/// Regeneration is synchronous: validate, build buffers, swap the resource.
/// A failure at any step leaves the displayed galaxy and the current
/// parameters as they were.
pub struct GalaxyController<F: ResourceFactory, R: Rng> {
    factory: F,
    rng: R,
    scene: Scene<F::Resource>,
    slot: ResourceSlot,
    params: Option<GalaxyParams>,
    frame: FrameState,
    generation: u64,
}

impl<F: ResourceFactory, R: Rng> GalaxyController<F, R> {
    pub fn new(factory: F, rng: R) -> Self {
        Self {
            factory,
            rng,
            scene: Scene::new(),
            slot: ResourceSlot::new(),
            params: None,
            frame: FrameState::default(),
            generation: 0,
        }
    }

    pub fn state(&self) -> ControllerState {
        if self.slot.active().is_some() {
            ControllerState::Ready
        } else {
            ControllerState::Uninitialized
        }
    }

    /// Regenerate the galaxy from a committed parameter snapshot.
    pub fn on_parameters_committed(&mut self, set: &ParameterSet) -> GalaxyResult<()> {
        self.generate(set).inspect_err(|e| {
            log::warn!("Rejected galaxy parameters: {}", e);
        })
    }

    fn generate(&mut self, set: &ParameterSet) -> GalaxyResult<()> {
        let params = set.validate()?;
        let start = Instant::now();

        let buffers = build(&params, &mut self.rng)?;
        let id = self
            .slot
            .replace(&mut self.scene, &mut self.factory, &buffers, &params)?;

        self.params = Some(params);
        self.frame.apply_params(&params, id);
        self.generation += 1;

        log::info!(
            "✓ Generated galaxy {} ({} particles, {} branches, {:?}) in {:.1} ms",
            id,
            params.count,
            params.branches,
            params.jitter_mode,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }

    /// Advance the time uniform. Never rebuilds anything.
    pub fn tick(&mut self, elapsed_seconds: f32) -> &FrameState {
        self.frame.time = elapsed_seconds;
        &self.frame
    }

    pub fn on_resize(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        self.frame.resize(width, height, pixel_ratio);
    }

    pub fn set_view_projection(&mut self, view_proj: Mat4) {
        self.frame.view_proj = view_proj;
    }

    /// Dispose the active galaxy (for shutdown).
    pub fn clear(&mut self) {
        self.slot.clear(&mut self.scene, &mut self.factory);
        self.frame.active = None;
    }

    pub fn params(&self) -> Option<&GalaxyParams> {
        self.params.as_ref()
    }

    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    pub fn scene(&self) -> &Scene<F::Resource> {
        &self.scene
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    /// Number of successful regenerations so far
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
