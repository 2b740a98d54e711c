//! In-memory resource factory for lifecycle tests

use crate::{GalaxyResource, ResourceFactory, VisualId};
use galaxy_generator::{GalaxyBuffers, GalaxyError, GalaxyParams, GalaxyResult, JitterMode};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Created(VisualId),
    Disposed(VisualId),
}

#[derive(Debug)]
pub struct MockResource {
    id: VisualId,
    /// Unique per `create` call, even when ids repeat
    token: u64,
    count: usize,
    mode: JitterMode,
    pub position_len: usize,
}

impl GalaxyResource for MockResource {
    fn id(&self) -> VisualId {
        self.id
    }

    fn particle_count(&self) -> usize {
        self.count
    }

    fn mode(&self) -> JitterMode {
        self.mode
    }
}

#[derive(Default)]
pub struct MockFactory {
    next_id: u64,
    next_token: u64,
    /// Undisposed resources by creation token
    live: HashMap<u64, VisualId>,
    pub events: Vec<LifecycleEvent>,
    /// Error returned by the next `create` call
    pub fail_next: Option<GalaxyError>,
    /// Hand out this id on the next `create` instead of a fresh one
    pub reuse_id: Option<VisualId>,
}

impl MockFactory {
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, id: VisualId) -> bool {
        self.live.values().any(|&live| live == id)
    }

    pub fn disposed(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, LifecycleEvent::Disposed(_)))
            .count()
    }
}

impl ResourceFactory for MockFactory {
    type Resource = MockResource;

    fn create(
        &mut self,
        buffers: &GalaxyBuffers,
        params: &GalaxyParams,
    ) -> GalaxyResult<Self::Resource> {
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        let id = self.reuse_id.take().unwrap_or_else(|| {
            self.next_id += 1;
            VisualId(self.next_id)
        });
        self.next_token += 1;
        let token = self.next_token;
        self.live.insert(token, id);
        self.events.push(LifecycleEvent::Created(id));
        Ok(MockResource {
            id,
            token,
            count: buffers.count(),
            mode: params.jitter_mode,
            position_len: buffers.positions.len(),
        })
    }

    fn dispose(&mut self, resource: Self::Resource) {
        assert!(
            self.live.remove(&resource.token).is_some(),
            "double dispose of {}",
            resource.id
        );
        self.events.push(LifecycleEvent::Disposed(resource.id));
    }
}
