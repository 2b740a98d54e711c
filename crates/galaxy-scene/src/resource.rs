//! GPU resource lifecycle
//!
//! A galaxy resource is one geometry + material pair. The [`Scene`] holds the
//! resources that get drawn, and [`ResourceSlot`] swaps the active one for a
//! freshly built one in a fixed order:
//!
//! 1. create the new resource (a failure leaves everything untouched)
//! 2. remove the old visual from the scene
//! 3. dispose the old resource
//! 4. insert the new visual
//!
//! All four steps run between two frames on the thread that owns the scene.

use galaxy_generator::{GalaxyBuffers, GalaxyError, GalaxyParams, GalaxyResult, JitterMode};
use std::fmt;

/// Identifies one visual for as long as it lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualId(pub u64);

impl fmt::Display for VisualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A drawable galaxy: uploaded attribute buffers plus its material
pub trait GalaxyResource {
    fn id(&self) -> VisualId;
    fn particle_count(&self) -> usize;
    fn mode(&self) -> JitterMode;
}

/// Creates and frees galaxy resources on a graphics backend
pub trait ResourceFactory {
    type Resource: GalaxyResource;

    /// Upload `buffers`. Must not touch any existing resource.
    fn create(
        &mut self,
        buffers: &GalaxyBuffers,
        params: &GalaxyParams,
    ) -> GalaxyResult<Self::Resource>;

    /// Release all memory owned by `resource`.
    fn dispose(&mut self, resource: Self::Resource);
}

/// The visuals drawn each frame, in insertion order
pub struct Scene<R> {
    visuals: Vec<R>,
}

impl<R> Default for Scene<R> {
    fn default() -> Self {
        Self {
            visuals: Vec::new(),
        }
    }
}

impl<R: GalaxyResource> Scene<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a visual. A visual whose id is already present is handed back.
    pub fn insert(&mut self, visual: R) -> Result<(), R> {
        if self.contains(visual.id()) {
            return Err(visual);
        }
        self.visuals.push(visual);
        Ok(())
    }

    pub fn remove(&mut self, id: VisualId) -> Option<R> {
        let index = self.visuals.iter().position(|v| v.id() == id)?;
        Some(self.visuals.remove(index))
    }

    pub fn contains(&self, id: VisualId) -> bool {
        self.visuals.iter().any(|v| v.id() == id)
    }

    pub fn get(&self, id: VisualId) -> Option<&R> {
        self.visuals.iter().find(|v| v.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.visuals.iter()
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }
}

/// Holds the id of the one active galaxy visual
#[derive(Debug, Default)]
pub struct ResourceSlot {
    active: Option<VisualId>,
}

impl ResourceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<VisualId> {
        self.active
    }

    /// Build a resource from `buffers` and make it the only active visual.
    ///
    /// On error the scene and the previously active resource are unchanged.
    pub fn replace<F: ResourceFactory>(
        &mut self,
        scene: &mut Scene<F::Resource>,
        factory: &mut F,
        buffers: &GalaxyBuffers,
        params: &GalaxyParams,
    ) -> GalaxyResult<VisualId> {
        let fresh = factory.create(buffers, params)?;
        let id = fresh.id();
        if scene.contains(id) {
            factory.dispose(fresh);
            return Err(GalaxyError::DuplicateVisual(id.0));
        }

        if let Some(old_id) = self.active.take() {
            match scene.remove(old_id) {
                Some(old) => {
                    factory.dispose(old);
                    log::debug!("Disposed galaxy visual {}", old_id);
                }
                None => log::warn!("Active galaxy visual {} was missing from the scene", old_id),
            }
        }

        if let Err(fresh) = scene.insert(fresh) {
            factory.dispose(fresh);
            return Err(GalaxyError::DuplicateVisual(id.0));
        }
        self.active = Some(id);
        Ok(id)
    }

    /// Remove and dispose the active visual, if any.
    pub fn clear<F: ResourceFactory>(&mut self, scene: &mut Scene<F::Resource>, factory: &mut F) {
        if let Some(id) = self.active.take() {
            if let Some(old) = scene.remove(id) {
                factory.dispose(old);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LifecycleEvent, MockFactory};
    use galaxy_generator::{build, ParameterSet};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn buffers(count: i64) -> (GalaxyBuffers, GalaxyParams) {
        let params = ParameterSet {
            count,
            ..Default::default()
        }
        .validate()
        .unwrap();
        let buffers = build(&params, &mut StdRng::seed_from_u64(0)).unwrap();
        (buffers, params)
    }

    #[test]
    fn test_first_replace_only_creates() {
        let mut scene = Scene::new();
        let mut factory = MockFactory::default();
        let mut slot = ResourceSlot::new();
        let (b, p) = buffers(10);

        let id = slot.replace(&mut scene, &mut factory, &b, &p).unwrap();
        assert_eq!(slot.active(), Some(id));
        assert_eq!(scene.len(), 1);
        assert_eq!(factory.events, vec![LifecycleEvent::Created(id)]);
    }

    #[test]
    fn test_repeated_replace_keeps_one_visual() {
        let mut scene = Scene::new();
        let mut factory = MockFactory::default();
        let mut slot = ResourceSlot::new();

        for n in 1..=6 {
            let (b, p) = buffers(n * 10);
            let id = slot.replace(&mut scene, &mut factory, &b, &p).unwrap();
            assert_eq!(scene.len(), 1);
            assert!(scene.contains(id));
            assert_eq!(scene.get(id).unwrap().particle_count(), (n * 10) as usize);
            assert_eq!(factory.live_count(), 1);
        }
        assert_eq!(factory.disposed(), 5);
    }

    #[test]
    fn test_old_disposed_after_new_created() {
        let mut scene = Scene::new();
        let mut factory = MockFactory::default();
        let mut slot = ResourceSlot::new();
        let (b, p) = buffers(5);

        let first = slot.replace(&mut scene, &mut factory, &b, &p).unwrap();
        let second = slot.replace(&mut scene, &mut factory, &b, &p).unwrap();
        assert_eq!(
            factory.events,
            vec![
                LifecycleEvent::Created(first),
                LifecycleEvent::Created(second),
                LifecycleEvent::Disposed(first),
            ]
        );
        assert!(!scene.contains(first));
    }

    #[test]
    fn test_failed_create_keeps_previous() {
        let mut scene = Scene::new();
        let mut factory = MockFactory::default();
        let mut slot = ResourceSlot::new();
        let (b, p) = buffers(8);
        let first = slot.replace(&mut scene, &mut factory, &b, &p).unwrap();

        factory.fail_next = Some(GalaxyError::AllocationFailure {
            count: 8,
            reason: "device limit".into(),
        });
        let err = slot.replace(&mut scene, &mut factory, &b, &p).unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(slot.active(), Some(first));
        assert_eq!(scene.len(), 1);
        assert_eq!(factory.disposed(), 0);
    }

    #[test]
    fn test_duplicate_id_is_refused() {
        let mut scene = Scene::new();
        let mut factory = MockFactory::default();
        let mut slot = ResourceSlot::new();
        let (b, p) = buffers(3);
        let first = slot.replace(&mut scene, &mut factory, &b, &p).unwrap();

        factory.reuse_id = Some(first);
        let err = slot.replace(&mut scene, &mut factory, &b, &p).unwrap_err();
        assert_eq!(err, GalaxyError::DuplicateVisual(first.0));
        assert_eq!(slot.active(), Some(first));
        assert_eq!(scene.len(), 1);

        // Only the refused duplicate was disposed; the displayed one is still live
        assert_eq!(factory.disposed(), 1);
        assert_eq!(factory.live_count(), 1);
        assert!(factory.is_live(first));

        slot.clear(&mut scene, &mut factory);
        assert!(scene.is_empty());
        assert_eq!(factory.live_count(), 0);
        assert_eq!(factory.disposed(), 2);
    }

    #[test]
    fn test_clear_disposes_active() {
        let mut scene = Scene::new();
        let mut factory = MockFactory::default();
        let mut slot = ResourceSlot::new();
        let (b, p) = buffers(3);
        slot.replace(&mut scene, &mut factory, &b, &p).unwrap();

        slot.clear(&mut scene, &mut factory);
        assert!(scene.is_empty());
        assert!(slot.active().is_none());
        assert_eq!(factory.live_count(), 0);

        // Clearing an empty slot is a no-op
        slot.clear(&mut scene, &mut factory);
        assert_eq!(factory.disposed(), 1);
    }
}
