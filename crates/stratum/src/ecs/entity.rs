//! # Entities — Named Bags of Components
//!
//! An entity is a [`Handle`] into the world's entity store. Behind the handle
//! sits an [`EntityRecord`]: a display name, the layer the entity was created
//! in, its components keyed by [`ComponentKind`], and the list of systems it
//! structurally matched.
//!
//! Callers describe a new entity with a [`Components`] bundle:
//!
//! ```ignore
//! let hero = world.create_entity(
//!     "hero",
//!     Components::new()
//!         .with(Transform::from_xy(0.0, 0.0))
//!         .with(Sprite::new(texture, Vec2::splat(32.0))),
//! );
//! ```
//!
//! Tooling that only knows kinds at runtime (a scene loader, say) uses
//! [`Components::with_kind`] with a kind looked up by name.
//!
//! ## Deferred deletion
//!
//! Entities are never destroyed in the middle of a frame. `delete_entity`
//! pushes the handle onto a [`DeletionQueue`] (an ordered set) and the world
//! drains it after every system has run.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::component::{AnyComponent, ComponentKind, ComponentRegistry, ComponentSlot};
use super::handle::Handle;
use super::layer::Layer;
use super::system::SystemId;

/// Framework-internal component injected into every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneMeta {
    /// Layer the entity was created in.
    pub layer: Layer,
    /// Frame number at creation.
    pub created_frame: u64,
    /// Whether scene saving should write this entity out. Debug-layer
    /// entities are editor-only.
    pub persistent: bool,
}

impl SceneMeta {
    pub(crate) fn new(layer: Layer, created_frame: u64) -> Self {
        Self {
            layer,
            created_frame,
            persistent: layer != Layer::DEBUG,
        }
    }
}

/// Storage for one live entity.
pub(crate) struct EntityRecord {
    pub(crate) name: String,
    pub(crate) layer: Layer,
    pub(crate) components: BTreeMap<ComponentKind, ComponentSlot>,
    /// Systems whose required kinds this entity owns, in registration order.
    /// Membership may be narrower while a component is inactive.
    pub(crate) systems: Vec<SystemId>,
    /// Set once teardown starts. A dying entity never rejoins a system.
    pub(crate) dying: bool,
}

impl EntityRecord {
    pub(crate) fn owns_all(&self, kinds: &[ComponentKind]) -> bool {
        kinds.iter().all(|kind| self.components.contains_key(kind))
    }

    pub(crate) fn all_active(&self, kinds: &[ComponentKind]) -> bool {
        kinds
            .iter()
            .all(|kind| self.components.get(kind).is_some_and(|slot| slot.active))
    }
}

enum PendingKey {
    Typed(fn(&mut ComponentRegistry) -> ComponentKind),
    Kind(ComponentKind),
}

struct PendingComponent {
    key: PendingKey,
    value: AnyComponent,
}

/// A bundle of components for [`World::create_entity`](super::world::World::create_entity).
#[derive(Default)]
pub struct Components {
    entries: Vec<PendingComponent>,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component. Its kind is registered on first use.
    pub fn with<T: Send + Sync + 'static>(mut self, component: T) -> Self {
        self.entries.push(PendingComponent {
            key: PendingKey::Typed(ComponentRegistry::register::<T>),
            value: Box::new(component),
        });
        self
    }

    /// Add an already-boxed component under a known kind. The value must be
    /// an instance of the kind's type; mismatches are dropped with a warning
    /// at creation.
    pub fn with_kind(mut self, kind: ComponentKind, value: AnyComponent) -> Self {
        self.entries.push(PendingComponent {
            key: PendingKey::Kind(kind),
            value,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every entry to a kind, registering types as needed. Later
    /// entries of the same kind replace earlier ones.
    pub(crate) fn resolve(
        self,
        registry: &mut ComponentRegistry,
    ) -> BTreeMap<ComponentKind, ComponentSlot> {
        let mut slots = BTreeMap::new();
        for entry in self.entries {
            let kind = match entry.key {
                PendingKey::Typed(register) => register(registry),
                PendingKey::Kind(kind) => {
                    let Some(desc) = registry.descriptor(kind) else {
                        log::warn!("unknown component {kind}; dropping it");
                        continue;
                    };
                    if !desc.matches(&*entry.value) {
                        log::warn!(
                            "value passed for component '{}' has a different type; dropping it",
                            desc.name()
                        );
                        continue;
                    }
                    kind
                }
            };
            if slots.insert(kind, ComponentSlot::new(entry.value)).is_some() {
                log::warn!(
                    "component '{}' supplied twice; keeping the last one",
                    registry.name(kind)
                );
            }
        }
        slots
    }
}

/// Ordered set of handles awaiting deletion.
///
/// A handle stays marked from `push` until [`finish`](Self::finish), so a
/// teardown callback can't queue an entity that is already being destroyed.
#[derive(Debug, Default)]
pub(crate) struct DeletionQueue {
    order: VecDeque<Handle>,
    queued: HashSet<Handle>,
}

impl DeletionQueue {
    /// Returns `false` if the handle was already queued.
    pub(crate) fn push(&mut self, entity: Handle) -> bool {
        if !self.queued.insert(entity) {
            return false;
        }
        self.order.push_back(entity);
        true
    }

    pub(crate) fn contains(&self, entity: Handle) -> bool {
        self.queued.contains(&entity)
    }

    /// Take the oldest request. It stays marked until `finish`.
    pub(crate) fn take_next(&mut self) -> Option<Handle> {
        self.order.pop_front()
    }

    pub(crate) fn finish(&mut self, entity: Handle) {
        self.queued.remove(&entity);
    }

    /// Handles waiting to be taken, in request order.
    pub(crate) fn to_vec(&self) -> Vec<Handle> {
        self.order.iter().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health(u32);
    struct Armor;

    #[test]
    fn scene_meta_debug_layer_not_persistent() {
        assert!(SceneMeta::new(Layer::BASE, 3).persistent);
        assert!(SceneMeta::new(Layer::OVERLAY_1, 3).persistent);
        assert!(!SceneMeta::new(Layer::DEBUG, 3).persistent);
    }

    #[test]
    fn bundle_registers_kinds_and_keeps_last_duplicate() {
        let mut registry = ComponentRegistry::new();
        let slots = Components::new()
            .with(Health(1))
            .with(Armor)
            .with(Health(7))
            .resolve(&mut registry);

        assert_eq!(slots.len(), 2);
        let health = registry.kind_of::<Health>().unwrap();
        let slot = &slots[&health];
        assert_eq!(slot.downcast_ref::<Health>().unwrap().0, 7);
        assert!(slot.active);
        assert_eq!(slot.owner, Handle::INVALID);
    }

    #[test]
    fn with_kind_checks_type_and_registration() {
        let mut registry = ComponentRegistry::new();
        let health = registry.register::<Health>();
        let armor = registry.register::<Armor>();

        let slots = Components::new()
            .with_kind(health, Box::new(Health(3)))
            // Wrong type for the kind: dropped.
            .with_kind(armor, Box::new(Health(4)))
            .resolve(&mut registry);
        assert_eq!(slots.len(), 1);
        assert!(slots.contains_key(&health));
    }

    #[test]
    fn deletion_queue_dedups() {
        let mut queue = DeletionQueue::default();
        assert!(queue.push(Handle::from_raw(2)));
        assert!(queue.push(Handle::from_raw(0)));
        assert!(!queue.push(Handle::from_raw(2)));
        assert_eq!(queue.len(), 2);
        assert!(queue.contains(Handle::from_raw(0)));
        assert_eq!(queue.to_vec(), vec![Handle::from_raw(2), Handle::from_raw(0)]);
    }

    #[test]
    fn taken_handle_stays_marked_until_finished() {
        let mut queue = DeletionQueue::default();
        queue.push(Handle::from_raw(5));
        assert_eq!(queue.take_next(), Some(Handle::from_raw(5)));
        assert!(queue.is_empty());

        // Still being destroyed: a second request is refused.
        assert!(!queue.push(Handle::from_raw(5)));
        assert_eq!(queue.take_next(), None);

        queue.finish(Handle::from_raw(5));
        assert!(!queue.contains(Handle::from_raw(5)));
        assert!(queue.push(Handle::from_raw(5)));
    }
}
