//! # Systems — Per-Entity Behavior
//!
//! A system is a named piece of behavior that runs once per frame for every
//! entity it is interested in. Interest is declared up front as a set of
//! required component kinds; the world keeps a membership list per system
//! and never re-scans entities during `update`.
//!
//! ## Lifecycle
//!
//! ```text
//! register_system ──► init(world)
//!                     init_entity(world, e)      once per entity that joins
//! every frame     ──► update(world, dt, e)       once per eligible member
//! entity deleted  ──► shutdown_entity(world, e)
//! world shutdown  ──► shutdown(world)
//! ```
//!
//! Only `update` is mandatory. Any
//! `FnMut(&mut World, f32, Handle) -> anyhow::Result<()>` is a system, so
//! closures and plain functions work without a wrapper struct.
//!
//! ## Registration order is update order
//!
//! There is no dependency graph. Systems run in the order they were
//! registered, and within a system, members run in the order they joined.
//! Register the transform propagation before anything that reads world
//! transforms.
//!
//! ## Check-out
//!
//! While a callback runs, its boxed system is taken out of the registry (the
//! same extract/reinsert move the world uses for resources). The callback can
//! freely create entities, toggle components or look up other systems. If a
//! new entity joins the system that is currently checked out, its
//! `init_entity` is queued and runs as soon as the system is checked back in.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::EcsError;

use super::component::ComponentKind;
use super::handle::Handle;
use super::world::World;

/// Behavior attached to entities that own every required component kind.
pub trait System: 'static {
    /// Called once, right after registration.
    fn init(&mut self, _world: &mut World) {}

    /// Called when an entity joins this system.
    fn init_entity(&mut self, _world: &mut World, _entity: Handle) {}

    /// Called once per frame for each eligible member.
    fn update(&mut self, world: &mut World, dt: f32, entity: Handle) -> anyhow::Result<()>;

    /// Called when a member entity is being destroyed.
    fn shutdown_entity(&mut self, _world: &mut World, _entity: Handle) {}

    /// Called once from [`World::shutdown`], after all entities are gone.
    fn shutdown(&mut self, _world: &mut World) {}
}

/// Blanket impl: any `FnMut(&mut World, f32, Handle) -> anyhow::Result<()>`
/// is a `System` with no-op lifecycle hooks.
impl<F> System for F
where
    F: FnMut(&mut World, f32, Handle) -> anyhow::Result<()> + 'static,
{
    fn update(&mut self, world: &mut World, dt: f32, entity: Handle) -> anyhow::Result<()> {
        (self)(world, dt, entity)
    }
}

/// Index of a registered system. Systems are never unregistered, so ids
/// are stable for the world's lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct SystemId(pub(crate) usize);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}

/// Insertion-ordered set of member handles.
#[derive(Debug, Default)]
pub(crate) struct Membership {
    order: Vec<Handle>,
    set: HashSet<Handle>,
}

impl Membership {
    /// Append if absent. Returns `true` if inserted.
    pub(crate) fn insert(&mut self, entity: Handle) -> bool {
        if !self.set.insert(entity) {
            return false;
        }
        self.order.push(entity);
        true
    }

    pub(crate) fn remove(&mut self, entity: Handle) -> bool {
        if !self.set.remove(&entity) {
            return false;
        }
        self.order.retain(|&h| h != entity);
        true
    }

    pub(crate) fn contains(&self, entity: Handle) -> bool {
        self.set.contains(&entity)
    }

    pub(crate) fn as_slice(&self) -> &[Handle] {
        &self.order
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Registry record for one system.
pub(crate) struct SystemSlot {
    pub(crate) name: String,
    pub(crate) required: Vec<ComponentKind>,
    pub(crate) always_update: bool,
    pub(crate) members: Membership,
    /// `None` while checked out.
    pub(crate) system: Option<Box<dyn System>>,
    /// Entities that joined while the system was checked out.
    pub(crate) pending_init: Vec<Handle>,
    /// Failed or panicked updates in the most recent frame.
    pub(crate) faults_last_frame: u32,
    pub(crate) faults_total: u64,
    #[cfg(feature = "diagnostics")]
    pub(crate) last_duration_us: f64,
}

impl SystemSlot {
    pub(crate) fn requires(&self, kind: ComponentKind) -> bool {
        self.required.contains(&kind)
    }
}

/// Ordered list of registered systems.
#[derive(Default)]
pub(crate) struct SystemRegistry {
    slots: Vec<SystemSlot>,
    by_name: HashMap<String, SystemId>,
}

impl SystemRegistry {
    pub(crate) fn register(
        &mut self,
        name: &str,
        system: Box<dyn System>,
        required: &[ComponentKind],
        always_update: bool,
    ) -> Result<SystemId, EcsError> {
        if self.by_name.contains_key(name) {
            return Err(EcsError::DuplicateSystem(name.to_string()));
        }

        // Ordered set: first occurrence wins.
        let mut kinds = Vec::with_capacity(required.len());
        for &kind in required {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        let id = SystemId(self.slots.len());
        self.slots.push(SystemSlot {
            name: name.to_string(),
            required: kinds,
            always_update,
            members: Membership::default(),
            system: Some(system),
            pending_init: Vec::new(),
            faults_last_frame: 0,
            faults_total: 0,
            #[cfg(feature = "diagnostics")]
            last_duration_us: 0.0,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub(crate) fn get(&self, id: SystemId) -> Option<&SystemSlot> {
        self.slots.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: SystemId) -> Option<&mut SystemSlot> {
        self.slots.get_mut(id.0)
    }

    pub(crate) fn id_of(&self, name: &str) -> Option<SystemId> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn ids(&self) -> Vec<SystemId> {
        (0..self.slots.len()).map(SystemId).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (SystemId, &SystemSlot)> {
        self.slots.iter().enumerate().map(|(i, s)| (SystemId(i), s))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (SystemId, &mut SystemSlot)> {
        self.slots
            .iter_mut()
            .enumerate()
            .map(|(i, s)| (SystemId(i), s))
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn name(&self, id: SystemId) -> &str {
        self.get(id).map_or("<unknown>", |s| s.name.as_str())
    }

    /// Take the boxed system out. `None` if unknown or already checked out.
    pub(crate) fn checkout(&mut self, id: SystemId) -> Option<Box<dyn System>> {
        self.get_mut(id)?.system.take()
    }

    pub(crate) fn checkin(&mut self, id: SystemId, system: Box<dyn System>) {
        if let Some(slot) = self.get_mut(id) {
            slot.system = Some(system);
        }
    }

    pub(crate) fn queue_init(&mut self, id: SystemId, entity: Handle) {
        if let Some(slot) = self.get_mut(id) {
            slot.pending_init.push(entity);
        }
    }

    pub(crate) fn take_pending_init(&mut self, id: SystemId) -> Vec<Handle> {
        self.get_mut(id)
            .map(|slot| std::mem::take(&mut slot.pending_init))
            .unwrap_or_default()
    }

    pub(crate) fn is_member(&self, id: SystemId, entity: Handle) -> bool {
        self.get(id).is_some_and(|s| s.members.contains(entity))
    }

    pub(crate) fn remove_member(&mut self, id: SystemId, entity: Handle) -> bool {
        self.get_mut(id).is_some_and(|s| s.members.remove(entity))
    }
}
