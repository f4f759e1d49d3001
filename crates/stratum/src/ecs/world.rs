//! # World — The Central Container
//!
//! The [`World`] owns every entity, every system and the layer state. There
//! are no globals: a host creates a world, drives it with `update`, and
//! tears it down with `shutdown`. Several worlds can coexist (tests do this
//! all the time).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ World                                                    │
//! │                                                          │
//! │  registry:  ComponentRegistry   type ↔ ComponentKind     │
//! │  entities:  HandleStore<EntityRecord>                    │
//! │               name, layer, kind → ComponentSlot          │
//! │  systems:   SystemRegistry      ordered, with members    │
//! │  layers:    LayerManager        buckets + drawn/eligible │
//! │  deletions: DeletionQueue       drained after update     │
//! │  sinks:     Vec<Box<dyn EventSink>>                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Creating an entity
//!
//! `create_entity` does, in order:
//!
//! 1. allocate a handle and stamp it onto every component (plus the injected
//!    [`SceneMeta`]);
//! 2. offset drawable priorities by `layer index × layer_priority_range`;
//! 3. add the handle to every system whose required kinds it owns;
//! 4. run `init_entity` for each of those systems, after all of them have
//!    been evaluated;
//! 5. append the handle to the cursor layer's bucket;
//! 6. fire [`WorldEvent::EntityCreated`].
//!
//! ## Not-found is not an error
//!
//! Every accessor takes a handle that may be stale. Unknown handles and
//! kinds are logged at trace level and answered with `None` or ignored.
//!
//! ## Comparison
//!
//! - **hecs / bevy_ecs**: archetype tables and queries; systems discover
//!   entities every frame.
//! - **stratum**: each system keeps an explicit membership list, computed
//!   when an entity is created or a component is toggled. Iteration is a
//!   walk over a short list, and membership changes are visible in one place.

use std::any::Any;

use crate::config::WorldConfig;
use crate::error::EcsError;
use crate::event::{EditorEvent, EventSink, WorldEvent};
use crate::ecs::hierarchy::GlobalTransform;
use crate::math::Transform;
use crate::render::{Sprite, Text};
use crate::time::FrameClock;

use super::component::{ComponentKind, ComponentRegistry, ComponentSlot};
use super::entity::{Components, DeletionQueue, EntityRecord, SceneMeta};
use super::handle::{Handle, HandleStore};
use super::layer::{Layer, LayerManager};
use super::system::{SystemId, SystemRegistry};

/// The central container for all entities, systems and layers.
pub struct World {
    pub(crate) config: WorldConfig,
    pub(crate) registry: ComponentRegistry,
    pub(crate) entities: HandleStore<EntityRecord>,
    pub(crate) systems: SystemRegistry,
    pub(crate) layers: LayerManager,
    pub(crate) deletions: DeletionQueue,
    sinks: Vec<Box<dyn EventSink>>,
    pub(crate) clock: FrameClock,
    /// Inside the system sweep of `update`.
    pub(crate) updating: bool,
    pub(crate) shut_down: bool,
    pub(crate) created_this_frame: u32,
    pub(crate) destroyed_this_frame: u32,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world from a config. An invalid config is logged and the
    /// offending values fall back to their defaults.
    pub fn with_config(config: WorldConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                log::warn!("{err}; using defaults for invalid fields");
                sanitize(config)
            }
        };

        let mut registry = ComponentRegistry::new();
        registry.register_debug::<SceneMeta>();
        registry.register_debug::<Transform>();
        registry.register_debug::<GlobalTransform>();
        registry.register_drawable::<Sprite>();
        registry.register_drawable::<Text>();

        Self {
            entities: HandleStore::with_capacity(config.handle_capacity),
            layers: LayerManager::new(config.initial_layer),
            registry,
            systems: SystemRegistry::default(),
            deletions: DeletionQueue::default(),
            sinks: Vec::new(),
            clock: FrameClock::new(),
            updating: false,
            shut_down: false,
            created_this_frame: 0,
            destroyed_this_frame: 0,
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    // ── Components ──────────────────────────────────────────────────────

    pub fn components(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Register `T` ahead of first use and get its kind.
    pub fn register_component<T: Any + Send + Sync>(&mut self) -> ComponentKind {
        self.registry.register::<T>()
    }

    /// Register `T` as drawable so its priority is offset per layer.
    pub fn register_drawable<T: super::component::Drawable + Any + Send + Sync>(
        &mut self,
    ) -> ComponentKind {
        self.registry.register_drawable::<T>()
    }

    /// Register `T` with a debug formatter for [`describe_entity`](Self::describe_entity).
    pub fn register_debug<T: std::fmt::Debug + Any + Send + Sync>(&mut self) -> ComponentKind {
        self.registry.register_debug::<T>()
    }

    pub fn kind_of<T: Any>(&self) -> Option<ComponentKind> {
        self.registry.kind_of::<T>()
    }

    pub fn kind_by_name(&self, name: &str) -> Option<ComponentKind> {
        self.registry.kind_by_name(name)
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Add an observer for [`WorldEvent`]s.
    pub fn add_event_sink(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub(crate) fn emit(&mut self, event: WorldEvent) {
        for sink in &mut self.sinks {
            sink.on_event(&event);
        }
    }

    // ── Entity registry ─────────────────────────────────────────────────

    /// Create an entity in the cursor layer.
    ///
    /// Returns [`Handle::INVALID`] (and logs a warning) if the cursor layer
    /// is out of range or the entity store is full.
    pub fn create_entity(&mut self, name: &str, components: Components) -> Handle {
        match self.try_create_entity(name, components) {
            Ok(handle) => handle,
            Err(err) => {
                log::warn!("create_entity('{name}') failed: {err}");
                Handle::INVALID
            }
        }
    }

    /// Like [`create_entity`](Self::create_entity), reporting the reason for
    /// a failure.
    pub fn try_create_entity(
        &mut self,
        name: &str,
        components: Components,
    ) -> Result<Handle, EcsError> {
        let layer = self.layers.cursor();
        if !layer.is_valid() {
            return Err(EcsError::LayerOutOfRange(layer));
        }

        let mut slots = components.resolve(&mut self.registry);
        let meta_kind = self.registry.register_debug::<SceneMeta>();
        slots.insert(
            meta_kind,
            ComponentSlot::new(Box::new(SceneMeta::new(layer, self.clock.frame_count()))),
        );

        let handle = self.entities.try_add(EntityRecord {
            name: name.to_string(),
            layer,
            components: slots,
            systems: Vec::new(),
            dying: false,
        })?;

        if self.layers.contains(layer, handle) {
            self.entities.release(handle);
            return Err(EcsError::AlreadyInLayer { layer });
        }

        let offset = (layer.index() as i32).saturating_mul(self.config.layer_priority_range);
        let joined = self.stamp_and_classify(handle, offset);

        for id in joined {
            self.init_entity_for(id, handle);
        }

        self.layers.insert(handle, layer);
        self.created_this_frame += 1;
        log::trace!("created {handle} '{name}' in {layer}");
        self.emit(WorldEvent::EntityCreated(handle));
        Ok(handle)
    }

    /// Stamp owners, offset priorities and add the entity to every matching
    /// system. Returns the systems it joined.
    fn stamp_and_classify(&mut self, handle: Handle, priority_offset: i32) -> Vec<SystemId> {
        let Some(record) = self.entities.get_mut(handle) else {
            return Vec::new();
        };

        for (kind, slot) in record.components.iter_mut() {
            slot.owner = handle;
            if priority_offset == 0 {
                continue;
            }
            if let Some(desc) = self.registry.descriptor(*kind) {
                if let Some(priority) = desc.draw_priority(&mut *slot.value) {
                    *priority = priority.saturating_add(priority_offset);
                }
            }
        }

        let mut joined = Vec::new();
        for (id, system) in self.systems.iter_mut() {
            if record.owns_all(&system.required) {
                system.members.insert(handle);
                joined.push(id);
            }
        }
        record.systems = joined.clone();
        joined
    }

    /// Queue an entity for deletion after the current (or next) update.
    ///
    /// Idempotent: queuing the same handle twice deletes it once. Handles
    /// that are not alive are ignored.
    pub fn delete_entity(&mut self, entity: Handle) {
        match self.entities.get(entity) {
            None => {
                log::trace!("delete_entity: {entity} is not alive, ignoring");
                return;
            }
            Some(record) if record.dying => {
                log::trace!("delete_entity: {entity} is already being destroyed");
                return;
            }
            Some(_) => {}
        }
        if self.deletions.push(entity) {
            log::trace!("queued {entity} for deletion");
        }
    }

    /// Tear an entity down right now. Only called from the deletion phase
    /// and from shutdown.
    pub(crate) fn destroy_entity(&mut self, entity: Handle) {
        let Some(record) = self.entities.get_mut(entity) else {
            return;
        };
        record.dying = true;
        let systems = record.systems.clone();

        for id in systems {
            self.systems.remove_member(id, entity);
            self.call_system(id, |system, world| system.shutdown_entity(world, entity));
        }

        // The handle is about to be recycled; no member list may keep it.
        for (_, system) in self.systems.iter_mut() {
            system.members.remove(entity);
        }

        let Some(record) = self.entities.release(entity) else {
            return;
        };
        self.layers.remove(entity, record.layer);
        drop(record);

        self.destroyed_this_frame += 1;
        log::trace!("destroyed {entity}");
        self.emit(WorldEvent::EntityDestroyed(entity));
    }

    /// Apply every queued deletion, including ones queued by the teardown
    /// callbacks themselves.
    pub(crate) fn flush_deletions(&mut self) {
        while let Some(entity) = self.deletions.take_next() {
            self.destroy_entity(entity);
            self.deletions.finish(entity);
        }
    }

    pub fn is_alive(&self, entity: Handle) -> bool {
        self.entities.contains(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// All live entities in ascending handle order.
    pub fn entities(&self) -> Vec<Handle> {
        self.entities.available_ids()
    }

    pub fn entity_name(&self, entity: Handle) -> Option<&str> {
        self.record(entity).map(|r| r.name.as_str())
    }

    pub fn set_entity_name(&mut self, entity: Handle, name: &str) {
        match self.entities.get_mut(entity) {
            Some(record) => record.name = name.to_string(),
            None => log::trace!("set_entity_name: {entity} is not alive"),
        }
    }

    /// Every live entity with this name, ascending. Names are not unique.
    pub fn find_by_name(&self, name: &str) -> Vec<Handle> {
        self.entities
            .iter()
            .filter(|(_, record)| record.name == name)
            .map(|(handle, _)| handle)
            .collect()
    }

    /// The layer the entity was created in.
    pub fn entity_layer(&self, entity: Handle) -> Option<Layer> {
        self.record(entity).map(|r| r.layer)
    }

    /// Kinds owned by the entity, ascending.
    pub fn component_kinds(&self, entity: Handle) -> Vec<ComponentKind> {
        self.record(entity)
            .map(|r| r.components.keys().copied().collect())
            .unwrap_or_default()
    }

    /// `(kind name, debug text)` for every component of the entity.
    pub fn describe_entity(&self, entity: Handle) -> Vec<(String, String)> {
        let Some(record) = self.record(entity) else {
            return Vec::new();
        };
        record
            .components
            .iter()
            .map(|(kind, slot)| match self.registry.descriptor(*kind) {
                Some(desc) => (desc.name().to_string(), desc.format(&*slot.value)),
                None => (kind.to_string(), "<opaque>".to_string()),
            })
            .collect()
    }

    pub fn is_pending_deletion(&self, entity: Handle) -> bool {
        self.deletions.contains(entity)
    }

    /// Handles queued for deletion, in request order.
    pub fn pending_deletions(&self) -> Vec<Handle> {
        self.deletions.to_vec()
    }

    fn record(&self, entity: Handle) -> Option<&EntityRecord> {
        let record = self.entities.get(entity);
        if record.is_none() {
            log::trace!("{entity} is not alive");
        }
        record
    }

    fn slot(&self, entity: Handle, kind: ComponentKind) -> Option<&ComponentSlot> {
        let slot = self.record(entity)?.components.get(&kind);
        if slot.is_none() {
            log::trace!("{entity} has no {}", self.registry.name(kind));
        }
        slot
    }

    fn slot_mut(&mut self, entity: Handle, kind: ComponentKind) -> Option<&mut ComponentSlot> {
        let Some(record) = self.entities.get_mut(entity) else {
            log::trace!("{entity} is not alive");
            return None;
        };
        record.components.get_mut(&kind)
    }

    // ── Component access ────────────────────────────────────────────────

    pub fn get<T: Any>(&self, entity: Handle) -> Option<&T> {
        let kind = self.registry.kind_of::<T>()?;
        self.slot(entity, kind)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any>(&mut self, entity: Handle) -> Option<&mut T> {
        let kind = self.registry.kind_of::<T>()?;
        self.slot_mut(entity, kind)?.downcast_mut::<T>()
    }

    /// Kind-based access for code that only knows kinds at runtime.
    pub fn get_by_kind(&self, entity: Handle, kind: ComponentKind) -> Option<&dyn Any> {
        let value: &dyn Any = &*self.slot(entity, kind)?.value;
        Some(value)
    }

    pub fn get_by_kind_mut(&mut self, entity: Handle, kind: ComponentKind) -> Option<&mut dyn Any> {
        let value: &mut dyn Any = &mut *self.slot_mut(entity, kind)?.value;
        Some(value)
    }

    pub fn has<T: Any>(&self, entity: Handle) -> bool {
        self.registry
            .kind_of::<T>()
            .and_then(|kind| self.entities.get(entity)?.components.get(&kind))
            .is_some()
    }

    /// The entity a component was stamped with at creation.
    pub fn component_owner(&self, entity: Handle, kind: ComponentKind) -> Option<Handle> {
        self.slot(entity, kind).map(|slot| slot.owner)
    }

    pub fn is_component_active(&self, entity: Handle, kind: ComponentKind) -> Option<bool> {
        self.slot(entity, kind).map(|slot| slot.active)
    }

    /// `false` if the entity lacks `T` or it is inactive.
    pub fn is_active<T: Any>(&self, entity: Handle) -> bool {
        self.registry
            .kind_of::<T>()
            .and_then(|kind| self.entities.get(entity)?.components.get(&kind))
            .is_some_and(|slot| slot.active)
    }

    /// Flip a component's `active` flag and update the membership of every
    /// system that requires the kind.
    ///
    /// Activating adds the entity back to a system only if it owns every
    /// other required kind (all of them active) and isn't a member already.
    /// Deactivating removes it unconditionally. No lifecycle callbacks run.
    pub fn set_component_active(&mut self, entity: Handle, kind: ComponentKind, active: bool) {
        let Some(record) = self.entities.get_mut(entity) else {
            log::warn!("set_component_active: {entity} is not alive");
            return;
        };
        let Some(slot) = record.components.get_mut(&kind) else {
            log::warn!(
                "set_component_active: {entity} has no {}",
                self.registry.name(kind)
            );
            return;
        };
        slot.active = active;
        if record.dying {
            log::trace!("{entity} is being destroyed; membership unchanged");
            return;
        }

        for (_, system) in self.systems.iter_mut() {
            if !system.requires(kind) {
                continue;
            }
            if active {
                if record.owns_all(&system.required) && record.all_active(&system.required) {
                    system.members.insert(entity);
                }
            } else {
                system.members.remove(entity);
            }
        }
        log::trace!(
            "{entity}: {} is now {}",
            self.registry.name(kind),
            if active { "active" } else { "inactive" }
        );
    }

    /// Typed form of [`set_component_active`](Self::set_component_active).
    pub fn set_active<T: Any>(&mut self, entity: Handle, active: bool) {
        match self.registry.kind_of::<T>() {
            Some(kind) => self.set_component_active(entity, kind, active),
            None => log::warn!(
                "set_active: component {} was never registered",
                std::any::type_name::<T>()
            ),
        }
    }

    // ── Layers ──────────────────────────────────────────────────────────

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    /// Move the insertion cursor. Out-of-range layers are ignored.
    pub fn begin_layer(&mut self, layer: Layer) {
        self.layers.begin_layer(layer);
    }

    /// Switch the running layer and fire [`WorldEvent::LayerChanged`].
    pub fn make_visible(&mut self, layer: Layer) {
        if self.layers.make_visible(layer) {
            self.emit(WorldEvent::LayerChanged(layer));
        }
    }

    /// React to the editor starting or stopping a session.
    pub fn handle_editor_event(&mut self, event: EditorEvent) {
        match event {
            EditorEvent::Start => {
                if self.layers.running() != Layer::DEBUG {
                    log::info!("editor started, leaving {}", self.layers.running());
                    self.make_visible(Layer::DEBUG);
                }
            }
            EditorEvent::Stop => {
                if self.layers.running() == Layer::DEBUG {
                    let previous = self.layers.previous();
                    log::info!("editor stopped, resuming {previous}");
                    self.make_visible(previous);
                }
            }
        }
    }

    // ── Invariants ──────────────────────────────────────────────────────

    pub(crate) fn invariant_violation(&self, message: &str) {
        log::error!("invariant violated: {message}");
        if self.config.strict_invariants {
            panic!("invariant violated: {message}");
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn sanitize(config: WorldConfig) -> WorldConfig {
    let defaults = WorldConfig::default();
    WorldConfig {
        handle_capacity: if config.handle_capacity == 0 {
            defaults.handle_capacity
        } else {
            config.handle_capacity
        },
        layer_priority_range: if config.layer_priority_range <= 0
            || config.layer_priority_range > crate::config::MAX_LAYER_PRIORITY_RANGE
        {
            defaults.layer_priority_range
        } else {
            config.layer_priority_range
        },
        strict_invariants: config.strict_invariants,
        initial_layer: if config.initial_layer.is_valid() {
            config.initial_layer
        } else {
            defaults.initial_layer
        },
    }
}
