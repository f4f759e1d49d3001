//! # Schedule — Registering Systems and Running Frames
//!
//! The scheduling half of [`World`]: system registration, the per-frame
//! `update` pass, and `shutdown`.
//!
//! ## One frame
//!
//! ```text
//! update(dt)
//!   clock.advance(dt)
//!   for system in registration order:
//!       snapshot = system.members
//!       for entity in snapshot:
//!           skip unless still a member
//!           skip unless eligible   (drawn set if always_update,
//!                                   running layer otherwise)
//!           system.update(world, dt, entity)   ← errors/panics logged
//!   flush deletion queue                        ← shutdown_entity, free
//! ```
//!
//! The membership snapshot means an entity created mid-frame is visited
//! this frame only by systems that haven't started yet. Deletions never
//! happen during the sweep.
//!
//! ## Faults
//!
//! A failing `update` (an `Err` or a panic) is logged with the system name
//! and the entity, counted, and then forgotten: the next entity still runs.
//! Lifecycle callbacks get the same panic isolation.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::EcsError;

use super::component::{ComponentKind, ComponentRegistry};
use super::handle::Handle;
use super::layer::Layer;
use super::system::{System, SystemId};
use super::world::World;

/// A tuple of component types, used to derive a system's required kinds.
pub trait ComponentSet {
    /// Register every type in the set and return their kinds.
    fn kinds(registry: &mut ComponentRegistry) -> Vec<ComponentKind>;
}

impl ComponentSet for () {
    fn kinds(_registry: &mut ComponentRegistry) -> Vec<ComponentKind> {
        Vec::new()
    }
}

macro_rules! impl_component_set {
    ($($T:ident),+) => {
        impl<$($T: Any + Send + Sync),+> ComponentSet for ($($T,)+) {
            fn kinds(registry: &mut ComponentRegistry) -> Vec<ComponentKind> {
                vec![$(registry.register::<$T>()),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);

impl World {
    /// Register a system under a unique name.
    ///
    /// Runs the system-level `init` immediately, then classifies the
    /// entities that already exist, calling `init_entity` for each match.
    /// Registration order is update order.
    pub fn register_system<S: System>(
        &mut self,
        name: &str,
        system: S,
        required: &[ComponentKind],
        always_update: bool,
    ) -> Result<(), EcsError> {
        for &kind in required {
            if self.registry.descriptor(kind).is_none() {
                log::warn!("system '{name}' requires unregistered {kind}; it will never match");
            }
        }

        let id = self
            .systems
            .register(name, Box::new(system), required, always_update)?;
        log::debug!(
            "registered system '{name}' requiring [{}]",
            required
                .iter()
                .map(|&k| self.registry.name(k))
                .collect::<Vec<_>>()
                .join(", ")
        );

        self.call_system(id, |system, world| system.init(world));
        self.classify_existing(id);
        Ok(())
    }

    /// Register a system whose required kinds are the types in `Q`.
    ///
    /// ```ignore
    /// world.register_system_for::<(Transform, Sprite)>("Render", render, true)?;
    /// ```
    pub fn register_system_for<Q: ComponentSet>(
        &mut self,
        name: &str,
        system: impl System,
        always_update: bool,
    ) -> Result<(), EcsError> {
        let required = Q::kinds(&mut self.registry);
        self.register_system(name, system, &required, always_update)
    }

    /// Add the live entities to a newly registered system.
    fn classify_existing(&mut self, id: SystemId) {
        let Some(required) = self.systems.get(id).map(|s| s.required.clone()) else {
            return;
        };

        let mut matched = Vec::new();
        for (handle, record) in self.entities.iter_mut() {
            // Entities created by the system's own `init` are already in.
            if record.dying || record.systems.contains(&id) || !record.owns_all(&required) {
                continue;
            }
            record.systems.push(id);
            matched.push((handle, record.all_active(&required)));
        }

        if let Some(slot) = self.systems.get_mut(id) {
            for &(handle, active) in &matched {
                if active {
                    slot.members.insert(handle);
                }
            }
        }
        for (handle, _) in matched {
            self.init_entity_for(id, handle);
        }
    }

    /// Run `init_entity`, or queue it if the system is checked out.
    pub(crate) fn init_entity_for(&mut self, id: SystemId, entity: Handle) {
        if self.systems.get(id).is_some_and(|s| s.system.is_none()) {
            self.systems.queue_init(id, entity);
            return;
        }
        self.call_system(id, |system, world| system.init_entity(world, entity));
    }

    /// Check a system out, run `f` on it with panic isolation, and check it
    /// back in. `None` if the system is busy or `f` panicked.
    pub(crate) fn call_system<R>(
        &mut self,
        id: SystemId,
        f: impl FnOnce(&mut dyn System, &mut World) -> R,
    ) -> Option<R> {
        let Some(mut system) = self.systems.checkout(id) else {
            log::warn!(
                "system '{}' is busy, skipping callback",
                self.systems.name(id)
            );
            return None;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(&mut *system, self)));
        self.return_system(id, system);

        match outcome {
            Ok(value) => Some(value),
            Err(payload) => {
                log::error!(
                    "system '{}' panicked: {}",
                    self.systems.name(id),
                    panic_message(&*payload)
                );
                None
            }
        }
    }

    /// Check a system back in, first running the `init_entity` calls that
    /// were queued while it was out.
    fn return_system(&mut self, id: SystemId, mut system: Box<dyn System>) {
        loop {
            let pending = self.systems.take_pending_init(id);
            if pending.is_empty() {
                break;
            }
            for entity in pending {
                if !self.entities.contains(entity) {
                    continue;
                }
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| system.init_entity(self, entity)));
                if let Err(payload) = outcome {
                    log::error!(
                        "system '{}' panicked in init for {entity}: {}",
                        self.systems.name(id),
                        panic_message(&*payload)
                    );
                }
            }
        }
        self.systems.checkin(id, system);
    }

    /// Run one frame: every system over its eligible members, then the
    /// queued deletions. `dt_ms` is passed through to every `update`.
    pub fn update(&mut self, dt_ms: f32) {
        if self.shut_down {
            log::warn!("update called after shutdown, ignoring");
            return;
        }
        if self.updating {
            log::warn!("update called from inside a system, ignoring");
            return;
        }

        self.created_this_frame = 0;
        self.destroyed_this_frame = 0;
        self.clock.advance(dt_ms);

        self.updating = true;
        for id in self.systems.ids() {
            self.run_system(id, dt_ms);
        }
        self.updating = false;

        self.flush_deletions();
    }

    fn run_system(&mut self, id: SystemId, dt: f32) {
        let Some(slot) = self.systems.get(id) else {
            return;
        };
        let name = slot.name.clone();
        let always_update = slot.always_update;
        let members = slot.members.as_slice().to_vec();

        let Some(mut system) = self.systems.checkout(id) else {
            log::warn!("system '{name}' is busy, skipping its update");
            return;
        };

        #[cfg(feature = "diagnostics")]
        let start = std::time::Instant::now();

        let mut faults = 0u32;
        for entity in members {
            // Deactivated by an earlier entity in this pass.
            if !self.systems.is_member(id, entity) {
                continue;
            }
            let eligible = if always_update {
                self.layers.is_drawn(entity)
            } else {
                self.layers.is_update_eligible(entity)
            };
            if !eligible {
                continue;
            }

            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| system.update(self, dt, entity)));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => format!("{err:#}"),
                Err(payload) => format!("panicked: {}", panic_message(&*payload)),
            };
            faults += 1;
            log::error!("system '{name}' failed on {entity}: {message}");
        }

        if let Some(slot) = self.systems.get_mut(id) {
            slot.faults_last_frame = faults;
            slot.faults_total += u64::from(faults);
            #[cfg(feature = "diagnostics")]
            {
                slot.last_duration_us = start.elapsed().as_secs_f64() * 1_000_000.0;
            }
        }
        self.return_system(id, system);
    }

    /// Tear the world down: delete every entity, then call each system's
    /// `shutdown` once, in registration order. Further updates are refused.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            log::warn!("shutdown called twice, ignoring");
            return;
        }
        if self.updating {
            log::warn!("shutdown called from inside a system, ignoring");
            return;
        }
        log::info!(
            "shutting down world: {} entities, {} systems",
            self.entities.len(),
            self.systems.len()
        );

        for entity in self.entities.available_ids() {
            self.delete_entity(entity);
        }
        self.flush_deletions();

        for id in self.systems.ids() {
            self.call_system(id, |system, world| system.shutdown(world));
        }
        self.shut_down = true;
        self.check_teardown();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn check_teardown(&self) {
        for layer in Layer::all() {
            let left = self.layers.bucket(layer).len();
            if left > 0 {
                self.invariant_violation(&format!(
                    "{left} entities left in layer {layer} after shutdown"
                ));
            }
        }
        for (_, slot) in self.systems.iter() {
            if !slot.members.is_empty() {
                self.invariant_violation(&format!(
                    "system '{}' still has {} members after shutdown",
                    slot.name,
                    slot.members.len()
                ));
            }
        }
        if !self.deletions.is_empty() {
            self.invariant_violation(&format!(
                "{} deletions still queued after shutdown",
                self.deletions.len()
            ));
        }
    }

    // ── System queries ──────────────────────────────────────────────────

    /// Current members of a system, in update order. Unknown names log a
    /// warning and return nothing.
    pub fn entities_in_system(&self, name: &str) -> Vec<Handle> {
        match self.systems.id_of(name).and_then(|id| self.systems.get(id)) {
            Some(slot) => slot.members.as_slice().to_vec(),
            None => {
                log::warn!("entities_in_system: no system named '{name}'");
                Vec::new()
            }
        }
    }

    /// Registered system names, in update order.
    pub fn system_names(&self) -> Vec<String> {
        self.systems.iter().map(|(_, s)| s.name.clone()).collect()
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn required_kinds(&self, name: &str) -> Option<Vec<ComponentKind>> {
        let id = self.systems.id_of(name)?;
        self.systems.get(id).map(|s| s.required.clone())
    }

    /// Faults recorded for a system during the most recent update.
    pub fn system_faults(&self, name: &str) -> Option<u32> {
        let id = self.systems.id_of(name)?;
        self.systems.get(id).map(|s| s.faults_last_frame)
    }
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::ecs::entity::Components;
    use crate::event::{EventLog, WorldEvent};

    struct Health(i32);
    struct Poison;

    type Calls = Rc<RefCell<Vec<String>>>;

    /// Records every callback as "<tag>:<what>:<entity>".
    struct Recorder {
        tag: &'static str,
        calls: Calls,
    }

    impl Recorder {
        fn new(tag: &'static str, calls: &Calls) -> Self {
            Self {
                tag,
                calls: calls.clone(),
            }
        }

        fn push(&self, what: &str, entity: Option<Handle>) {
            let entry = match entity {
                Some(e) => format!("{}:{what}:{}", self.tag, e.raw()),
                None => format!("{}:{what}", self.tag),
            };
            self.calls.borrow_mut().push(entry);
        }
    }

    impl System for Recorder {
        fn init(&mut self, _world: &mut World) {
            self.push("init", None);
        }

        fn init_entity(&mut self, _world: &mut World, entity: Handle) {
            self.push("init", Some(entity));
        }

        fn update(&mut self, _world: &mut World, _dt: f32, entity: Handle) -> anyhow::Result<()> {
            self.push("update", Some(entity));
            Ok(())
        }

        fn shutdown_entity(&mut self, _world: &mut World, entity: Handle) {
            self.push("shutdown", Some(entity));
        }

        fn shutdown(&mut self, _world: &mut World) {
            self.push("shutdown", None);
        }
    }

    fn calls() -> Calls {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn duplicate_system_name_rejected() {
        let mut world = World::new();
        let noop = |_: &mut World, _: f32, _: Handle| -> anyhow::Result<()> { Ok(()) };
        world.register_system("A", noop, &[], false).unwrap();
        let err = world.register_system("A", noop, &[], false).unwrap_err();
        assert_eq!(err, EcsError::DuplicateSystem("A".to_string()));
        assert_eq!(world.system_names(), vec!["A".to_string()]);
    }

    #[test]
    fn register_system_for_derives_kinds() {
        let mut world = World::new();
        let calls = calls();
        world
            .register_system_for::<(Health, Poison)>("Dot", Recorder::new("dot", &calls), false)
            .unwrap();
        let kinds = world.required_kinds("Dot").unwrap();
        assert_eq!(
            kinds,
            vec![world.kind_of::<Health>().unwrap(), world.kind_of::<Poison>().unwrap()]
        );
    }

    #[test]
    fn lifecycle_order() {
        let mut world = World::new();
        let calls = calls();
        world
            .register_system_for::<(Health,)>("H", Recorder::new("h", &calls), false)
            .unwrap();
        let e = world.create_entity("e", Components::new().with(Health(3)));
        world.update(16.0);
        world.delete_entity(e);
        world.update(16.0);
        world.shutdown();

        assert_eq!(
            *calls.borrow(),
            vec!["h:init", "h:init:0", "h:update:0", "h:update:0", "h:shutdown:0", "h:shutdown"]
        );
    }

    #[test]
    fn late_registration_classifies_existing_entities() {
        let mut world = World::new();
        let a = world.create_entity("a", Components::new().with(Health(1)));
        let _b = world.create_entity("b", Components::new().with(Poison));
        let c = world.create_entity("c", Components::new().with(Health(2)));

        let calls = calls();
        world
            .register_system_for::<(Health,)>("H", Recorder::new("h", &calls), false)
            .unwrap();
        assert_eq!(world.entities_in_system("H"), vec![a, c]);
        assert_eq!(*calls.borrow(), vec!["h:init", "h:init:0", "h:init:2"]);
    }

    #[test]
    fn entity_created_during_update_is_initialized_once() {
        let mut world = World::new();
        let spawned = Rc::new(RefCell::new(false));
        let flag = spawned.clone();
        let calls = calls();

        world
            .register_system_for::<(Health,)>("H", Recorder::new("h", &calls), false)
            .unwrap();
        world
            .register_system_for::<(Poison,)>(
                "Spawner",
                move |world: &mut World, _dt: f32, _e: Handle| -> anyhow::Result<()> {
                    if !*flag.borrow() {
                        *flag.borrow_mut() = true;
                        world.create_entity("child", Components::new().with(Health(1)));
                    }
                    Ok(())
                },
                false,
            )
            .unwrap();

        world.create_entity("spawner", Components::new().with(Poison));
        world.update(16.0);
        assert!(*spawned.borrow());
        // "H" ran before the spawner, so the child waits for next frame.
        assert_eq!(*calls.borrow(), vec!["h:init", "h:init:1"]);
        world.update(16.0);
        assert_eq!(*calls.borrow(), vec!["h:init", "h:init:1", "h:update:1"]);
    }

    #[test]
    fn self_matching_spawn_defers_init_until_checkin() {
        let mut world = World::new();
        let order = calls();

        struct Splitter {
            order: Calls,
        }

        impl System for Splitter {
            fn init_entity(&mut self, _world: &mut World, entity: Handle) {
                self.order.borrow_mut().push(format!("init:{}", entity.raw()));
            }

            fn update(&mut self, world: &mut World, _dt: f32, entity: Handle) -> anyhow::Result<()> {
                self.order.borrow_mut().push(format!("update:{}", entity.raw()));
                if entity.raw() == 0 {
                    world.create_entity("half", Components::new().with(Health(1)));
                }
                Ok(())
            }
        }

        world
            .register_system_for::<(Health,)>("Split", Splitter { order: order.clone() }, false)
            .unwrap();
        world.create_entity("whole", Components::new().with(Health(2)));
        world.update(16.0);

        assert_eq!(*order.borrow(), vec!["init:0", "update:0", "init:1"]);
        assert_eq!(world.entities_in_system("Split").len(), 2);
    }

    #[test]
    fn deactivation_mid_pass_skips_entity() {
        let mut world = World::new();
        let seen = calls();
        let log = seen.clone();
        world
            .register_system_for::<(Health,)>(
                "H",
                move |world: &mut World, _dt: f32, e: Handle| -> anyhow::Result<()> {
                    log.borrow_mut().push(e.raw().to_string());
                    // The first entity switches the second one off.
                    if e.raw() == 0 {
                        world.set_active::<Health>(Handle::from_raw(1), false);
                    }
                    Ok(())
                },
                false,
            )
            .unwrap();
        world.create_entity("a", Components::new().with(Health(1)));
        world.create_entity("b", Components::new().with(Health(1)));
        world.update(16.0);
        assert_eq!(*seen.borrow(), vec!["0"]);
    }

    #[test]
    fn deletions_requested_during_teardown_are_flushed() {
        let mut world = World::new();
        let log = EventLog::new();
        world.add_event_sink(log.clone());

        struct TakeFriend;
        impl System for TakeFriend {
            fn update(&mut self, _: &mut World, _: f32, _: Handle) -> anyhow::Result<()> {
                Ok(())
            }
            fn shutdown_entity(&mut self, world: &mut World, _entity: Handle) {
                for friend in world.find_by_name("friend") {
                    world.delete_entity(friend);
                }
            }
        }

        world
            .register_system_for::<(Poison,)>("Take", TakeFriend, false)
            .unwrap();
        let leader = world.create_entity("leader", Components::new().with(Poison));
        let friend = world.create_entity("friend", Components::new());
        world.delete_entity(leader);
        world.update(16.0);

        assert!(!world.is_alive(leader));
        assert!(!world.is_alive(friend));
        assert_eq!(log.count(WorldEvent::EntityDestroyed(friend)), 1);
    }

    #[test]
    fn reactivation_during_teardown_does_not_leak_membership() {
        struct Revive;
        impl System for Revive {
            fn update(&mut self, _: &mut World, _: f32, _: Handle) -> anyhow::Result<()> {
                Ok(())
            }
            fn shutdown_entity(&mut self, world: &mut World, entity: Handle) {
                world.set_active::<Poison>(entity, true);
            }
        }

        let mut world = World::new();
        world
            .register_system_for::<(Poison,)>("Revive", Revive, false)
            .unwrap();
        let e = world.create_entity("e", Components::new().with(Poison));
        world.delete_entity(e);
        world.update(16.0);
        assert!(!world.is_alive(e));
        assert!(world.entities_in_system("Revive").is_empty());

        // The recycled handle owns nothing the system requires.
        let reused = world.create_entity("plain", Components::new());
        assert_eq!(reused, e);
        assert!(world.entities_in_system("Revive").is_empty());
    }

    #[test]
    fn repeated_delete_inside_a_batch_spares_recycled_handles() {
        struct Chain;
        impl System for Chain {
            fn update(&mut self, _: &mut World, _: f32, _: Handle) -> anyhow::Result<()> {
                Ok(())
            }
            fn shutdown_entity(&mut self, world: &mut World, entity: Handle) {
                let name = world.entity_name(entity).map(str::to_string);
                match name.as_deref() {
                    Some("a") => {
                        for b in world.find_by_name("b") {
                            world.delete_entity(b);
                        }
                    }
                    Some("d") => {
                        world.create_entity("newborn", Components::new());
                    }
                    _ => {}
                }
            }
        }

        let mut world = World::new();
        world
            .register_system_for::<(Poison,)>("Chain", Chain, false)
            .unwrap();
        let b = world.create_entity("b", Components::new().with(Poison));
        let d = world.create_entity("d", Components::new().with(Poison));
        let a = world.create_entity("a", Components::new().with(Poison));

        let log = EventLog::new();
        world.add_event_sink(log.clone());
        world.delete_entity(a);
        world.delete_entity(b);
        world.delete_entity(d);
        world.update(16.0);

        let newborn = world.find_by_name("newborn");
        assert_eq!(newborn, vec![b]);
        assert!(world.is_alive(b));
        assert_eq!(
            log.events(),
            vec![
                WorldEvent::EntityDestroyed(a),
                WorldEvent::EntityDestroyed(b),
                WorldEvent::EntityCreated(b),
                WorldEvent::EntityDestroyed(d),
            ]
        );
    }

    #[test]
    fn panic_in_update_is_isolated() {
        let mut world = World::new();
        let seen = calls();
        let log = seen.clone();
        world
            .register_system_for::<(Health,)>(
                "Fragile",
                move |world: &mut World, _dt: f32, e: Handle| -> anyhow::Result<()> {
                    if world.get::<Health>(e).is_some_and(|h| h.0 < 0) {
                        panic!("negative health on {e}");
                    }
                    log.borrow_mut().push(e.raw().to_string());
                    Ok(())
                },
                false,
            )
            .unwrap();
        world.create_entity("ok", Components::new().with(Health(1)));
        world.create_entity("broken", Components::new().with(Health(-1)));
        world.create_entity("also ok", Components::new().with(Health(2)));

        world.update(16.0);
        assert_eq!(*seen.borrow(), vec!["0", "2"]);
        assert_eq!(world.system_faults("Fragile"), Some(1));

        // Checked back in and still running next frame.
        world.update(16.0);
        assert_eq!(*seen.borrow(), vec!["0", "2", "0", "2"]);
        assert_eq!(world.system_faults("Fragile"), Some(1));
    }

    #[test]
    fn init_entity_sees_every_membership() {
        struct Peek {
            other: &'static str,
            seen: Rc<RefCell<Vec<bool>>>,
        }
        impl System for Peek {
            fn init_entity(&mut self, world: &mut World, entity: Handle) {
                let member = world.entities_in_system(self.other).contains(&entity);
                self.seen.borrow_mut().push(member);
            }
            fn update(&mut self, _: &mut World, _: f32, _: Handle) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new();
        world
            .register_system_for::<(Health,)>(
                "First",
                Peek {
                    other: "Second",
                    seen: seen.clone(),
                },
                false,
            )
            .unwrap();
        world
            .register_system_for::<(Health,)>(
                "Second",
                Peek {
                    other: "First",
                    seen: seen.clone(),
                },
                false,
            )
            .unwrap();

        world.create_entity("both", Components::new().with(Health(1)));
        assert_eq!(*seen.borrow(), vec![true, true]);
    }

    #[test]
    fn update_after_shutdown_is_refused() {
        let mut world = World::new();
        let calls = calls();
        world
            .register_system_for::<(Health,)>("H", Recorder::new("h", &calls), false)
            .unwrap();
        world.shutdown();
        world.create_entity("late", Components::new().with(Health(1)));
        let before = calls.borrow().len();
        world.update(16.0);
        assert_eq!(calls.borrow().len(), before);
        assert_eq!(world.clock().frame_count(), 0);
        assert!(world.is_shut_down());
    }

    #[test]
    fn lifecycle_panics_are_contained() {
        struct BadInit;
        impl System for BadInit {
            fn init_entity(&mut self, _: &mut World, _: Handle) {
                panic!("init exploded");
            }
            fn update(&mut self, _: &mut World, _: f32, _: Handle) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let mut world = World::new();
        world
            .register_system_for::<(Poison,)>("Bad", BadInit, false)
            .unwrap();
        let e = world.create_entity("e", Components::new().with(Poison));
        assert!(world.is_alive(e));
        // Still checked in and usable.
        world.update(16.0);
        assert_eq!(world.entities_in_system("Bad"), vec![e]);
    }

    #[test]
    #[should_panic(expected = "invariant violated")]
    fn leak_after_shutdown_panics_when_strict() {
        struct Leaky;
        impl System for Leaky {
            fn update(&mut self, _: &mut World, _: f32, _: Handle) -> anyhow::Result<()> {
                Ok(())
            }
            fn shutdown(&mut self, world: &mut World) {
                world.create_entity("leak", Components::new());
            }
        }

        let mut world = World::with_config(crate::config::WorldConfig {
            strict_invariants: true,
            ..Default::default()
        });
        world.register_system("Leaky", Leaky, &[], false).unwrap();
        world.shutdown();
    }

    #[test]
    fn leak_after_shutdown_only_logs_when_lenient() {
        struct Leaky;
        impl System for Leaky {
            fn update(&mut self, _: &mut World, _: f32, _: Handle) -> anyhow::Result<()> {
                Ok(())
            }
            fn shutdown(&mut self, world: &mut World) {
                world.create_entity("leak", Components::new());
            }
        }

        let mut world = World::with_config(crate::config::WorldConfig {
            strict_invariants: false,
            ..Default::default()
        });
        world.register_system("Leaky", Leaky, &[], false).unwrap();
        world.shutdown();
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn unknown_system_name_is_empty() {
        let world = World::new();
        assert!(world.entities_in_system("Nope").is_empty());
        assert!(world.required_kinds("Nope").is_none());
    }
}
