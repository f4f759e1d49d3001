//! World events and the sink interface that observes them.
//!
//! The world doesn't own an event bus. Hosts inject one or more
//! [`EventSink`]s with [`World::add_event_sink`](crate::ecs::world::World::add_event_sink)
//! and receive every [`WorldEvent`] synchronously, in the order things
//! happen. A closure is a sink:
//!
//! ```ignore
//! world.add_event_sink(|event: &WorldEvent| log::info!("{event:?}"));
//! ```
//!
//! [`EventLog`] is a cloneable recorder for tests and tooling: keep one clone,
//! hand the other to the world.
//!
//! Going the other way, [`EditorEvent`]s are fed into the world by the
//! editor front end through
//! [`World::handle_editor_event`](crate::ecs::world::World::handle_editor_event).

use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::handle::Handle;
use crate::ecs::layer::Layer;

/// Notifications produced by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    EntityCreated(Handle),
    EntityDestroyed(Handle),
    LayerChanged(Layer),
}

/// Editor session boundaries, consumed by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// Editing starts: switch to the Debug layer.
    Start,
    /// Editing ends: go back to the layer that was running before `Start`.
    Stop,
}

/// Receiver for [`WorldEvent`]s.
pub trait EventSink {
    fn on_event(&mut self, event: &WorldEvent);
}

impl<F: FnMut(&WorldEvent)> EventSink for F {
    fn on_event(&mut self, event: &WorldEvent) {
        (self)(event);
    }
}

/// Shared recorder of world events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<WorldEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<WorldEvent> {
        self.events.borrow().clone()
    }

    /// Take everything recorded so far.
    pub fn drain(&self) -> Vec<WorldEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// How many recorded events equal `event`.
    pub fn count(&self, event: WorldEvent) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl EventSink for EventLog {
    fn on_event(&mut self, event: &WorldEvent) {
        self.events.borrow_mut().push(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_is_a_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |event: &WorldEvent| seen.push(*event);
            sink.on_event(&WorldEvent::LayerChanged(Layer::DEBUG));
        }
        assert_eq!(seen, vec![WorldEvent::LayerChanged(Layer::DEBUG)]);
    }

    #[test]
    fn event_log_clones_share_storage() {
        let log = EventLog::new();
        let mut sink = log.clone();
        let h = Handle::from_raw(1);
        sink.on_event(&WorldEvent::EntityCreated(h));
        sink.on_event(&WorldEvent::EntityDestroyed(h));
        sink.on_event(&WorldEvent::EntityCreated(h));

        assert_eq!(log.len(), 3);
        assert_eq!(log.count(WorldEvent::EntityCreated(h)), 2);
        assert_eq!(log.drain().len(), 3);
        assert!(log.is_empty());
    }
}
