//! # Handle Store — Recyclable Integer Keys
//!
//! A [`Handle`] is just a small number. It doesn't "contain" anything; the
//! [`HandleStore`] that issued it maps it to a heap-owned value. Entities,
//! systems and any other low-cardinality registry use the same store.
//!
//! ## Recycling
//!
//! When a value is released, its slot is emptied and the handle goes onto a
//! free list. The next `add` takes the *smallest* freed handle before growing
//! the slot vector, so handle numbers stay dense:
//!
//! ```text
//! slots: [Some(a), None, Some(c), None]   ← 4 slots ever allocated
//! free:  {1, 3}                           ← sorted, smallest first
//!
//! add(d) → Handle(1)
//! slots: [Some(a), Some(d), Some(c), None]
//! free:  {3}
//! ```
//!
//! A handle is never handed out twice while its value is alive. There is no
//! generation counter: once a handle is released, any copy of it still held
//! elsewhere may later resolve to a different value. Callers that keep
//! handles across frames should check liveness through the owner.
//!
//! ## Dedup
//!
//! A store can be given an equivalence predicate. With one configured, `add`
//! first scans the live entries and returns the existing handle if an
//! equivalent value is already stored (an at-most-one-copy policy, handy for
//! loaded textures or scripts). The scan is O(live count), which is fine for
//! the registries this store is meant for. It is not meant for per-frame data.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Default number of simultaneously live handles a store accepts.
pub const DEFAULT_CAPACITY: u32 = 10_000;

/// A small recyclable integer identifying a value in a [`HandleStore`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(pub(crate) u32);

impl Handle {
    /// The reserved sentinel. Never issued by a store.
    pub const INVALID: Handle = Handle(u32::MAX);

    /// Build a handle from its raw value. Mostly for tests and tooling.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// `false` for [`Handle::INVALID`].
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Handle({})", self.0)
        } else {
            write!(f, "Handle(INVALID)")
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#invalid")
        }
    }
}

type DedupFn<T> = Box<dyn Fn(&T, &T) -> bool>;

/// A keyed container mapping recyclable [`Handle`]s to owned values.
pub struct HandleStore<T> {
    /// One slot per handle ever allocated; `None` while freed.
    slots: Vec<Option<T>>,
    /// Released handles, smallest first.
    free: BTreeSet<u32>,
    /// Number of `Some` slots.
    live: usize,
    /// Upper bound on `slots.len()`.
    capacity: u32,
    dedup: Option<DedupFn<T>>,
}

impl<T> HandleStore<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a store that refuses to grow beyond `capacity` slots.
    ///
    /// The sentinel value is reserved, so the capacity is clamped below it.
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            slots: Vec::new(),
            free: BTreeSet::new(),
            live: 0,
            capacity: capacity.min(Handle::INVALID.0),
            dedup: None,
        }
    }

    /// Configure the at-most-one-copy policy: `add` returns the handle of an
    /// existing live entry when `equivalent(existing, new)` holds.
    pub fn with_dedup(mut self, equivalent: impl Fn(&T, &T) -> bool + 'static) -> Self {
        self.dedup = Some(Box::new(equivalent));
        self
    }

    /// Store a value and return its handle.
    ///
    /// Returns [`Handle::INVALID`] (and logs a warning) when the store is
    /// full. Use [`try_add`](Self::try_add) to get the error instead.
    pub fn add(&mut self, value: T) -> Handle {
        match self.try_add(value) {
            Ok(handle) => handle,
            Err(err) => {
                log::warn!("{err}; returning invalid handle");
                Handle::INVALID
            }
        }
    }

    /// Store a value, reporting capacity exhaustion as an error.
    pub fn try_add(&mut self, value: T) -> Result<Handle, StoreError> {
        if let Some(existing) = self.find_equivalent(&value) {
            return Ok(existing);
        }

        if let Some(index) = self.free.pop_first() {
            self.slots[index as usize] = Some(value);
            self.live += 1;
            return Ok(Handle(index));
        }

        let next = self.slots.len();
        if next >= self.capacity as usize {
            return Err(StoreError::CapacityExhausted {
                capacity: self.capacity,
            });
        }
        self.slots.push(Some(value));
        self.live += 1;
        Ok(Handle(next as u32))
    }

    fn find_equivalent(&self, value: &T) -> Option<Handle> {
        let equivalent = self.dedup.as_ref()?;
        self.iter()
            .find(|(_, existing)| equivalent(existing, value))
            .map(|(handle, _)| handle)
    }

    /// Get the value behind a handle. `None` if out of range or freed.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots.get_mut(handle.0 as usize)?.as_mut()
    }

    /// Whether the handle currently refers to a live value.
    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Empty the slot and return the handle to the free pool.
    ///
    /// Returns the released value, or `None` (a no-op) if the slot was
    /// already empty or never allocated.
    pub fn release(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.0 as usize)?;
        let value = slot.take()?;
        self.free.insert(handle.0);
        self.live -= 1;
        Some(value)
    }

    /// All live handles in ascending order.
    pub fn available_ids(&self) -> Vec<Handle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Invoke `f` once per live entry, in ascending handle order.
    pub fn for_each(&self, mut f: impl FnMut(Handle, &T)) {
        for (handle, value) in self.iter() {
            f(handle, value);
        }
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(Handle, &mut T)) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot {
                f(Handle(index as u32), value);
            }
        }
    }

    /// Iterate live entries in ascending handle order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (Handle(index as u32), value)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|value| (Handle(index as u32), value)))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of released handles waiting for reuse.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Number of slots ever allocated (live + free).
    pub fn total_slots(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

impl<T> Default for HandleStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for HandleStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleStore")
            .field("live", &self.live)
            .field("free", &self.free.len())
            .field("capacity", &self.capacity)
            .field("dedup", &self.dedup.is_some())
            .finish()
    }
}
