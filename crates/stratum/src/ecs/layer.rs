//! # Layers — What Is Drawn, What Is Updated
//!
//! Every live entity sits in exactly one of [`LAYER_COUNT`] ordered buckets:
//!
//! ```text
//!   index  layer
//!   ─────  ─────────
//!     4    Debug      ← editor-only, topmost
//!     3    Overlay2
//!     2    Overlay1
//!     1    Overlay0
//!     0    Base       ← the game world
//! ```
//!
//! Two pointers select layers:
//!
//! - the **insertion cursor** (`begin_layer`) picks the bucket for entities
//!   created from now on. The choice is permanent for the entity's lifetime.
//! - the **running layer** (`make_visible`) picks what happens this frame.
//!
//! From the running layer the manager derives two cached sets:
//!
//! ```text
//!   drawn    = Base + remembered overlay (if any) + Debug (if running)
//!   eligible = members of the running layer only
//! ```
//!
//! Systems flagged `always_update` visit the drawn set; the rest only visit
//! the eligible set. So a pause menu on Overlay0 freezes gameplay systems on
//! Base while Base stays on screen under it.
//!
//! ## Overlay memory
//!
//! Making an overlay visible remembers it; making Base visible forgets it.
//! Switching to Debug keeps whatever overlay was remembered, and the layer
//! that was running before Debug is kept as `previous` so an editor session
//! can resume exactly where it started.
//!
//! Both caches are kept coherent on every insert and remove, so an entity
//! created in the running layer is eligible right away.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::handle::Handle;

/// Number of layer buckets: Base, three overlays, Debug.
pub const LAYER_COUNT: usize = 5;

/// An index into the fixed list of layers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Layer(u8);

impl Layer {
    pub const BASE: Layer = Layer(0);
    pub const OVERLAY_0: Layer = Layer(1);
    pub const OVERLAY_1: Layer = Layer(2);
    pub const OVERLAY_2: Layer = Layer(3);
    pub const DEBUG: Layer = Layer(LAYER_COUNT as u8 - 1);

    /// Build a layer from a raw index. The result may be out of range; check
    /// with [`is_valid`](Self::is_valid).
    pub const fn from_index(index: u8) -> Self {
        Self(index)
    }

    /// The `n`-th overlay (0-based).
    pub const fn overlay(n: u8) -> Self {
        Self(n.saturating_add(1))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_valid(self) -> bool {
        self.index() < LAYER_COUNT
    }

    /// Strictly between Base and Debug.
    pub fn is_overlay(self) -> bool {
        self.0 > Self::BASE.0 && self.0 < Self::DEBUG.0
    }

    /// All valid layers, bottom to top.
    pub fn all() -> impl Iterator<Item = Layer> {
        (0..LAYER_COUNT as u8).map(Layer)
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::BASE
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Layer::BASE => write!(f, "Base"),
            Layer::DEBUG => write!(f, "Debug"),
            l if l.is_overlay() => write!(f, "Overlay{}", l.0 - 1),
            l => write!(f, "Layer({})", l.0),
        }
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Owns the layer buckets and the drawn/eligible caches.
#[derive(Debug)]
pub struct LayerManager {
    buckets: [Vec<Handle>; LAYER_COUNT],
    cursor: Layer,
    running: Layer,
    overlay: Option<Layer>,
    previous: Layer,
    drawn: HashSet<Handle>,
    eligible: HashSet<Handle>,
}

impl LayerManager {
    /// Start with cursor and running layer both at `initial`.
    pub fn new(initial: Layer) -> Self {
        let initial = if initial.is_valid() {
            initial
        } else {
            log::warn!("initial layer {initial} is out of range, using Base");
            Layer::BASE
        };
        Self {
            buckets: Default::default(),
            cursor: initial,
            running: initial,
            overlay: initial.is_overlay().then_some(initial),
            previous: initial,
            drawn: HashSet::new(),
            eligible: HashSet::new(),
        }
    }

    /// Set the insertion cursor. Returns `false` (and warns) if out of range.
    pub fn begin_layer(&mut self, layer: Layer) -> bool {
        if !layer.is_valid() {
            log::warn!("begin_layer: {layer} is out of range, ignoring");
            return false;
        }
        self.cursor = layer;
        true
    }

    /// Switch the running layer and recompute both caches.
    ///
    /// Returns `false` (and warns) if out of range. The caller is
    /// responsible for announcing the change.
    pub fn make_visible(&mut self, layer: Layer) -> bool {
        if !layer.is_valid() {
            log::warn!("make_visible: {layer} is out of range, ignoring");
            return false;
        }
        if layer == Layer::DEBUG && self.running != Layer::DEBUG {
            self.previous = self.running;
        }
        if layer.is_overlay() {
            self.overlay = Some(layer);
        } else if layer == Layer::BASE {
            self.overlay = None;
        }
        self.running = layer;
        self.recompute();
        log::debug!("running layer is now {layer} (overlay: {:?})", self.overlay);
        true
    }

    fn recompute(&mut self) {
        self.drawn.clear();
        for layer in self.drawn_layers() {
            self.drawn.extend(self.buckets[layer.index()].iter().copied());
        }
        self.eligible.clear();
        self.eligible
            .extend(self.buckets[self.running.index()].iter().copied());
    }

    /// Layers in the drawn set, bottom to top.
    pub fn drawn_layers(&self) -> Vec<Layer> {
        let mut layers = vec![Layer::BASE];
        if let Some(overlay) = self.overlay {
            layers.push(overlay);
        }
        if self.running == Layer::DEBUG {
            layers.push(Layer::DEBUG);
        }
        layers
    }

    fn is_drawn_layer(&self, layer: Layer) -> bool {
        layer == Layer::BASE
            || self.overlay == Some(layer)
            || (layer == Layer::DEBUG && self.running == Layer::DEBUG)
    }

    /// Append `entity` to `layer`'s bucket. Returns `false` if the layer is
    /// out of range or the entity is already there.
    pub(crate) fn insert(&mut self, entity: Handle, layer: Layer) -> bool {
        if !layer.is_valid() || self.contains(layer, entity) {
            return false;
        }
        self.buckets[layer.index()].push(entity);
        if self.is_drawn_layer(layer) {
            self.drawn.insert(entity);
        }
        if layer == self.running {
            self.eligible.insert(entity);
        }
        true
    }

    /// Remove `entity` from `layer`'s bucket and from both caches.
    pub(crate) fn remove(&mut self, entity: Handle, layer: Layer) -> bool {
        let Some(bucket) = self.buckets.get_mut(layer.index()) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|&h| h != entity);
        self.drawn.remove(&entity);
        self.eligible.remove(&entity);
        bucket.len() != before
    }

    pub fn contains(&self, layer: Layer, entity: Handle) -> bool {
        self.bucket(layer).contains(&entity)
    }

    /// The layer whose bucket holds `entity`. Linear in the number of
    /// entities; the world keeps the layer on the entity record for fast
    /// lookups.
    pub fn layer_of(&self, entity: Handle) -> Option<Layer> {
        Layer::all().find(|&layer| self.contains(layer, entity))
    }

    /// Entities in `layer`, in insertion order. Empty if out of range.
    pub fn bucket(&self, layer: Layer) -> &[Handle] {
        self.buckets
            .get(layer.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Drawn entities ordered by layer, then insertion order.
    pub fn drawn(&self) -> Vec<Handle> {
        self.drawn_layers()
            .into_iter()
            .flat_map(|layer| self.bucket(layer).iter().copied())
            .collect()
    }

    /// Update-eligible entities in insertion order.
    pub fn update_eligible(&self) -> Vec<Handle> {
        self.bucket(self.running).to_vec()
    }

    pub fn is_drawn(&self, entity: Handle) -> bool {
        self.drawn.contains(&entity)
    }

    pub fn is_update_eligible(&self, entity: Handle) -> bool {
        self.eligible.contains(&entity)
    }

    pub fn drawn_count(&self) -> usize {
        self.drawn.len()
    }

    pub fn eligible_count(&self) -> usize {
        self.eligible.len()
    }

    pub fn cursor(&self) -> Layer {
        self.cursor
    }

    pub fn running(&self) -> Layer {
        self.running
    }

    /// The remembered secondary overlay.
    pub fn overlay(&self) -> Option<Layer> {
        self.overlay
    }

    /// The layer that was running before the last switch into Debug.
    pub fn previous(&self) -> Layer {
        self.previous
    }

    /// Bucket sizes, bottom to top.
    pub fn bucket_sizes(&self) -> [usize; LAYER_COUNT] {
        std::array::from_fn(|i| self.buckets[i].len())
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new(Layer::BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(n: u32) -> Handle {
        Handle::from_raw(n)
    }

    #[test]
    fn layer_names() {
        assert_eq!(Layer::BASE.to_string(), "Base");
        assert_eq!(Layer::overlay(1).to_string(), "Overlay1");
        assert_eq!(Layer::DEBUG.to_string(), "Debug");
        assert_eq!(Layer::from_index(9).to_string(), "Layer(9)");
        assert!(!Layer::from_index(9).is_valid());
        assert!(Layer::OVERLAY_2.is_overlay());
        assert!(!Layer::DEBUG.is_overlay());
    }

    #[test]
    fn begin_layer_rejects_out_of_range() {
        let mut layers = LayerManager::default();
        assert!(layers.begin_layer(Layer::OVERLAY_1));
        assert!(!layers.begin_layer(Layer::from_index(LAYER_COUNT as u8)));
        assert_eq!(layers.cursor(), Layer::OVERLAY_1);
    }

    #[test]
    fn drawn_and_eligible_follow_running_layer() {
        let mut layers = LayerManager::default();
        layers.insert(h(0), Layer::BASE);
        layers.insert(h(1), Layer::OVERLAY_0);
        layers.insert(h(2), Layer::OVERLAY_1);

        // Base only at start.
        assert_eq!(layers.drawn(), vec![h(0)]);
        assert_eq!(layers.update_eligible(), vec![h(0)]);

        layers.make_visible(Layer::OVERLAY_0);
        assert_eq!(layers.drawn(), vec![h(0), h(1)]);
        assert!(layers.is_update_eligible(h(1)));
        assert!(!layers.is_update_eligible(h(0)));
        assert!(!layers.is_drawn(h(2)));

        layers.make_visible(Layer::BASE);
        assert_eq!(layers.overlay(), None);
        assert_eq!(layers.drawn(), vec![h(0)]);
    }

    #[test]
    fn debug_keeps_overlay_and_remembers_previous() {
        let mut layers = LayerManager::default();
        layers.insert(h(0), Layer::BASE);
        layers.insert(h(1), Layer::OVERLAY_2);
        layers.insert(h(2), Layer::DEBUG);

        layers.make_visible(Layer::OVERLAY_2);
        layers.make_visible(Layer::DEBUG);
        assert_eq!(layers.previous(), Layer::OVERLAY_2);
        assert_eq!(layers.drawn(), vec![h(0), h(1), h(2)]);
        assert_eq!(layers.update_eligible(), vec![h(2)]);

        // Re-entering Debug does not overwrite `previous`.
        layers.make_visible(Layer::DEBUG);
        assert_eq!(layers.previous(), Layer::OVERLAY_2);
    }

    #[test]
    fn make_visible_out_of_range_is_ignored() {
        let mut layers = LayerManager::default();
        layers.make_visible(Layer::OVERLAY_0);
        assert!(!layers.make_visible(Layer::from_index(200)));
        assert_eq!(layers.running(), Layer::OVERLAY_0);
    }

    #[test]
    fn caches_stay_coherent_on_insert_and_remove() {
        let mut layers = LayerManager::default();
        layers.make_visible(Layer::OVERLAY_0);
        assert!(layers.insert(h(5), Layer::OVERLAY_0));
        assert!(layers.is_update_eligible(h(5)));
        assert!(layers.is_drawn(h(5)));
        assert!(!layers.insert(h(5), Layer::OVERLAY_0));

        assert!(layers.remove(h(5), Layer::OVERLAY_0));
        assert!(!layers.is_update_eligible(h(5)));
        assert!(!layers.is_drawn(h(5)));
        assert!(layers.is_empty());
    }

    #[test]
    fn layer_of_and_bucket_sizes() {
        let mut layers = LayerManager::default();
        layers.insert(h(0), Layer::BASE);
        layers.insert(h(1), Layer::DEBUG);
        layers.insert(h(2), Layer::DEBUG);
        assert_eq!(layers.layer_of(h(2)), Some(Layer::DEBUG));
        assert_eq!(layers.layer_of(h(9)), None);
        assert_eq!(layers.bucket_sizes(), [1, 0, 0, 0, 2]);
    }
}
