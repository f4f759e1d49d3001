//! # Entity Runtime — Handles, Entities, Systems and Layers
//!
//! The world owns every entity and component and drives the registered
//! systems once per frame. Entities live on one of five stacked layers;
//! the layer manager decides which of them are drawn and which are updated.
//!
//! ## Module Overview
//!
//! - [`handle`] — Dense integer handles with lowest-free-id reuse
//! - [`component`] — Component kinds, the kind registry, drawable priorities
//! - [`entity`] — Entity records, the `Components` builder, the deletion queue
//! - [`layer`] — Layer ids, drawn and update-eligible sets
//! - [`system`] — The `System` trait and the system registry
//! - [`schedule`] — Registration, membership and the frame loop
//! - [`world`] — Central container tying the above together
//! - [`hierarchy`] — Parent links and world-space transforms

pub mod component;
pub mod entity;
pub mod handle;
pub mod hierarchy;
pub mod layer;
pub mod schedule;
pub mod system;
pub mod world;

pub use component::{AnyComponent, ComponentKind, ComponentRegistry, Drawable, KindDescriptor};
pub use entity::{Components, SceneMeta};
pub use handle::{Handle, HandleStore};
pub use hierarchy::{GlobalTransform, Parent};
pub use layer::{LAYER_COUNT, Layer, LayerManager};
pub use schedule::ComponentSet;
pub use system::{System, SystemId};
pub use world::World;
