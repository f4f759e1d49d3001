//! # Stratum — Layered Entity Runtime
//!
//! A small entity-component runtime for 2D scenes: a handle store, a world
//! of entities with type-erased components, systems that run once per frame
//! over the entities carrying their required components, and a five-layer
//! stack (Base, three overlays, Debug) that controls what is drawn and what
//! is updated.
//!
//! Start with `use stratum::prelude::*` and a [`World`](ecs::World).

pub mod config;
pub mod ecs;
pub mod error;
pub mod event;
pub mod logging;
pub mod math;
pub mod prelude;
pub mod render;
pub mod stats;
pub mod time;

#[cfg(feature = "diagnostics")]
pub mod diag;
