//! Error types for the handle store, the world and configuration loading.
//!
//! Most lookups in stratum never fail loudly: an unknown handle or component
//! kind is logged and answered with `None`. The types here cover the few
//! places where the caller must be told something went wrong:
//!
//! - [`StoreError`]: a [`HandleStore`](crate::ecs::handle::HandleStore) ran
//!   out of capacity.
//! - [`EcsError`]: registration or entity creation was rejected.
//! - [`ConfigError`]: a [`WorldConfig`](crate::config::WorldConfig) could not
//!   be read or failed validation.
//!
//! All of them implement [`std::error::Error`] and [`fmt::Display`], with
//! `From` conversions so `?` can lift a low-level error into a higher one.

use std::fmt;
use std::io;

use crate::ecs::layer::Layer;

/// Returned when a handle store has no free slot left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Every slot up to `capacity` is live and the free list is empty.
    CapacityExhausted { capacity: u32 },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::CapacityExhausted { capacity } => {
                write!(f, "handle store is full ({capacity} live handles)")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors reported by [`World`](crate::ecs::world::World) operations that
/// the caller is expected to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A system with this name is already registered.
    DuplicateSystem(String),
    /// The insertion cursor does not point at a valid layer.
    LayerOutOfRange(Layer),
    /// The freshly allocated handle was already present in the target bucket.
    AlreadyInLayer { layer: Layer },
    /// The entity store is full.
    Store(StoreError),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::DuplicateSystem(name) => {
                write!(f, "a system named '{name}' is already registered")
            }
            EcsError::LayerOutOfRange(layer) => {
                write!(f, "layer {layer} is out of range")
            }
            EcsError::AlreadyInLayer { layer } => {
                write!(f, "entity is already present in layer {layer}")
            }
            EcsError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EcsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EcsError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for EcsError {
    fn from(err: StoreError) -> Self {
        EcsError::Store(err)
    }
}

/// Errors from loading or validating a [`WorldConfig`](crate::config::WorldConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(io::Error),
    /// The config text is not valid JSON for the config schema.
    Parse(serde_json::Error),
    /// The config parsed but a value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config: {err}"),
            ConfigError::Parse(err) => write!(f, "failed to parse config: {err}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}
