//! World configuration.
//!
//! Everything has a sensible default, so most hosts use
//! `WorldConfig::default()`. A config can also come from JSON; missing fields
//! keep their defaults:
//!
//! ```json
//! { "handle_capacity": 2048, "initial_layer": 1 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ecs::handle::DEFAULT_CAPACITY;
use crate::ecs::layer::{LAYER_COUNT, Layer};
use crate::error::ConfigError;

/// Largest `layer_priority_range` whose Debug-layer offset still fits in
/// an `i32`.
pub const MAX_LAYER_PRIORITY_RANGE: i32 = i32::MAX / (LAYER_COUNT as i32 - 1);

/// Tunables for a [`World`](crate::ecs::world::World).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maximum number of simultaneously live entities.
    pub handle_capacity: u32,
    /// Draw-priority offset per layer index, applied once at creation.
    pub layer_priority_range: i32,
    /// Panic on invariant violations instead of only logging them.
    pub strict_invariants: bool,
    /// Initial insertion cursor and running layer.
    pub initial_layer: Layer,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            handle_capacity: DEFAULT_CAPACITY,
            layer_priority_range: 1000,
            strict_invariants: cfg!(debug_assertions),
            initial_layer: Layer::BASE,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::info!("loaded world config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handle_capacity == 0 {
            return Err(ConfigError::Invalid("handle_capacity must be > 0".into()));
        }
        if self.layer_priority_range <= 0 || self.layer_priority_range > MAX_LAYER_PRIORITY_RANGE {
            return Err(ConfigError::Invalid(format!(
                "layer_priority_range must be in 1..={MAX_LAYER_PRIORITY_RANGE}, got {}",
                self.layer_priority_range
            )));
        }
        if !self.initial_layer.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "initial_layer {} is out of range",
                self.initial_layer
            )));
        }
        Ok(())
    }
}
