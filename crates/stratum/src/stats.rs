//! Plain-data snapshot of a world's runtime state.
//!
//! [`World::stats`] is cheap enough to call every frame. The diagnostics
//! sender serializes the same structs for the telemetry dashboard.

use serde::{Deserialize, Serialize};

use crate::ecs::layer::Layer;
use crate::ecs::world::World;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub frame_count: u64,
    pub fps: f32,
    pub delta_ms: f32,
    pub elapsed_secs: f32,
    pub pool: PoolStats,
    pub systems: Vec<SystemStats>,
    pub layers: LayerStats,
    pub pending_deletions: usize,
}

/// Entity store occupancy. The per-frame counters cover the span since the
/// latest `update` started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolStats {
    pub capacity: u32,
    pub total_slots: u32,
    pub free_count: usize,
    pub alive_count: usize,
    pub created_this_frame: u32,
    pub destroyed_this_frame: u32,
}

impl PoolStats {
    /// Share of allocated slots that are currently free, in percent.
    pub fn fragmentation_pct(&self) -> f32 {
        if self.total_slots == 0 {
            0.0
        } else {
            self.free_count as f32 / self.total_slots as f32 * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub name: String,
    pub required: Vec<String>,
    pub members: usize,
    pub always_update: bool,
    /// Wall time of the latest sweep. Always 0 without the `diagnostics`
    /// feature.
    pub last_duration_us: f64,
    pub faults_last_frame: u32,
    pub faults_total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStats {
    pub cursor: Layer,
    pub running: Layer,
    pub overlay: Option<Layer>,
    pub previous: Layer,
    /// Bucket sizes, bottom to top.
    pub bucket_sizes: Vec<usize>,
    pub drawn: usize,
    pub eligible: usize,
}

impl World {
    pub fn stats(&self) -> WorldStats {
        let systems = self
            .systems
            .iter()
            .map(|(_, slot)| SystemStats {
                name: slot.name.clone(),
                required: slot
                    .required
                    .iter()
                    .map(|&kind| self.registry.name(kind).to_string())
                    .collect(),
                members: slot.members.len(),
                always_update: slot.always_update,
                #[cfg(feature = "diagnostics")]
                last_duration_us: slot.last_duration_us,
                #[cfg(not(feature = "diagnostics"))]
                last_duration_us: 0.0,
                faults_last_frame: slot.faults_last_frame,
                faults_total: slot.faults_total,
            })
            .collect();

        WorldStats {
            frame_count: self.clock.frame_count(),
            fps: self.clock.fps(),
            delta_ms: self.clock.delta_ms(),
            elapsed_secs: self.clock.elapsed_secs(),
            pool: PoolStats {
                capacity: self.entities.capacity(),
                total_slots: self.entities.total_slots(),
                free_count: self.entities.free_count(),
                alive_count: self.entities.len(),
                created_this_frame: self.created_this_frame,
                destroyed_this_frame: self.destroyed_this_frame,
            },
            systems,
            layers: LayerStats {
                cursor: self.layers.cursor(),
                running: self.layers.running(),
                overlay: self.layers.overlay(),
                previous: self.layers.previous(),
                bucket_sizes: self.layers.bucket_sizes().to_vec(),
                drawn: self.layers.drawn_count(),
                eligible: self.layers.eligible_count(),
            },
            pending_deletions: self.deletions.len(),
        }
    }
}
