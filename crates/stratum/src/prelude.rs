//! Convenience re-exports — `use stratum::prelude::*` for the common items.

pub use crate::config::WorldConfig;
pub use crate::ecs::hierarchy::{self, GlobalTransform, Parent};
pub use crate::ecs::{
    Components, ComponentKind, ComponentSet, Drawable, Handle, HandleStore, Layer, SceneMeta,
    System, SystemId, World,
};
pub use crate::error::{ConfigError, EcsError, StoreError};
pub use crate::event::{EditorEvent, EventLog, EventSink, WorldEvent};
pub use crate::logging::init_logger;
pub use crate::math::{Mat4, Quat, Transform, Vec2, Vec3, Vec4};
pub use crate::render::{RenderBackend, Sprite, Text, render_frame};
pub use crate::stats::WorldStats;
pub use crate::time::FrameClock;
#[cfg(feature = "diagnostics")]
pub use crate::diag::{DiagSender, send_diagnostics};
