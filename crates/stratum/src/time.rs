//! Frame timing.
//!
//! The [`FrameClock`] is advanced by [`World::update`](crate::ecs::world::World::update)
//! with the host's delta, so time in stratum is whatever the host says it is.
//! Tests can drive it with fixed steps.

/// Weight of the newest sample in the smoothed FPS.
const FPS_SMOOTHING: f32 = 0.1;

/// Frame counter and clock, driven by `update(dt_ms)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    frame_count: u64,
    delta_ms: f32,
    elapsed_ms: f64,
    fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame that lasted `dt_ms` milliseconds.
    pub(crate) fn advance(&mut self, dt_ms: f32) {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        self.frame_count += 1;
        self.delta_ms = dt_ms;
        self.elapsed_ms += f64::from(dt_ms);
        if dt_ms > 0.0 {
            let instant = 1000.0 / dt_ms;
            self.fps = if self.fps == 0.0 {
                instant
            } else {
                self.fps + (instant - self.fps) * FPS_SMOOTHING
            };
        }
    }

    /// Number of `update` calls so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Delta of the most recent frame in milliseconds.
    pub fn delta_ms(&self) -> f32 {
        self.delta_ms
    }

    /// Delta in seconds, the usual unit for movement code.
    pub fn delta_secs(&self) -> f32 {
        self.delta_ms / 1000.0
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn elapsed_secs(&self) -> f32 {
        (self.elapsed_ms / 1000.0) as f32
    }

    /// Exponentially smoothed frames per second.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}
