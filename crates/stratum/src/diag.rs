//! Diagnostics sender: ships live world metrics to `stratum-telemetry` over UDP.
//!
//! Enabled by the `diagnostics` feature flag. The host owns a [`DiagSender`]
//! and calls [`send_diagnostics`] once per frame (throttled to 10 Hz
//! internally). Each send serializes a JSON [`DiagSnapshot`] built from
//! [`World::stats`] plus any log records captured since the last send, and
//! fires it at `127.0.0.1:9100`.
//!
//! Log capture works through [`DiagLogger`], a `log::Log` that writes every
//! record to stderr via `env_logger` *and* into a 500-entry ring buffer.
//! [`crate::logging::init_logger`] installs it.

use std::collections::VecDeque;
use std::net::UdpSocket;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::ecs::world::World;
use crate::stats::WorldStats;

/// Address the telemetry dashboard listens on.
pub const TELEMETRY_ADDR: &str = "127.0.0.1:9100";

/// Minimum time between two datagrams.
const SEND_INTERVAL: Duration = Duration::from_millis(100);

/// Captured log records kept in memory.
const LOG_RING_CAPACITY: usize = 500;

/// Captured log records shipped per datagram.
const LOGS_PER_SEND: usize = 50;

// ── DiagSender ───────────────────────────────────────────────────────────

/// Owns the outbound UDP socket and the throttling state.
pub struct DiagSender {
    socket: UdpSocket,
    last_send: Option<Instant>,
}

impl DiagSender {
    /// Bind an ephemeral local port connected to [`TELEMETRY_ADDR`].
    ///
    /// `None` if the socket can't be set up; diagnostics are optional and
    /// the host should carry on without them.
    pub fn new() -> Option<Self> {
        Self::connect(TELEMETRY_ADDR)
    }

    pub fn connect(addr: &str) -> Option<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").ok()?;
        socket.connect(addr).ok()?;
        socket.set_nonblocking(true).ok()?;
        Some(Self {
            socket,
            last_send: None,
        })
    }

    fn due(&mut self, now: Instant) -> bool {
        match self.last_send {
            Some(last) if now.duration_since(last) < SEND_INTERVAL => false,
            _ => {
                self.last_send = Some(now);
                true
            }
        }
    }
}

// ── Snapshot types (wire format) ────────────────────────────────────────

/// One datagram.
#[derive(Debug, Serialize)]
pub struct DiagSnapshot {
    pub world: WorldStats,
    pub fragmentation_pct: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<LogEntrySnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntrySnapshot {
    pub level: String,
    pub target: String,
    pub message: String,
    pub timestamp_secs: f32,
}

impl DiagSnapshot {
    pub fn capture(world: &World, logs: Vec<LogEntrySnapshot>) -> Self {
        let world = world.stats();
        Self {
            fragmentation_pct: world.pool.fragmentation_pct(),
            world,
            logs,
        }
    }
}

// ── Log Capture ──────────────────────────────────────────────────────────

/// Bounded FIFO of captured records.
struct LogRing {
    entries: VecDeque<LogEntrySnapshot>,
}

impl LogRing {
    const fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    fn push(&mut self, entry: LogEntrySnapshot) {
        if self.entries.len() >= LOG_RING_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    fn drain(&mut self, max: usize) -> Vec<LogEntrySnapshot> {
        let n = self.entries.len().min(max);
        self.entries.drain(..n).collect()
    }
}

static LOG_RING: Mutex<LogRing> = Mutex::new(LogRing::new());
static LOG_START: OnceLock<Instant> = OnceLock::new();

/// Delegates to `env_logger` for stderr and copies every record at info or
/// above (or whatever `RUST_LOG` enables) into the ring buffer.
pub struct DiagLogger {
    inner: env_logger::Logger,
}

impl DiagLogger {
    pub fn new(inner: env_logger::Logger) -> Self {
        LOG_START.get_or_init(Instant::now);
        Self { inner }
    }
}

impl log::Log for DiagLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata) || metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp_secs = LOG_START
            .get()
            .map(|start| start.elapsed().as_secs_f32())
            .unwrap_or(0.0);
        let entry = LogEntrySnapshot {
            level: record.level().to_string(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            timestamp_secs,
        };
        if let Ok(mut ring) = LOG_RING.lock() {
            ring.push(entry);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Take up to `max` captured records, oldest first.
pub fn drain_captured_logs(max: usize) -> Vec<LogEntrySnapshot> {
    match LOG_RING.lock() {
        Ok(mut ring) => ring.drain(max),
        Err(_) => Vec::new(),
    }
}

// ── send_diagnostics ─────────────────────────────────────────────────────

/// Called once per frame. Sends at most every 100 ms; returns whether a
/// datagram went out.
pub fn send_diagnostics(world: &World, sender: &mut DiagSender) -> bool {
    if !sender.due(Instant::now()) {
        return false;
    }

    let snapshot = DiagSnapshot::capture(world, drain_captured_logs(LOGS_PER_SEND));
    match serde_json::to_vec(&snapshot) {
        // Fire-and-forget: nobody listening is not an error.
        Ok(json) => sender.socket.send(&json).is_ok(),
        Err(err) => {
            log::debug!("failed to serialize diagnostics: {err}");
            false
        }
    }
}
