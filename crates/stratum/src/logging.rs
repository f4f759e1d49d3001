//! Logger setup.
//!
//! stratum logs through the `log` facade everywhere. [`init_logger`] installs
//! `env_logger` (filter from `RUST_LOG`, info by default). With the
//! `diagnostics` feature the logger is wrapped in
//! [`DiagLogger`](crate::diag::DiagLogger) so records also reach the
//! telemetry dashboard.
//!
//! Call it once, early. Later calls, or calls after the host installed its
//! own logger, print a warning and leave the existing logger alone.

#[cfg(feature = "diagnostics")]
static DIAG_LOGGER: std::sync::OnceLock<crate::diag::DiagLogger> = std::sync::OnceLock::new();

#[cfg(feature = "diagnostics")]
pub fn init_logger() {
    let inner = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .build();
    let max_level = inner.filter();

    let logger = DIAG_LOGGER.get_or_init(|| crate::diag::DiagLogger::new(inner));
    if log::set_logger(logger).is_err() {
        eprintln!("[stratum] Warning: a logger is already set. Log capture disabled.");
        return;
    }
    log::set_max_level(max_level.max(log::LevelFilter::Info));
}

#[cfg(not(feature = "diagnostics"))]
pub fn init_logger() {
    let result = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
    if result.is_err() {
        eprintln!("[stratum] Warning: a logger is already set.");
    }
}
