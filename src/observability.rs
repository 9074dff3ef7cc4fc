use std::net::SocketAddr;

use crate::guard::CampsiteError;

// ── Request-driven metrics ──────────────────────────────────────

/// Counter: availability reads. Labels: path (optimistic, fallback).
pub const AVAILABILITY_READS_TOTAL: &str = "campsite_availability_reads_total";

/// Counter: write operations. Labels: op, status.
pub const OPERATIONS_TOTAL: &str = "campsite_operations_total";

/// Histogram: time spent waiting for the exclusive write lock, in seconds.
pub const WRITE_LOCK_WAIT_SECONDS: &str = "campsite_write_lock_wait_seconds";

// ── Window state ────────────────────────────────────────────────

/// Gauge: occupied bookable days in the window.
pub const OCCUPIED_DAYS: &str = "campsite_occupied_days";

/// Counter: day-rollover advances applied.
pub const WINDOW_ADVANCES_TOTAL: &str = "campsite_window_advances_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

/// Outcome label for `OPERATIONS_TOTAL`.
pub fn status_label<T>(result: &Result<T, CampsiteError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) => e.kind().code(),
    }
}
