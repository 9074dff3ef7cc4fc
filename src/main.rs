use std::sync::Arc;

use tracing::info;

use campsite::clock::{Clock, SystemClock};
use campsite::config::CampsiteConfig;
use campsite::guard::AvailabilityGuard;
use campsite::rollover;
use campsite::service::ReservationService;
use campsite::store::InMemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = CampsiteConfig::from_env();
    campsite::observability::init(config.metrics_port)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = Arc::new(InMemoryStore::new());
    let guard = Arc::new(AvailabilityGuard::new(config.window_days, clock, store));
    // Occupancy must be rebuilt before the first request is admitted.
    guard.reconcile().await?;

    let service = ReservationService::new(guard.clone(), config.date_rules());
    let report = service.read_availability(None).await?;

    info!("campsite ready");
    info!("  window: {} ({} days)", report.range, config.window_days);
    info!("  free days: {}", report.free_days.len());
    info!("  max stay: {} days", config.max_stay_days);
    info!(
        "  metrics: {}",
        config
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    let rollover = tokio::spawn(rollover::run_rollover(guard));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    rollover.abort();

    info!("campsite stopped");
    Ok(())
}
