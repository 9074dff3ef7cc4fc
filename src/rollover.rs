use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Local, NaiveTime, TimeZone};
use tracing::debug;

use crate::guard::AvailabilityGuard;

/// Background task that shifts the calendar shortly after each local
/// midnight, so the first request of the day finds it already aligned.
/// Requests that arrive earlier align it themselves.
pub async fn run_rollover(guard: Arc<AvailabilityGuard>) {
    loop {
        let wait = duration_until_next_day(&Local::now());
        debug!("next rollover in {}s", wait.as_secs());
        tokio::time::sleep(wait).await;
        let days = guard.advance().await;
        if days == 0 {
            debug!("rollover woke before the date changed");
        }
    }
}

/// Time left until the next midnight in `now`'s time zone, at least one
/// millisecond. Follows the zone's offset changes, so a 23 or 25 hour day
/// sleeps 23 or 25 hours.
pub fn duration_until_next_day<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    let next_date = now.date_naive() + Days::new(1);
    let naive_midnight = next_date.and_time(NaiveTime::MIN);
    let wait = match now.timezone().from_local_datetime(&naive_midnight).earliest() {
        Some(midnight) => midnight.signed_duration_since(now.clone()),
        // Midnight skipped by a forward shift: the new day starts when the
        // wall clock would have reached it.
        None => naive_midnight.signed_duration_since(now.naive_local()),
    };
    wait.to_std().unwrap_or(Duration::ZERO).max(Duration::from_millis(1))
}
