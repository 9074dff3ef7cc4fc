use chrono::NaiveDate;

use crate::calendar::WindowedCalendar;
use crate::model::DateRange;
use crate::observability;

use super::AvailabilityGuard;

impl AvailabilityGuard {
    /// Free days in `range`, ascending.
    ///
    /// Tries a lock-free read first and falls back to the shared lock when a
    /// writer touched the calendar during the scan. Either way the result is
    /// a consistent snapshot: all of one write or none of it. Days the
    /// calendar does not track yet are never reported free.
    pub async fn read_availability(&self, range: &DateRange) -> Vec<NaiveDate> {
        self.align_for_read().await;

        let scan = |calendar: &WindowedCalendar| {
            calendar
                .clamp(range)
                .map(|tracked| calendar.read_availability(&tracked))
                .unwrap_or_default()
        };
        if let Some(free) = self.read_optimistic(scan) {
            metrics::counter!(observability::AVAILABILITY_READS_TOTAL, "path" => "optimistic")
                .increment(1);
            return free;
        }

        metrics::counter!(observability::AVAILABILITY_READS_TOTAL, "path" => "fallback")
            .increment(1);
        let _shared = self.lock.read().await;
        scan(&self.calendar)
    }

    /// Whether every day in `range` is free right now. Advisory only: the
    /// answer may be stale by the time a booking is attempted.
    pub async fn is_available(&self, range: &DateRange) -> bool {
        self.align_for_read().await;

        let check = |calendar: &WindowedCalendar| {
            calendar.clamp(range) == Some(*range) && calendar.check_availability(range)
        };
        if let Some(free) = self.read_optimistic(check) {
            return free;
        }
        let _shared = self.lock.read().await;
        check(&self.calendar)
    }
}
