mod error;
mod mutations;
mod queries;

pub use error::{CampsiteError, ErrorKind};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering, fence};
use std::time::Instant;

use chrono::NaiveDate;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::calendar::WindowedCalendar;
use crate::clock::{Clock, ManualClock};
use crate::model::DateRange;
use crate::observability;
use crate::store::ReservationStore;

/// Concurrency control around the single shared [`WindowedCalendar`].
///
/// Two primitives cooperate:
/// - `lock` serializes every writer (book, modify, cancel, advance,
///   reconcile) for the full operation, store call included, and gives
///   readers a blocking shared mode.
/// - `stamp` is a sequence counter, odd while the calendar is being mutated.
///   Availability reads scan the calendar without the lock and keep the
///   result only if the stamp was even and unchanged across the scan.
///
/// Writers bump the stamp only around the calendar mutation itself, so an
/// optimistic read overlapping a slow store call still succeeds.
///
/// The calendar's "today" is `aligned`, not the wall clock. It moves only
/// under the write lock, together with the slot shift, so flags and dates
/// never disagree. Every locked path and every read first catches `aligned`
/// up with `clock`.
pub struct AvailabilityGuard {
    calendar: WindowedCalendar,
    clock: Arc<dyn Clock>,
    aligned: Arc<ManualClock>,
    lock: RwLock<()>,
    stamp: AtomicU64,
    store: Arc<dyn ReservationStore>,
}

impl AvailabilityGuard {
    pub fn new(window_length: usize, clock: Arc<dyn Clock>, store: Arc<dyn ReservationStore>) -> Self {
        let aligned = Arc::new(ManualClock::new(clock.today()));
        Self {
            calendar: WindowedCalendar::new(window_length, aligned.clone()),
            clock,
            aligned,
            lock: RwLock::new(()),
            stamp: AtomicU64::new(0),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn ReservationStore> {
        &self.store
    }

    /// Wall-clock today. Requests are validated against this.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn window_length(&self) -> usize {
        self.calendar.window_length()
    }

    /// Bookable range: tomorrow through `today + window_length`.
    pub fn window(&self) -> DateRange {
        DateRange::from_offsets(self.today(), 1, self.window_length() as u64)
    }

    /// Bring the calendar up to the clock's today, shifting once per day
    /// boundary crossed. Returns the number of days shifted. Every locked
    /// operation does this implicitly; a periodic trigger keeps the first
    /// request of a day from paying for it.
    pub async fn advance(&self) -> u64 {
        let guard = self.lock.write().await;
        self.align(&guard)
    }

    fn is_behind(&self) -> bool {
        self.aligned.today() < self.clock.today()
    }

    fn align(&self, exclusive: &RwLockWriteGuard<'_, ()>) -> u64 {
        let from = self.aligned.today();
        let to = self.clock.today();
        if to < from {
            warn!("clock moved back from {from} to {to}, keeping calendar at {from}");
            return 0;
        }
        let days = (to - from).num_days() as u64;
        if days == 0 {
            return 0;
        }

        // Past window_length + 1 shifts every slot is already free.
        let shifts = days.min(self.window_length() as u64 + 1);
        self.mutate(exclusive, |calendar| {
            for _ in 0..shifts {
                calendar.advance();
            }
            self.aligned.set(to);
        });
        metrics::counter!(observability::WINDOW_ADVANCES_TOTAL).increment(days);
        info!("calendar advanced {days} day(s), window now {}", self.calendar.window());
        days
    }

    /// Rebuild occupancy from the store. Lapsed reservations are skipped and
    /// ongoing stays are clipped to the tracked slots. Must complete before
    /// the guard serves requests.
    pub async fn reconcile(&self) -> Result<usize, CampsiteError> {
        let guard = self.lock_exclusive().await;
        let reservations = self.store.list().await?;
        let today = self.calendar.today();

        let ranges: Vec<DateRange> = reservations
            .iter()
            .filter(|r| !r.is_lapsed(today))
            .filter_map(|r| self.calendar.clamp(&r.dates()))
            .collect();
        self.mutate(&guard, |calendar| {
            for range in &ranges {
                calendar.book(range);
            }
        });

        info!(
            "reconciled {} of {} stored reservations into the calendar",
            ranges.len(),
            reservations.len()
        );
        Ok(ranges.len())
    }

    #[cfg(test)]
    pub(crate) async fn occupancy(&self) -> Vec<bool> {
        let _shared = self.lock.read().await;
        self.calendar.occupancy()
    }

    // ── Locking protocol ─────────────────────────────────────

    /// Take the write lock with the calendar aligned to the clock.
    pub(super) async fn lock_exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        let wait_start = Instant::now();
        let guard = self.lock.write().await;
        metrics::histogram!(observability::WRITE_LOCK_WAIT_SECONDS)
            .record(wait_start.elapsed().as_secs_f64());
        self.align(&guard);
        guard
    }

    /// Catch up a calendar left behind by a day boundary before reading it.
    pub(super) async fn align_for_read(&self) {
        if self.is_behind() {
            self.advance().await;
        }
    }

    /// Apply a calendar mutation inside an odd stamp phase. Holding the write
    /// guard is the proof that no other writer is active.
    pub(super) fn mutate(&self, _exclusive: &RwLockWriteGuard<'_, ()>, apply: impl FnOnce(&WindowedCalendar)) {
        self.stamp.fetch_add(1, Ordering::Relaxed);
        fence(Ordering::Release);
        apply(&self.calendar);
        self.stamp.fetch_add(1, Ordering::Release);
        metrics::gauge!(observability::OCCUPIED_DAYS).set(self.calendar.occupied_count() as f64);
    }

    /// Run `read` against the live calendar without locking. Returns `None`
    /// if a mutation was in progress or completed during the read.
    pub(super) fn read_optimistic<T>(&self, read: impl FnOnce(&WindowedCalendar) -> T) -> Option<T> {
        let stamp = self.stamp.load(Ordering::Acquire);
        if stamp % 2 == 1 {
            return None;
        }
        let value = read(&self.calendar);
        fence(Ordering::Acquire);
        if self.stamp.load(Ordering::Relaxed) == stamp {
            Some(value)
        } else {
            debug!("optimistic read invalidated at stamp {stamp}");
            None
        }
    }
}

impl std::fmt::Debug for AvailabilityGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityGuard")
            .field("calendar", &self.calendar)
            .field("clock_today", &self.clock.today())
            .field("stamp", &self.stamp.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
