use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Days, NaiveDate};

use crate::clock::Clock;
use crate::model::DateRange;

/// Occupancy flags for a rolling window of days anchored to the clock's
/// "today".
///
/// Slot 0 is today and slot `window_length` is the furthest bookable day, so
/// the bookable range is tomorrow through `today + window_length`. The date of
/// slot `i` is always `today + i` for the clock's *current* today; `advance()`
/// must be called exactly once per day boundary to keep stored flags lined up
/// with that mapping.
///
/// The calendar does no synchronization. Mutations must be serialized by the
/// caller. Flags are atomics so readers may scan them while a writer is active
/// without undefined behavior, but such a reader can see a mix of old and new
/// flags and has to validate its result externally.
///
/// Every operation takes pre-validated inclusive ranges inside the window.
pub struct WindowedCalendar {
    slots: Box<[AtomicBool]>,
    clock: Arc<dyn Clock>,
}

impl WindowedCalendar {
    pub fn new(window_length: usize, clock: Arc<dyn Clock>) -> Self {
        let slots = (0..=window_length).map(|_| AtomicBool::new(false)).collect();
        Self { slots, clock }
    }

    pub fn window_length(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// The bookable range: tomorrow through `today + window_length`.
    pub fn window(&self) -> DateRange {
        DateRange::from_offsets(self.today(), 1, self.window_length() as u64)
    }

    /// The part of `range` that has a slot (today through the far end), if
    /// any. Used for stored reservations that may have started in the past.
    pub fn clamp(&self, range: &DateRange) -> Option<DateRange> {
        let today = self.today();
        let last = today + Days::new(self.window_length() as u64);
        let start = range.start.max(today);
        let end = range.end.min(last);
        (start <= end).then(|| DateRange::new(start, end))
    }

    /// Every free date in `range`, ascending.
    pub fn read_availability(&self, range: &DateRange) -> Vec<NaiveDate> {
        let today = self.today();
        self.slot_range(today, range)
            .filter(|&i| !self.is_occupied(i))
            .map(|i| today + Days::new(i as u64))
            .collect()
    }

    /// True iff every day in `range` is free.
    pub fn check_availability(&self, range: &DateRange) -> bool {
        let today = self.today();
        self.span_is_free(self.slot_range(today, range))
    }

    /// Admission check for moving a reservation from `original` to `new`.
    ///
    /// Days of `new` already covered by `original` need no check. Of the
    /// remaining days, every slot from the earliest to the latest one is
    /// checked, including any slots of `original` lying between them. A
    /// modification that widens `original` on both sides is therefore
    /// rejected, because the span crosses the original's own occupied days.
    pub fn check_overlapping_availability(&self, original: &DateRange, new: &DateRange) -> bool {
        let today = self.today();
        let covered = self.slot_range(today, original);
        let mut residual = self.slot_range(today, new).filter(|i| !covered.contains(i));
        let Some(first) = residual.next() else {
            return true; // new range sits inside the original
        };
        let last = residual.last().unwrap_or(first);
        self.span_is_free(first..=last)
    }

    /// Mark every day in `range` occupied. Unconditional and idempotent.
    pub fn book(&self, range: &DateRange) {
        let today = self.today();
        for i in self.slot_range(today, range) {
            self.slots[i].store(true, Ordering::Relaxed);
        }
    }

    /// Mark every day in `range` free. Unconditional and idempotent.
    pub fn unbook(&self, range: &DateRange) {
        let today = self.today();
        for i in self.slot_range(today, range) {
            self.slots[i].store(false, Ordering::Relaxed);
        }
    }

    /// Drop today's slot and append a free slot at the far end.
    pub fn advance(&self) {
        let last = self.window_length();
        for i in 0..last {
            let next = self.slots[i + 1].load(Ordering::Relaxed);
            self.slots[i].store(next, Ordering::Relaxed);
        }
        self.slots[last].store(false, Ordering::Relaxed);
    }

    /// Number of occupied bookable days (today's slot excluded).
    pub fn occupied_count(&self) -> usize {
        (1..self.slots.len()).filter(|&i| self.is_occupied(i)).count()
    }

    /// Copy of every flag, slot 0 first.
    pub fn occupancy(&self) -> Vec<bool> {
        (0..self.slots.len()).map(|i| self.is_occupied(i)).collect()
    }

    fn is_occupied(&self, slot: usize) -> bool {
        self.slots[slot].load(Ordering::Relaxed)
    }

    fn span_is_free(&self, span: RangeInclusive<usize>) -> bool {
        span.into_iter().all(|i| !self.is_occupied(i))
    }

    /// Slot indices for `range`, relative to a single reading of today.
    fn slot_range(&self, today: NaiveDate, range: &DateRange) -> RangeInclusive<usize> {
        self.slot_index(today, range.start)..=self.slot_index(today, range.end)
    }

    fn slot_index(&self, today: NaiveDate, date: NaiveDate) -> usize {
        let offset = (date - today).num_days();
        debug_assert!(
            (0..=self.window_length() as i64).contains(&offset),
            "{date} is outside the window anchored at {today}"
        );
        offset as usize
    }
}

impl std::fmt::Debug for WindowedCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flags: String = self
            .occupancy()
            .iter()
            .map(|&o| if o { 'x' } else { '.' })
            .collect();
        f.debug_struct("WindowedCalendar")
            .field("today", &self.today())
            .field("slots", &flags)
            .finish()
    }
}
