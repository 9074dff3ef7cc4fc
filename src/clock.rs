use std::sync::atomic::{AtomicI32, Ordering};

use chrono::{Datelike, Days, Local, NaiveDate};

/// Source of the current calendar date. Every date→slot mapping is computed
/// against `today()` at the moment of the call.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn tomorrow(&self) -> NaiveDate {
        self.today() + Days::new(1)
    }
}

/// Local wall-clock date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that only moves when told to. Stored as days since CE so reads
/// and writes are single atomic operations.
#[derive(Debug)]
pub struct ManualClock {
    days_from_ce: AtomicI32,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            days_from_ce: AtomicI32::new(today.num_days_from_ce()),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        self.days_from_ce
            .store(today.num_days_from_ce(), Ordering::SeqCst);
    }

    /// Move the clock forward by one day and return the new date.
    pub fn advance_day(&self) -> NaiveDate {
        let days = self.days_from_ce.fetch_add(1, Ordering::SeqCst) + 1;
        from_ce(days)
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        from_ce(self.days_from_ce.load(Ordering::SeqCst))
    }
}

fn from_ce(days: i32) -> NaiveDate {
    NaiveDate::from_num_days_from_ce_opt(days).unwrap_or(NaiveDate::MAX)
}
