use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end, "DateRange start must not be after end");
        Self { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// Range of `len` days starting `offset` days after `today`.
    pub fn from_offsets(today: NaiveDate, offset: u64, len: u64) -> Self {
        let start = today + Days::new(offset);
        Self::new(start, start + Days::new(len.saturating_sub(1)))
    }

    /// Number of days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// A confirmed reservation as held by the reservation store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub email: String,
    pub full_name: String,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
}

impl Reservation {
    pub fn dates(&self) -> DateRange {
        DateRange::new(self.arrival, self.departure)
    }

    /// A reservation has lapsed once its departure date is today or earlier.
    pub fn is_lapsed(&self, today: NaiveDate) -> bool {
        self.departure <= today
    }
}

/// Input for a new booking; the id is assigned on admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    pub email: String,
    pub full_name: String,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
}

impl NewReservation {
    /// Requested dates, unchecked: arrival may still be after departure.
    pub fn dates(&self) -> DateRange {
        DateRange {
            start: self.arrival,
            end: self.departure,
        }
    }

    pub(crate) fn into_reservation(self, id: Ulid) -> Reservation {
        Reservation {
            id,
            email: self.email,
            full_name: self.full_name,
            arrival: self.arrival,
            departure: self.departure,
        }
    }
}

/// Replacement contact fields and dates for an existing reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationChanges {
    pub email: String,
    pub full_name: String,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
}

impl ReservationChanges {
    /// Requested dates, unchecked: arrival may still be after departure.
    pub fn dates(&self) -> DateRange {
        DateRange {
            start: self.arrival,
            end: self.departure,
        }
    }

    pub(crate) fn apply_to(self, original: &Reservation) -> Reservation {
        Reservation {
            id: original.id,
            email: self.email,
            full_name: self.full_name,
            arrival: self.arrival,
            departure: self.departure,
        }
    }
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub range: DateRange,
    pub free_days: Vec<NaiveDate>,
}
