use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::model::*;
use crate::observability;

use super::{AvailabilityGuard, CampsiteError};

fn record<T>(op: &'static str, result: &Result<T, CampsiteError>) {
    metrics::counter!(
        observability::OPERATIONS_TOTAL,
        "op" => op,
        "status" => observability::status_label(result)
    )
    .increment(1);
}

impl AvailabilityGuard {
    /// Admit and persist a new reservation. The calendar is only touched
    /// after the store accepted the record.
    pub async fn book(&self, request: NewReservation) -> Result<Reservation, CampsiteError> {
        let result = self.book_exclusive(request).await;
        record("book", &result);
        result
    }

    async fn book_exclusive(&self, request: NewReservation) -> Result<Reservation, CampsiteError> {
        let dates = request.dates();
        let guard = self.lock_exclusive().await;
        self.ensure_tracked(&dates)?;

        if !self.calendar.check_availability(&dates) {
            debug!("booking rejected, {dates} not available");
            return Err(CampsiteError::UnavailableDates(dates));
        }

        let reservation = request.into_reservation(Ulid::new());
        if let Err(e) = self.store.create(&reservation).await {
            warn!("store create failed for {}: {e}", reservation.id);
            return Err(e.into());
        }

        self.mutate(&guard, |calendar| calendar.book(&dates));
        info!("booked {dates} as {}", reservation.id);
        Ok(reservation)
    }

    /// Move `original` to the dates and contact fields in `changes`.
    pub async fn modify(
        &self,
        original: &Reservation,
        changes: ReservationChanges,
    ) -> Result<Reservation, CampsiteError> {
        let result = self.modify_exclusive(original, changes).await;
        record("modify", &result);
        result
    }

    async fn modify_exclusive(
        &self,
        original: &Reservation,
        changes: ReservationChanges,
    ) -> Result<Reservation, CampsiteError> {
        // Depends only on the caller's record, so no lock needed.
        if original.is_lapsed(self.today()) {
            return Err(CampsiteError::ReservationExpired(original.id));
        }

        let new_dates = changes.dates();
        let guard = self.lock_exclusive().await;
        let current = self.current_record(original.id).await?;
        self.ensure_tracked(&new_dates)?;
        let old_dates = self.calendar.clamp(&current.dates());

        let admitted = match &old_dates {
            Some(old) => self.calendar.check_overlapping_availability(old, &new_dates),
            None => self.calendar.check_availability(&new_dates),
        };
        if !admitted {
            debug!("modification of {} rejected, {new_dates} not available", current.id);
            return Err(CampsiteError::UnavailableDates(new_dates));
        }

        let updated = changes.apply_to(&current);
        if let Err(e) = self.store.update(&updated).await {
            warn!("store update failed for {}: {e}", current.id);
            return Err(e.into());
        }

        self.mutate(&guard, |calendar| {
            if let Some(old) = &old_dates {
                calendar.unbook(old);
            }
            calendar.book(&new_dates);
        });
        info!("moved {} from {} to {new_dates}", current.id, current.dates());
        Ok(updated)
    }

    /// Delete `original` from the store and free its days.
    pub async fn cancel(&self, original: &Reservation) -> Result<(), CampsiteError> {
        let result = self.cancel_exclusive(original).await;
        record("cancel", &result);
        result
    }

    async fn cancel_exclusive(&self, original: &Reservation) -> Result<(), CampsiteError> {
        if original.is_lapsed(self.today()) {
            return Err(CampsiteError::ReservationExpired(original.id));
        }

        let guard = self.lock_exclusive().await;
        let current = self.current_record(original.id).await?;
        if let Err(e) = self.store.delete(current.id).await {
            warn!("store delete failed for {}: {e}", current.id);
            return Err(e.into());
        }

        if let Some(old) = self.calendar.clamp(&current.dates()) {
            self.mutate(&guard, |calendar| calendar.unbook(&old));
        }
        info!("cancelled {} ({})", current.id, current.dates());
        Ok(())
    }

    /// Re-read the stored record under the write lock. The caller's copy may
    /// predate a modification or cancellation that held the lock first.
    async fn current_record(&self, id: Ulid) -> Result<Reservation, CampsiteError> {
        let Some(current) = self.store.get(id).await? else {
            debug!("reservation {id} gone before the lock was taken");
            return Err(CampsiteError::NotFound(id));
        };
        if current.is_lapsed(self.calendar.today()) {
            return Err(CampsiteError::ReservationExpired(id));
        }
        Ok(current)
    }

    /// Reject dates the calendar has no slot for.
    fn ensure_tracked(&self, dates: &DateRange) -> Result<(), CampsiteError> {
        if dates.start > dates.end || self.calendar.clamp(dates) != Some(*dates) {
            debug!("{dates} outside the tracked window {}", self.calendar.window());
            return Err(CampsiteError::InvalidRequest("dates outside the window"));
        }
        Ok(())
    }
}
