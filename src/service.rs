use std::sync::Arc;

use tracing::debug;
use ulid::Ulid;

use crate::guard::{AvailabilityGuard, CampsiteError};
use crate::model::*;
use crate::validation::{DateRules, validate_contact};

/// Request-facing operations: validate input, resolve ids through the
/// store, then hand admission to the [`AvailabilityGuard`].
#[derive(Debug, Clone)]
pub struct ReservationService {
    guard: Arc<AvailabilityGuard>,
    rules: DateRules,
}

impl ReservationService {
    pub fn new(guard: Arc<AvailabilityGuard>, rules: DateRules) -> Self {
        Self { guard, rules }
    }

    pub fn guard(&self) -> &Arc<AvailabilityGuard> {
        &self.guard
    }

    /// Free days in `range`, or in the whole window when `range` is `None`.
    pub async fn read_availability(
        &self,
        range: Option<DateRange>,
    ) -> Result<AvailabilityReport, CampsiteError> {
        let today = self.guard.today();
        let range = range.unwrap_or_else(|| self.rules.window(today));
        self.rules.validate_query(today, &range)?;
        let free_days = self.guard.read_availability(&range).await;
        Ok(AvailabilityReport { range, free_days })
    }

    pub async fn make_reservation(
        &self,
        request: NewReservation,
    ) -> Result<Reservation, CampsiteError> {
        validate_contact(&request.email, &request.full_name)?;
        self.rules.validate_stay(self.guard.today(), &request.dates())?;
        self.guard.book(request).await
    }

    pub async fn modify_reservation(
        &self,
        id: Ulid,
        changes: ReservationChanges,
    ) -> Result<Reservation, CampsiteError> {
        validate_contact(&changes.email, &changes.full_name)?;
        self.rules.validate_stay(self.guard.today(), &changes.dates())?;
        let original = self.read_reservation(id).await?;
        self.guard.modify(&original, changes).await
    }

    pub async fn cancel_reservation(&self, id: Ulid) -> Result<(), CampsiteError> {
        let original = self.read_reservation(id).await?;
        self.guard.cancel(&original).await
    }

    pub async fn read_reservation(&self, id: Ulid) -> Result<Reservation, CampsiteError> {
        match self.guard.store().get(id).await? {
            Some(reservation) => Ok(reservation),
            None => {
                debug!("reservation {id} not found");
                Err(CampsiteError::NotFound(id))
            }
        }
    }
}
