use ulid::Ulid;

use crate::model::DateRange;
use crate::store::StoreError;

/// Stable failure codes for the transport layer to map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnavailableDates,
    ReservationExpired,
    ReservationNotFound,
    InvalidRequest,
    Store,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnavailableDates => "UNAVAILABLE_DATES",
            ErrorKind::ReservationExpired => "RESERVATION_EXPIRED",
            ErrorKind::ReservationNotFound => "RESERVATION_NOT_FOUND",
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::Store => "STORE_ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampsiteError {
    /// Some day of the requested range (or of a modification's residual
    /// span) was occupied at admission time.
    UnavailableDates(DateRange),
    /// Departure date is today or earlier.
    ReservationExpired(Ulid),
    NotFound(Ulid),
    InvalidRequest(&'static str),
    /// Reservation store failure, passed through untouched.
    Store(StoreError),
}

impl CampsiteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CampsiteError::UnavailableDates(_) => ErrorKind::UnavailableDates,
            CampsiteError::ReservationExpired(_) => ErrorKind::ReservationExpired,
            CampsiteError::NotFound(_) => ErrorKind::ReservationNotFound,
            CampsiteError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            CampsiteError::Store(_) => ErrorKind::Store,
        }
    }
}

impl std::fmt::Display for CampsiteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampsiteError::UnavailableDates(range) => {
                write!(f, "dates {range} are not available")
            }
            CampsiteError::ReservationExpired(id) => write!(f, "reservation expired: {id}"),
            CampsiteError::NotFound(id) => write!(f, "reservation not found: {id}"),
            CampsiteError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            CampsiteError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for CampsiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CampsiteError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CampsiteError {
    fn from(e: StoreError) -> Self {
        CampsiteError::Store(e)
    }
}
