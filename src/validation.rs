use chrono::NaiveDate;

use crate::guard::CampsiteError;
use crate::limits::*;
use crate::model::*;

/// Date rules shared by every request, relative to `today`.
#[derive(Debug, Clone, Copy)]
pub struct DateRules {
    pub window_days: usize,
    pub max_stay_days: i64,
}

impl Default for DateRules {
    fn default() -> Self {
        Self {
            window_days: WINDOW_DAYS,
            max_stay_days: MAX_STAY_DAYS,
        }
    }
}

impl DateRules {
    /// Bookable and queryable range: tomorrow through `today + window_days`.
    pub fn window(&self, today: NaiveDate) -> DateRange {
        DateRange::from_offsets(today, 1, self.window_days as u64)
    }

    /// Availability queries: ordered and inside the window.
    pub fn validate_query(&self, today: NaiveDate, range: &DateRange) -> Result<(), CampsiteError> {
        check_order(range)?;
        check_in_window(&self.window(today), range)
    }

    /// Bookings: ordered, inside the window, at most `max_stay_days` long.
    pub fn validate_stay(&self, today: NaiveDate, range: &DateRange) -> Result<(), CampsiteError> {
        check_order(range)?;
        check_in_window(&self.window(today), range)?;
        if range.days() > self.max_stay_days {
            return Err(CampsiteError::InvalidRequest("stay too long"));
        }
        Ok(())
    }
}

pub fn validate_contact(email: &str, full_name: &str) -> Result<(), CampsiteError> {
    if email.is_empty() || !email.contains('@') {
        return Err(CampsiteError::InvalidRequest("email missing or malformed"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(CampsiteError::InvalidRequest("email too long"));
    }
    if full_name.trim().is_empty() {
        return Err(CampsiteError::InvalidRequest("full name missing"));
    }
    if full_name.len() > MAX_NAME_LEN {
        return Err(CampsiteError::InvalidRequest("full name too long"));
    }
    Ok(())
}

fn check_order(range: &DateRange) -> Result<(), CampsiteError> {
    if range.start > range.end {
        return Err(CampsiteError::InvalidRequest("start after end"));
    }
    Ok(())
}

fn check_in_window(window: &DateRange, range: &DateRange) -> Result<(), CampsiteError> {
    if range.start < window.start {
        return Err(CampsiteError::InvalidRequest("starts before tomorrow"));
    }
    if range.end > window.end {
        return Err(CampsiteError::InvalidRequest("ends beyond the booking window"));
    }
    Ok(())
}
