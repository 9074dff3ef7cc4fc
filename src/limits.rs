/// Days tracked ahead of today (tomorrow through today + WINDOW_DAYS).
pub const WINDOW_DAYS: usize = 30;

/// Longest stay accepted for a single reservation, inclusive of both ends.
pub const MAX_STAY_DAYS: i64 = 3;

pub const MAX_EMAIL_LEN: usize = 64;
pub const MAX_NAME_LEN: usize = 64;
