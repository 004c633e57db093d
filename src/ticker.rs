use chrono::{Local, NaiveDate};
use std::time::Duration;

/// How long the board waits for a key before looking at the clock again
pub const POLL_INTERVAL_MS: u64 = 250;

pub fn poll_interval() -> Duration {
    Duration::from_millis(POLL_INTERVAL_MS)
}

/// Today's date on the local clock
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// True once the clock has passed midnight since `last_seen`
pub fn has_day_changed(last_seen: NaiveDate, now: NaiveDate) -> bool {
    now > last_seen
}
