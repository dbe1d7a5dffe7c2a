//! Source of "today" for date-range validation.

use time::{Date, OffsetDateTime};

/// Supplies the current calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> Date;
}

/// Wall-clock date in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}

/// Pinned date for deterministic validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}
