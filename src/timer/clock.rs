use chrono::Local;

use crate::models::RECORD_DATE_FORMAT;

/// Supplies the calendar day a session record is filed under.
pub trait Clock: Send + Sync {
    /// Today's local date as `yyyy/MM/dd`.
    fn today(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> String {
        Local::now().format(RECORD_DATE_FORMAT).to_string()
    }
}

/// Clock pinned to one date string.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl FixedClock {
    pub fn new(date: impl Into<String>) -> Self {
        Self(date.into())
    }
}

impl Clock for FixedClock {
    fn today(&self) -> String {
        self.0.clone()
    }
}
