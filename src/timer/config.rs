use serde::{Deserialize, Serialize};

/// Countdown length as entered in the task sheet's hour/minute/second pickers.
///
/// Minutes and seconds are conventionally below 60 but not clamped; the
/// total is always derived arithmetically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerConfig {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            hours: 0,
            minutes: 25,
            seconds: 0,
        }
    }
}

impl TimerConfig {
    pub const fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    pub const fn from_minutes(minutes: u64) -> Self {
        Self::new(0, minutes, 0)
    }

    pub fn total_seconds(&self) -> u64 {
        self.hours
            .saturating_mul(3600)
            .saturating_add(self.minutes.saturating_mul(60))
            .saturating_add(self.seconds)
    }

    /// Quick-set durations offered next to the pickers, in display order.
    pub fn presets() -> [TimerConfig; 6] {
        [
            Self::from_minutes(25),
            Self::from_minutes(15),
            Self::from_minutes(5),
            Self::from_minutes(45),
            Self::new(1, 0, 0),
            Self::new(2, 0, 0),
        ]
    }
}
