//! Focus session core for the cat Pomodoro app.
//!
//! The presentation layer drives a [`TimerController`] and renders its
//! [`TimerSnapshot`]s; finished sessions land in a process-lifetime
//! [`SessionLog`] that backs the daily statistics screen.

pub mod models;
pub mod settings;
pub mod stats;
pub mod timer;
mod utils;

pub use models::SessionRecord;
pub use settings::{SettingsStore, TimerSettings};
pub use stats::{format_duration, DailyStats, SessionLog};
pub use timer::{
    Clock, ControllerOptions, FixedClock, LocalClock, PhaseLabel, TimerConfig, TimerController,
    TimerEvent, TimerSnapshot, TimerState, TimerStatus,
};
pub use utils::logging::init_logging;
