pub mod clock;
pub mod config;
pub mod controller;
pub mod state;

pub use clock::{Clock, FixedClock, LocalClock};
pub use config::TimerConfig;
pub use controller::{ControllerOptions, TimerController, TimerEvent, TimerSnapshot};
pub use state::{
    format_countdown, PhaseLabel, TickerEffect, TimerCommand, TimerState, TimerStatus, Transition,
    DEFAULT_TASK_LABEL,
};
