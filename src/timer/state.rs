use serde::{Deserialize, Serialize};

use crate::models::SessionRecord;

use super::{Clock, TimerConfig};

/// Task label used when the user confirms the task sheet with a blank name.
pub const DEFAULT_TASK_LABEL: &str = "Focus Task";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    /// No task set.
    Idle,
    /// Task and time set, countdown not running.
    Configured,
    Running,
    /// Running, with a cancel confirmation pending.
    Cancelling,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Idle
    }
}

/// Status line shown under the task name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PhaseLabel {
    Hidden,
    Focusing,
    Ready,
    TimeUp,
}

impl PhaseLabel {
    pub fn text(&self) -> &'static str {
        match self {
            PhaseLabel::Hidden => "",
            PhaseLabel::Focusing => "專注中...",
            PhaseLabel::Ready => "準備開始",
            PhaseLabel::TimeUp => "時間到！",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerCommand {
    SetTask { name: String, config: TimerConfig },
    Start,
    /// One scheduler tick, tagged with the run generation of the ticker that fired it.
    Tick { generation: u64 },
    Pause,
    RequestCancel,
    ConfirmCancel,
    DeclineCancel,
    ResetTimer,
    /// Reset followed by start, applied as one step.
    Restart,
    ClearTask,
    /// Stop without recording; the owner is going away.
    Suspend,
}

impl TimerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            TimerCommand::SetTask { .. } => "set_task",
            TimerCommand::Start => "start",
            TimerCommand::Tick { .. } => "tick",
            TimerCommand::Pause => "pause",
            TimerCommand::RequestCancel => "request_cancel",
            TimerCommand::ConfirmCancel => "confirm_cancel",
            TimerCommand::DeclineCancel => "decline_cancel",
            TimerCommand::ResetTimer => "reset",
            TimerCommand::Restart => "restart",
            TimerCommand::ClearTask => "clear_task",
            TimerCommand::Suspend => "suspend",
        }
    }
}

/// What the owner of the scheduler must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerEffect {
    Keep,
    /// Replace any ticker with one tagged with `generation`.
    Start { generation: u64 },
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub accepted: bool,
    pub record: Option<SessionRecord>,
    pub ticker: TickerEffect,
}

impl Transition {
    fn ignored() -> Self {
        Self {
            accepted: false,
            record: None,
            ticker: TickerEffect::Keep,
        }
    }

    fn applied(ticker: TickerEffect) -> Self {
        Self {
            accepted: true,
            record: None,
            ticker,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimerState {
    status: TimerStatus,
    task_name: String,
    remaining_secs: u64,
    config: TimerConfig,
    /// Bumped on every start so ticks from a superseded ticker are discarded.
    generation: u64,
    default_config: TimerConfig,
    default_task_label: String,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::with_defaults(TimerConfig::default(), DEFAULT_TASK_LABEL)
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State whose cleared configuration and blank-name label come from settings.
    pub fn with_defaults(default_config: TimerConfig, default_task_label: impl Into<String>) -> Self {
        let label: String = default_task_label.into();
        let mut label = label.trim().to_string();
        if label.is_empty() {
            label = DEFAULT_TASK_LABEL.to_string();
        }
        Self {
            status: TimerStatus::Idle,
            task_name: String::new(),
            remaining_secs: 0,
            config: default_config,
            generation: 0,
            default_config,
            default_task_label: label,
        }
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn config(&self) -> TimerConfig {
        self.config
    }

    pub fn total_secs(&self) -> u64 {
        self.config.total_seconds()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while the countdown is live, including while a cancel prompt is open.
    pub fn is_running(&self) -> bool {
        matches!(self.status, TimerStatus::Running | TimerStatus::Cancelling)
    }

    pub fn time_display(&self) -> String {
        format_countdown(self.remaining_secs)
    }

    pub fn phase_label(&self) -> PhaseLabel {
        if self.task_name.is_empty() {
            PhaseLabel::Hidden
        } else if self.remaining_secs == 0 {
            PhaseLabel::TimeUp
        } else if self.is_running() {
            PhaseLabel::Focusing
        } else {
            PhaseLabel::Ready
        }
    }

    pub fn apply(&mut self, command: TimerCommand, clock: &dyn Clock) -> Transition {
        match command {
            TimerCommand::SetTask { name, config } => self.set_task(&name, config),
            TimerCommand::Start => self.start(),
            TimerCommand::Tick { generation } => self.tick_for(generation, clock),
            TimerCommand::Pause => self.pause(),
            TimerCommand::RequestCancel => self.request_cancel(),
            TimerCommand::ConfirmCancel => self.confirm_cancel(clock),
            TimerCommand::DeclineCancel => self.decline_cancel(),
            TimerCommand::ResetTimer => self.reset_timer(),
            TimerCommand::Restart => self.restart(),
            TimerCommand::ClearTask => self.clear_task(),
            TimerCommand::Suspend => self.suspend(),
        }
    }

    pub fn set_task(&mut self, name: &str, config: TimerConfig) -> Transition {
        if self.is_running() {
            return Transition::ignored();
        }

        let trimmed = name.trim();
        self.task_name = if trimmed.is_empty() {
            self.default_task_label.clone()
        } else {
            trimmed.to_string()
        };
        self.config = config;
        self.remaining_secs = config.total_seconds();
        self.status = TimerStatus::Configured;
        Transition::applied(TickerEffect::Keep)
    }

    pub fn start(&mut self) -> Transition {
        if self.is_running() || self.remaining_secs == 0 || self.task_name.is_empty() {
            return Transition::ignored();
        }

        self.generation = self.generation.wrapping_add(1);
        self.status = TimerStatus::Running;
        Transition::applied(TickerEffect::Start {
            generation: self.generation,
        })
    }

    /// Advances the countdown of the current run by one second.
    pub fn tick(&mut self, clock: &dyn Clock) -> Transition {
        self.tick_for(self.generation, clock)
    }

    fn tick_for(&mut self, generation: u64, clock: &dyn Clock) -> Transition {
        if !self.is_running() || generation != self.generation {
            return Transition::ignored();
        }

        // Zero is the completion trigger, never decrement past it.
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
        }
        if self.remaining_secs > 0 {
            return Transition::applied(TickerEffect::Keep);
        }

        self.status = TimerStatus::Configured;
        let record = (!self.task_name.is_empty()).then(|| {
            SessionRecord::completed(clock.today(), self.task_name.clone(), self.total_secs())
        });
        Transition {
            accepted: true,
            record,
            ticker: TickerEffect::Stop,
        }
    }

    pub fn pause(&mut self) -> Transition {
        if self.status != TimerStatus::Running {
            return Transition::ignored();
        }

        self.status = TimerStatus::Configured;
        Transition::applied(TickerEffect::Stop)
    }

    pub fn request_cancel(&mut self) -> Transition {
        if self.status != TimerStatus::Running {
            return Transition::ignored();
        }

        self.status = TimerStatus::Cancelling;
        Transition::applied(TickerEffect::Keep)
    }

    pub fn decline_cancel(&mut self) -> Transition {
        if self.status != TimerStatus::Cancelling {
            return Transition::ignored();
        }

        self.status = TimerStatus::Running;
        Transition::applied(TickerEffect::Keep)
    }

    /// Confirms the cancel prompt. A running countdown must pass through
    /// `request_cancel` first; outside a pending prompt this only clears.
    pub fn confirm_cancel(&mut self, clock: &dyn Clock) -> Transition {
        if self.status == TimerStatus::Running {
            return Transition::ignored();
        }

        let record = (self.status == TimerStatus::Cancelling
            && !self.task_name.is_empty()
            && self.remaining_secs > 0)
            .then(|| {
                let elapsed = self.total_secs().saturating_sub(self.remaining_secs);
                SessionRecord::cancelled(clock.today(), self.task_name.clone(), elapsed)
            });

        self.clear();
        Transition {
            accepted: true,
            record,
            ticker: TickerEffect::Stop,
        }
    }

    pub fn reset_timer(&mut self) -> Transition {
        self.remaining_secs = self.total_secs();
        self.status = if self.task_name.is_empty() {
            TimerStatus::Idle
        } else {
            TimerStatus::Configured
        };
        Transition::applied(TickerEffect::Stop)
    }

    /// Reset then start. The reset always happens; acceptance follows the start.
    pub fn restart(&mut self) -> Transition {
        self.reset_timer();
        let started = self.start();
        if started.accepted {
            started
        } else {
            Transition {
                accepted: false,
                record: None,
                ticker: TickerEffect::Stop,
            }
        }
    }

    pub fn clear_task(&mut self) -> Transition {
        if self.is_running() {
            return Transition::ignored();
        }

        self.clear();
        Transition::applied(TickerEffect::Stop)
    }

    /// Stops a live countdown (including one behind a cancel prompt) without
    /// recording anything, keeping the remaining time. Used on teardown.
    pub fn suspend(&mut self) -> Transition {
        if self.is_running() {
            self.status = TimerStatus::Configured;
        }
        Transition::applied(TickerEffect::Stop)
    }

    fn clear(&mut self) {
        self.status = TimerStatus::Idle;
        self.task_name.clear();
        self.remaining_secs = 0;
        self.config = self.default_config;
    }
}

/// `HH:MM:SS` when at least an hour remains, otherwise `MM:SS`.
pub fn format_countdown(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::FixedClock;

    fn clock() -> FixedClock {
        FixedClock::new("2025/01/02")
    }

    fn configured(total: u64) -> TimerState {
        let mut state = TimerState::new();
        assert!(state.set_task("Write report", TimerConfig::new(0, 0, total)).accepted);
        state
    }

    #[test]
    fn set_task_trims_and_falls_back_to_default_label() {
        let mut state = TimerState::new();
        state.set_task("  Read  ", TimerConfig::default());
        assert_eq!(state.task_name(), "Read");
        assert_eq!(state.remaining_secs(), 1500);
        assert_eq!(state.status(), TimerStatus::Configured);

        state.set_task(" \n\t ", TimerConfig::from_minutes(5));
        assert_eq!(state.task_name(), DEFAULT_TASK_LABEL);
        assert_eq!(state.remaining_secs(), 300);
    }

    #[test]
    fn custom_default_label_is_used_for_blank_names() {
        let mut state = TimerState::with_defaults(TimerConfig::from_minutes(50), "專注任務");
        state.set_task("", TimerConfig::from_minutes(1));
        assert_eq!(state.task_name(), "專注任務");
    }

    #[test]
    fn set_task_rejected_while_running() {
        let mut state = configured(10);
        state.start();
        let result = state.set_task("Other", TimerConfig::from_minutes(1));
        assert!(!result.accepted);
        assert_eq!(state.task_name(), "Write report");
        assert_eq!(state.remaining_secs(), 10);
    }

    #[test]
    fn start_requires_task_and_time() {
        let mut idle = TimerState::new();
        assert!(!idle.start().accepted);
        assert_eq!(idle.status(), TimerStatus::Idle);

        let mut zero = configured(0);
        let result = zero.start();
        assert!(!result.accepted);
        assert_eq!(result.ticker, TickerEffect::Keep);
        assert!(!zero.is_running());
    }

    #[test]
    fn double_start_is_a_no_op() {
        let mut state = configured(10);
        let first = state.start();
        assert_eq!(first.ticker, TickerEffect::Start { generation: 1 });
        let second = state.start();
        assert!(!second.accepted);
        assert_eq!(second.ticker, TickerEffect::Keep);
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn completion_records_configured_total() {
        for total in [1, 2, 7, 60, 61] {
            let mut state = configured(total);
            state.start();
            let mut records = Vec::new();
            for _ in 0..total {
                let transition = state.tick(&clock());
                records.extend(transition.record);
            }
            assert_eq!(records.len(), 1, "total {total}");
            assert!(records[0].is_completed());
            assert_eq!(records[0].duration_secs(), total);
            assert_eq!(records[0].date(), "2025/01/02");
            assert!(!state.is_running());
            assert_eq!(state.remaining_secs(), 0);
            assert_eq!(state.task_name(), "Write report");
            assert_eq!(state.phase_label(), PhaseLabel::TimeUp);

            // Further ticks after completion do nothing.
            assert!(!state.tick(&clock()).accepted);
        }
    }

    #[test]
    fn completing_tick_stops_the_ticker() {
        let mut state = configured(2);
        state.start();
        assert_eq!(state.tick(&clock()).ticker, TickerEffect::Keep);
        assert_eq!(state.tick(&clock()).ticker, TickerEffect::Stop);
    }

    #[test]
    fn confirmed_cancel_records_elapsed_time() {
        let total = 10;
        for k in 1..total {
            let mut state = configured(total);
            state.start();
            for _ in 0..k {
                assert!(state.tick(&clock()).record.is_none());
            }
            assert!(state.request_cancel().accepted);
            let transition = state.confirm_cancel(&clock());
            let record = transition.record.expect("cancel record");
            assert!(!record.is_completed());
            assert_eq!(record.duration_secs(), k);
            assert_eq!(transition.ticker, TickerEffect::Stop);
            assert_eq!(state.status(), TimerStatus::Idle);
            assert_eq!(state.task_name(), "");
            assert_eq!(state.remaining_secs(), 0);
            assert_eq!(state.config(), TimerConfig::default());
        }
    }

    #[test]
    fn confirm_cancel_requires_the_prompt_while_running() {
        let mut state = configured(10);
        state.start();
        assert!(!state.confirm_cancel(&clock()).accepted);
        assert!(state.is_running());
    }

    #[test]
    fn confirm_cancel_without_active_session_clears_without_record() {
        let mut state = configured(10);
        let transition = state.confirm_cancel(&clock());
        assert!(transition.accepted);
        assert!(transition.record.is_none());
        assert_eq!(state.status(), TimerStatus::Idle);

        let mut idle = TimerState::new();
        assert!(idle.confirm_cancel(&clock()).record.is_none());
    }

    #[test]
    fn decline_cancel_resumes_unchanged() {
        let mut state = configured(10);
        state.start();
        state.tick(&clock());
        state.request_cancel();
        assert!(state.is_running());
        // The countdown keeps going while the prompt is open.
        state.tick(&clock());
        assert!(state.decline_cancel().accepted);
        assert_eq!(state.status(), TimerStatus::Running);
        assert_eq!(state.remaining_secs(), 8);
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn request_cancel_only_while_running() {
        let mut state = configured(10);
        assert!(!state.request_cancel().accepted);
        assert!(!state.decline_cancel().accepted);
        assert_eq!(state.status(), TimerStatus::Configured);
    }

    #[test]
    fn pause_keeps_remaining_and_records_nothing() {
        let mut state = configured(10);
        state.start();
        state.tick(&clock());
        state.tick(&clock());
        let transition = state.pause();
        assert!(transition.accepted);
        assert!(transition.record.is_none());
        assert_eq!(transition.ticker, TickerEffect::Stop);
        assert_eq!(state.remaining_secs(), 8);
        assert_eq!(state.phase_label(), PhaseLabel::Ready);
        assert!(!state.pause().accepted);
    }

    #[test]
    fn ticks_from_a_superseded_run_are_ignored() {
        let mut state = configured(10);
        state.start();
        let stale = state.generation();
        state.pause();
        state.start();
        let result = state.apply(TimerCommand::Tick { generation: stale }, &clock());
        assert!(!result.accepted);
        assert_eq!(state.remaining_secs(), 10);
    }

    #[test]
    fn reset_restores_total_without_record() {
        let mut state = configured(10);
        state.start();
        for _ in 0..4 {
            state.tick(&clock());
        }
        let transition = state.reset_timer();
        assert!(transition.record.is_none());
        assert_eq!(transition.ticker, TickerEffect::Stop);
        assert_eq!(state.remaining_secs(), 10);
        assert_eq!(state.task_name(), "Write report");
        assert!(!state.is_running());

        let mut idle = TimerState::new();
        assert!(idle.reset_timer().accepted);
        assert_eq!(idle.remaining_secs(), 1500);
        assert_eq!(idle.status(), TimerStatus::Idle);
    }

    #[test]
    fn reset_drops_a_pending_cancel_prompt() {
        let mut state = configured(10);
        state.start();
        state.tick(&clock());
        state.request_cancel();
        let transition = state.reset_timer();
        assert!(transition.accepted);
        assert!(transition.record.is_none());
        assert_eq!(transition.ticker, TickerEffect::Stop);
        assert_eq!(state.status(), TimerStatus::Configured);
        assert_eq!(state.remaining_secs(), 10);
        // The prompt is gone, so there is nothing left to confirm or decline.
        assert!(!state.decline_cancel().accepted);
        assert!(state.confirm_cancel(&clock()).record.is_none());
    }

    #[test]
    fn reset_after_completion_refills_without_record() {
        let mut state = configured(2);
        state.start();
        state.tick(&clock());
        assert!(state.tick(&clock()).record.is_some());
        assert_eq!(state.remaining_secs(), 0);

        let transition = state.reset_timer();
        assert!(transition.record.is_none());
        assert_eq!(state.status(), TimerStatus::Configured);
        assert_eq!(state.remaining_secs(), 2);
        assert_eq!(state.phase_label(), PhaseLabel::Ready);
    }

    #[test]
    fn command_names_are_static() {
        assert_eq!(TimerCommand::Tick { generation: 3 }.name(), "tick");
        assert_eq!(TimerCommand::ResetTimer.name(), "reset");
    }

    #[test]
    fn restart_resets_and_runs_again() {
        let mut state = configured(10);
        state.start();
        state.tick(&clock());
        let transition = state.restart();
        assert!(transition.accepted);
        assert!(transition.record.is_none());
        assert_eq!(transition.ticker, TickerEffect::Start { generation: 2 });
        assert_eq!(state.remaining_secs(), 10);
        assert_eq!(state.status(), TimerStatus::Running);
    }

    #[test]
    fn restart_without_task_stays_stopped() {
        let mut state = TimerState::new();
        let transition = state.restart();
        assert!(!transition.accepted);
        assert_eq!(transition.ticker, TickerEffect::Stop);
        assert!(!state.is_running());
    }

    #[test]
    fn clear_task_resets_config_and_is_rejected_while_running() {
        let mut state = configured(10);
        state.start();
        assert!(!state.clear_task().accepted);
        state.pause();
        assert!(state.clear_task().accepted);
        assert_eq!(state.task_name(), "");
        assert_eq!(state.remaining_secs(), 0);
        assert_eq!(state.config(), TimerConfig::default());
        assert_eq!(state.phase_label(), PhaseLabel::Hidden);
    }

    #[test]
    fn suspend_stops_behind_a_cancel_prompt() {
        let mut state = configured(10);
        state.start();
        state.tick(&clock());
        state.request_cancel();
        let transition = state.suspend();
        assert!(transition.record.is_none());
        assert_eq!(transition.ticker, TickerEffect::Stop);
        assert_eq!(state.status(), TimerStatus::Configured);
        assert_eq!(state.remaining_secs(), 9);
    }

    #[test]
    fn countdown_formatting() {
        assert_eq!(format_countdown(0), "00:00");
        assert_eq!(format_countdown(59), "00:59");
        assert_eq!(format_countdown(1500), "25:00");
        assert_eq!(format_countdown(3599), "59:59");
        assert_eq!(format_countdown(3600), "01:00:00");
        assert_eq!(format_countdown(3661), "01:01:01");
    }
}
