use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    models::SessionRecord,
    settings::TimerSettings,
    stats::{DailyStats, SessionLog},
};

use super::{
    Clock, LocalClock, PhaseLabel, TickerEffect, TimerCommand, TimerConfig, TimerState,
    TimerStatus, Transition, DEFAULT_TASK_LABEL,
};

// Set to false to silence this module's info/warn/error output.
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub task_name: String,
    pub remaining_secs: u64,
    pub total_secs: u64,
    pub time_display: String,
    pub phase: PhaseLabel,
    pub is_running: bool,
}

impl From<&TimerState> for TimerSnapshot {
    fn from(state: &TimerState) -> Self {
        Self {
            status: state.status(),
            task_name: state.task_name().to_string(),
            remaining_secs: state.remaining_secs(),
            total_secs: state.total_secs(),
            time_display: state.time_display(),
            phase: state.phase_label(),
            is_running: state.is_running(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum TimerEvent {
    StateChanged(TimerSnapshot),
    SessionRecorded(SessionRecord),
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub tick_interval: Duration,
    pub default_config: TimerConfig,
    pub default_task_label: String,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            default_config: TimerConfig::default(),
            default_task_label: DEFAULT_TASK_LABEL.into(),
        }
    }
}

impl From<&TimerSettings> for ControllerOptions {
    fn from(settings: &TimerSettings) -> Self {
        Self {
            tick_interval: settings.tick_interval(),
            default_config: settings.default_config,
            default_task_label: settings.default_task_label.clone(),
        }
    }
}

/// Handle to the running 1 Hz countdown task. Dropping it cancels the task.
struct Ticker {
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl Ticker {
    async fn stop(&mut self) -> Result<()> {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.await.context("ticker task failed to join")
        } else {
            Ok(())
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Owns the focus timer. Clones share the same state, log and ticker.
///
/// Commands are serialized on the ticker slot lock, which is held for the
/// whole command. The ticker task itself only takes the state lock.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    log: Arc<Mutex<SessionLog>>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<TimerEvent>,
    tick_interval: Duration,
}

impl TimerController {
    pub fn new(options: ControllerOptions) -> Self {
        Self::with_clock(options, Arc::new(LocalClock))
    }

    pub fn from_settings(settings: &TimerSettings) -> Self {
        Self::new(ControllerOptions::from(settings))
    }

    pub fn with_clock(options: ControllerOptions, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(TimerState::with_defaults(
                options.default_config,
                options.default_task_label,
            ))),
            log: Arc::new(Mutex::new(SessionLog::new())),
            ticker: Arc::new(Mutex::new(None)),
            clock,
            events,
            tick_interval: options.tick_interval,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub async fn get_snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::from(&*self.state.lock().await)
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.is_running()
    }

    pub async fn records(&self) -> Vec<SessionRecord> {
        self.log.lock().await.records().to_vec()
    }

    pub async fn grouped_stats(&self) -> Vec<DailyStats> {
        self.log.lock().await.grouped_stats()
    }

    pub async fn completed_task_names(&self, date: &str) -> Vec<String> {
        self.log.lock().await.completed_task_names(date)
    }

    /// Tasks completed on the clock's current day.
    pub async fn completed_today(&self) -> Vec<String> {
        let today = self.clock.today();
        self.completed_task_names(&today).await
    }

    pub async fn set_task(&self, name: &str, config: TimerConfig) -> Result<bool> {
        self.dispatch(TimerCommand::SetTask {
            name: name.to_string(),
            config,
        })
        .await
    }

    pub async fn start_timer(&self) -> Result<bool> {
        self.dispatch(TimerCommand::Start).await
    }

    pub async fn pause_timer(&self) -> Result<bool> {
        self.dispatch(TimerCommand::Pause).await
    }

    pub async fn reset_timer(&self) -> Result<bool> {
        self.dispatch(TimerCommand::ResetTimer).await
    }

    pub async fn restart_timer(&self) -> Result<bool> {
        self.dispatch(TimerCommand::Restart).await
    }

    pub async fn request_cancel(&self) -> Result<bool> {
        self.dispatch(TimerCommand::RequestCancel).await
    }

    pub async fn confirm_cancel(&self) -> Result<bool> {
        self.dispatch(TimerCommand::ConfirmCancel).await
    }

    pub async fn decline_cancel(&self) -> Result<bool> {
        self.dispatch(TimerCommand::DeclineCancel).await
    }

    pub async fn clear_task(&self) -> Result<bool> {
        self.dispatch(TimerCommand::ClearTask).await
    }

    /// Stops the countdown without recording, for when the owner goes away.
    pub async fn shutdown(&self) -> Result<()> {
        self.dispatch(TimerCommand::Suspend).await.map(|_| ())
    }

    async fn dispatch(&self, command: TimerCommand) -> Result<bool> {
        let mut ticker = self.ticker.lock().await;
        let command_name = command.name();
        let announce = matches!(
            command,
            TimerCommand::Pause
                | TimerCommand::ResetTimer
                | TimerCommand::ClearTask
                | TimerCommand::ConfirmCancel
                | TimerCommand::Suspend
        );

        let (transition, snapshot) = apply_command(
            &self.state,
            &self.log,
            &self.events,
            self.clock.as_ref(),
            command,
        )
        .await;
        if !transition.accepted {
            log::debug!("Ignored {} while {:?}", command_name, snapshot.status);
        } else if announce {
            log_info!(
                "Focus timer {}: task '{}', {}s left",
                command_name,
                snapshot.task_name,
                snapshot.remaining_secs
            );
        }

        let ticker_result = match transition.ticker {
            TickerEffect::Keep => Ok(()),
            TickerEffect::Stop => stop_ticker(&mut ticker).await,
            TickerEffect::Start { generation } => {
                let stopped = stop_ticker(&mut ticker).await;
                *ticker = Some(self.spawn_ticker(generation));
                log_info!(
                    "Focus session '{}' running with {}s left",
                    snapshot.task_name,
                    snapshot.remaining_secs
                );
                stopped
            }
        };

        if let Err(err) = &ticker_result {
            log_error!("Failed to stop ticker after {}: {err:?}", command_name);
        }
        ticker_result?;
        Ok(transition.accepted)
    }

    fn spawn_ticker(&self, generation: u64) -> Ticker {
        let cancel_token = CancellationToken::new();
        // Anchor the first tick to the command, not to when the task is first polled.
        let first_tick = Instant::now() + self.tick_interval;
        let handle = tokio::spawn(run_ticker(
            generation,
            first_tick,
            self.tick_interval,
            self.state.clone(),
            self.log.clone(),
            self.clock.clone(),
            self.events.clone(),
            cancel_token.clone(),
        ));

        Ticker {
            handle: Some(handle),
            cancel_token,
        }
    }
}

async fn stop_ticker(slot: &mut Option<Ticker>) -> Result<()> {
    match slot.take() {
        Some(mut ticker) => ticker.stop().await,
        None => Ok(()),
    }
}

/// Applies a command under the state lock. Any record is appended and the
/// resulting events are sent before the lock is released, so subscribers see
/// changes in the order they were made.
async fn apply_command(
    state: &Mutex<TimerState>,
    log: &Mutex<SessionLog>,
    events: &broadcast::Sender<TimerEvent>,
    clock: &dyn Clock,
    command: TimerCommand,
) -> (Transition, TimerSnapshot) {
    let mut guard = state.lock().await;
    let transition = guard.apply(command, clock);
    if let Some(record) = &transition.record {
        log.lock().await.append(record.clone());
    }

    let snapshot = TimerSnapshot::from(&*guard);
    let changed = transition.accepted || transition.ticker != TickerEffect::Keep;
    if changed {
        emit(events, snapshot.clone(), transition.record.clone());
    }
    drop(guard);

    (transition, snapshot)
}

fn emit(
    events: &broadcast::Sender<TimerEvent>,
    snapshot: TimerSnapshot,
    record: Option<SessionRecord>,
) {
    // Sending only fails when nobody is subscribed.
    let _ = events.send(TimerEvent::StateChanged(snapshot));
    if let Some(record) = record {
        log_info!(
            "Recorded {} session '{}' ({}s) on {}",
            if record.is_completed() { "completed" } else { "cancelled" },
            record.task_name(),
            record.duration_secs(),
            record.date()
        );
        let _ = events.send(TimerEvent::SessionRecorded(record));
    }
}

async fn run_ticker(
    generation: u64,
    first_tick: Instant,
    tick_interval: Duration,
    state: Arc<Mutex<TimerState>>,
    log: Arc<Mutex<SessionLog>>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<TimerEvent>,
    cancel_token: CancellationToken,
) {
    let mut interval = time::interval_at(first_tick, tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = interval.tick() => {
                let (transition, _) = apply_command(
                    &state,
                    &log,
                    &events,
                    clock.as_ref(),
                    TimerCommand::Tick { generation },
                )
                .await;

                // Superseded, no longer running, or just completed.
                if !transition.accepted || transition.ticker == TickerEffect::Stop {
                    break;
                }
            }
        }
    }
}
