use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use crate::timer::{TimerConfig, DEFAULT_TASK_LABEL};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Overrides `tick_interval_ms` when set, handy for watching a countdown run fast.
pub const TICK_INTERVAL_ENV: &str = "CATFOCUS_TICK_MS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimerSettings {
    /// Countdown the task sheet starts from, and what clearing a task resets to.
    pub default_config: TimerConfig,
    pub default_task_label: String,
    pub tick_interval_ms: u64,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            default_config: TimerConfig::default(),
            default_task_label: DEFAULT_TASK_LABEL.into(),
            tick_interval_ms: 1000,
        }
    }
}

impl TimerSettings {
    pub fn tick_interval(&self) -> Duration {
        let ms = std::env::var(TICK_INTERVAL_ENV)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(self.tick_interval_ms);
        Duration::from_millis(ms.max(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    timer: TimerSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log_warn!("Ignoring unreadable settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn timer(&self) -> TimerSettings {
        self.read().timer.clone()
    }

    pub fn update_timer(&self, settings: TimerSettings) -> Result<()> {
        let mut guard = self.write();
        guard.timer = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: UserSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings in {}", self.path.display()))?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
