//! Session record data model.
//!
//! A `SessionRecord` is written exactly once, when a focus session reaches a
//! terminal outcome (completion or confirmed cancellation), and is read-only
//! afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Date format used for `SessionRecord::date`. Sorts chronologically as a string.
pub const RECORD_DATE_FORMAT: &str = "%Y/%m/%d";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    id: String,
    date: String,
    task_name: String,
    duration_secs: u64,
    is_completed: bool,
}

impl SessionRecord {
    /// Record for a countdown that reached zero; `duration_secs` is the configured total.
    pub fn completed(date: impl Into<String>, task_name: impl Into<String>, duration_secs: u64) -> Self {
        Self::new(date, task_name, duration_secs, true)
    }

    /// Record for a session cancelled early; `duration_secs` is the elapsed time.
    pub fn cancelled(date: impl Into<String>, task_name: impl Into<String>, duration_secs: u64) -> Self {
        Self::new(date, task_name, duration_secs, false)
    }

    pub fn new(
        date: impl Into<String>,
        task_name: impl Into<String>,
        duration_secs: u64,
        is_completed: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date: date.into(),
            task_name: task_name.into(),
            duration_secs,
            is_completed,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }
}
