mod types;

pub use types::DailyStats;

use std::collections::BTreeMap;

use crate::models::SessionRecord;

/// Append-only history of finished sessions, in the order they ended.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    records: Vec<SessionRecord>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: SessionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-date totals, newest date first. Recomputed from the full log on every call.
    pub fn grouped_stats(&self) -> Vec<DailyStats> {
        let mut by_date: BTreeMap<&str, DailyStats> = BTreeMap::new();
        for record in &self.records {
            let entry = by_date
                .entry(record.date())
                .or_insert_with(|| DailyStats::empty(record.date()));
            if record.is_completed() {
                entry.completed_count += 1;
            } else {
                entry.uncompleted_count += 1;
            }
            entry.total_duration_secs = entry
                .total_duration_secs
                .saturating_add(record.duration_secs());
        }

        // `yyyy/MM/dd` orders chronologically as a plain string.
        by_date.into_values().rev().collect()
    }

    /// Distinct names of tasks completed on `date`, in first-completion order.
    pub fn completed_task_names(&self, date: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for record in &self.records {
            if record.is_completed()
                && record.date() == date
                && !names.iter().any(|name| name == record.task_name())
            {
                names.push(record.task_name().to_string());
            }
        }
        names
    }
}

/// Human-readable duration; larger units are omitted when they are zero.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}小時{minutes}分鐘{seconds}秒")
    } else if minutes > 0 {
        format!("{minutes}分鐘{seconds}秒")
    } else {
        format!("{seconds}秒")
    }
}
