use serde::{Deserialize, Serialize};

/// Per-day rollup of the session log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: String,
    pub completed_count: u32,
    pub uncompleted_count: u32,
    /// Completed and cancelled sessions alike.
    pub total_duration_secs: u64,
}

impl DailyStats {
    pub(crate) fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            completed_count: 0,
            uncompleted_count: 0,
            total_duration_secs: 0,
        }
    }
}
