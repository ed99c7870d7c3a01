use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FailureKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DrawReport {
    Navigated {
        url: String,
        history_len: usize,
    },
    Waiting {
        reset_at: DateTime<Utc>,
        reset_time: String,
        remaining_secs: i64,
    },
    Failed {
        kind: FailureKind,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub history: Vec<String>,
    pub history_limit: usize,
    pub reset_at: Option<DateTime<Utc>>,
    pub reset_time: Option<String>,
}
