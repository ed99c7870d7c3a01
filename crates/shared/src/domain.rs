use std::{collections::HashSet, time::Duration};

use chrono::{DateTime, Utc};

use crate::error::SourceError;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;
pub const DEFAULT_RESET_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

/// Limits applied to every draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPolicy {
    pub history_limit: usize,
    pub reset_after: Duration,
}

impl Default for DrawPolicy {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            reset_after: DEFAULT_RESET_AFTER,
        }
    }
}

/// Candidate entries in source order, comments and blanks already removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList(Vec<String>);

impl SourceList {
    /// Keeps the first occurrence of every entry.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let entries = entries
            .into_iter()
            .map(Into::into)
            .filter(|entry: &String| seen.insert(entry.clone()))
            .collect();
        Self(entries)
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries not present in `history`, in source order.
    pub fn eligible<'a>(&'a self, history: &[String]) -> Vec<&'a str> {
        let drawn: HashSet<&str> = history.iter().map(String::as_str).collect();
        self.0
            .iter()
            .map(String::as_str)
            .filter(|entry| !drawn.contains(entry))
            .collect()
    }
}

/// Everything that survives between draws.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawState {
    pub history: Vec<String>,
    pub reset_deadline: Option<DateTime<Utc>>,
}

impl DrawState {
    pub fn new(history: Vec<String>, reset_deadline: Option<DateTime<Utc>>) -> Self {
        Self {
            history,
            reset_deadline,
        }
    }

    /// Appends `entry` and evicts the oldest entries beyond `limit`.
    pub fn record(&mut self, entry: impl Into<String>, limit: usize) {
        self.history.push(entry.into());
        self.truncate_history(limit);
    }

    pub fn truncate_history(&mut self, limit: usize) {
        if self.history.len() > limit {
            let excess = self.history.len() - limit;
            self.history.drain(..excess);
        }
    }

    pub fn cleared() -> Self {
        Self::default()
    }
}

/// What a draw decided to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawAction {
    Navigate(String),
    Wait(DateTime<Utc>),
    /// Source failure; the state is left as it was.
    Error(SourceError),
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
