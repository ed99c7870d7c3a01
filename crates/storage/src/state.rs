use chrono::{DateTime, Utc};
use shared::domain::DrawState;
use thiserror::Error;
use tracing::warn;

use crate::{KeyValueStore, KvChange};

pub const DRAWN_URLS_KEY: &str = "oracle.drawn_urls";
pub const RESET_TIME_KEY: &str = "oracle.reset_time";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("value under '{key}' is not a JSON array of strings: {source}")]
    CorruptHistory {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Reads and writes [`DrawState`] through the two persisted keys.
pub struct StateRepository<S> {
    store: S,
    history_limit: usize,
}

impl<S: KeyValueStore> StateRepository<S> {
    pub fn new(store: S, history_limit: usize) -> Self {
        Self {
            store,
            history_limit,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// An unparseable deadline is treated as absent.
    pub async fn load_deadline(&self) -> Result<Option<DateTime<Utc>>, StateError> {
        let Some(raw) = self.store.get(RESET_TIME_KEY).await? else {
            return Ok(None);
        };

        let deadline = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis);
        if deadline.is_none() {
            warn!(key = RESET_TIME_KEY, value = %raw, "state: ignoring unparseable reset deadline");
        }
        Ok(deadline)
    }

    pub async fn load_history(&self) -> Result<Vec<String>, StateError> {
        let Some(raw) = self.store.get(DRAWN_URLS_KEY).await? else {
            return Ok(Vec::new());
        };

        let mut history: Vec<String> =
            serde_json::from_str(&raw).map_err(|source| StateError::CorruptHistory {
                key: DRAWN_URLS_KEY,
                source,
            })?;
        if history.len() > self.history_limit {
            let excess = history.len() - self.history_limit;
            history.drain(..excess);
        }
        Ok(history)
    }

    pub async fn load(&self) -> Result<DrawState, StateError> {
        let reset_deadline = self.load_deadline().await?;
        let history = self.load_history().await?;
        Ok(DrawState::new(history, reset_deadline))
    }

    /// Writes history and deadline together so a failed write leaves the
    /// previous state intact.
    pub async fn save(&self, state: &DrawState) -> Result<(), StateError> {
        let encoded_history = if state.history.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&state.history).map_err(|err| StateError::Store(err.into()))?)
        };
        let encoded_deadline = state
            .reset_deadline
            .map(|deadline| deadline.timestamp_millis().to_string());

        let changes = [
            match &encoded_history {
                Some(value) => KvChange::Set { key: DRAWN_URLS_KEY, value },
                None => KvChange::Remove { key: DRAWN_URLS_KEY },
            },
            match &encoded_deadline {
                Some(value) => KvChange::Set { key: RESET_TIME_KEY, value },
                None => KvChange::Remove { key: RESET_TIME_KEY },
            },
        ];
        self.store.apply(&changes).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StateError> {
        self.store
            .apply(&[
                KvChange::Remove { key: DRAWN_URLS_KEY },
                KvChange::Remove { key: RESET_TIME_KEY },
            ])
            .await?;
        Ok(())
    }
}
