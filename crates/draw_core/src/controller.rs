//! The draw decision, free of storage, network and wall-clock access.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use rand::{seq::SliceRandom, Rng};
use shared::{
    domain::{DrawAction, DrawPolicy, DrawState, SourceList},
    error::SourceError,
};

/// Result of checking the persisted reset deadline before any fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Deadline still ahead; nothing may be fetched or mutated.
    Wait(DateTime<Utc>),
    /// Deadline has passed; history and deadline are discarded.
    Expired,
    Open,
}

pub fn check_deadline(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Gate {
    match deadline {
        Some(deadline) if now < deadline => Gate::Wait(deadline),
        Some(_) => Gate::Expired,
        None => Gate::Open,
    }
}

pub fn deadline_after(now: DateTime<Utc>, reset_after: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(reset_after)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Picks the next entry. `state` must already have passed [`check_deadline`].
///
/// On failure the state is returned untouched. When every entry has been
/// drawn the history is kept and a deadline `policy.reset_after` from `now`
/// is set. Otherwise one eligible entry is chosen uniformly and recorded.
pub fn decide<R: Rng + ?Sized>(
    mut state: DrawState,
    fetched: Result<SourceList, SourceError>,
    rng: &mut R,
    now: DateTime<Utc>,
    policy: &DrawPolicy,
) -> (DrawState, DrawAction) {
    let source = match fetched {
        Ok(source) => source,
        Err(err) => return (state, DrawAction::Error(err)),
    };

    let picked = source
        .eligible(&state.history)
        .choose(rng)
        .map(|entry| entry.to_string());

    match picked {
        Some(url) => {
            state.reset_deadline = None;
            state.record(url.clone(), policy.history_limit);
            (state, DrawAction::Navigate(url))
        }
        None => {
            let deadline = deadline_after(now, policy.reset_after);
            state.reset_deadline = Some(deadline);
            (state, DrawAction::Wait(deadline))
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
