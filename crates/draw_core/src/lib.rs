use std::sync::Arc;

use rand::Rng;
use shared::{
    domain::{DrawAction, DrawPolicy, DrawState},
    error::DrawError,
    protocol::{DrawReport, StatusReport},
};
use storage::{KeyValueStore, StateError, StateRepository};
use tracing::{error, info, warn};

pub mod clock;
pub mod controller;
pub mod navigator;
pub mod source;
pub mod waiting;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{check_deadline, decide, Gate};
pub use navigator::{Navigator, PrintNavigator, SystemNavigator};
pub use source::{fetcher_for, parse_source_text, SourceFetcher, SourceLocation};
pub use waiting::{WaitNotice, WaitView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Navigated { url: String, history_len: usize },
    Waiting(WaitNotice),
}

impl DrawOutcome {
    pub fn report(&self) -> DrawReport {
        match self {
            Self::Navigated { url, history_len } => DrawReport::Navigated {
                url: url.clone(),
                history_len: *history_len,
            },
            Self::Waiting(notice) => DrawReport::Waiting {
                reset_at: notice.reset_at,
                reset_time: notice.reset_time(),
                remaining_secs: notice.remaining.num_seconds(),
            },
        }
    }
}

/// Runs one draw per invocation against injected storage, source, clock and
/// navigator.
pub struct DrawController {
    state: StateRepository<Arc<dyn KeyValueStore>>,
    fetcher: Arc<dyn SourceFetcher>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    policy: DrawPolicy,
}

impl DrawController {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        fetcher: Arc<dyn SourceFetcher>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
        policy: DrawPolicy,
    ) -> Self {
        Self {
            state: StateRepository::new(store, policy.history_limit),
            fetcher,
            navigator,
            clock,
            policy,
        }
    }

    /// Draws, and if the resulting wait has already run out, clears state and
    /// draws once more.
    pub async fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<DrawOutcome, DrawError> {
        let outcome = self.draw_once(rng).await?;
        let DrawOutcome::Waiting(notice) = &outcome else {
            return Ok(outcome);
        };

        match waiting::evaluate(notice.reset_at, self.clock.now()) {
            WaitView::Pending(notice) => Ok(DrawOutcome::Waiting(notice)),
            WaitView::Elapsed => {
                info!(reset_at = %notice.reset_at, "draw: wait already over, redrawing");
                self.state.clear().await.map_err(state_error)?;
                self.draw_once(rng).await
            }
        }
    }

    async fn draw_once<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<DrawOutcome, DrawError> {
        let deadline = self.state.load_deadline().await.map_err(state_error)?;
        let now = self.clock.now();

        let state = match check_deadline(deadline, now) {
            Gate::Wait(reset_at) => {
                info!(%reset_at, "draw: waiting for reset");
                return Ok(DrawOutcome::Waiting(WaitNotice {
                    reset_at,
                    remaining: reset_at - now,
                }));
            }
            Gate::Expired => {
                info!("draw: reset deadline passed, starting fresh");
                DrawState::cleared()
            }
            Gate::Open => {
                let history = self.state.load_history().await.map_err(state_error)?;
                DrawState::new(history, None)
            }
        };

        let fetched = self.fetcher.fetch().await;
        match &fetched {
            Ok(source) if source.is_empty() => warn!("draw: source list has no entries"),
            Ok(_) => {}
            Err(err) => error!(%err, "draw: failed to load source list"),
        }
        let candidates = fetched.as_ref().map(|source| source.len()).unwrap_or_default();

        let (next, action) = decide(state, fetched, rng, now, &self.policy);
        match action {
            DrawAction::Navigate(url) => {
                self.state.save(&next).await.map_err(state_error)?;
                info!(
                    %url,
                    candidates,
                    history_len = next.history.len(),
                    "draw: selected entry"
                );
                self.navigator
                    .open(&url)
                    .map_err(|err| DrawError::Navigation {
                        url: url.clone(),
                        message: format!("{err:#}"),
                    })?;
                Ok(DrawOutcome::Navigated {
                    url,
                    history_len: next.history.len(),
                })
            }
            DrawAction::Wait(reset_at) => {
                self.state.save(&next).await.map_err(state_error)?;
                info!(%reset_at, candidates, "draw: every entry drawn, cooldown started");
                Ok(DrawOutcome::Waiting(WaitNotice {
                    reset_at,
                    remaining: reset_at - now,
                }))
            }
            // Nothing is persisted on failure.
            DrawAction::Error(err) => Err(err.into()),
        }
    }

    /// Current history and deadline. An elapsed deadline is cleared, the
    /// same as the next draw would.
    pub async fn status(&self) -> Result<StatusReport, DrawError> {
        let mut deadline = self.state.load_deadline().await.map_err(state_error)?;
        if let Some(reset_at) = deadline {
            if waiting::evaluate(reset_at, self.clock.now()) == WaitView::Elapsed {
                info!(%reset_at, "status: reset deadline passed, clearing history");
                self.state.clear().await.map_err(state_error)?;
                deadline = None;
            }
        }

        let history = self.state.load_history().await.map_err(state_error)?;
        Ok(StatusReport {
            history,
            history_limit: self.policy.history_limit,
            reset_at: deadline,
            reset_time: deadline
                .map(|reset_at| waiting::format_reset_time(reset_at, &chrono::Local)),
        })
    }

    pub async fn reset(&self) -> Result<(), DrawError> {
        self.state.clear().await.map_err(state_error)?;
        info!("reset: history and deadline cleared");
        Ok(())
    }
}

fn state_error(err: StateError) -> DrawError {
    error!(%err, "draw: state access failed");
    DrawError::State(err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
