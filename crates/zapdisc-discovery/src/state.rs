//! The result set a renderer displays, and the facade that refreshes it.

use zapdisc_relay::{Event, RelayPool};

use crate::error::DiscoveryError;
use crate::feed::{fetch_author_notes, fetch_author_profile};
use crate::metadata::ProfileMetadata;
use crate::pipeline::{remove_author, run_discovery};
use crate::transport::QueryTransport;
use crate::types::{AuthorSummary, DiscoveryOutcome, DiscoveryParams, RunStatistics};

/// What the rendering layer observes.
///
/// A successful run replaces `summaries` and `stats` wholesale. A failed run
/// leaves them untouched and only sets `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryState {
    pub summaries: Vec<AuthorSummary>,
    pub stats: Option<RunStatistics>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DiscoveryState {
    /// Marks a run as started and clears the previous error.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::RunInProgress`] if a run is already loading.
    pub fn begin_run(&mut self) -> Result<(), DiscoveryError> {
        if self.loading {
            return Err(DiscoveryError::RunInProgress);
        }
        self.loading = true;
        self.error = None;
        Ok(())
    }

    /// Installs a successful run's results.
    pub fn complete(&mut self, outcome: DiscoveryOutcome) {
        self.summaries = outcome.summaries;
        self.stats = Some(outcome.stats);
        self.loading = false;
    }

    /// Records a failed run; the previous results stay.
    pub fn fail(&mut self, error: &DiscoveryError) {
        self.error = Some(error.to_string());
        self.loading = false;
    }

    /// Settles a run started with [`begin_run`](Self::begin_run).
    ///
    /// # Errors
    ///
    /// Hands back the run's error after recording it.
    pub fn finish_run(
        &mut self,
        result: Result<DiscoveryOutcome, DiscoveryError>,
    ) -> Result<(), DiscoveryError> {
        match result {
            Ok(outcome) => {
                self.complete(outcome);
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Drops one author card. Does not touch `stats`.
    pub fn remove_user(&mut self, pubkey: &str) {
        self.summaries = remove_author(&self.summaries, pubkey);
    }
}

/// Discovery bound to a transport: the two operations a UI wires to buttons,
/// plus the per-author lookups behind each card.
pub struct Discovery<T> {
    transport: T,
    params: DiscoveryParams,
    note_feed_limit: usize,
    note_feed_timeout: std::time::Duration,
    state: DiscoveryState,
}

impl Discovery<RelayPool> {
    /// Builds a relay-backed discovery from configuration.
    ///
    /// # Errors
    ///
    /// Returns the relay error if the configured relay list is unusable.
    pub fn from_config(config: &zapdisc_core::AppConfig) -> Result<Self, zapdisc_relay::RelayError> {
        let pool = RelayPool::new(&config.relays)?.with_straggler_grace(config.relay_grace());
        Ok(Self::new(pool, DiscoveryParams::from_config(config))
            .with_note_feed(config.note_feed_limit, config.note_feed_timeout()))
    }
}

impl<T: QueryTransport> Discovery<T> {
    #[must_use]
    pub fn new(transport: T, params: DiscoveryParams) -> Self {
        Self {
            transport,
            params,
            note_feed_limit: 20,
            note_feed_timeout: std::time::Duration::from_secs(5),
            state: DiscoveryState::default(),
        }
    }

    #[must_use]
    pub fn with_note_feed(mut self, limit: usize, timeout: std::time::Duration) -> Self {
        self.note_feed_limit = limit;
        self.note_feed_timeout = timeout;
        self
    }

    #[must_use]
    pub fn state(&self) -> &DiscoveryState {
        &self.state
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn params(&self) -> &DiscoveryParams {
        &self.params
    }

    /// Runs one discovery and installs its results.
    ///
    /// Dropping the returned future mid-run clears `loading` and keeps the
    /// previous results.
    ///
    /// # Errors
    ///
    /// Returns the run's error after recording it in [`DiscoveryState::error`].
    pub async fn fetch_random_users(&mut self) -> Result<&DiscoveryState, DiscoveryError> {
        self.state.begin_run()?;
        {
            let mut run = LoadingGuard {
                state: &mut self.state,
            };
            let result = run_discovery(&self.transport, &self.params).await;
            run.state.finish_run(result)?;
        }
        Ok(&self.state)
    }

    pub fn remove_user(&mut self, pubkey: &str) {
        self.state.remove_user(pubkey);
    }

    /// Notes for the "View Notes" feed of one author.
    ///
    /// # Errors
    ///
    /// Query timeout or transport failure.
    pub async fn author_notes(&self, pubkey: &str) -> Result<Vec<Event>, DiscoveryError> {
        fetch_author_notes(
            &self.transport,
            pubkey,
            self.note_feed_limit,
            self.note_feed_timeout,
        )
        .await
    }

    /// Profile for one author: the cached card metadata when present,
    /// otherwise a fresh lookup.
    ///
    /// # Errors
    ///
    /// Query timeout or transport failure on the fresh lookup.
    pub async fn author_profile(&self, pubkey: &str) -> Result<Option<ProfileMetadata>, DiscoveryError> {
        let cached = self
            .state
            .summaries
            .iter()
            .find(|s| s.pubkey == pubkey)
            .and_then(|s| s.metadata.clone());
        if cached.is_some() {
            return Ok(cached);
        }
        fetch_author_profile(&self.transport, pubkey, self.note_feed_timeout).await
    }
}

/// Clears the busy flag however the run ends, including cancellation.
struct LoadingGuard<'a> {
    state: &'a mut DiscoveryState,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn outcome(pubkeys: &[&str]) -> DiscoveryOutcome {
        let summaries: Vec<AuthorSummary> = pubkeys
            .iter()
            .map(|p| AuthorSummary {
                pubkey: (*p).to_string(),
                metadata: None,
                is_bot: false,
                recent_notes: Vec::new(),
                last_activity: Some(1),
            })
            .collect();
        DiscoveryOutcome {
            stats: RunStatistics {
                total_events: summaries.len(),
                unique_authors: summaries.len(),
                bots_filtered: 0,
                real_users: summaries.len(),
                query_time_ms: 1,
            },
            summaries,
        }
    }

    #[test]
    fn begin_run_is_exclusive() {
        let mut state = DiscoveryState::default();
        state.begin_run().unwrap();
        assert!(state.loading);
        assert!(matches!(
            state.begin_run(),
            Err(DiscoveryError::RunInProgress)
        ));
    }

    #[test]
    fn begin_run_clears_previous_error() {
        let mut state = DiscoveryState {
            error: Some("boom".to_string()),
            ..DiscoveryState::default()
        };
        state.begin_run().unwrap();
        assert!(state.error.is_none());
    }

    #[test]
    fn complete_replaces_results() {
        let mut state = DiscoveryState::default();
        state.begin_run().unwrap();
        state.complete(outcome(&["a", "b"]));
        state.begin_run().unwrap();
        state.complete(outcome(&["c"]));

        assert!(!state.loading);
        assert_eq!(state.summaries.len(), 1);
        assert_eq!(state.summaries[0].pubkey, "c");
        assert_eq!(state.stats.unwrap().total_events, 1);
    }

    #[test]
    fn fail_keeps_previous_results() {
        let mut state = DiscoveryState::default();
        state.begin_run().unwrap();
        state.complete(outcome(&["a"]));

        state.begin_run().unwrap();
        state.fail(&DiscoveryError::Timeout {
            stage: crate::error::QueryStage::Posts,
            budget: Duration::from_secs(10),
        });

        assert!(!state.loading);
        assert_eq!(state.summaries.len(), 1);
        assert!(state.stats.is_some());
        assert!(state.error.as_deref().unwrap().contains("timed out"));
    }

    #[test]
    fn finish_run_always_clears_loading() {
        let mut state = DiscoveryState::default();
        state.begin_run().unwrap();
        state.finish_run(Ok(outcome(&["a"]))).unwrap();
        assert!(!state.loading);

        state.begin_run().unwrap();
        let err = state
            .finish_run(Err(DiscoveryError::RunInProgress))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::RunInProgress));
        assert!(!state.loading);
        assert_eq!(state.summaries.len(), 1);
    }

    #[test]
    fn remove_user_keeps_stats() {
        let mut state = DiscoveryState::default();
        state.complete(outcome(&["a", "b", "c"]));
        state.remove_user("b");
        let left: Vec<&str> = state.summaries.iter().map(|s| s.pubkey.as_str()).collect();
        assert_eq!(left, vec!["a", "c"]);
        assert_eq!(state.stats.unwrap().unique_authors, 3);
    }
}
