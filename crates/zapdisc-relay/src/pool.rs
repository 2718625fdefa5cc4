//! Fan-out query across several relays with merged, deduplicated results.

use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;

use crate::client::RelayClient;
use crate::error::RelayError;
use crate::types::{Event, Filter};

/// How long the remaining relays get once the first one has answered.
pub const DEFAULT_STRAGGLER_GRACE: Duration = Duration::from_secs(1);

/// A fixed set of relays queried together.
#[derive(Debug, Clone)]
pub struct RelayPool {
    relays: Vec<RelayClient>,
    straggler_grace: Duration,
}

impl RelayPool {
    /// Builds a pool from relay URLs.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::NoRelays`] if `urls` is empty, or
    /// [`RelayError::InvalidUrl`] for the first malformed URL.
    pub fn new<S: AsRef<str>>(urls: &[S]) -> Result<Self, RelayError> {
        if urls.is_empty() {
            return Err(RelayError::NoRelays);
        }
        let relays = urls
            .iter()
            .map(|u| RelayClient::new(u.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            relays,
            straggler_grace: DEFAULT_STRAGGLER_GRACE,
        })
    }

    /// Sets how long slower relays may keep answering after the first success.
    #[must_use]
    pub fn with_straggler_grace(mut self, grace: Duration) -> Self {
        self.straggler_grace = grace;
        self
    }

    #[must_use]
    pub fn straggler_grace(&self) -> Duration {
        self.straggler_grace
    }

    #[must_use]
    pub fn urls(&self) -> Vec<&str> {
        self.relays.iter().map(RelayClient::url).collect()
    }

    /// Queries every relay concurrently and merges the answers.
    ///
    /// Once the first relay answers, the rest have `straggler_grace` (never past
    /// `deadline`) to finish; relays still silent after that are dropped.
    /// Events are deduplicated by id in arrival order, first occurrence
    /// winning. When any filter carries a `limit`, the merged set is cut to the
    /// largest such limit, keeping the newest events.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::AllRelaysFailed`] only when no relay answered.
    /// Partial failures are logged and skipped.
    pub async fn query(&self, filters: &[Filter], deadline: Instant) -> Result<Vec<Event>, RelayError> {
        let mut pending: FuturesUnordered<_> = self
            .relays
            .iter()
            .map(|relay| async move { (relay.url(), relay.query(filters, deadline).await) })
            .collect();

        let mut batches = Vec::with_capacity(self.relays.len());
        let mut last_err = None;
        let mut cutoff: Option<Instant> = None;

        loop {
            let next = match cutoff {
                None => pending.next().await,
                Some(cutoff) => match tokio::time::timeout_at(cutoff, pending.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        tracing::debug!(
                            stragglers = pending.len(),
                            grace_ms = u64::try_from(self.straggler_grace.as_millis()).unwrap_or(u64::MAX),
                            "dropping relays that missed the grace window"
                        );
                        break;
                    }
                },
            };
            let Some((url, answer)) = next else { break };

            match answer {
                Ok(events) => {
                    batches.push(events);
                    if cutoff.is_none() {
                        cutoff = Some((Instant::now() + self.straggler_grace).min(deadline));
                    }
                }
                Err(e) => {
                    tracing::warn!(relay = url, error = %e, "relay query failed");
                    last_err = Some(e);
                }
            }
        }
        drop(pending);

        if batches.is_empty() {
            let last = last_err.unwrap_or(RelayError::NoRelays);
            return Err(RelayError::AllRelaysFailed {
                attempted: self.relays.len(),
                last: Box::new(last),
            });
        }

        let limit = filters.iter().filter_map(|f| f.limit).max();
        let merged = merge_events(batches, limit);
        tracing::debug!(
            relays = self.relays.len(),
            events = merged.len(),
            "pool query merged"
        );
        Ok(merged)
    }
}

/// Concatenates relay batches, dropping repeated event ids, and applies `limit`
/// to the newest events.
pub(crate) fn merge_events(batches: Vec<Vec<Event>>, limit: Option<usize>) -> Vec<Event> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<Event> = batches
        .into_iter()
        .flatten()
        .filter(|event| seen.insert(event.id.clone()))
        .collect();

    if let Some(limit) = limit {
        if merged.len() > limit {
            merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            merged.truncate(limit);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, created_at: u64) -> Event {
        Event {
            id: id.to_string(),
            pubkey: "p".to_string(),
            created_at,
            kind: 1,
            tags: Vec::new(),
            content: String::new(),
            sig: String::new(),
        }
    }

    #[test]
    fn empty_pool_is_rejected() {
        let urls: [&str; 0] = [];
        assert!(matches!(RelayPool::new(&urls), Err(RelayError::NoRelays)));
    }

    #[test]
    fn bad_url_is_rejected() {
        let result = RelayPool::new(&["wss://ok.example", "http://bad.example"]);
        assert!(matches!(result, Err(RelayError::InvalidUrl { .. })));
    }

    #[test]
    fn merge_drops_duplicate_ids() {
        let merged = merge_events(
            vec![
                vec![event("a", 1), event("b", 2)],
                vec![event("b", 2), event("c", 3)],
            ],
            None,
        );
        let ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn merge_keeps_newest_under_limit() {
        let merged = merge_events(
            vec![vec![event("a", 10), event("b", 30)], vec![event("c", 20)]],
            Some(2),
        );
        let ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn merge_within_limit_preserves_order() {
        let merged = merge_events(vec![vec![event("a", 10), event("b", 30)]], Some(5));
        let ids: Vec<&str> = merged.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn grace_defaults_and_overrides() {
        let pool = RelayPool::new(&["wss://ok.example"]).unwrap();
        assert_eq!(pool.straggler_grace(), DEFAULT_STRAGGLER_GRACE);
        let pool = pool.with_straggler_grace(Duration::from_millis(250));
        assert_eq!(pool.straggler_grace(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn all_failing_relays_report_last_error() {
        // Nothing listens on port 1; connection is refused immediately.
        let pool = RelayPool::new(&["ws://127.0.0.1:1"]).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        let err = pool.query(&[Filter::new().kind(1)], deadline).await.unwrap_err();
        assert!(matches!(err, RelayError::AllRelaysFailed { attempted: 1, .. }));
    }
}
