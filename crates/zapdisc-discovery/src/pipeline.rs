//! Discovery pipeline orchestration.
//!
//! A run is two dependent queries sharing one deadline: recent notes from
//! anyone, then profiles for a random sample of the authors seen. Everything
//! between and after the queries is pure and lives in free functions so it can
//! be tested without a transport.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;
use zapdisc_relay::{Event, Filter, KIND_METADATA, KIND_TEXT_NOTE};

use crate::classifier::detect_bot;
use crate::display::unix_now;
use crate::error::{DiscoveryError, QueryStage};
use crate::metadata::{latest_profiles, metadata_from_event};
use crate::sampler::choose_k;
use crate::transport::{bounded_query, QueryTransport};
use crate::types::{AuthorSummary, DiscoveryOutcome, DiscoveryParams, RunStatistics};

/// Posts grouped by author, authors in first-seen order.
#[derive(Debug, Default)]
pub struct AuthorGroups {
    order: Vec<String>,
    posts: HashMap<String, Vec<Event>>,
}

impl AuthorGroups {
    /// Distinct authors in first-seen order.
    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn posts_by(&self, pubkey: &str) -> &[Event] {
        self.posts.get(pubkey).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Removes and returns an author's posts.
    pub fn take(&mut self, pubkey: &str) -> Vec<Event> {
        self.posts.remove(pubkey).unwrap_or_default()
    }

    /// All posts, author by author, each author's posts in arrival order.
    pub fn into_flat(mut self) -> Vec<Event> {
        let order = std::mem::take(&mut self.order);
        order.iter().flat_map(|a| self.take(a)).collect()
    }
}

/// Groups posts by `pubkey`, keeping arrival order within each author.
#[must_use]
pub fn group_by_author(posts: Vec<Event>) -> AuthorGroups {
    let mut groups = AuthorGroups::default();
    for post in posts {
        match groups.posts.get_mut(&post.pubkey) {
            Some(list) => list.push(post),
            None => {
                groups.order.push(post.pubkey.clone());
                groups.posts.insert(post.pubkey.clone(), vec![post]);
            }
        }
    }
    groups
}

/// Builds one summary per selected author and ranks them.
///
/// `profiles` may hold several records per author and records for authors
/// that were not selected; only the newest record of each selected author is
/// used.
pub fn assemble_summaries(
    groups: &mut AuthorGroups,
    selected: &[String],
    profiles: Vec<Event>,
    notes_per_author: usize,
) -> Vec<AuthorSummary> {
    let latest = latest_profiles(
        profiles
            .into_iter()
            .filter(|e| e.kind == KIND_METADATA)
            .collect(),
    );

    let mut summaries: Vec<AuthorSummary> = selected
        .iter()
        .map(|pubkey| {
            let metadata = latest.get(pubkey).and_then(metadata_from_event);
            let is_bot = detect_bot(metadata.as_ref());

            let mut recent_notes = groups.take(pubkey);
            recent_notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            recent_notes.truncate(notes_per_author);
            let last_activity = recent_notes.first().map(|n| n.created_at);

            AuthorSummary {
                pubkey: pubkey.clone(),
                metadata,
                is_bot,
                recent_notes,
                last_activity,
            }
        })
        .collect();

    rank_summaries(&mut summaries);
    summaries
}

/// Humans first, then bots; newest activity first within each group.
/// Authors without activity sort last in their group.
pub fn rank_summaries(summaries: &mut [AuthorSummary]) {
    summaries.sort_by(|a, b| {
        a.is_bot
            .cmp(&b.is_bot)
            .then_with(|| b.last_activity.cmp(&a.last_activity))
    });
}

/// Returns `summaries` without the entry for `pubkey`, order preserved.
#[must_use]
pub fn remove_author(summaries: &[AuthorSummary], pubkey: &str) -> Vec<AuthorSummary> {
    summaries
        .iter()
        .filter(|s| s.pubkey != pubkey)
        .cloned()
        .collect()
}

/// One discovery invocation: both queries share `deadline`.
pub struct DiscoveryRun<'a, T> {
    transport: &'a T,
    params: &'a DiscoveryParams,
    started: Instant,
    deadline: Instant,
}

impl<'a, T: QueryTransport> DiscoveryRun<'a, T> {
    #[must_use]
    pub fn new(transport: &'a T, params: &'a DiscoveryParams) -> Self {
        let started = Instant::now();
        Self {
            transport,
            params,
            started,
            deadline: started + params.timeout,
        }
    }

    /// Step one: recent notes from anyone inside the lookback window.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::Timeout`] or [`DiscoveryError::Transport`].
    pub async fn fetch_posts(&self, now: u64) -> Result<Vec<Event>, DiscoveryError> {
        let since = now.saturating_sub(self.params.lookback.as_secs());
        let filter = Filter::new()
            .kind(KIND_TEXT_NOTE)
            .since(since)
            .limit(self.params.post_limit);
        bounded_query(
            self.transport,
            QueryStage::Posts,
            &[filter],
            self.deadline,
            self.params.timeout,
        )
        .await
    }

    /// Step two: profile records for exactly `authors`.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::Timeout`] or [`DiscoveryError::Transport`].
    pub async fn fetch_profiles(&self, authors: &[String]) -> Result<Vec<Event>, DiscoveryError> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        let filter = Filter::new()
            .kind(KIND_METADATA)
            .authors(authors.iter().map(String::as_str));
        bounded_query(
            self.transport,
            QueryStage::Profiles,
            &[filter],
            self.deadline,
            self.params.timeout,
        )
        .await
    }

    /// Runs both steps and assembles the outcome.
    ///
    /// # Errors
    ///
    /// Any query failure aborts the run; nothing partial is returned.
    pub async fn execute<R: Rng + Send>(self, rng: &mut R) -> Result<DiscoveryOutcome, DiscoveryError> {
        let posts = self.fetch_posts(unix_now()).await?;
        let total_events = posts.len();

        let mut groups = group_by_author(posts);
        let unique_authors = groups.authors().len();
        let selected = choose_k(groups.authors(), self.params.sample_size, rng);

        tracing::debug!(
            total_events,
            unique_authors,
            selected = selected.len(),
            "sampled authors"
        );

        let profiles = self.fetch_profiles(&selected).await?;
        let summaries = assemble_summaries(
            &mut groups,
            &selected,
            profiles,
            self.params.notes_per_author,
        );

        let bots_filtered = summaries.iter().filter(|s| s.is_bot).count();
        let stats = RunStatistics {
            total_events,
            unique_authors,
            bots_filtered,
            real_users: summaries.len() - bots_filtered,
            query_time_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        tracing::info!(
            total_events = stats.total_events,
            unique_authors = stats.unique_authors,
            bots_filtered = stats.bots_filtered,
            real_users = stats.real_users,
            query_time_ms = stats.query_time_ms,
            "discovery run complete"
        );

        Ok(DiscoveryOutcome { summaries, stats })
    }
}

/// Runs the full discovery pipeline with a freshly seeded RNG.
///
/// 1. Fetch up to `post_limit` recent notes within `lookback`.
/// 2. Group by author and sample up to `sample_size` authors.
/// 3. Fetch profiles for the sample; keep the newest per author.
/// 4. Classify, cap notes, rank, and compute statistics.
///
/// # Errors
///
/// Returns [`DiscoveryError::Timeout`] when `params.timeout` elapses during
/// either query and [`DiscoveryError::Transport`] when the transport rejects
/// one. Malformed profiles are not errors.
pub async fn run_discovery<T: QueryTransport>(
    transport: &T,
    params: &DiscoveryParams,
) -> Result<DiscoveryOutcome, DiscoveryError> {
    let mut rng = StdRng::from_rng(&mut rand::rng());
    run_discovery_with_rng(transport, params, &mut rng).await
}

/// [`run_discovery`] with a caller-supplied RNG, for reproducible sampling.
///
/// # Errors
///
/// Same as [`run_discovery`].
pub async fn run_discovery_with_rng<T: QueryTransport, R: Rng + Send>(
    transport: &T,
    params: &DiscoveryParams,
    rng: &mut R,
) -> Result<DiscoveryOutcome, DiscoveryError> {
    let result = DiscoveryRun::new(transport, params).execute(rng).await;
    if let Err(e) = &result {
        tracing::warn!(error = %e, stage = ?e.stage(), "discovery run failed");
    }
    result
}
