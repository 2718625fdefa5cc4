use std::time::Duration;

use serde::Serialize;
use zapdisc_core::AppConfig;
use zapdisc_relay::Event;

use crate::display::fallback_name;
use crate::metadata::ProfileMetadata;

/// One sampled author, as shown on a discovery card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorSummary {
    /// Hex public key.
    pub pubkey: String,
    /// Newest parseable profile, if any.
    pub metadata: Option<ProfileMetadata>,
    pub is_bot: bool,
    /// Newest first, capped at the per-author note limit.
    pub recent_notes: Vec<Event>,
    /// `created_at` of the newest note.
    pub last_activity: Option<u64>,
}

impl AuthorSummary {
    /// Profile display name, falling back to a generated name.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.metadata
            .as_ref()
            .and_then(ProfileMetadata::preferred_name)
            .map_or_else(|| fallback_name(&self.pubkey), str::to_string)
    }

    #[must_use]
    pub fn has_lightning(&self) -> bool {
        self.metadata
            .as_ref()
            .is_some_and(ProfileMetadata::has_lightning)
    }

    /// Zaps are offered only to humans with a lightning address.
    #[must_use]
    pub fn can_zap(&self) -> bool {
        self.has_lightning() && !self.is_bot
    }
}

/// Aggregate numbers for one discovery run.
///
/// `bots_filtered + real_users` counts the sampled authors only;
/// `unique_authors` counts every author seen in the post window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub total_events: usize,
    pub unique_authors: usize,
    pub bots_filtered: usize,
    pub real_users: usize,
    pub query_time_ms: u64,
}

/// The ranked summaries and statistics a successful run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryOutcome {
    pub summaries: Vec<AuthorSummary>,
    pub stats: RunStatistics,
}

/// Tunables for a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryParams {
    /// How far back to look for posts.
    pub lookback: Duration,
    /// Cap on posts fetched in the first query.
    pub post_limit: usize,
    /// Maximum number of authors sampled.
    pub sample_size: usize,
    /// Maximum notes kept per author.
    pub notes_per_author: usize,
    /// Wall-clock budget for the whole run, both queries included.
    pub timeout: Duration,
}

impl Default for DiscoveryParams {
    fn default() -> Self {
        Self {
            lookback: Duration::from_secs(6 * 60 * 60),
            post_limit: 500,
            sample_size: 20,
            notes_per_author: 10,
            timeout: Duration::from_secs(10),
        }
    }
}

impl DiscoveryParams {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            lookback: config.lookback(),
            post_limit: config.post_limit,
            sample_size: config.sample_size,
            notes_per_author: config.notes_per_author,
            timeout: config.timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(metadata: Option<ProfileMetadata>, is_bot: bool) -> AuthorSummary {
        AuthorSummary {
            pubkey: "ab".repeat(32),
            metadata,
            is_bot,
            recent_notes: Vec::new(),
            last_activity: None,
        }
    }

    #[test]
    fn default_params_match_documented_constants() {
        let p = DiscoveryParams::default();
        assert_eq!(p.lookback, Duration::from_secs(21_600));
        assert_eq!(p.post_limit, 500);
        assert_eq!(p.sample_size, 20);
        assert_eq!(p.notes_per_author, 10);
        assert_eq!(p.timeout, Duration::from_secs(10));
    }

    #[test]
    fn display_name_prefers_profile() {
        let s = summary(
            Some(ProfileMetadata {
                name: Some("alice".to_string()),
                ..ProfileMetadata::default()
            }),
            false,
        );
        assert_eq!(s.display_name(), "alice");
    }

    #[test]
    fn display_name_falls_back_to_generated() {
        let s = summary(None, false);
        assert_eq!(s.display_name(), fallback_name(&s.pubkey));
    }

    #[test]
    fn bots_cannot_be_zapped() {
        let lightning = ProfileMetadata {
            lud16: Some("x@y.z".to_string()),
            ..ProfileMetadata::default()
        };
        assert!(summary(Some(lightning.clone()), false).can_zap());
        assert!(!summary(Some(lightning), true).can_zap());
        assert!(!summary(None, false).can_zap());
    }
}
