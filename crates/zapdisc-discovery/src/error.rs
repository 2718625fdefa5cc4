use std::time::Duration;

use thiserror::Error;
use zapdisc_relay::RelayError;

/// Which query of a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Posts,
    Profiles,
    AuthorNotes,
    AuthorProfile,
}

impl std::fmt::Display for QueryStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryStage::Posts => write!(f, "recent posts"),
            QueryStage::Profiles => write!(f, "profile"),
            QueryStage::AuthorNotes => write!(f, "author notes"),
            QueryStage::AuthorProfile => write!(f, "author profile"),
        }
    }
}

/// Failure reported by a [`crate::QueryTransport`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("{0}")]
    Rejected(String),
}

impl TransportError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            TransportError::Relay(e) => e.is_timeout(),
            TransportError::Rejected(_) => false,
        }
    }
}

/// Errors that abort a discovery run or a per-author fetch.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Shows the transport's own message; `stage` is kept for logs and matching.
    #[error("{source}")]
    Transport {
        stage: QueryStage,
        #[source]
        source: TransportError,
    },

    #[error("failed to fetch users: {stage} query timed out after {}ms", budget.as_millis())]
    Timeout { stage: QueryStage, budget: Duration },

    #[error("a discovery run is already in progress")]
    RunInProgress,
}

impl DiscoveryError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, DiscoveryError::Timeout { .. })
    }

    /// The query that failed, if the error came from one.
    #[must_use]
    pub fn stage(&self) -> Option<QueryStage> {
        match self {
            DiscoveryError::Transport { stage, .. } | DiscoveryError::Timeout { stage, .. } => {
                Some(*stage)
            }
            DiscoveryError::RunInProgress => None,
        }
    }
}

/// A profile payload that could not be read. Never leaves the crate: the
/// author is treated as having no metadata.
#[derive(Debug, Error)]
pub(crate) enum MetadataParseError {
    #[error("invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("profile payload is not a JSON object")]
    NotAnObject,
}
