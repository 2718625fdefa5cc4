use std::time::Duration;

/// Relays queried when `ZAPDISC_RELAYS` is not set.
pub const DEFAULT_RELAYS: &[&str] = &[
    "wss://relay.damus.io",
    "wss://relay.nostr.band",
    "wss://relay.primal.net",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// WebSocket relay URLs, in the order they were configured.
    pub relays: Vec<String>,
    pub lookback_secs: u64,
    pub post_limit: usize,
    pub sample_size: usize,
    pub notes_per_author: usize,
    pub timeout_ms: u64,
    /// Once one relay has answered, how long the others may still answer.
    pub relay_grace_ms: u64,
    pub note_feed_limit: usize,
    pub note_feed_timeout_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn lookback(&self) -> Duration {
        Duration::from_secs(self.lookback_secs)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn relay_grace(&self) -> Duration {
        Duration::from_millis(self.relay_grace_ms)
    }

    #[must_use]
    pub fn note_feed_timeout(&self) -> Duration {
        Duration::from_millis(self.note_feed_timeout_ms)
    }
}
