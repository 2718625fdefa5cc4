//! Zap Discovery: sample active Nostr authors and separate humans from bots.
//!
//! Pulls recent notes from a relay set, samples authors at random, fetches
//! their profiles, classifies each as bot or human, and ranks the result.
//! [`Discovery`] holds the observable state a renderer draws from.

pub mod classifier;
pub mod display;
pub mod error;
pub mod feed;
pub mod metadata;
pub mod pipeline;
pub mod sampler;
pub mod state;
pub mod transport;
pub mod types;

pub use classifier::detect_bot;
pub use error::{DiscoveryError, QueryStage, TransportError};
pub use feed::{fetch_author_notes, fetch_author_profile};
pub use metadata::ProfileMetadata;
pub use pipeline::{remove_author, run_discovery, run_discovery_with_rng};
pub use sampler::choose_k;
pub use state::{Discovery, DiscoveryState};
pub use transport::QueryTransport;
pub use types::{AuthorSummary, DiscoveryOutcome, DiscoveryParams, RunStatistics};
