//! Nostr relay transport.
//!
//! Speaks the NIP-01 `REQ`/`EVENT`/`EOSE`/`CLOSE` exchange over WebSocket to
//! one relay ([`RelayClient`]) or several at once ([`RelayPool`]). Every query
//! is bounded by a caller-supplied [`tokio::time::Instant`] deadline.

pub mod client;
pub mod error;
pub mod pool;
pub mod types;

mod message;

pub use client::RelayClient;
pub use error::RelayError;
pub use pool::{RelayPool, DEFAULT_STRAGGLER_GRACE};
pub use types::{Event, Filter, KIND_METADATA, KIND_TEXT_NOTE};
