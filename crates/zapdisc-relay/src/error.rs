use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors returned by the relay client and pool.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The relay URL is not a `ws://` or `wss://` URL.
    #[error("invalid relay URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection, handshake, or frame-level failure on the WebSocket.
    #[error("websocket error from {url}: {source}")]
    WebSocket {
        url: String,
        #[source]
        source: Box<tungstenite::Error>,
    },

    /// A client frame could not be serialized.
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The relay did not finish answering before the deadline.
    #[error("relay {url} timed out")]
    Timeout { url: String },

    /// The relay refused or terminated the subscription with `CLOSED`.
    #[error("relay {url} closed subscription: {message}")]
    Closed { url: String, message: String },

    /// A pool was constructed without any relay URLs.
    #[error("no relays configured")]
    NoRelays,

    /// Every relay in the pool failed; carries the last failure.
    #[error("all {attempted} relays failed; last error: {last}")]
    AllRelaysFailed {
        attempted: usize,
        #[source]
        last: Box<RelayError>,
    },
}

impl RelayError {
    pub(crate) fn websocket(url: &str, source: tungstenite::Error) -> Self {
        Self::WebSocket {
            url: url.to_string(),
            source: Box::new(source),
        }
    }

    /// Returns `true` if this error (or the last error of a failed pool) is a
    /// deadline expiry.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::AllRelaysFailed { last, .. } => last.is_timeout(),
            _ => false,
        }
    }
}
