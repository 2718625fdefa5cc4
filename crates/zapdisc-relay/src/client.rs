//! Single-relay NIP-01 query client over WebSocket.
//!
//! Each [`RelayClient::query`] opens a fresh connection, issues one `REQ`,
//! drains stored events until `EOSE`, then sends `CLOSE` and hangs up. The
//! whole exchange runs under the caller's deadline.

use futures::{SinkExt, StreamExt};
use tokio::time::Instant;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::RelayError;
use crate::message::{ClientMessage, RelayMessage};
use crate::types::{Event, Filter};

/// Query client for one relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    url: String,
}

impl RelayClient {
    /// Creates a client for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidUrl`] if `url` is not a `ws://` or `wss://` URL.
    pub fn new(url: &str) -> Result<Self, RelayError> {
        let trimmed = url.trim();
        let has_host = trimmed
            .strip_prefix("wss://")
            .or_else(|| trimmed.strip_prefix("ws://"))
            .is_some_and(|rest| !rest.is_empty());
        if !has_host {
            return Err(RelayError::InvalidUrl {
                url: url.to_string(),
                reason: "expected ws:// or wss:// followed by a host".to_string(),
            });
        }
        Ok(Self {
            url: trimmed.to_string(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Runs one subscription with `filters` and returns the stored events the
    /// relay sent before `EOSE`.
    ///
    /// # Errors
    ///
    /// - [`RelayError::Timeout`] if `deadline` passes first.
    /// - [`RelayError::WebSocket`] on connection or frame failures.
    /// - [`RelayError::Closed`] if the relay refuses the subscription.
    pub async fn query(&self, filters: &[Filter], deadline: Instant) -> Result<Vec<Event>, RelayError> {
        match tokio::time::timeout_at(deadline, self.run_subscription(filters)).await {
            Ok(result) => result,
            Err(_) => Err(RelayError::Timeout {
                url: self.url.clone(),
            }),
        }
    }

    async fn run_subscription(&self, filters: &[Filter]) -> Result<Vec<Event>, RelayError> {
        let (mut ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| RelayError::websocket(&self.url, e))?;

        let subscription_id = new_subscription_id();
        let req = ClientMessage::Req {
            subscription_id: &subscription_id,
            filters,
        }
        .to_json()?;
        ws.send(Message::text(req))
            .await
            .map_err(|e| RelayError::websocket(&self.url, e))?;

        let mut events = Vec::new();
        while let Some(frame) = ws.next().await {
            let frame = frame.map_err(|e| RelayError::websocket(&self.url, e))?;
            let text = match &frame {
                Message::Text(_) => frame
                    .to_text()
                    .map_err(|e| RelayError::websocket(&self.url, e))?,
                Message::Close(_) => break,
                _ => continue,
            };

            match RelayMessage::parse(text) {
                Ok(RelayMessage::Event {
                    subscription_id: sub,
                    event,
                }) if sub == subscription_id => events.push(*event),
                Ok(RelayMessage::EndOfStoredEvents(sub)) if sub == subscription_id => break,
                Ok(RelayMessage::Closed {
                    subscription_id: sub,
                    message,
                }) if sub == subscription_id => {
                    return Err(RelayError::Closed {
                        url: self.url.clone(),
                        message,
                    });
                }
                Ok(RelayMessage::Notice(notice)) => {
                    tracing::warn!(relay = %self.url, notice = %notice, "relay notice");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(relay = %self.url, error = %e, "skipping unreadable relay frame");
                }
            }
        }

        let close = ClientMessage::Close(&subscription_id).to_json()?;
        if let Err(e) = ws.send(Message::text(close)).await {
            tracing::debug!(relay = %self.url, error = %e, "failed to send CLOSE");
        }
        if let Err(e) = ws.close(None).await {
            tracing::debug!(relay = %self.url, error = %e, "failed to close websocket");
        }

        tracing::debug!(relay = %self.url, events = events.len(), "relay query complete");
        Ok(events)
    }
}

fn new_subscription_id() -> String {
    format!("zapdisc-{:016x}", rand::random::<u64>())
}
