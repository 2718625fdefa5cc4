//! The query seam between discovery and the relay network.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use zapdisc_relay::{Event, Filter, RelayClient, RelayPool};

use crate::error::{DiscoveryError, QueryStage, TransportError};

/// Anything that can answer a set of NIP-01 filters before a deadline.
pub trait QueryTransport: Sync {
    /// Returns every event matching any of `filters`.
    ///
    /// Implementations should give up once `deadline` passes; callers also
    /// enforce it independently.
    fn query(
        &self,
        filters: &[Filter],
        deadline: Instant,
    ) -> impl Future<Output = Result<Vec<Event>, TransportError>> + Send;
}

impl QueryTransport for RelayPool {
    async fn query(&self, filters: &[Filter], deadline: Instant) -> Result<Vec<Event>, TransportError> {
        Ok(RelayPool::query(self, filters, deadline).await?)
    }
}

impl QueryTransport for RelayClient {
    async fn query(&self, filters: &[Filter], deadline: Instant) -> Result<Vec<Event>, TransportError> {
        Ok(RelayClient::query(self, filters, deadline).await?)
    }
}

/// Runs one transport query under `deadline`, mapping failures onto
/// [`DiscoveryError`]. `budget` is only used for the timeout message.
pub(crate) async fn bounded_query<T: QueryTransport>(
    transport: &T,
    stage: QueryStage,
    filters: &[Filter],
    deadline: Instant,
    budget: Duration,
) -> Result<Vec<Event>, DiscoveryError> {
    match tokio::time::timeout_at(deadline, transport.query(filters, deadline)).await {
        Err(_) => Err(DiscoveryError::Timeout { stage, budget }),
        Ok(Err(e)) if e.is_timeout() => Err(DiscoveryError::Timeout { stage, budget }),
        Ok(Err(source)) => Err(DiscoveryError::Transport { stage, source }),
        Ok(Ok(events)) => Ok(events),
    }
}
