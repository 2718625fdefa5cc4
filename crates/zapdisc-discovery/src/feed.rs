//! Per-author lookups behind "View Notes" and card refreshes.

use std::time::Duration;

use tokio::time::Instant;
use zapdisc_relay::{Event, Filter, KIND_METADATA, KIND_TEXT_NOTE};

use crate::error::{DiscoveryError, QueryStage};
use crate::metadata::{latest_profiles, metadata_from_event, ProfileMetadata};
use crate::transport::{bounded_query, QueryTransport};

/// Fetches up to `limit` notes by `pubkey`, newest first.
///
/// # Errors
///
/// [`DiscoveryError::Timeout`] if `timeout` elapses, otherwise
/// [`DiscoveryError::Transport`] on transport failure.
pub async fn fetch_author_notes<T: QueryTransport>(
    transport: &T,
    pubkey: &str,
    limit: usize,
    timeout: Duration,
) -> Result<Vec<Event>, DiscoveryError> {
    let filter = Filter::new()
        .kind(KIND_TEXT_NOTE)
        .authors([pubkey])
        .limit(limit);
    let deadline = Instant::now() + timeout;
    let mut notes = bounded_query(
        transport,
        QueryStage::AuthorNotes,
        &[filter],
        deadline,
        timeout,
    )
    .await?;

    notes.retain(|n| n.pubkey == pubkey && n.kind == KIND_TEXT_NOTE);
    notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    notes.truncate(limit);
    Ok(notes)
}

/// Fetches the newest profile for `pubkey`.
///
/// Returns `Ok(None)` when the author has no profile or its payload is
/// malformed.
///
/// # Errors
///
/// [`DiscoveryError::Timeout`] or [`DiscoveryError::Transport`].
pub async fn fetch_author_profile<T: QueryTransport>(
    transport: &T,
    pubkey: &str,
    timeout: Duration,
) -> Result<Option<ProfileMetadata>, DiscoveryError> {
    let filter = Filter::new().kind(KIND_METADATA).authors([pubkey]);
    let deadline = Instant::now() + timeout;
    let records = bounded_query(
        transport,
        QueryStage::AuthorProfile,
        &[filter],
        deadline,
        timeout,
    )
    .await?;

    let latest = latest_profiles(
        records
            .into_iter()
            .filter(|e| e.kind == KIND_METADATA)
            .collect(),
    );
    Ok(latest.get(pubkey).and_then(metadata_from_event))
}
