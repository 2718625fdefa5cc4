//! Plain-text rendering of discovery cards, statistics and note feeds.

use chrono::{DateTime, Utc};
use zapdisc_discovery::display::{fallback_name, relative_time, short_pubkey};
use zapdisc_discovery::{AuthorSummary, ProfileMetadata, RunStatistics};
use zapdisc_relay::Event;

const ABOUT_MAX_CHARS: usize = 160;
const NOTE_MAX_CHARS: usize = 280;

pub(crate) fn render_stats(stats: &RunStatistics) -> String {
    format!(
        "{} events | {} unique authors | {} real users | {} bots | {}ms",
        stats.total_events,
        stats.unique_authors,
        stats.real_users,
        stats.bots_filtered,
        stats.query_time_ms
    )
}

/// One author card: name line, identity line, optional about, activity line.
pub(crate) fn render_card(summary: &AuthorSummary, now: DateTime<Utc>) -> String {
    let mut lines = Vec::with_capacity(4);

    let mut title = summary.display_name();
    if summary.is_bot {
        title.push_str(" [BOT]");
    }
    if summary.has_lightning() {
        title.push_str(" [⚡]");
    }
    lines.push(title);

    lines.push(identity_line(&summary.pubkey, summary.metadata.as_ref()));

    if let Some(about) = summary
        .metadata
        .as_ref()
        .and_then(|m| m.about.as_deref())
        .filter(|a| !a.trim().is_empty())
    {
        lines.push(format!("  {}", truncate(about.trim(), ABOUT_MAX_CHARS)));
    }

    let last_seen = summary
        .last_activity
        .map_or_else(|| "never".to_string(), |t| relative_time(t, now));
    let zap = if summary.can_zap() {
        "zappable"
    } else {
        "not zappable"
    };
    lines.push(format!(
        "  {} recent notes | last active {last_seen} | {zap}",
        summary.recent_notes.len()
    ));

    lines.join("\n")
}

pub(crate) fn render_profile_header(pubkey: &str, metadata: Option<&ProfileMetadata>) -> String {
    let name = metadata
        .and_then(ProfileMetadata::preferred_name)
        .map_or_else(|| fallback_name(pubkey), str::to_string);
    let mut lines = vec![format!("# {name}"), identity_line(pubkey, metadata)];
    if let Some(about) = metadata
        .and_then(|m| m.about.as_deref())
        .filter(|a| !a.trim().is_empty())
    {
        lines.push(format!("  {}", about.trim()));
    }
    lines.join("\n")
}

pub(crate) fn render_note(note: &Event, now: DateTime<Utc>) -> String {
    format!(
        "[{}] {}",
        relative_time(note.created_at, now),
        truncate(note.content.trim(), NOTE_MAX_CHARS)
    )
}

/// `@handle · nip05 · short pubkey`, skipping whatever the profile lacks.
fn identity_line(pubkey: &str, metadata: Option<&ProfileMetadata>) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(handle) = metadata
        .and_then(|m| m.name.as_deref())
        .filter(|n| !n.trim().is_empty())
    {
        parts.push(format!("@{}", handle.trim()));
    }
    if let Some(nip05) = metadata
        .and_then(|m| m.nip05.as_deref())
        .filter(|n| !n.trim().is_empty())
    {
        parts.push(nip05.trim().to_string());
    }
    parts.push(short_pubkey(pubkey));
    format!("  {}", parts.join(" · "))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
