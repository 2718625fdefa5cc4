//! Small presentation helpers shared by renderers.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

const ADJECTIVES: &[&str] = &[
    "Swift", "Quiet", "Bright", "Clever", "Brave", "Gentle", "Lucky", "Mellow", "Nimble", "Proud",
    "Sunny", "Witty", "Bold", "Calm", "Eager", "Jolly",
];

const ANIMALS: &[&str] = &[
    "Otter", "Falcon", "Badger", "Heron", "Lynx", "Marten", "Osprey", "Panda", "Raven", "Seal",
    "Tiger", "Wombat", "Yak", "Zebra", "Koala", "Fox",
];

/// Deterministic placeholder name for an author without a profile name.
///
/// The same pubkey always yields the same name.
#[must_use]
pub fn fallback_name(pubkey: &str) -> String {
    let digest = Sha256::digest(pubkey.as_bytes());
    let adjective = ADJECTIVES[usize::from(digest[0]) % ADJECTIVES.len()];
    let animal = ANIMALS[usize::from(digest[1]) % ANIMALS.len()];
    format!("{adjective} {animal}")
}

/// Abbreviates a hex pubkey to `first8…last8`.
#[must_use]
pub fn short_pubkey(pubkey: &str) -> String {
    if pubkey.len() <= 19 || !pubkey.is_ascii() {
        return pubkey.to_string();
    }
    format!("{}…{}", &pubkey[..8], &pubkey[pubkey.len() - 8..])
}

/// Renders a unix timestamp relative to `now` ("just now", "5m ago", "3h ago", "2d ago").
///
/// Timestamps in the future render as "just now".
#[must_use]
pub fn relative_time(created_at: u64, now: DateTime<Utc>) -> String {
    let then = i64::try_from(created_at).unwrap_or(i64::MAX);
    let secs = (now.timestamp() - then).max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3_599 => format!("{}m ago", secs / 60),
        3_600..=86_399 => format!("{}h ago", secs / 3_600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

/// Current unix time in seconds.
#[must_use]
pub fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn fallback_name_is_deterministic() {
        let key = "f".repeat(64);
        assert_eq!(fallback_name(&key), fallback_name(&key));
        assert_eq!(fallback_name(&key).split(' ').count(), 2);
    }

    #[test]
    fn fallback_name_varies_by_key() {
        let names: std::collections::HashSet<String> = (0..50)
            .map(|i| fallback_name(&format!("{i:064x}")))
            .collect();
        assert!(names.len() > 10, "expected varied names, got {}", names.len());
    }

    #[test]
    fn short_pubkey_abbreviates_long_keys() {
        let key = format!("{}{}", "a".repeat(32), "b".repeat(32));
        assert_eq!(short_pubkey(&key), "aaaaaaaa…bbbbbbbb");
    }

    #[test]
    fn short_pubkey_leaves_short_input() {
        assert_eq!(short_pubkey("abc"), "abc");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc.timestamp_opt(1_000_000, 0).unwrap();
        assert_eq!(relative_time(1_000_000, now), "just now");
        assert_eq!(relative_time(1_000_100, now), "just now");
        assert_eq!(relative_time(1_000_000 - 300, now), "5m ago");
        assert_eq!(relative_time(1_000_000 - 7_200, now), "2h ago");
        assert_eq!(relative_time(1_000_000 - 3 * 86_400, now), "3d ago");
    }
}
