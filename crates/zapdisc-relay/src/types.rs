use serde::{Deserialize, Serialize};

/// Profile metadata (`set_metadata`) event kind.
pub const KIND_METADATA: u32 = 0;
/// Short text note event kind.
pub const KIND_TEXT_NOTE: u32 = 1;

/// A signed Nostr event as delivered by a relay.
///
/// Signatures are not verified here; the relay is trusted to have done so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Hex event id (SHA-256 of the serialized event).
    pub id: String,
    /// Hex public key of the author.
    pub pubkey: String,
    /// Unix timestamp in seconds.
    pub created_at: u64,
    pub kind: u32,
    #[serde(default)]
    pub tags: Vec<Vec<String>>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sig: String,
}

/// A NIP-01 subscription filter.
///
/// Absent fields are omitted from the wire form, which relays read as
/// "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn kind(self, kind: u32) -> Self {
        self.kinds([kind])
    }

    #[must_use]
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = u32>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    #[must_use]
    pub fn authors<S: Into<String>>(mut self, authors: impl IntoIterator<Item = S>) -> Self {
        self.authors = Some(authors.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn since(mut self, since: u64) -> Self {
        self.since = Some(since);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_omits_absent_fields() {
        let filter = Filter::new().kind(KIND_TEXT_NOTE).since(100).limit(500);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kinds": [1], "since": 100, "limit": 500 })
        );
    }

    #[test]
    fn filter_authors_accepts_borrowed_strings() {
        let authors = vec!["aa".to_string(), "bb".to_string()];
        let filter = Filter::new()
            .kind(KIND_METADATA)
            .authors(authors.iter().map(String::as_str));
        assert_eq!(
            filter.authors.as_deref(),
            Some(&["aa".to_string(), "bb".to_string()][..])
        );
    }

    #[test]
    fn event_tolerates_missing_optional_fields() {
        let json = r#"{"id":"e1","pubkey":"p1","created_at":42,"kind":1}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.created_at, 42);
        assert!(event.tags.is_empty());
        assert!(event.content.is_empty());
    }
}
