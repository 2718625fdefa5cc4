//! Profile (kind 0) payload parsing and newest-record selection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zapdisc_relay::Event;

use crate::error::MetadataParseError;

/// Parsed profile metadata. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nip05: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lud16: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lud06: Option<String>,
    /// Explicit self-declared automation flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot: Option<bool>,
}

impl ProfileMetadata {
    /// Preferred label: `display_name`, then `name`. Empty strings count as absent.
    #[must_use]
    pub fn preferred_name(&self) -> Option<&str> {
        non_empty(self.display_name.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }

    /// `true` when a lightning address (`lud16`) or LNURL (`lud06`) is set.
    #[must_use]
    pub fn has_lightning(&self) -> bool {
        non_empty(self.lud16.as_deref()).is_some() || non_empty(self.lud06.as_deref()).is_some()
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// Parses a profile event's `content`.
///
/// Fields of the wrong JSON type are dropped rather than failing the whole
/// payload; clients in the wild publish numbers and nulls in string slots.
pub(crate) fn parse_profile(content: &str) -> Result<ProfileMetadata, MetadataParseError> {
    let value: Value = serde_json::from_str(content)?;
    let Value::Object(map) = value else {
        return Err(MetadataParseError::NotAnObject);
    };

    Ok(ProfileMetadata {
        name: string_field(&map, "name"),
        display_name: string_field(&map, "display_name")
            .or_else(|| string_field(&map, "displayName")),
        about: string_field(&map, "about"),
        picture: string_field(&map, "picture"),
        nip05: string_field(&map, "nip05"),
        lud16: string_field(&map, "lud16"),
        lud06: string_field(&map, "lud06"),
        bot: map.get("bot").and_then(Value::as_bool),
    })
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Parses `event`'s payload, logging and discarding malformed ones.
pub(crate) fn metadata_from_event(event: &Event) -> Option<ProfileMetadata> {
    match parse_profile(&event.content) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            tracing::debug!(pubkey = %event.pubkey, error = %e, "ignoring malformed profile");
            None
        }
    }
}

/// Keeps the newest profile record per author. On equal timestamps the first
/// one seen wins.
pub(crate) fn latest_profiles(events: Vec<Event>) -> HashMap<String, Event> {
    let mut latest: HashMap<String, Event> = HashMap::new();
    for event in events {
        let newer = latest
            .get(&event.pubkey)
            .is_none_or(|existing| event.created_at > existing.created_at);
        if newer {
            latest.insert(event.pubkey.clone(), event);
        }
    }
    latest
}
