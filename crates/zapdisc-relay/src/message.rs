//! NIP-01 wire frames exchanged with a relay.

use serde_json::Value;

use crate::types::{Event, Filter};

/// Frames sent from client to relay.
pub(crate) enum ClientMessage<'a> {
    Req {
        subscription_id: &'a str,
        filters: &'a [Filter],
    },
    Close(&'a str),
}

impl ClientMessage<'_> {
    pub(crate) fn to_json(&self) -> Result<String, serde_json::Error> {
        let frame = match self {
            ClientMessage::Req {
                subscription_id,
                filters,
            } => {
                let mut frame = vec![Value::from("REQ"), Value::from(*subscription_id)];
                for filter in *filters {
                    frame.push(serde_json::to_value(filter)?);
                }
                frame
            }
            ClientMessage::Close(subscription_id) => {
                vec![Value::from("CLOSE"), Value::from(*subscription_id)]
            }
        };
        serde_json::to_string(&frame)
    }
}

/// Frames sent from relay to client.
#[derive(Debug, PartialEq)]
pub(crate) enum RelayMessage {
    Event {
        subscription_id: String,
        event: Box<Event>,
    },
    EndOfStoredEvents(String),
    Closed {
        subscription_id: String,
        message: String,
    },
    Notice(String),
    /// `OK`, `AUTH`, `COUNT`, or anything else this client does not act on.
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is not a JSON array with a string label")]
    Shape,
}

impl RelayMessage {
    pub(crate) fn parse(text: &str) -> Result<Self, FrameError> {
        let frame: Vec<Value> = serde_json::from_str(text)?;
        let label = frame.first().and_then(Value::as_str).ok_or(FrameError::Shape)?;
        let str_at = |i: usize| -> Result<String, FrameError> {
            frame
                .get(i)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(FrameError::Shape)
        };

        let message = match label {
            "EVENT" => {
                let subscription_id = str_at(1)?;
                let raw = frame.get(2).cloned().ok_or(FrameError::Shape)?;
                let event: Event = serde_json::from_value(raw)?;
                RelayMessage::Event {
                    subscription_id,
                    event: Box::new(event),
                }
            }
            "EOSE" => RelayMessage::EndOfStoredEvents(str_at(1)?),
            "CLOSED" => RelayMessage::Closed {
                subscription_id: str_at(1)?,
                message: str_at(2).unwrap_or_default(),
            },
            "NOTICE" => RelayMessage::Notice(str_at(1).unwrap_or_default()),
            other => RelayMessage::Other(other.to_string()),
        };
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn req_frame_inlines_filters() {
        let filters = [Filter::new().kind(1).limit(2)];
        let json = ClientMessage::Req {
            subscription_id: "sub",
            filters: &filters,
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"["REQ","sub",{"kinds":[1],"limit":2}]"#);
    }

    #[test]
    fn close_frame() {
        assert_eq!(
            ClientMessage::Close("sub").to_json().unwrap(),
            r#"["CLOSE","sub"]"#
        );
    }

    #[test]
    fn parses_event_frame() {
        let text = r#"["EVENT","sub",{"id":"e","pubkey":"p","created_at":7,"kind":1,"tags":[],"content":"hi","sig":"s"}]"#;
        match RelayMessage::parse(text).unwrap() {
            RelayMessage::Event {
                subscription_id,
                event,
            } => {
                assert_eq!(subscription_id, "sub");
                assert_eq!(event.content, "hi");
            }
            other => panic!("expected EVENT, got {other:?}"),
        }
    }

    #[test]
    fn parses_eose_and_notice() {
        assert_eq!(
            RelayMessage::parse(r#"["EOSE","sub"]"#).unwrap(),
            RelayMessage::EndOfStoredEvents("sub".to_string())
        );
        assert_eq!(
            RelayMessage::parse(r#"["NOTICE","slow down"]"#).unwrap(),
            RelayMessage::Notice("slow down".to_string())
        );
    }

    #[test]
    fn closed_without_message_defaults_to_empty() {
        assert_eq!(
            RelayMessage::parse(r#"["CLOSED","sub"]"#).unwrap(),
            RelayMessage::Closed {
                subscription_id: "sub".to_string(),
                message: String::new(),
            }
        );
    }

    #[test]
    fn unknown_label_is_other() {
        assert_eq!(
            RelayMessage::parse(r#"["OK","id",true,""]"#).unwrap(),
            RelayMessage::Other("OK".to_string())
        );
    }

    #[test]
    fn rejects_malformed_frames() {
        assert!(matches!(RelayMessage::parse("{}"), Err(FrameError::Json(_))));
        assert!(matches!(RelayMessage::parse("[1,2]"), Err(FrameError::Shape)));
        assert!(matches!(
            RelayMessage::parse(r#"["EVENT","sub",{"id":"x"}]"#),
            Err(FrameError::Json(_))
        ));
    }
}
