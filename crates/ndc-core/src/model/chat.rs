//! Chat message events (`t = 1000`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DispatchError, DispatchResult};
use crate::event::EventKind;
use crate::frame::Frame;

/// The author of a chat message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    /// User ID.
    pub uid: Option<String>,
    /// Display name.
    pub nickname: Option<String>,
    /// Avatar URL.
    pub icon: Option<String>,
    /// Community level.
    pub level: Option<i64>,
    /// Community role.
    pub role: Option<i64>,
    /// Reputation points.
    pub reputation: Option<i64>,
}

/// The `chatMessage` object of a chat event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatMessage {
    /// Message ID.
    pub message_id: Option<String>,
    /// Thread the message belongs to.
    pub thread_id: Option<String>,
    /// Message kind (`type`). `0` is a plain text message.
    #[serde(rename = "type", deserialize_with = "super::null_as_default")]
    pub kind: i64,
    /// Media kind. `0` when the message carries no media.
    #[serde(deserialize_with = "super::null_as_default")]
    pub media_type: i64,
    /// Media URL.
    pub media_value: Option<String>,
    /// Text content.
    pub content: Option<String>,
    /// Author's user ID.
    pub uid: Option<String>,
    /// Author profile.
    pub author: Option<Author>,
    /// Creation time as sent by the service.
    pub created_time: Option<String>,
    /// Whether the message is hidden.
    pub is_hidden: Option<bool>,
    /// Message extensions (mentions, reply references, sticker data, …).
    pub extensions: Option<Value>,
}

/// A normalized chat event, built from the frame body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatEvent {
    /// Community ID.
    pub ndc_id: Option<i64>,
    /// Alert option of the thread for the receiving user.
    pub alert_option: Option<i64>,
    /// Membership status of the receiving user.
    pub membership_status: Option<i64>,
    /// The message itself.
    #[serde(deserialize_with = "super::null_as_default")]
    pub chat_message: ChatMessage,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatEvent {
    /// Normalizes the body of a frame routed to `event`.
    pub fn from_frame(event: EventKind, frame: &Frame) -> DispatchResult<Self> {
        let body = if frame.body.is_null() {
            Value::Object(Map::new())
        } else {
            frame.body.clone()
        };
        serde_json::from_value(body).map_err(|e| DispatchError::normalize(event, e))
    }

    /// Returns the text content, if any.
    pub fn content(&self) -> Option<&str> {
        self.chat_message.content.as_deref()
    }

    /// Returns the thread ID.
    pub fn thread_id(&self) -> Option<&str> {
        self.chat_message.thread_id.as_deref()
    }

    /// Returns the author's display name.
    pub fn author_name(&self) -> Option<&str> {
        self.chat_message
            .author
            .as_ref()
            .and_then(|a| a.nickname.as_deref())
    }

    /// Returns the author's user ID, preferring the embedded profile.
    pub fn author_id(&self) -> Option<&str> {
        self.chat_message
            .author
            .as_ref()
            .and_then(|a| a.uid.as_deref())
            .or(self.chat_message.uid.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_text_message() {
        let frame = Frame::new(
            1000,
            json!({
                "ndcId": 123,
                "alertOption": 1,
                "chatMessage": {
                    "messageId": "m-1",
                    "threadId": "t-1",
                    "type": 0,
                    "content": "hello",
                    "author": {"uid": "u-1", "nickname": "alice", "level": 7},
                    "createdTime": "2024-01-01T00:00:00Z"
                },
                "unknownField": true
            }),
        );

        let event = ChatEvent::from_frame(EventKind::TextMessage, &frame).unwrap();
        assert_eq!(event.ndc_id, Some(123));
        assert_eq!(event.chat_message.kind, 0);
        assert_eq!(event.chat_message.media_type, 0);
        assert_eq!(event.content(), Some("hello"));
        assert_eq!(event.thread_id(), Some("t-1"));
        assert_eq!(event.author_name(), Some("alice"));
        assert_eq!(event.author_id(), Some("u-1"));
        assert_eq!(event.extra.get("unknownField"), Some(&json!(true)));
    }

    #[test]
    fn test_null_fields_use_defaults() {
        let frame = Frame::new(
            1000,
            json!({"chatMessage": {"type": null, "mediaType": null, "content": "x"}}),
        );
        let event = ChatEvent::from_frame(EventKind::TextMessage, &frame).unwrap();
        assert_eq!(event.chat_message.kind, 0);
        assert_eq!(event.chat_message.media_type, 0);

        let frame = Frame::new(1000, json!({"ndcId": 1, "chatMessage": null}));
        let event = ChatEvent::from_frame(EventKind::VoiceChatStart, &frame).unwrap();
        assert_eq!(event.chat_message, ChatMessage::default());
    }

    #[test]
    fn test_normalize_rejects_wrong_types() {
        let frame = Frame::new(1000, json!({"ndcId": "not a number"}));
        let err = ChatEvent::from_frame(EventKind::TextMessage, &frame).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Normalize {
                event: EventKind::TextMessage,
                ..
            }
        ));
    }
}
