//! Topic updates and typing actions (`t = 304`, `306`, `400`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DispatchError, DispatchResult};
use crate::event::EventKind;
use crate::frame::Frame;
use crate::routing::KEY_SEPARATOR;

/// A user entry in a topic update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// User ID.
    pub uid: Option<String>,
    /// Display name.
    pub nickname: Option<String>,
    /// Avatar URL.
    pub icon: Option<String>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A normalized users-actions body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsersActions {
    /// Topic string (`ndtopic:<community>:<topic>[:<suffix>]`).
    pub topic: Option<String>,
    /// Community ID.
    pub ndc_id: Option<i64>,
    /// Navigation target of a chat action.
    pub target: Option<String>,
    /// Total number of users behind the topic.
    pub user_profile_count: Option<i64>,
    /// Users included in this update.
    #[serde(deserialize_with = "super::null_as_default")]
    pub user_profile_list: Vec<UserProfile>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UsersActions {
    /// Normalizes the body of a frame routed to `event`.
    pub fn from_frame(event: EventKind, frame: &Frame) -> DispatchResult<Self> {
        Self::from_body(&frame.body).map_err(|e| DispatchError::normalize(event, e))
    }

    /// Normalizes a raw body. `null` yields an empty value.
    pub fn from_body(body: &Value) -> serde_json::Result<Self> {
        if body.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(body.clone())
    }

    /// Returns the topic name (third component of the topic string).
    pub fn topic_name(&self) -> Option<&str> {
        self.topic
            .as_deref()
            .and_then(|t| t.split(KEY_SEPARATOR).nth(2))
    }

    /// Returns `true` when the update carries no topic and no users.
    pub fn is_empty(&self) -> bool {
        self.topic.is_none() && self.user_profile_list.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_topic_update() {
        let frame = Frame::new(
            400,
            json!({
                "topic": "ndtopic:x123:online-members",
                "ndcId": 123,
                "userProfileCount": 2,
                "userProfileList": [
                    {"uid": "a", "nickname": "alice"},
                    {"uid": "b", "nickname": "bob", "status": 0}
                ]
            }),
        );

        let update = UsersActions::from_frame(EventKind::OnlineUsersUpdate, &frame).unwrap();
        assert_eq!(update.topic_name(), Some("online-members"));
        assert_eq!(update.user_profile_count, Some(2));
        assert_eq!(update.user_profile_list.len(), 2);
        assert_eq!(update.user_profile_list[1].extra.get("status"), Some(&json!(0)));
        assert!(!update.is_empty());
    }

    #[test]
    fn test_null_profile_list_is_empty() {
        let body = json!({"topic": "ndtopic:x1:online-members", "userProfileList": null});
        let update = UsersActions::from_body(&body).unwrap();
        assert!(update.user_profile_list.is_empty());
        assert_eq!(update.topic_name(), Some("online-members"));
    }

    #[test]
    fn test_null_body_is_empty() {
        assert!(UsersActions::from_body(&Value::Null).unwrap().is_empty());
    }
}
