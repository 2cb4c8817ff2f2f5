//! Push notifications (`t = 10`) and channel fetch responses (`t = 201`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DispatchError, DispatchResult};
use crate::event::EventKind;
use crate::frame::Frame;

/// The `aps` block of a push payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aps {
    /// Alert text.
    pub alert: Option<String>,
    /// Badge count.
    pub badge: Option<i64>,
    /// Sound name.
    pub sound: Option<String>,
}

/// A normalized `o.payload` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notification {
    /// Notification type code.
    pub notif_type: Option<i64>,
    /// Community ID.
    pub ndc_id: Option<i64>,
    /// Thread ID.
    #[serde(rename = "tid")]
    pub thread_id: Option<String>,
    /// Originating user ID.
    #[serde(rename = "uid")]
    pub user_id: Option<String>,
    /// Notification ID.
    pub id: Option<String>,
    /// Display block.
    pub aps: Option<Aps>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notification {
    /// Normalizes `o.payload` of a frame routed to `event`.
    ///
    /// A frame without a payload yields an empty notification.
    pub fn from_frame(event: EventKind, frame: &Frame) -> DispatchResult<Self> {
        match frame.field("payload") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(payload) => serde_json::from_value(payload.clone())
                .map_err(|e| DispatchError::normalize(event, e)),
        }
    }

    /// Returns the alert text, if any.
    pub fn alert(&self) -> Option<&str> {
        self.aps.as_ref().and_then(|a| a.alert.as_deref())
    }
}
