//! The wire envelope.
//!
//! Every message exchanged with the service is a JSON object of the form
//! `{"o": {...}, "t": <code>}`. `t` selects the message family and `o` carries
//! a family-specific body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DispatchResult;

/// Message type codes seen on the wire.
pub mod codes {
    /// Push notification wrapper (`o.payload`).
    pub const NOTIFICATION: i64 = 10;
    /// Voice/video channel control (`channelType`).
    pub const CHANNEL_CONTROL: i64 = 108;
    /// Join/leave a live room (`joinRole`).
    pub const ROOM_JOIN: i64 = 112;
    /// Channel fetch response.
    pub const CHANNEL_FETCH: i64 = 201;
    /// Topic subscription request.
    pub const TOPIC_SUBSCRIBE: i64 = 300;
    /// Presence action stop.
    pub const PRESENCE_STOP: i64 = 303;
    /// Chat action start (inbound).
    pub const ACTION_START: i64 = 304;
    /// Chat action end (inbound) and presence action start (outbound).
    pub const ACTION_END: i64 = 306;
    /// Presence action start (outbound). Shares its code with [`ACTION_END`].
    pub const PRESENCE: i64 = 306;
    /// Topic update.
    pub const TOPIC: i64 = 400;
    /// Chat message event.
    pub const CHAT_MESSAGE: i64 = 1000;
}

/// One decoded envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// The family-specific body (`o`).
    #[serde(rename = "o", default)]
    pub body: Value,
    /// The message type code (`t`).
    #[serde(rename = "t")]
    pub code: i64,
}

impl Frame {
    /// Creates a frame from a code and body.
    pub fn new(code: i64, body: Value) -> Self {
        Self { body, code }
    }

    /// Decodes a frame from raw bytes.
    pub fn decode(data: &[u8]) -> DispatchResult<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Encodes the frame to JSON bytes.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Returns a field of the body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.get(name)
    }

    /// Returns a copy of this frame with a different code.
    pub fn with_code(&self, code: i64) -> Self {
        Self {
            body: self.body.clone(),
            code,
        }
    }
}
