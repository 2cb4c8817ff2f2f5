//! Normalized payloads handed to callbacks.
//!
//! ```text
//! EventValue
//! ├── Chat(ChatEvent)              ← t = 1000, plus recording topics
//! ├── Notification(Notification)   ← t = 10, t = 201
//! ├── UsersActions(UsersActions)   ← typing actions, t = 400
//! └── Frame(Frame)                 ← default handler, raw envelope
//! ```

pub mod chat;
pub mod notification;
pub mod users;

pub use chat::{Author, ChatEvent, ChatMessage};
pub use notification::{Aps, Notification};
pub use users::{UserProfile, UsersActions};

use serde::{Deserialize, Deserializer};

use crate::frame::Frame;

/// Treats an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The value delivered to callbacks of one leaf event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    /// A chat event.
    Chat(ChatEvent),
    /// A push payload.
    Notification(Notification),
    /// A users-actions update.
    UsersActions(UsersActions),
    /// The raw envelope, for events without a dedicated model.
    Frame(Frame),
}

impl EventValue {
    /// Returns the chat event, if this is one.
    pub fn as_chat(&self) -> Option<&ChatEvent> {
        match self {
            Self::Chat(event) => Some(event),
            _ => None,
        }
    }

    /// Returns the notification, if this is one.
    pub fn as_notification(&self) -> Option<&Notification> {
        match self {
            Self::Notification(payload) => Some(payload),
            _ => None,
        }
    }

    /// Returns the users-actions update, if this is one.
    pub fn as_users_actions(&self) -> Option<&UsersActions> {
        match self {
            Self::UsersActions(update) => Some(update),
            _ => None,
        }
    }

    /// Returns the raw frame, if this is one.
    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Self::Frame(frame) => Some(frame),
            _ => None,
        }
    }
}
