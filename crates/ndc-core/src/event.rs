//! Leaf event identities.
//!
//! Every leaf handler in the dispatch tables carries one [`EventKind`]. The
//! kind's name is the key callbacks are registered under.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Returned when a string does not name any known event.
#[derive(Debug, Clone, Error)]
#[error("unknown event name: {0}")]
pub struct UnknownEvent(pub String);

macro_rules! event_kinds {
    ($( $(#[$meta:meta])* $variant:ident => $name:literal ),* $(,)?) => {
        /// The identity of a leaf event.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum EventKind {
            $( $(#[$meta])* $variant, )*
        }

        impl EventKind {
            /// Every known event, in declaration order.
            pub const ALL: &'static [EventKind] = &[ $(EventKind::$variant),* ];

            /// Returns the registry name of this event.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( EventKind::$variant => $name, )*
                }
            }
        }

        impl FromStr for EventKind {
            type Err = UnknownEvent;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok(EventKind::$variant), )*
                    other => Err(UnknownEvent(other.to_string())),
                }
            }
        }
    };
}

event_kinds! {
    // Chat messages (t = 1000)
    TextMessage => "on_text_message",
    ImageMessage => "on_image_message",
    YoutubeMessage => "on_youtube_message",
    StrikeMessage => "on_strike_message",
    VoiceMessage => "on_voice_message",
    StickerMessage => "on_sticker_message",
    UserShareExurl => "on_user_share_exurl",
    UserShareUser => "on_user_share_user",
    VoiceChatNotAnswered => "on_voice_chat_not_answered",
    VoiceChatNotCancelled => "on_voice_chat_not_cancelled",
    VoiceChatNotDeclined => "on_voice_chat_not_declined",
    VideoChatNotAnswered => "on_video_chat_not_answered",
    VideoChatNotCancelled => "on_video_chat_not_cancelled",
    VideoChatNotDeclined => "on_video_chat_not_declined",
    AvatarChatNotAnswered => "on_avatar_chat_not_answered",
    AvatarChatNotCancelled => "on_avatar_chat_not_cancelled",
    AvatarChatNotDeclined => "on_avatar_chat_not_declined",
    DeleteMessage => "on_delete_message",
    GroupMemberJoin => "on_group_member_join",
    GroupMemberLeave => "on_group_member_leave",
    ChatInvite => "on_chat_invite",
    ChatBackgroundChanged => "on_chat_background_changed",
    ChatTitleChanged => "on_chat_title_changed",
    ChatIconChanged => "on_chat_icon_changed",
    /// Also reached from the `users-start-recording-at` topic.
    VoiceChatStart => "on_voice_chat_start",
    VideoChatStart => "on_video_chat_start",
    AvatarChatStart => "on_avatar_chat_start",
    /// Also reached from the `users-end-recording-at` topic.
    VoiceChatEnd => "on_voice_chat_end",
    VideoChatEnd => "on_video_chat_end",
    AvatarChatEnd => "on_avatar_chat_end",
    ChatContentChanged => "on_chat_content_changed",
    ScreenRoomStart => "on_screen_room_start",
    ScreenRoomEnd => "on_screen_room_end",
    ChatHostTransferred => "on_chat_host_transferred",
    TextMessageForceRemoved => "on_text_message_force_removed",
    ChatRemovedMessage => "on_chat_removed_message",
    TextMessageRemovedByAdmin => "on_text_message_removed_by_admin",
    ChatTip => "on_chat_tip",
    ChatPinAnnouncement => "on_chat_pin_announcement",
    VoiceChatPermissionOpenToEveryone => "on_voice_chat_permission_open_to_everyone",
    VoiceChatPermissionInvitedAndRequested => "on_voice_chat_permission_invited_and_requested",
    VoiceChatPermissionInviteOnly => "on_voice_chat_permission_invite_only",
    ChatViewOnlyEnabled => "on_chat_view_only_enabled",
    ChatViewOnlyDisabled => "on_chat_view_only_disabled",
    ChatUnpinAnnouncement => "on_chat_unpin_announcement",
    ChatTippingEnabled => "on_chat_tipping_enabled",
    ChatTippingDisabled => "on_chat_tipping_disabled",
    TimestampMessage => "on_timestamp_message",
    WelcomeMessage => "on_welcome_message",
    InviteMessage => "on_invite_message",

    // Notifications (t = 10)
    Alert => "on_alert",
    MemberSetYouHost => "on_member_set_you_host",
    MemberSetYouCohost => "on_member_set_you_cohost",
    MemberRemoveYouCohost => "on_member_remove_you_cohost",

    // Chat actions and channels (t = 201, 304, 306)
    FetchChannel => "on_fetch_channel",
    UserTypingStart => "on_user_typing_start",
    UserTypingEnd => "on_user_typing_end",

    // Topics (t = 400)
    OnlineUsersUpdate => "on_online_users_update",

    /// Chat actions with no dedicated handler.
    Default => "default",
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
