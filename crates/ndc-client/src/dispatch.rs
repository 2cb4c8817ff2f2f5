//! Hierarchical frame dispatch.
//!
//! Routing is two-level. The top-level table maps the frame code `t` to a
//! resolver; each resolver derives a secondary [`RoutingKey`] from the body
//! and looks it up in its family table to find a [`Leaf`].
//!
//! ```text
//! t = 10    ─▶ o.payload.notifType             ─▶ notifications
//! t = 201   ─▶ "fetch-channel"                 ─▶ chat actions
//! t = 304   ─▶ o.actions[0] + "-start"         ─▶ chat actions (miss → default)
//! t = 306   ─▶ o.actions[0] + "-end"           ─▶ chat actions (miss → default)
//! t = 400   ─▶ third segment of o.topic        ─▶ topics
//! t = 1000  ─▶ chatMessage.type:mediaType      ─▶ chat messages
//! ```
//!
//! Misses in the chat message, notification and topic tables are dropped
//! silently: the service emits many variants nobody subscribes to. Chat
//! action misses go to the [`EventKind::Default`] leaf instead. Unknown
//! top-level codes are dropped.
//!
//! All tables are built once in [`DispatchTables::new`] and never mutated.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use ndc_core::{
    ChatEvent, DispatchResult, EventKind, EventRegistry, EventValue, Frame, Invocation,
    Notification, RoutingKey, UsersActions, codes,
};

/// Turns a routed frame into the value handed to callbacks.
pub type Normalizer = fn(EventKind, &Frame) -> DispatchResult<EventValue>;

/// Picks the leaf for a frame within one family.
type Resolver = fn(&DispatchTables, &Frame) -> Option<Leaf>;

/// A leaf handler: the event it fires and how its payload is normalized.
#[derive(Clone, Copy)]
pub struct Leaf {
    pub event: EventKind,
    normalize: Normalizer,
}

impl Leaf {
    fn new(event: EventKind, normalize: Normalizer) -> Self {
        Self { event, normalize }
    }

    /// Normalizes the frame for this leaf.
    pub fn normalize(&self, frame: &Frame) -> DispatchResult<EventValue> {
        (self.normalize)(self.event, frame)
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Leaf").field(&self.event).finish()
    }
}

// =============================================================================
// Normalizers
// =============================================================================

fn chat(event: EventKind, frame: &Frame) -> DispatchResult<EventValue> {
    ChatEvent::from_frame(event, frame).map(EventValue::Chat)
}

fn notification(event: EventKind, frame: &Frame) -> DispatchResult<EventValue> {
    Notification::from_frame(event, frame).map(EventValue::Notification)
}

fn users_actions(event: EventKind, frame: &Frame) -> DispatchResult<EventValue> {
    UsersActions::from_frame(event, frame).map(EventValue::UsersActions)
}

fn raw(_event: EventKind, frame: &Frame) -> DispatchResult<EventValue> {
    Ok(EventValue::Frame(frame.clone()))
}

// =============================================================================
// Tables
// =============================================================================

/// Chat action key reached by channel fetch responses.
const FETCH_CHANNEL: &str = "fetch-channel";
const ACTION_START_SUFFIX: &str = "-start";
const ACTION_END_SUFFIX: &str = "-end";

/// `(type, mediaType)` → event, for chat message frames.
const CHAT_MESSAGES: &[((i64, i64), EventKind)] = &[
    ((0, 0), EventKind::TextMessage),
    ((0, 100), EventKind::ImageMessage),
    ((0, 103), EventKind::YoutubeMessage),
    ((1, 0), EventKind::StrikeMessage),
    ((2, 110), EventKind::VoiceMessage),
    ((3, 113), EventKind::StickerMessage),
    ((50, 0), EventKind::UserShareExurl),
    ((51, 0), EventKind::UserShareUser),
    ((52, 0), EventKind::VoiceChatNotAnswered),
    ((53, 0), EventKind::VoiceChatNotCancelled),
    ((54, 0), EventKind::VoiceChatNotDeclined),
    ((55, 0), EventKind::VideoChatNotAnswered),
    ((56, 0), EventKind::VideoChatNotCancelled),
    ((57, 0), EventKind::VideoChatNotDeclined),
    ((58, 0), EventKind::AvatarChatNotAnswered),
    ((59, 0), EventKind::AvatarChatNotCancelled),
    ((60, 0), EventKind::AvatarChatNotDeclined),
    ((100, 0), EventKind::DeleteMessage),
    ((101, 0), EventKind::GroupMemberJoin),
    ((102, 0), EventKind::GroupMemberLeave),
    ((103, 0), EventKind::ChatInvite),
    ((104, 0), EventKind::ChatBackgroundChanged),
    ((105, 0), EventKind::ChatTitleChanged),
    ((106, 0), EventKind::ChatIconChanged),
    ((107, 0), EventKind::VoiceChatStart),
    ((108, 0), EventKind::VideoChatStart),
    ((109, 0), EventKind::AvatarChatStart),
    ((110, 0), EventKind::VoiceChatEnd),
    ((111, 0), EventKind::VideoChatEnd),
    ((112, 0), EventKind::AvatarChatEnd),
    ((113, 0), EventKind::ChatContentChanged),
    ((114, 0), EventKind::ScreenRoomStart),
    ((115, 0), EventKind::ScreenRoomEnd),
    ((116, 0), EventKind::ChatHostTransferred),
    ((117, 0), EventKind::TextMessageForceRemoved),
    ((118, 0), EventKind::ChatRemovedMessage),
    ((119, 0), EventKind::TextMessageRemovedByAdmin),
    ((120, 0), EventKind::ChatTip),
    ((121, 0), EventKind::ChatPinAnnouncement),
    ((122, 0), EventKind::VoiceChatPermissionOpenToEveryone),
    ((123, 0), EventKind::VoiceChatPermissionInvitedAndRequested),
    ((124, 0), EventKind::VoiceChatPermissionInviteOnly),
    ((125, 0), EventKind::ChatViewOnlyEnabled),
    ((126, 0), EventKind::ChatViewOnlyDisabled),
    ((127, 0), EventKind::ChatUnpinAnnouncement),
    ((128, 0), EventKind::ChatTippingEnabled),
    ((129, 0), EventKind::ChatTippingDisabled),
    ((65281, 0), EventKind::TimestampMessage),
    ((65282, 0), EventKind::WelcomeMessage),
    ((65283, 0), EventKind::InviteMessage),
];

/// `notifType` → event.
const NOTIFICATIONS: &[(i64, EventKind)] = &[
    (18, EventKind::Alert),
    (53, EventKind::MemberSetYouHost),
    (67, EventKind::MemberSetYouCohost),
    (68, EventKind::MemberRemoveYouCohost),
];

/// The immutable routing tables.
pub struct DispatchTables {
    top: HashMap<i64, Resolver>,
    chat_messages: HashMap<RoutingKey, Leaf>,
    notifications: HashMap<RoutingKey, Leaf>,
    chat_actions: HashMap<RoutingKey, Leaf>,
    topics: HashMap<RoutingKey, Leaf>,
    default: Leaf,
}

impl DispatchTables {
    /// Builds every table.
    pub fn new() -> Self {
        let top: HashMap<i64, Resolver> = HashMap::from([
            (codes::NOTIFICATION, resolve_notification as Resolver),
            (codes::CHANNEL_FETCH, resolve_channel as Resolver),
            (codes::ACTION_START, resolve_action_start as Resolver),
            (codes::ACTION_END, resolve_action_end as Resolver),
            (codes::TOPIC, resolve_topic as Resolver),
            (codes::CHAT_MESSAGE, resolve_chat_message as Resolver),
        ]);

        let chat_messages = CHAT_MESSAGES
            .iter()
            .map(|&((kind, media), event)| (RoutingKey::Pair(kind, media), Leaf::new(event, chat)))
            .collect();

        let notifications = NOTIFICATIONS
            .iter()
            .map(|&(notif_type, event)| (RoutingKey::Code(notif_type), Leaf::new(event, notification)))
            .collect();

        let chat_actions = HashMap::from([
            (
                RoutingKey::name(FETCH_CHANNEL),
                Leaf::new(EventKind::FetchChannel, notification),
            ),
            (
                RoutingKey::name("Typing-start"),
                Leaf::new(EventKind::UserTypingStart, users_actions),
            ),
            (
                RoutingKey::name("Typing-end"),
                Leaf::new(EventKind::UserTypingEnd, users_actions),
            ),
        ]);

        let topics = HashMap::from([
            (
                RoutingKey::name("online-members"),
                Leaf::new(EventKind::OnlineUsersUpdate, users_actions),
            ),
            (
                RoutingKey::name("users-start-typing-at"),
                Leaf::new(EventKind::UserTypingStart, users_actions),
            ),
            (
                RoutingKey::name("users-end-typing-at"),
                Leaf::new(EventKind::UserTypingEnd, users_actions),
            ),
            (
                RoutingKey::name("users-start-recording-at"),
                Leaf::new(EventKind::VoiceChatStart, chat),
            ),
            (
                RoutingKey::name("users-end-recording-at"),
                Leaf::new(EventKind::VoiceChatEnd, chat),
            ),
        ]);

        Self {
            top,
            chat_messages,
            notifications,
            chat_actions,
            topics,
            default: Leaf::new(EventKind::Default, raw),
        }
    }

    /// Finds the leaf for `frame`, or `None` when the frame is unroutable.
    pub fn route(&self, frame: &Frame) -> Option<Leaf> {
        match self.top.get(&frame.code) {
            Some(resolver) => resolver(self, frame),
            None => {
                debug!(code = frame.code, "Unhandled frame type");
                None
            }
        }
    }

    /// Returns `true` if `code` has a top-level entry.
    pub fn handles(&self, code: i64) -> bool {
        self.top.contains_key(&code)
    }

    /// Looks `key` up in `table`, logging a miss.
    fn lookup(table: &HashMap<RoutingKey, Leaf>, family: &str, key: RoutingKey) -> Option<Leaf> {
        let leaf = table.get(&key).copied();
        if leaf.is_none() {
            debug!(family, key = %key, "No handler for routing key");
        }
        leaf
    }
}

impl Default for DispatchTables {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DispatchTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTables")
            .field("top", &self.top.len())
            .field("chat_messages", &self.chat_messages.len())
            .field("notifications", &self.notifications.len())
            .field("chat_actions", &self.chat_actions.len())
            .field("topics", &self.topics.len())
            .finish()
    }
}

// =============================================================================
// Resolvers
// =============================================================================

fn resolve_chat_message(tables: &DispatchTables, frame: &Frame) -> Option<Leaf> {
    let message = frame.field("chatMessage")?;
    let kind = message.get("type").and_then(Value::as_i64)?;
    let media = message
        .get("mediaType")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    DispatchTables::lookup(&tables.chat_messages, "chat", RoutingKey::Pair(kind, media))
}

fn resolve_notification(tables: &DispatchTables, frame: &Frame) -> Option<Leaf> {
    let notif_type = frame
        .field("payload")
        .and_then(|payload| payload.get("notifType"))
        .and_then(Value::as_i64)?;
    DispatchTables::lookup(&tables.notifications, "notification", RoutingKey::Code(notif_type))
}

fn resolve_channel(tables: &DispatchTables, _frame: &Frame) -> Option<Leaf> {
    tables
        .chat_actions
        .get(&RoutingKey::name(FETCH_CHANNEL))
        .copied()
}

fn resolve_action_start(tables: &DispatchTables, frame: &Frame) -> Option<Leaf> {
    Some(resolve_action(tables, frame, ACTION_START_SUFFIX))
}

fn resolve_action_end(tables: &DispatchTables, frame: &Frame) -> Option<Leaf> {
    Some(resolve_action(tables, frame, ACTION_END_SUFFIX))
}

/// Chat actions always resolve: misses fall back to the default leaf.
fn resolve_action(tables: &DispatchTables, frame: &Frame, suffix: &str) -> Leaf {
    action_name(frame)
        .map(|name| RoutingKey::suffixed(name, suffix))
        .and_then(|key| tables.chat_actions.get(&key).copied())
        .unwrap_or_else(|| {
            debug!(code = frame.code, "Chat action routed to default handler");
            tables.default
        })
}

/// The action name: `o.actions` is a list on the wire, but a bare string
/// is accepted too.
fn action_name(frame: &Frame) -> Option<&str> {
    match frame.field("actions")? {
        Value::Array(actions) => actions.first().and_then(Value::as_str),
        Value::String(action) => Some(action),
        _ => None,
    }
}

fn resolve_topic(tables: &DispatchTables, frame: &Frame) -> Option<Leaf> {
    let topic = frame.field("topic").and_then(Value::as_str)?;
    let name = topic.split(ndc_core::KEY_SEPARATOR).nth(2)?;
    DispatchTables::lookup(&tables.topics, "topic", RoutingKey::name(name.to_string()))
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Routes frames through the tables and delivers them to the registry.
#[derive(Debug)]
pub struct Dispatcher {
    tables: DispatchTables,
    registry: Arc<EventRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<EventRegistry>) -> Self {
        Self {
            tables: DispatchTables::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    pub fn tables(&self) -> &DispatchTables {
        &self.tables
    }

    /// Returns the event a frame would fire, without firing it.
    pub fn route(&self, frame: &Frame) -> Option<EventKind> {
        self.tables.route(frame).map(|leaf| leaf.event)
    }

    /// Decodes raw bytes and dispatches the frame.
    ///
    /// A decode failure is returned for this call only.
    pub async fn resolve(&self, data: &[u8]) -> DispatchResult<Option<Invocation>> {
        let frame = Frame::decode(data)?;
        self.dispatch(&frame).await
    }

    /// Dispatches one decoded frame.
    ///
    /// Returns `None` when the frame is unroutable, otherwise the outcome of
    /// running the leaf's callbacks.
    pub async fn dispatch(&self, frame: &Frame) -> DispatchResult<Option<Invocation>> {
        let Some(leaf) = self.tables.route(frame) else {
            return Ok(None);
        };
        trace!(code = frame.code, event = %leaf.event, "Dispatching frame");

        let value = leaf.normalize(frame)?;
        Ok(Some(self.registry.invoke(leaf.event, &value).await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(EventRegistry::new()))
    }

    /// Registers a callback that records every value it receives.
    fn record(dispatcher: &Dispatcher, event: EventKind) -> Arc<Mutex<Vec<EventValue>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dispatcher.registry().register(event, move |value| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().push(value);
                Ok(())
            }
        });
        seen
    }

    fn chat_frame(kind: i64, media: Option<i64>) -> Frame {
        let mut message = json!({"type": kind, "content": "hello", "threadId": "t1"});
        if let Some(media) = media {
            message["mediaType"] = json!(media);
        }
        Frame::new(codes::CHAT_MESSAGE, json!({"ndcId": 1, "chatMessage": message}))
    }

    #[tokio::test]
    async fn test_unknown_codes_are_ignored() {
        let dispatcher = dispatcher();
        let everything: Vec<_> = EventKind::ALL
            .iter()
            .map(|&event| record(&dispatcher, event))
            .collect();

        for code in [0, 1, 108, 112, 300, 303, 999, -1] {
            let frame = Frame::new(code, json!({"actions": ["Typing"]}));
            assert!(dispatcher.dispatch(&frame).await.unwrap().is_none());
        }
        assert!(everything.iter().all(|seen| seen.lock().is_empty()));
    }

    #[tokio::test]
    async fn test_text_message_invoked_once() {
        let dispatcher = dispatcher();
        let seen = record(&dispatcher, EventKind::TextMessage);

        let invocation = dispatcher
            .dispatch(&chat_frame(0, Some(0)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(invocation.invoked, 1);

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        let chat = seen[0].as_chat().unwrap();
        assert_eq!(chat.content(), Some("hello"));
        assert_eq!(chat.thread_id(), Some("t1"));
    }

    #[tokio::test]
    async fn test_media_type_defaults_to_zero() {
        let dispatcher = dispatcher();
        assert_eq!(
            dispatcher.route(&chat_frame(0, None)),
            Some(EventKind::TextMessage)
        );
        assert_eq!(
            dispatcher.route(&chat_frame(0, Some(100))),
            Some(EventKind::ImageMessage)
        );
        assert_eq!(
            dispatcher.route(&chat_frame(65282, None)),
            Some(EventKind::WelcomeMessage)
        );
    }

    #[tokio::test]
    async fn test_unknown_chat_pair_is_silently_dropped() {
        let dispatcher = dispatcher();
        let text = record(&dispatcher, EventKind::TextMessage);
        let fallback = record(&dispatcher, EventKind::Default);

        let outcome = dispatcher.dispatch(&chat_frame(999, Some(999))).await.unwrap();
        assert!(outcome.is_none());
        assert!(text.lock().is_empty());
        assert!(fallback.lock().is_empty());
    }

    #[tokio::test]
    async fn test_chat_frame_without_message_is_dropped() {
        let dispatcher = dispatcher();
        let frame = Frame::new(codes::CHAT_MESSAGE, json!({"ndcId": 1}));
        assert!(dispatcher.dispatch(&frame).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_null_media_type_reaches_text_callbacks() {
        let dispatcher = dispatcher();
        let seen = record(&dispatcher, EventKind::TextMessage);

        let frame = Frame::new(
            codes::CHAT_MESSAGE,
            json!({"chatMessage": {"type": 0, "mediaType": null, "content": "hi"}}),
        );
        let invocation = dispatcher.dispatch(&frame).await.unwrap().unwrap();
        assert_eq!(invocation.invoked, 1);

        let seen = seen.lock();
        let chat = seen[0].as_chat().unwrap();
        assert_eq!(chat.chat_message.media_type, 0);
        assert_eq!(chat.content(), Some("hi"));
    }

    #[tokio::test]
    async fn test_null_profile_list_reaches_online_callbacks() {
        let dispatcher = dispatcher();
        let seen = record(&dispatcher, EventKind::OnlineUsersUpdate);

        let frame = Frame::new(
            codes::TOPIC,
            json!({
                "topic": "ndtopic:x123:online-members",
                "userProfileCount": 0,
                "userProfileList": null
            }),
        );
        let invocation = dispatcher.dispatch(&frame).await.unwrap().unwrap();
        assert_eq!(invocation.invoked, 1);

        let update = seen.lock()[0].as_users_actions().cloned().unwrap();
        assert!(update.user_profile_list.is_empty());
        assert_eq!(update.user_profile_count, Some(0));
    }

    #[tokio::test]
    async fn test_callbacks_run_in_registration_order() {
        let dispatcher = dispatcher();
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in ["first", "second"] {
            let order = Arc::clone(&order);
            dispatcher
                .registry()
                .register(EventKind::TextMessage, move |_| {
                    let order = Arc::clone(&order);
                    async move {
                        order.lock().push(id);
                        Ok(())
                    }
                });
        }

        dispatcher.dispatch(&chat_frame(0, Some(0))).await.unwrap();
        assert_eq!(*order.lock(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_notifications() {
        let dispatcher = dispatcher();
        let alerts = record(&dispatcher, EventKind::Alert);

        let frame = Frame::new(
            codes::NOTIFICATION,
            json!({"payload": {"notifType": 18, "aps": {"alert": "ping"}}}),
        );
        dispatcher.dispatch(&frame).await.unwrap();
        assert_eq!(alerts.lock()[0].as_notification().unwrap().alert(), Some("ping"));

        let host = Frame::new(codes::NOTIFICATION, json!({"payload": {"notifType": 53}}));
        assert_eq!(dispatcher.route(&host), Some(EventKind::MemberSetYouHost));

        let unknown = Frame::new(codes::NOTIFICATION, json!({"payload": {"notifType": 7}}));
        assert!(dispatcher.dispatch(&unknown).await.unwrap().is_none());

        let missing = Frame::new(codes::NOTIFICATION, json!({}));
        assert!(dispatcher.dispatch(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_channel_fetch_is_unconditional() {
        let dispatcher = dispatcher();
        let seen = record(&dispatcher, EventKind::FetchChannel);

        let frame = Frame::new(codes::CHANNEL_FETCH, json!({"payload": {"channelKey": "k"}}));
        dispatcher.dispatch(&frame).await.unwrap();
        let value = seen.lock()[0].clone();
        assert!(value.as_notification().is_some());

        let bare = Frame::new(codes::CHANNEL_FETCH, Value::Null);
        assert_eq!(dispatcher.route(&bare), Some(EventKind::FetchChannel));
    }

    #[tokio::test]
    async fn test_chat_actions() {
        let dispatcher = dispatcher();
        let start = Frame::new(codes::ACTION_START, json!({"actions": ["Typing"], "threadId": "t"}));
        let end = Frame::new(codes::ACTION_END, json!({"actions": "Typing"}));
        assert_eq!(dispatcher.route(&start), Some(EventKind::UserTypingStart));
        assert_eq!(dispatcher.route(&end), Some(EventKind::UserTypingEnd));
    }

    #[tokio::test]
    async fn test_unknown_chat_action_falls_back_to_default() {
        let dispatcher = dispatcher();
        let fallback = record(&dispatcher, EventKind::Default);

        let unknown = Frame::new(codes::ACTION_START, json!({"actions": ["Recording"]}));
        let missing = Frame::new(codes::ACTION_END, json!({}));
        dispatcher.dispatch(&unknown).await.unwrap();
        dispatcher.dispatch(&missing).await.unwrap();

        let seen = fallback.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].as_frame(), Some(&unknown));
        assert_eq!(seen[1].as_frame(), Some(&missing));
    }

    #[tokio::test]
    async fn test_topics() {
        let dispatcher = dispatcher();
        let online = record(&dispatcher, EventKind::OnlineUsersUpdate);

        let frame = Frame::new(
            codes::TOPIC,
            json!({"topic": "ndtopic:x123:online-members", "userProfileList": [{"uid": "a"}]}),
        );
        dispatcher.dispatch(&frame).await.unwrap();
        let update = online.lock()[0].as_users_actions().cloned().unwrap();
        assert_eq!(update.user_profile_list.len(), 1);

        let recording = Frame::new(
            codes::TOPIC,
            json!({"topic": "ndtopic:x123:users-start-recording-at:chat-id"}),
        );
        assert_eq!(dispatcher.route(&recording), Some(EventKind::VoiceChatStart));
    }

    #[tokio::test]
    async fn test_malformed_topics_are_ignored() {
        let dispatcher = dispatcher();
        for body in [
            json!({"topic": "ndtopic:x123"}),
            json!({"topic": 5}),
            json!({}),
            json!({"topic": "ndtopic:x123:unknown-topic"}),
        ] {
            let frame = Frame::new(codes::TOPIC, body);
            assert!(dispatcher.dispatch(&frame).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_decode_error_does_not_affect_next_frame() {
        let dispatcher = dispatcher();
        let seen = record(&dispatcher, EventKind::TextMessage);

        assert!(dispatcher.resolve(b"{not json").await.is_err());

        let good = chat_frame(0, Some(0)).to_bytes().unwrap();
        dispatcher.resolve(&good).await.unwrap();
        assert_eq!(seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_normalize_failure_is_reported() {
        let dispatcher = dispatcher();
        let frame = Frame::new(
            codes::CHAT_MESSAGE,
            json!({"chatMessage": {"type": 0, "content": 12}}),
        );
        assert!(matches!(
            dispatcher.dispatch(&frame).await,
            Err(ndc_core::DispatchError::Normalize { .. })
        ));
    }

    #[test]
    fn test_table_coverage() {
        let tables = DispatchTables::new();
        assert_eq!(tables.chat_messages.len(), CHAT_MESSAGES.len());
        assert_eq!(tables.notifications.len(), 4);
        for code in [10, 201, 304, 306, 400, 1000] {
            assert!(tables.handles(code));
        }
        assert!(!tables.handles(112));
    }
}
