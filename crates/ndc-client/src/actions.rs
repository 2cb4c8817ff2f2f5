//! Outbound control messages.
//!
//! Room control (`t = 112` / `108`), presence (`t = 306`, stopped with
//! `t = 303`) and topic subscriptions (`t = 300`). Every envelope carries an
//! `id` string used as a request correlation id; it is fresh for every call.
//!
//! Sending is fire-and-forget: a successful return means the frame was handed
//! to the transport, not that the service accepted it.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Value, json};
use tracing::{debug, trace};

use ndc_core::{Frame, TransportResult, UsersActions, codes};

use crate::supervisor::Supervisor;

/// Default role when joining a room.
pub const JOIN_AS_MEMBER: i64 = 1;
/// Role used to leave a room or to watch as a spectator.
pub const JOIN_AS_SPECTATOR: i64 = 2;

/// Channel type of a video room.
const CHANNEL_VIDEO: i64 = 5;
/// Channel type of a voice room.
const CHANNEL_VOICE: i64 = 1;

// =============================================================================
// Envelopes
// =============================================================================

/// `t = 112`: join or leave a live room.
pub fn join_room(community: i64, thread: &str, join_role: i64, id: &str) -> Frame {
    Frame::new(
        codes::ROOM_JOIN,
        json!({
            "ndcId": community,
            "threadId": thread,
            "joinRole": join_role,
            "id": id,
        }),
    )
}

/// `t = 108`: open a room channel, optionally with a join role.
pub fn join_channel(
    community: i64,
    thread: &str,
    join_role: Option<i64>,
    channel_type: i64,
    id: &str,
) -> Frame {
    let mut body = json!({
        "ndcId": community,
        "threadId": thread,
        "channelType": channel_type,
        "id": id,
    });
    if let Some(role) = join_role {
        body["joinRole"] = json!(role);
    }
    Frame::new(codes::CHANNEL_CONTROL, body)
}

/// `t = 300`: subscribe to a topic.
pub fn topic_subscription(community: i64, topic: &str, id: &str) -> Frame {
    Frame::new(
        codes::TOPIC_SUBSCRIBE,
        json!({
            "ndcId": community,
            "topic": topic,
            "id": id,
        }),
    )
}

/// `t = 306`: announce what the user is doing.
pub fn presence(community: i64, actions: Value, target: &str, params: Value, id: &str) -> Frame {
    Frame::new(
        codes::PRESENCE,
        json!({
            "actions": actions,
            "target": target,
            "ndcId": community,
            "params": params,
            "id": id,
        }),
    )
}

// =============================================================================
// Topics
// =============================================================================

/// Topics accepted by [`ActionSender::users_actions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsersActionTopic {
    #[default]
    UsersChatting,
    OnlineMembers,
    StartTypingAt,
    EndTypingAt,
    StartRecordingAt,
    EndRecordingAt,
}

impl UsersActionTopic {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UsersChatting => "users-chatting",
            Self::OnlineMembers => "online-members",
            Self::StartTypingAt => "users-start-typing-at",
            Self::EndTypingAt => "users-end-typing-at",
            Self::StartRecordingAt => "users-start-recording-at",
            Self::EndRecordingAt => "users-end-recording-at",
        }
    }

    /// Maps a numeric path (0..=5) to a topic. Out-of-range values select
    /// [`UsersActionTopic::UsersChatting`].
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => Self::OnlineMembers,
            2 => Self::StartTypingAt,
            3 => Self::EndTypingAt,
            4 => Self::StartRecordingAt,
            5 => Self::EndRecordingAt,
            _ => Self::UsersChatting,
        }
    }

    /// Builds `ndtopic:x<community>:<topic>[:<chat>]`.
    pub fn key(self, community: i64, chat: Option<&str>) -> String {
        match chat {
            Some(chat) => format!("ndtopic:x{community}:{}:{chat}", self.as_str()),
            None => format!("ndtopic:x{community}:{}", self.as_str()),
        }
    }
}

// =============================================================================
// Sender
// =============================================================================

/// Builds control envelopes and sends them through the supervisor.
#[derive(Debug)]
pub struct ActionSender {
    supervisor: Supervisor,
    request_id: AtomicU64,
}

impl ActionSender {
    pub fn new(supervisor: Supervisor) -> Self {
        Self {
            supervisor,
            request_id: AtomicU64::new(1),
        }
    }

    /// Returns a fresh correlation id.
    fn next_id(&self) -> String {
        self.request_id.fetch_add(1, Ordering::Relaxed).to_string()
    }

    /// Waits before a throttled room-control message.
    async fn throttle(&self) {
        tokio::time::sleep(self.supervisor.config().action_delay()).await;
    }

    async fn send(&self, frame: Frame) -> TransportResult<()> {
        trace!(code = frame.code, "Sending control message");
        self.supervisor.send(&frame).await
    }

    /// Joins a voice room.
    pub async fn join_voice_chat(
        &self,
        community: i64,
        thread: &str,
        join_role: i64,
    ) -> TransportResult<()> {
        self.throttle().await;
        self.send(join_room(community, thread, join_role, &self.next_id()))
            .await
    }

    /// Joins a video room.
    pub async fn join_video_chat(
        &self,
        community: i64,
        thread: &str,
        join_role: i64,
    ) -> TransportResult<()> {
        self.throttle().await;
        self.send(join_channel(
            community,
            thread,
            Some(join_role),
            CHANNEL_VIDEO,
            &self.next_id(),
        ))
        .await
    }

    /// Joins a voice room and opens its voice channel.
    pub async fn start_voice_chat(
        &self,
        community: i64,
        thread: &str,
        join_role: i64,
    ) -> TransportResult<()> {
        self.join_voice_chat(community, thread, join_role).await?;
        self.throttle().await;
        self.send(join_channel(
            community,
            thread,
            None,
            CHANNEL_VOICE,
            &self.next_id(),
        ))
        .await
    }

    /// Leaves a voice room. The service expects [`JOIN_AS_SPECTATOR`] as the
    /// leave role.
    pub async fn end_voice_chat(
        &self,
        community: i64,
        thread: &str,
        leave_role: i64,
    ) -> TransportResult<()> {
        self.join_voice_chat(community, thread, leave_role).await
    }

    /// Joins a video room as a spectator.
    pub async fn join_video_chat_as_spectator(
        &self,
        community: i64,
        thread: &str,
    ) -> TransportResult<()> {
        self.join_voice_chat(community, thread, JOIN_AS_SPECTATOR)
            .await
    }

    /// Joins a thread's live room without throttling.
    pub async fn thread_join(&self, community: i64, thread: &str) -> TransportResult<()> {
        self.send(join_room(community, thread, JOIN_AS_MEMBER, &self.next_id()))
            .await
    }

    /// Opens a thread's video channel without throttling.
    pub async fn channel_join(&self, community: i64, thread: &str) -> TransportResult<()> {
        self.send(join_channel(
            community,
            thread,
            None,
            CHANNEL_VIDEO,
            &self.next_id(),
        ))
        .await
    }

    /// Subscribes to a users-actions topic and reads the reply.
    ///
    /// After sending, the last received frame is read up to
    /// `users_actions_attempts` times. The first topic update found is
    /// returned; otherwise the result is empty.
    pub async fn users_actions(
        &self,
        community: i64,
        topic: UsersActionTopic,
        chat: Option<&str>,
    ) -> TransportResult<UsersActions> {
        let key = topic.key(community, chat);
        self.throttle().await;
        self.send(topic_subscription(community, &key, &self.next_id()))
            .await?;

        let config = self.supervisor.config();
        let attempts = config.users_actions_attempts;
        for attempt in 1..=attempts {
            if let Some(frame) = self.supervisor.receive().filter(|f| f.code == codes::TOPIC) {
                match UsersActions::from_body(&frame.body) {
                    Ok(update) => return Ok(update),
                    Err(e) => debug!(error = %e, "Ignoring malformed topic update"),
                }
            }
            if attempt < attempts {
                tokio::time::sleep(config.users_actions_poll()).await;
            }
        }

        debug!(topic = %key, "No users-actions reply received");
        Ok(UsersActions::default())
    }

    /// Returns a presence builder for a community and chat.
    pub fn presence(&self, community: i64, chat: impl Into<String>) -> Presence<'_> {
        Presence {
            sender: self,
            community,
            chat: chat.into(),
        }
    }
}

// =============================================================================
// Presence
// =============================================================================

/// Builds presence actions for one community and chat.
#[derive(Debug)]
pub struct Presence<'a> {
    sender: &'a ActionSender,
    community: i64,
    chat: String,
}

impl Presence<'_> {
    fn target(&self, path: &str) -> String {
        format!("ndc://x{}/{path}", self.community)
    }

    fn action(&self, actions: Value, target: &str, params: Value) -> PresenceAction {
        PresenceAction {
            supervisor: self.sender.supervisor.clone(),
            frame: presence(
                self.community,
                actions,
                target,
                params,
                &self.sender.next_id(),
            ),
        }
    }

    /// Sends the default browsing action.
    pub async fn set_default_action(&self) -> TransportResult<()> {
        self.action(
            json!(["Browsing"]),
            &self.target(""),
            json!({"duration": 27605}),
        )
        .start()
        .await
    }

    /// Browsing the featured page, or a blog when both `blog` and a non-zero
    /// `blog_type` are given.
    pub async fn browsing(
        &self,
        blog: Option<&str>,
        blog_type: i64,
    ) -> TransportResult<PresenceAction> {
        let target = match blog {
            Some(blog) if blog_type != 0 => self.target(&format!("blog/{blog}")),
            _ => self.target("featured"),
        };
        self.set_default_action().await?;
        Ok(self.action(json!(["Browsing"]), &target, json!({"blogType": blog_type})))
    }

    /// Chatting in this builder's chat. `thread_type` is 2 for public chats,
    /// 0 or 1 for private ones.
    pub fn chatting(&self, thread: Option<&str>, thread_type: i64) -> PresenceAction {
        let target = self.target(&format!("chat-thread/{}", self.chat));
        self.action(
            json!(["Chatting"]),
            &target,
            json!({
                "duration": 12800,
                "membershipStatus": 1,
                "threadType": thread_type,
                "threadId": thread,
            }),
        )
    }

    /// Browsing the public chat list.
    pub async fn public_chats(&self) -> TransportResult<PresenceAction> {
        self.set_default_action().await?;
        Ok(self.action(
            json!(["Browsing"]),
            &self.target("public-chats"),
            json!({"duration": 859}),
        ))
    }

    /// Browsing the leaderboards.
    pub async fn leaderboards(&self) -> TransportResult<PresenceAction> {
        self.set_default_action().await?;
        Ok(self.action(
            json!(["Browsing"]),
            &self.target("leaderboards"),
            json!({"duration": 859}),
        ))
    }

    /// Any action list, target (`ndc://x<community>/...`) and params.
    pub async fn custom(
        &self,
        actions: &[&str],
        target: &str,
        params: Value,
    ) -> TransportResult<PresenceAction> {
        self.set_default_action().await?;
        Ok(self.action(json!(actions), target, params))
    }
}

/// A built presence action.
#[derive(Debug, Clone)]
pub struct PresenceAction {
    supervisor: Supervisor,
    frame: Frame,
}

impl PresenceAction {
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Sends the action.
    pub async fn start(&self) -> TransportResult<()> {
        self.supervisor.send(&self.frame).await
    }

    /// Sends the same envelope as a stop (`t = 303`).
    pub async fn stop(&self) -> TransportResult<()> {
        self.supervisor
            .send(&self.frame.with_code(codes::PRESENCE_STOP))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_supervisor, test_config};
    use tokio_test::assert_ok;

    fn open_sender() -> (ActionSender, std::sync::Arc<crate::testing::MockConnector>) {
        let (supervisor, connector) = mock_supervisor(test_config());
        supervisor.open(false);
        (ActionSender::new(supervisor), connector)
    }

    #[test]
    fn test_join_voice_envelope() {
        let frame = join_room(123, "abc", 1, "37549515");
        let wire: Value = serde_json::from_slice(&frame.to_bytes().unwrap()).unwrap();
        assert_eq!(
            wire,
            json!({
                "o": {"ndcId": 123, "threadId": "abc", "joinRole": 1, "id": "37549515"},
                "t": 112
            })
        );
    }

    #[test]
    fn test_users_action_topics() {
        assert_eq!(
            UsersActionTopic::OnlineMembers.key(123, None),
            "ndtopic:x123:online-members"
        );
        assert_eq!(
            UsersActionTopic::StartTypingAt.key(1, Some("chat")),
            "ndtopic:x1:users-start-typing-at:chat"
        );
        assert_eq!(UsersActionTopic::from_index(4), UsersActionTopic::StartRecordingAt);
        assert_eq!(UsersActionTopic::from_index(5), UsersActionTopic::EndRecordingAt);
        assert_eq!(UsersActionTopic::from_index(42), UsersActionTopic::UsersChatting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_voice_chat_is_sent_with_fresh_ids() {
        let (sender, connector) = open_sender();
        assert_ok!(sender.join_voice_chat(123, "abc", JOIN_AS_MEMBER).await);
        assert_ok!(sender.thread_join(123, "abc").await);

        let sent = connector.sent_frames();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].code, codes::ROOM_JOIN);
        assert_eq!(sent[0].field("ndcId"), Some(&json!(123)));
        assert_eq!(sent[0].field("joinRole"), Some(&json!(1)));
        assert!(sent[0].field("id").unwrap().is_string());
        assert_ne!(sent[0].field("id"), sent[1].field("id"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_delay_throttles() {
        let (sender, connector) = open_sender();
        let started = tokio::time::Instant::now();
        assert_ok!(sender.join_video_chat(1, "t", JOIN_AS_MEMBER).await);
        assert!(started.elapsed() >= test_config().action_delay());

        let sent = connector.sent_frames();
        assert_eq!(sent[0].code, codes::CHANNEL_CONTROL);
        assert_eq!(sent[0].field("channelType"), Some(&json!(5)));
        assert_eq!(sent[0].field("joinRole"), Some(&json!(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_voice_chat_sends_join_then_channel() {
        let (sender, connector) = open_sender();
        assert_ok!(sender.start_voice_chat(1, "t", JOIN_AS_MEMBER).await);

        let sent = connector.sent_frames();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].code, codes::ROOM_JOIN);
        assert_eq!(sent[1].code, codes::CHANNEL_CONTROL);
        assert_eq!(sent[1].field("channelType"), Some(&json!(1)));
        assert_eq!(sent[1].field("joinRole"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spectator_and_leave_roles() {
        let (sender, connector) = open_sender();
        assert_ok!(sender.join_video_chat_as_spectator(1, "t").await);
        assert_ok!(sender.end_voice_chat(1, "t", JOIN_AS_SPECTATOR).await);
        assert_ok!(sender.channel_join(1, "t").await);

        let sent = connector.sent_frames();
        assert_eq!(sent[0].field("joinRole"), Some(&json!(2)));
        assert_eq!(sent[1].field("joinRole"), Some(&json!(2)));
        assert_eq!(sent[2].code, codes::CHANNEL_CONTROL);
        assert_eq!(sent[2].field("channelType"), Some(&json!(5)));
    }

    #[tokio::test]
    async fn test_presence_start_and_stop() {
        let (sender, connector) = open_sender();
        let presence = sender.presence(77, "chat-1");

        let action = presence.leaderboards().await.unwrap();
        assert_ok!(action.start().await);
        assert_ok!(action.stop().await);

        let sent = connector.sent_frames();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].field("target"), Some(&json!("ndc://x77/")));
        assert_eq!(sent[1].code, codes::PRESENCE);
        assert_eq!(sent[1].field("target"), Some(&json!("ndc://x77/leaderboards")));
        assert_eq!(sent[2].code, codes::PRESENCE_STOP);
        assert_eq!(sent[2].body, sent[1].body);
    }

    #[tokio::test]
    async fn test_chatting_skips_default_action() {
        let (sender, connector) = open_sender();
        let action = sender.presence(77, "chat-1").chatting(Some("chat-1"), 2);
        assert_ok!(action.start().await);

        let sent = connector.sent_frames();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].field("target"),
            Some(&json!("ndc://x77/chat-thread/chat-1"))
        );
        assert_eq!(sent[0].body["params"]["threadType"], json!(2));
    }

    #[tokio::test]
    async fn test_browsing_targets() {
        let (sender, _connector) = open_sender();
        let presence = sender.presence(5, "c");

        let featured = presence.browsing(None, 0).await.unwrap();
        assert_eq!(featured.frame().field("target"), Some(&json!("ndc://x5/featured")));

        let blog = presence.browsing(Some("b1"), 1).await.unwrap();
        assert_eq!(blog.frame().field("target"), Some(&json!("ndc://x5/blog/b1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_users_actions_reads_last_topic_update() {
        let (supervisor, connector) = mock_supervisor(test_config());
        supervisor.open(false);
        let update = Frame::new(
            codes::TOPIC,
            json!({"topic": "ndtopic:x9:online-members", "userProfileList": [{"uid": "u"}]}),
        );
        connector
            .listener(0)
            .on_message(&update.to_bytes().unwrap())
            .await;

        let sender = ActionSender::new(supervisor);
        let result = sender
            .users_actions(9, UsersActionTopic::OnlineMembers, None)
            .await
            .unwrap();
        assert_eq!(result.topic_name(), Some("online-members"));
        assert_eq!(result.user_profile_list.len(), 1);

        let request = &connector.sent_frames()[0];
        assert_eq!(request.code, codes::TOPIC_SUBSCRIBE);
        assert_eq!(request.field("topic"), Some(&json!("ndtopic:x9:online-members")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_users_actions_without_reply_is_empty() {
        let (sender, _connector) = open_sender();
        let result = sender
            .users_actions(9, UsersActionTopic::UsersChatting, Some("c"))
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
