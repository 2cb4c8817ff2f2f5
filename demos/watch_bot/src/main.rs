//! Watch Bot Example
//!
//! Logs chat traffic for the configured account and answers a few commands
//! typed into any chat it can see:
//!
//! - `/join`: joins the chat's live room
//! - `/voice`: joins the chat's voice room as a member
//! - `/online`: logs how many members are online in the community
//!
//! Credentials come from the configuration, typically via environment:
//!
//! ```bash
//! NDC_CREDENTIALS__DEVICE_ID=... NDC_CREDENTIALS__SESSION_TOKEN=... \
//!     cargo run --package watch-bot -- --config ndc.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use ndc::prelude::*;

#[derive(Debug, Parser)]
#[command(about = "Watches chats and reacts to a few commands")]
struct Args {
    /// Configuration file. Searched in the current and user config
    /// directories when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `production`.
    #[arg(short, long)]
    profile: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn on_text_message(runtime: Arc<NdcRuntime>, value: EventValue) -> anyhow::Result<()> {
    let Some(chat) = value.as_chat() else {
        return Ok(());
    };

    info!(
        community = ?chat.ndc_id,
        thread = chat.thread_id().unwrap_or("-"),
        author = chat.author_name().unwrap_or("Unknown"),
        "{}",
        chat.content().unwrap_or_default()
    );

    let (Some(community), Some(thread)) = (chat.ndc_id, chat.thread_id()) else {
        return Ok(());
    };
    let actions = runtime.client().actions();

    match chat.content().map(str::trim) {
        Some("/join") => actions.thread_join(community, thread).await?,
        Some("/voice") => {
            actions
                .join_voice_chat(community, thread, JOIN_AS_MEMBER)
                .await?
        }
        Some("/online") => {
            let update = actions
                .users_actions(community, UsersActionTopic::OnlineMembers, None)
                .await?;
            info!(
                community,
                online = update.user_profile_count.unwrap_or_default(),
                "Online members"
            );
        }
        _ => {}
    }

    Ok(())
}

async fn on_typing(value: EventValue) -> anyhow::Result<()> {
    if let Some(update) = value.as_users_actions() {
        debug!(topic = update.topic_name().unwrap_or("-"), "Typing");
    }
    Ok(())
}

async fn on_default(value: EventValue) -> anyhow::Result<()> {
    trace!(?value, "Unhandled frame");
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = NdcRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }
    let runtime = Arc::new(builder.build()?);

    let client = runtime.client();
    let handle = Arc::clone(&runtime);
    client.on(EventKind::TextMessage, move |value| {
        on_text_message(Arc::clone(&handle), value)
    });
    client.on(EventKind::UserTypingStart, on_typing);
    client.on(EventKind::Default, on_default);

    runtime.run().await?;
    info!(status = runtime.client().status(), "Bye");

    Ok(())
}
