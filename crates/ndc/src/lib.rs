//! # ndc
//!
//! A supervised client for a chat service's real-time socket.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  frames  ┌────────────┐  leaf event  ┌──────────────┐
//! │ Supervisor │─────────▶│ Dispatcher │─────────────▶│   Registry   │──▶ callbacks
//! │ (rotation) │          │  (tables)  │              │ (per event)  │
//! └────────────┘          └────────────┘              └──────────────┘
//!       ▲
//!       │ send
//! ┌────────────┐
//! │  Actions   │  join / voice / video / presence / topics
//! └────────────┘
//! ```
//!
//! - **Supervisor**: owns one connection at a time and replaces it on a fixed
//!   interval with freshly signed credentials
//! - **Dispatcher**: resolves each frame through a code table and nested
//!   sub-tables to exactly one event
//! - **Registry**: ordered callbacks per event, failures isolated
//! - **Actions**: builds and sends outbound control messages
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ndc::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = NdcRuntime::builder().build()?;
//!
//!     runtime.client().on(EventKind::TextMessage, |value| async move {
//!         if let Some(chat) = value.as_chat() {
//!             info!(content = ?chat.content(), "message");
//!         }
//!         Ok(())
//!     });
//!
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `ws-client` *(default)*: WebSocket transport
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log format

pub use ndc_client as client;
pub use ndc_core as core;
pub use ndc_runtime as runtime;
pub use ndc_transport as transport;

/// Commonly used types for building a client application.
pub mod prelude {
    pub use ndc_runtime::NdcRuntime;
    pub use ndc_runtime::prelude::*;

    pub use ndc_client::{
        ActionSender, Client, ClientConfig, ConnectionState, JOIN_AS_MEMBER, JOIN_AS_SPECTATOR,
        StaticCredentials, UsersActionTopic,
    };

    pub use ndc_core::{
        ChatEvent, EventKind, EventRegistry, EventValue, Frame, Notification, UsersActions, codes,
    };
}
