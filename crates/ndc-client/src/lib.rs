//! # ndc Client
//!
//! A supervised client for the chat service's real-time socket.
//!
//! - [`Dispatcher`]: routes decoded frames through immutable tables to leaf
//!   events and runs their callbacks
//! - [`Supervisor`]: owns the connection, rotates it on a fixed interval and
//!   bridges inbound frames to the dispatcher
//! - [`ActionSender`]: builds and sends room-control, presence and topic
//!   messages
//! - [`Client`]: facade composing the above
//!
//! ## Feature Flags
//!
//! - `ws-client`: use the WebSocket transport when no connector is given

pub mod actions;
pub mod client;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{
    ActionSender, JOIN_AS_MEMBER, JOIN_AS_SPECTATOR, Presence, PresenceAction, UsersActionTopic,
};
pub use client::{BuildError, Client, ClientBuilder};
pub use config::{ClientConfig, DEFAULT_URL};
pub use credentials::{CredentialProvider, SignedCredentials, Signer, StaticCredentials};
pub use dispatch::{DispatchTables, Dispatcher, Leaf};
pub use supervisor::{ConnectionState, Supervisor};
