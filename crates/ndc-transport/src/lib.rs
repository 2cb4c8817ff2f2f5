//! # ndc Transport
//!
//! Connection plumbing for the ndc client.
//!
//! The client never talks to a socket directly. It asks a
//! [`TransportConnector`] for a fresh [`Transport`] on every open, hands it a
//! [`TransportListener`], and receives open/close/error notifications and raw
//! inbound frames through it.
//!
//! ## Feature Flags
//!
//! - `ws-client`: WebSocket transport built on `tokio-tungstenite`
//!   with custom upgrade headers and keep-alive pings.

pub mod connection;

#[cfg(feature = "ws-client")]
pub mod websocket;

pub use connection::{
    BoxedListener, BoxedTransport, ConnectRequest, Transport, TransportConnector,
    TransportListener,
};

#[cfg(feature = "ws-client")]
pub use websocket::{WsConnector, WsTransport};
