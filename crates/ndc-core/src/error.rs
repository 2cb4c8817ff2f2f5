//! Unified error types for the ndc client.
//!
//! Dispatch, transport and callback failures are kept apart because each has
//! its own recovery policy: a dispatch error drops one frame, a transport error
//! waits for the next rotation, and a callback error only skips that callback.

use thiserror::Error;

use crate::event::EventKind;

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors raised while turning one inbound frame into a leaf event.
///
/// These never outlive the frame that caused them.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The raw bytes are not a valid envelope.
    #[error("failed to decode frame: {0}")]
    Decode(#[from] serde_json::Error),

    /// The envelope was routed but its payload does not fit the leaf's model.
    #[error("failed to normalize payload for '{event}': {reason}")]
    Normalize {
        /// The leaf event the frame was routed to.
        event: EventKind,
        /// Reason for failure.
        reason: String,
    },
}

impl DispatchError {
    /// Creates a normalization error for the given leaf.
    pub fn normalize(event: EventKind, reason: impl ToString) -> Self {
        Self::Normalize {
            event,
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur in transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {url} - {reason}")]
    ConnectionFailed {
        /// The URL that failed to connect.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// The upgrade request could not be built (bad URL or header).
    #[error("invalid connect request: {0}")]
    InvalidRequest(String),

    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// No adapter is currently attached.
    #[error("socket is not connected")]
    NotConnected,

    /// Connection closed.
    #[error("connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },
}

// =============================================================================
// Callback Errors
// =============================================================================

/// A failure inside a user-registered callback.
///
/// Collected per invocation; never propagated into the receive path.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("callback #{index} for '{event}' failed: {source}")]
    Failed {
        /// The event being delivered.
        event: EventKind,
        /// Position of the callback in registration order.
        index: usize,
        /// The error returned by the callback.
        source: anyhow::Error,
    },

    /// The callback panicked.
    #[error("callback #{index} for '{event}' panicked: {message}")]
    Panicked {
        /// The event being delivered.
        event: EventKind,
        /// Position of the callback in registration order.
        index: usize,
        /// Panic payload, when it was a string.
        message: String,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
