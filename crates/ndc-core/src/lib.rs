//! # ndc Core
//!
//! Foundation types shared by every ndc crate.
//!
//! - **Frames**: the `{"o": …, "t": …}` wire envelope ([`Frame`])
//! - **Routing**: keys used by the dispatch tables ([`RoutingKey`])
//! - **Events**: leaf event identities ([`EventKind`]) and their normalized
//!   payloads ([`EventValue`])
//! - **Registry**: user callbacks per event ([`EventRegistry`])
//! - **Errors**: dispatch, transport and callback failures
//!
//! ## Data Flow
//!
//! ```text
//! ┌───────────┐ bytes ┌────────────┐ Frame ┌────────────┐ EventValue ┌──────────┐
//! │ Transport │──────▶│ Supervisor │──────▶│ Dispatcher │───────────▶│ Registry │
//! └───────────┘       └────────────┘       └────────────┘            └──────────┘
//! ```

pub mod error;
pub mod event;
pub mod frame;
pub mod model;
pub mod registry;
pub mod routing;

pub use error::{
    CallbackError, DispatchError, DispatchResult, TransportError, TransportResult,
};
pub use event::{EventKind, UnknownEvent};
pub use frame::{Frame, codes};
pub use model::{
    Aps, Author, ChatEvent, ChatMessage, EventValue, Notification, UserProfile, UsersActions,
};
pub use registry::{BoxFuture, Callback, EventRegistry, Invocation};
pub use routing::{KEY_SEPARATOR, RoutingKey};
