//! Event registry.
//!
//! Maps each [`EventKind`] to an ordered list of user callbacks. Registration
//! appends; nothing is ever removed. Invoking an event awaits every callback
//! in registration order, one after the other.
//!
//! ```rust,ignore
//! use ndc_core::{EventKind, EventRegistry};
//!
//! let registry = EventRegistry::new();
//! registry.register(EventKind::TextMessage, |value| async move {
//!     if let Some(chat) = value.as_chat() {
//!         println!("{:?}", chat.content());
//!     }
//!     Ok(())
//! });
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::RwLock;
use tracing::{trace, warn};

use crate::error::CallbackError;
use crate::event::EventKind;
use crate::model::EventValue;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased event callback.
pub type Callback = Arc<dyn Fn(EventValue) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Outcome of delivering one event to its callbacks.
#[derive(Debug, Default)]
pub struct Invocation {
    /// Number of callbacks that were run.
    pub invoked: usize,
    /// Failures, in callback order.
    pub errors: Vec<CallbackError>,
}

impl Invocation {
    /// Returns `true` if every callback succeeded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Event name → ordered callbacks.
///
/// Callbacks may be registered while events are being delivered: each
/// invocation works on a snapshot of the list taken when it starts.
#[derive(Default)]
pub struct EventRegistry {
    handlers: RwLock<HashMap<EventKind, Vec<Callback>>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an async closure for `event` and returns it as a [`Callback`].
    pub fn register<F, Fut>(&self, event: EventKind, f: F) -> Callback
    where
        F: Fn(EventValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let callback: Callback = Arc::new(move |value| Box::pin(f(value)));
        self.register_callback(event, callback)
    }

    /// Appends an already boxed callback and returns it unchanged.
    ///
    /// Registering the same callback twice runs it twice.
    pub fn register_callback(&self, event: EventKind, callback: Callback) -> Callback {
        self.handlers
            .write()
            .entry(event)
            .or_default()
            .push(Arc::clone(&callback));
        trace!(event = %event, "Callback registered");
        callback
    }

    /// Returns the number of callbacks registered for `event`.
    pub fn callback_count(&self, event: EventKind) -> usize {
        self.handlers.read().get(&event).map_or(0, Vec::len)
    }

    /// Delivers `value` to every callback of `event`, in registration order.
    ///
    /// A failing or panicking callback is logged and skipped; the remaining
    /// callbacks still run.
    pub async fn invoke(&self, event: EventKind, value: &EventValue) -> Invocation {
        let callbacks = match self.handlers.read().get(&event) {
            Some(list) => list.clone(),
            None => return Invocation::default(),
        };

        let mut invocation = Invocation::default();
        for (index, callback) in callbacks.iter().enumerate() {
            let value = value.clone();
            let result = AssertUnwindSafe(async move { callback(value).await })
                .catch_unwind()
                .await;
            invocation.invoked += 1;

            let error = match result {
                Ok(Ok(())) => continue,
                Ok(Err(source)) => CallbackError::Failed {
                    event,
                    index,
                    source,
                },
                Err(panic) => CallbackError::Panicked {
                    event,
                    index,
                    message: panic_message(panic.as_ref()),
                },
            };
            warn!(error = %error, "Event callback failed");
            invocation.errors.push(error);
        }

        invocation
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.read();
        f.debug_struct("EventRegistry")
            .field("events", &handlers.len())
            .field("callbacks", &handlers.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use parking_lot::Mutex;
    use serde_json::json;

    fn fail() -> anyhow::Result<()> {
        anyhow::bail!("boom")
    }

    fn explode() -> anyhow::Result<()> {
        panic!("kaboom")
    }

    fn raw_value() -> EventValue {
        EventValue::Frame(Frame::new(304, json!({"actions": ["Unknown"]})))
    }

    #[tokio::test]
    async fn test_invoke_without_callbacks() {
        let registry = EventRegistry::new();
        let invocation = registry.invoke(EventKind::Default, &raw_value()).await;
        assert_eq!(invocation.invoked, 0);
        assert!(invocation.is_ok());
    }

    #[tokio::test]
    async fn test_callbacks_run_in_registration_order() {
        let registry = EventRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for id in 1..=3 {
            let order = Arc::clone(&order);
            registry.register(EventKind::Default, move |_| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().push(id);
                    Ok(())
                }
            });
        }

        let invocation = registry.invoke(EventKind::Default, &raw_value()).await;
        assert_eq!(invocation.invoked, 3);
        assert_eq!(*order.lock(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_same_callback_registered_twice_runs_twice() {
        let registry = EventRegistry::new();
        let hits = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&hits);
        let callback = registry.register(EventKind::Alert, move |_| {
            let counter = Arc::clone(&counter);
            async move {
                *counter.lock() += 1;
                Ok(())
            }
        });
        let returned = registry.register_callback(EventKind::Alert, Arc::clone(&callback));
        assert!(Arc::ptr_eq(&callback, &returned));

        registry.invoke(EventKind::Alert, &raw_value()).await;
        assert_eq!(*hits.lock(), 2);
        assert_eq!(registry.callback_count(EventKind::Alert), 2);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let registry = EventRegistry::new();
        let reached = Arc::new(Mutex::new(false));

        registry.register(EventKind::Default, |_| async { fail() });
        registry.register(EventKind::Default, |_| async { explode() });
        let flag = Arc::clone(&reached);
        registry.register(EventKind::Default, move |_| {
            let flag = Arc::clone(&flag);
            async move {
                *flag.lock() = true;
                Ok(())
            }
        });

        let invocation = registry.invoke(EventKind::Default, &raw_value()).await;
        assert_eq!(invocation.invoked, 3);
        assert_eq!(invocation.errors.len(), 2);
        assert!(matches!(
            invocation.errors[0],
            CallbackError::Failed { index: 0, .. }
        ));
        match &invocation.errors[1] {
            CallbackError::Panicked { index, message, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(message, "kaboom");
            }
            other => panic!("expected panic error, got {other:?}"),
        }
        assert!(*reached.lock());
    }

    #[tokio::test]
    async fn test_callbacks_only_see_their_event() {
        let registry = EventRegistry::new();
        let hits = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&hits);
        registry.register(EventKind::TextMessage, move |_| {
            let counter = Arc::clone(&counter);
            async move {
                *counter.lock() += 1;
                Ok(())
            }
        });

        registry.invoke(EventKind::ImageMessage, &raw_value()).await;
        assert_eq!(*hits.lock(), 0);
    }

    #[tokio::test]
    async fn test_register_during_invoke_applies_to_next_invoke() {
        let registry = Arc::new(EventRegistry::new());
        let late_hits = Arc::new(Mutex::new(0));

        let inner = Arc::clone(&registry);
        let counter = Arc::clone(&late_hits);
        registry.register(EventKind::TextMessage, move |_| {
            let inner = Arc::clone(&inner);
            let counter = Arc::clone(&counter);
            async move {
                if inner.callback_count(EventKind::TextMessage) == 1 {
                    inner.register(EventKind::TextMessage, move |_| {
                        let counter = Arc::clone(&counter);
                        async move {
                            *counter.lock() += 1;
                            Ok(())
                        }
                    });
                }
                Ok(())
            }
        });

        let invocation = registry.invoke(EventKind::TextMessage, &raw_value()).await;
        assert_eq!(invocation.invoked, 1);
        assert_eq!(*late_hits.lock(), 0);
        assert_eq!(registry.callback_count(EventKind::TextMessage), 2);

        let invocation = registry.invoke(EventKind::TextMessage, &raw_value()).await;
        assert_eq!(invocation.invoked, 2);
        assert_eq!(*late_hits.lock(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_register_and_invoke() {
        let registry = Arc::new(EventRegistry::new());
        let hits = Arc::new(Mutex::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            let hits = Arc::clone(&hits);
            tasks.push(tokio::spawn(async move {
                registry.register(EventKind::Alert, move |_| {
                    let hits = Arc::clone(&hits);
                    async move {
                        *hits.lock() += 1;
                        Ok(())
                    }
                });
                registry.invoke(EventKind::Alert, &raw_value()).await.invoked
            }));
        }
        for task in tasks {
            let invoked = task.await.unwrap();
            assert!((1..=8).contains(&invoked));
        }

        assert_eq!(registry.callback_count(EventKind::Alert), 8);
        let invocation = registry.invoke(EventKind::Alert, &raw_value()).await;
        assert_eq!(invocation.invoked, 8);
    }
}
