//! Cross-context notification bus.
//!
//! The bus repurposes storage change events as a pub/sub channel. Broadcasting
//! writes the payload to a dedicated signal key; other contexts see the change
//! event for that key and hand the new value to every callback registered for it.
//!
//! It is a last-value broadcast, not a log: only the latest payload is kept under
//! the signal key, a context that was not listening when a value was written
//! never receives it, and a context never receives its own broadcasts.
//!
//! Queued events are dispatched either synchronously with [`SignalBus::drain`] or
//! continuously by spawning [`SignalBus::run`] on a tokio task.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::Serialize;

use cowork_core::MonotonicClock;
use cowork_store::{collection, Context, StorageEvent, StorageListener};

type Handler = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<String, Vec<(u64, Handler)>>,
}

impl Registry {
    fn remove(&mut self, key: &str, id: u64) {
        if let Some(handlers) = self.handlers.get_mut(key) {
            handlers.retain(|(handler_id, _)| *handler_id != id);
            if handlers.is_empty() {
                self.handlers.remove(key);
            }
        }
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One context's view of the notification channels.
///
/// Cloning is cheap and clones share callbacks, listener and clock.
#[derive(Clone)]
pub struct SignalBus {
    context: Context,
    listener: Arc<tokio::sync::Mutex<StorageListener>>,
    registry: Arc<Mutex<Registry>>,
    clock: Arc<MonotonicClock>,
}

impl SignalBus {
    /// Create a bus for `context`. Changes made by other contexts from this
    /// point on are queued for dispatch.
    #[must_use]
    pub fn new(context: Context) -> Self {
        let listener = context.listen();
        Self {
            context,
            listener: Arc::new(tokio::sync::Mutex::new(listener)),
            registry: Arc::new(Mutex::new(Registry::default())),
            clock: Arc::new(MonotonicClock::new()),
        }
    }

    /// The context this bus belongs to.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The clock used to stamp broadcasts from this context.
    #[must_use]
    pub fn clock(&self) -> &MonotonicClock {
        &self.clock
    }

    /// Write `payload` as JSON to the signal key `key`.
    ///
    /// Failures are logged and dropped.
    pub fn broadcast<T: Serialize>(&self, key: &str, payload: &T) {
        match collection::try_write_value(&self.context, key, payload) {
            Ok(()) => tracing::trace!(key = %key, context = %self.context.id(), "Broadcast signal"),
            Err(e) => tracing::warn!(key = %key, error = %e, "Dropped signal broadcast"),
        }
    }

    /// Call `handler` with the raw new value whenever another context writes `key`.
    pub fn on_change<F>(&self, key: &str, handler: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .handlers
            .entry(key.to_string())
            .or_default()
            .push((id, Arc::new(handler)));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            key: key.to_string(),
            id,
            active: true,
        }
    }

    /// Number of callbacks currently registered for `key`.
    #[must_use]
    pub fn subscriber_count(&self, key: &str) -> usize {
        lock(&self.registry).handlers.get(key).map_or(0, Vec::len)
    }

    /// Dispatch every queued change event and return how many were dispatched.
    ///
    /// Returns zero without waiting if [`run`](Self::run) currently owns the
    /// listener.
    pub fn drain(&self) -> usize {
        let Ok(mut listener) = self.listener.try_lock() else {
            return 0;
        };
        let mut dispatched = 0;
        while let Some(event) = listener.try_next() {
            self.dispatch(&event);
            dispatched += 1;
        }
        dispatched
    }

    /// Dispatch change events as they arrive, until the origin is dropped.
    pub async fn run(&self) {
        let mut listener = self.listener.lock().await;
        while let Some(event) = listener.next().await {
            self.dispatch(&event);
        }
        tracing::debug!(context = %self.context.id(), "Signal bus stopped");
    }

    fn dispatch(&self, event: &StorageEvent) {
        // Removals carry no payload.
        let Some(value) = event.new_value.as_deref() else {
            return;
        };

        let handlers: Vec<Handler> = lock(&self.registry)
            .handlers
            .get(&event.key)
            .map(|handlers| handlers.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        if handlers.is_empty() {
            return;
        }

        tracing::trace!(
            key = %event.key,
            source = %event.source,
            handlers = handlers.len(),
            "Dispatching signal"
        );
        for handler in handlers {
            handler(value);
        }
    }
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBus")
            .field("context", &self.context.id())
            .finish_non_exhaustive()
    }
}

/// A registered callback. Dropping it unregisters the callback.
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    key: String,
    id: u64,
    active: bool,
}

impl Subscription {
    /// The signal key this subscription listens on.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Unregister the callback. A dispatch already in progress still completes.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).remove(&self.key, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}
