//! Minimal event dispatch shared by validations and queues
//!
//! A [`Dispatcher`] maps an event name to the callbacks registered for it.
//! Dispatch is synchronous and happens in registration order.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Callback invoked with the event arguments
pub type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Per-object observer list
pub struct Dispatcher<A> {
    callbacks: Mutex<HashMap<String, Vec<Callback<A>>>>,
}

impl<A> Dispatcher<A> {
    /// Create a dispatcher with no listeners
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(HashMap::new()),
        }
    }

    /// Register `callback` for every future `trigger(event, ..)`
    ///
    /// Registering the same callback twice makes it run twice.
    pub fn on<F>(&self, event: &str, callback: F)
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.callbacks
            .lock()
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(callback));
    }

    /// Invoke every callback registered for `event`, in registration order
    ///
    /// The listener list is snapshotted first, so callbacks may register
    /// listeners or trigger events on the same dispatcher.
    pub fn trigger(&self, event: &str, args: &A) {
        let callbacks = match self.callbacks.lock().get(event) {
            Some(callbacks) => callbacks.clone(),
            None => return,
        };

        for callback in callbacks {
            callback(args);
        }
    }

    /// Number of callbacks registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.callbacks.lock().get(event).map_or(0, Vec::len)
    }
}

impl<A> Default for Dispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let callbacks = self.callbacks.lock();
        f.debug_struct("Dispatcher")
            .field(
                "events",
                &callbacks
                    .iter()
                    .map(|(event, list)| (event.clone(), list.len()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
