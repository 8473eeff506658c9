//! Event-emitter contract used for `routing` / `routed` / `popstate`
//! notifications. The router works without one; embeddings plug their own
//! bus in. [`ListenerEmitter`] is a minimal in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

/// A registered listener.
pub type Listener = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

pub trait EventEmitter: Send + Sync {
    fn emit(&self, name: &str, payload: Option<Value>);

    fn on(&self, name: &str, listener: Listener);
}

/// Synchronous in-memory emitter dispatching to registered listeners.
#[derive(Default)]
pub struct ListenerEmitter {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl ListenerEmitter {
    pub fn new() -> Self {
        ListenerEmitter::default()
    }
}

impl EventEmitter for ListenerEmitter {
    fn emit(&self, name: &str, payload: Option<Value>) {
        let listeners = self.listeners.read().unwrap();
        if let Some(registered) = listeners.get(name) {
            for listener in registered {
                listener(payload.as_ref());
            }
        }
    }

    fn on(&self, name: &str, listener: Listener) {
        self.listeners
            .write()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push(listener);
    }
}
