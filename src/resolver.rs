//! External dependency-resolution contract.
//!
//! The core only ever *looks up* collaborators: controller instances for the
//! class dispatcher and alias binders for `"Alias@method"` bindings.
//! [`StaticResolver`] is a minimal in-memory implementation for tests and
//! embeddings without a container.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::RouterError;
use crate::handler::Controller;

/// A resolved alias target: invoked as `binder.call(method, key, raw)`.
pub trait AliasBinder: Send + Sync {
    fn call(
        &self,
        method: &str,
        key: &str,
        raw: Value,
    ) -> BoxFuture<'static, Result<Value, RouterError>>;
}

/// External resolver consulted for controllers and alias binders.
pub trait Resolver: Send + Sync {
    fn resolve_controller(&self, id: &str) -> Option<Arc<dyn Controller>>;

    fn resolve_binder(&self, id: &str) -> Option<Arc<dyn AliasBinder>>;

    fn has(&self, id: &str) -> bool {
        self.resolve_controller(id).is_some() || self.resolve_binder(id).is_some()
    }
}

/// In-memory [`Resolver`] over pre-registered instances.
#[derive(Default)]
pub struct StaticResolver {
    controllers: HashMap<String, Arc<dyn Controller>>,
    binders: HashMap<String, Arc<dyn AliasBinder>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        StaticResolver::default()
    }

    pub fn controller(mut self, id: impl Into<String>, controller: Arc<dyn Controller>) -> Self {
        self.controllers.insert(id.into(), controller);
        self
    }

    pub fn binder(mut self, id: impl Into<String>, binder: Arc<dyn AliasBinder>) -> Self {
        self.binders.insert(id.into(), binder);
        self
    }
}

impl Resolver for StaticResolver {
    fn resolve_controller(&self, id: &str) -> Option<Arc<dyn Controller>> {
        self.controllers.get(id).cloned()
    }

    fn resolve_binder(&self, id: &str) -> Option<Arc<dyn AliasBinder>> {
        self.binders.get(id).cloned()
    }
}
