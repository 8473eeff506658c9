//! Indexed route container.
//!
//! Routes are kept in insertion order with two derived indices: a
//! method→routes bucket map and a name→route map. Matching walks the
//! event-method bucket first; when only other methods match the path, the
//! collection answers an OPTIONS event with the allowed set and fails any
//! other method with a method-not-allowed error.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::{debug, trace};

use crate::error::RouterError;
use crate::event::Event;
use crate::route::{Route, RouteSummary};

#[derive(Debug, Default)]
pub struct RouteCollection {
    routes: Vec<Arc<Route>>,
    by_method: HashMap<Method, Vec<Arc<Route>>>,
    by_name: HashMap<String, Arc<Route>>,
}

impl RouteCollection {
    pub fn new() -> Self {
        RouteCollection::default()
    }

    /// Append a route, updating the derived indices. A later route with an
    /// already-registered name overwrites the name entry.
    pub fn add(&mut self, route: Arc<Route>) {
        self.by_method
            .entry(route.method().clone())
            .or_default()
            .push(route.clone());
        if let Some(name) = route.name() {
            self.by_name.insert(name.to_string(), route.clone());
        }
        self.routes.push(route);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes_by_method(&self, method: &Method) -> &[Arc<Route>] {
        self.by_method.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<Route>> {
        self.by_name.get(name).cloned()
    }

    pub fn has_named_route(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Find the route for an event.
    ///
    /// The event-method bucket is scanned in insertion order with the
    /// method matcher skipped (the bucket already guarantees it); the first
    /// full match wins. When the bucket yields nothing but other routes
    /// match by path/host/protocol, an OPTIONS event gets a synthesized
    /// route answering with the allowed set, anything else fails with
    /// method-not-allowed. Otherwise: not found.
    pub fn match_event(&self, event: &dyn Event) -> Result<Arc<Route>, RouterError> {
        for route in self.routes_by_method(event.method()) {
            if route.matches(event, false) {
                trace!(path = route.path(), method = %route.method(), "matched route");
                return Ok(route.clone());
            }
        }

        let mut allowed: Vec<Method> = Vec::new();
        for route in &self.routes {
            if route.matches(event, false) && !allowed.contains(route.method()) {
                allowed.push(route.method().clone());
            }
        }

        if !allowed.is_empty() {
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            if event.is_method(&Method::OPTIONS) {
                debug!(path = event.pathname(), "answering OPTIONS with allowed set");
                return Ok(Arc::new(Route::options_fallback(event.pathname(), &allowed)?));
            }
            return Err(RouterError::MethodNotAllowed {
                method: event.method().clone(),
                allowed,
            });
        }

        Err(RouterError::NoRouteMatched {
            method: event.method().clone(),
            path: event.pathname().to_string(),
        })
    }

    /// Dump entries sorted by path, internal HEAD twins excluded.
    pub async fn dump(&self) -> Result<Vec<RouteSummary>, RouterError> {
        let mut entries = Vec::new();
        for route in &self.routes {
            if route.is_internal_header() {
                continue;
            }
            entries.push(route.summary().await?);
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    /// JSON-serialized [`RouteCollection::dump`].
    pub async fn dump_json(&self) -> Result<String, RouterError> {
        Ok(serde_json::to_string(&self.dump().await?)?)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Route>> {
        self.routes.iter()
    }
}

impl<'a> IntoIterator for &'a RouteCollection {
    type Item = &'a Arc<Route>;
    type IntoIter = std::slice::Iter<'a, Arc<Route>>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
