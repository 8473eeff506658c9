//! The incoming event contract.
//!
//! The router consumes events through the [`Event`] trait and never owns a
//! transport: a server embedding wraps its request type, a browser embedding
//! wraps the current location. [`RequestEvent`] is the crate-provided plain
//! implementation for synthetic events, tests and framework-less embeddings.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use http::Method;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use url::Url;

use crate::error::RouterError;
use crate::route::Route;

/// Protocol restriction vocabulary: a route declaring one only matches
/// events carried over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(RouterError::UnknownProtocol(other.to_string())),
        }
    }
}

/// Content type the event prefers for rendered errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    Html,
    Json,
    Text,
    Xml,
}

/// Back-reference from the event to the route the router is currently
/// dispatching. Installed by the router before matching; treat it as a weak
/// reference, never as ownership.
pub type RouteResolverFn = Arc<dyn Fn() -> Option<Arc<Route>> + Send + Sync>;

/// What the router needs from an incoming event.
pub trait Event: Send + Sync {
    fn url(&self) -> &Url;

    fn method(&self) -> &Method;

    fn pathname(&self) -> &str {
        self.url().path()
    }

    /// Percent-decoded pathname, when the transport provides one. Matching
    /// prefers this over [`Event::pathname`].
    fn decoded_pathname(&self) -> Option<String> {
        None
    }

    fn protocol(&self) -> Protocol {
        match self.url().scheme() {
            "https" => Protocol::Https,
            _ => Protocol::Http,
        }
    }

    fn host(&self) -> String {
        self.url().host_str().unwrap_or("").to_string()
    }

    /// The full URI of the event. Required by `Route::bind`.
    fn uri(&self) -> String {
        self.url().to_string()
    }

    fn query(&self) -> HashMap<String, String> {
        self.url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn is_method(&self, method: &Method) -> bool {
        self.method() == method
    }

    fn preferred_type(&self) -> PreferredType {
        PreferredType::Html
    }

    fn set_route_resolver(&self, _resolver: RouteResolverFn) {}

    fn route_resolver(&self) -> Option<RouteResolverFn> {
        None
    }

    fn metadata_value(&self, _key: &str) -> Option<Value> {
        None
    }
}

/// Plain [`Event`] implementation backed by a parsed URL.
pub struct RequestEvent {
    url: Url,
    method: Method,
    preferred: PreferredType,
    metadata: HashMap<String, Value>,
    route_resolver: RwLock<Option<RouteResolverFn>>,
}

impl RequestEvent {
    pub fn new(method: Method, url: &str) -> Result<Self, RouterError> {
        Ok(RequestEvent {
            url: Url::parse(url)?,
            method,
            preferred: PreferredType::Html,
            metadata: HashMap::new(),
            route_resolver: RwLock::new(None),
        })
    }

    pub fn get(url: &str) -> Result<Self, RouterError> {
        RequestEvent::new(Method::GET, url)
    }

    pub fn with_preferred_type(mut self, preferred: PreferredType) -> Self {
        self.preferred = preferred;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

impl Event for RequestEvent {
    fn url(&self) -> &Url {
        &self.url
    }

    fn method(&self) -> &Method {
        &self.method
    }

    fn decoded_pathname(&self) -> Option<String> {
        percent_decode_str(self.url.path())
            .decode_utf8()
            .ok()
            .map(|decoded| decoded.into_owned())
    }

    fn preferred_type(&self) -> PreferredType {
        self.preferred
    }

    fn set_route_resolver(&self, resolver: RouteResolverFn) {
        *self.route_resolver.write().unwrap() = Some(resolver);
    }

    fn route_resolver(&self) -> Option<RouteResolverFn> {
        self.route_resolver.read().unwrap().clone()
    }

    fn metadata_value(&self, key: &str) -> Option<Value> {
        self.metadata.get(key).cloned()
    }
}

impl fmt::Debug for RequestEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestEvent")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .finish()
    }
}
