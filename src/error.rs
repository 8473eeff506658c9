//! Error taxonomy surfaced by the router.
//!
//! Three kinds are stable wire values: `RouterError` for configuration and
//! programmer errors, `RouteNotFoundError` when nothing matches (or a named
//! route is absent, or a required parameter fails to bind), and
//! `MethodNotAllowedError` when the path matches but the method does not.
//! [`RouterError::kind`] exposes the wire name; [`render`] maps an error to
//! an outgoing response the way a co-operating error handler would.

use http::{HeaderMap, Method, StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::event::{Event, PreferredType};
use crate::handler::HandlerKind;
use crate::response::{Body, Response};

/// Any failure surfaced by registration, matching, binding, generation or
/// dispatch. The router never catches or retries; everything propagates out
/// of `dispatch`.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no route matched {method} {path}")]
    NoRouteMatched { method: Method, path: String },

    #[error("no route named `{0}`")]
    UnknownNamedRoute(String),

    #[error("required parameter `{0}` did not bind")]
    UnboundParameter(String),

    #[error("{method} not allowed, allowed: {}", .allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(","))]
    MethodNotAllowed { method: Method, allowed: Vec<Method> },

    #[error("missing `{0}` in route definition")]
    MissingOption(&'static str),

    #[error("unsupported method `{0}`")]
    UnsupportedMethod(Method),

    #[error("invalid handler: {0}")]
    InvalidHandler(String),

    #[error("no `{0}` dispatcher registered")]
    UnknownDispatcher(HandlerKind),

    #[error("controller `{controller}` has no action `{action}`")]
    UnknownAction { controller: String, action: String },

    #[error("cannot resolve binding `{0}`")]
    UnresolvableBinding(String),

    #[error("invalid binding `{0}`, expected `Alias@method`")]
    InvalidBinding(String),

    #[error("invalid route pattern `{0}`")]
    InvalidPattern(String),

    #[error("unknown protocol `{0}`")]
    UnknownProtocol(String),

    #[error("route definitions nested deeper than {0}")]
    DepthExceeded(usize),

    #[error("max depth must be positive")]
    InvalidDepth,

    #[error("missing parameter `{0}` for URL generation")]
    MissingParameter(String),

    #[error("route is not bound to an event")]
    Unbound,

    #[error("empty redirect target")]
    EmptyRedirect,

    #[error("no history backend configured")]
    NoHistory,

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// Stable error kind names, matching what embedding frameworks key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Router,
    NotFound,
    MethodNotAllowed,
}

impl ErrorKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Router => "RouterError",
            ErrorKind::NotFound => "RouteNotFoundError",
            ErrorKind::MethodNotAllowed => "MethodNotAllowedError",
        }
    }
}

impl RouterError {
    /// The stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouterError::NoRouteMatched { .. }
            | RouterError::UnknownNamedRoute(_)
            | RouterError::UnboundParameter(_) => ErrorKind::NotFound,
            RouterError::MethodNotAllowed { .. } => ErrorKind::MethodNotAllowed,
            _ => ErrorKind::Router,
        }
    }

    /// The response status a co-operating error handler maps this error to.
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::Router => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Render an error into an outgoing response, shaping the body by the
/// event's preferred type. Every rendered error is logged.
pub fn render(error: &RouterError, event: &dyn Event) -> Response {
    tracing::error!(kind = error.kind().as_str(), error = %error, "router error");
    let body = match event.preferred_type() {
        PreferredType::Json => Body::Json(json!({ "error": error.to_string() })),
        _ => Body::Text(error.to_string()),
    };
    Response {
        status: error.status(),
        headers: HeaderMap::new(),
        body,
    }
}
