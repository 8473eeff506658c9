//! The outgoing response contract.
//!
//! The router produces three shapes itself (redirects, the automatic
//! OPTIONS reply and rendered errors) and passes handler results through
//! untransformed. [`Body::View`] carries an opaque UI component for browser
//! embeddings.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use http::{header, HeaderMap, HeaderValue, StatusCode};
use serde_json::{json, Value};

/// An opaque UI component produced by a component handler. The router never
/// inspects it; the embedding view layer downcasts.
pub type Component = Arc<dyn Any + Send + Sync>;

/// Outgoing response. Handler results are returned as-is; the router only
/// constructs the redirect and OPTIONS shapes itself.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

pub enum Body {
    Empty,
    Text(String),
    Json(Value),
    View(Component),
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Response {
            status,
            headers: HeaderMap::new(),
            body: Body::Empty,
        }
    }

    pub fn ok() -> Self {
        Response::new(StatusCode::OK)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Response {
            body: Body::Text(text.into()),
            ..Response::ok()
        }
    }

    pub fn json(value: Value) -> Self {
        Response {
            body: Body::Json(value),
            ..Response::ok()
        }
    }

    pub fn view(component: Component) -> Self {
        Response {
            body: Body::View(component),
            ..Response::ok()
        }
    }

    /// A redirect carrying a `Location` header.
    pub fn redirect(location: &str, status: StatusCode) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::LOCATION,
            HeaderValue::from_str(location).unwrap_or(HeaderValue::from_static("/")),
        );
        Response {
            status,
            headers,
            body: Body::Empty,
        }
    }

    /// The automatic OPTIONS reply: status 200, an `Allow` header and a
    /// JSON content mirror of the allowed set.
    pub fn options(allow: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ALLOW,
            HeaderValue::from_str(allow).unwrap_or(HeaderValue::from_static("")),
        );
        Response {
            status: StatusCode::OK,
            headers,
            body: Body::Json(json!({ "Allow": allow })),
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn allow(&self) -> Option<&str> {
        self.headers.get(header::ALLOW).and_then(|v| v.to_str().ok())
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Body::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Body::View(_) => f.write_str("View(..)"),
        }
    }
}
