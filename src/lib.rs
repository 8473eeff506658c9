#![deny(rust_2018_idioms)]

//! # uniroute
//!
//! A universal request router that runs the same way in server and browser
//! embeddings: declarative route definitions are compiled into matchable
//! routes, the best match for an incoming event is selected, URI parameters
//! are bound (optionally through external binders), and the event is
//! dispatched to one of four handler shapes: a function, a controller
//! action, a UI component or a redirect.
//!
//! The router owns no transport and performs no I/O: it is a pure,
//! in-memory event→handler resolver. Incoming events arrive through the
//! [`Event`] trait; whatever a handler returns goes back out untouched.
//!
//! ## Usage
//!
//! ```
//! use uniroute::{handler_fn, RequestEvent, Response, Router, RouterError};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), RouterError> {
//!     let mut router = Router::new();
//!     router.get("/", handler_fn(|_| async {
//!         Ok(Response::text("Hello, World!"))
//!     }))?;
//!     router.get("/hello/:user", handler_fn(|event| async move {
//!         let user = event
//!             .route_resolver()
//!             .and_then(|resolve| resolve())
//!             .and_then(|route| route.get_param("user"))
//!             .unwrap_or_default();
//!         Ok(Response::text(format!("Hello, {user}")))
//!     }))?;
//!
//!     let event = Arc::new(RequestEvent::get("http://localhost/hello/gordon")?);
//!     let response = router.dispatch(event).await?;
//!     assert_eq!(response.status, 200);
//!     Ok(())
//! }
//! ```
//!
//! ## Route templates
//!
//! Registered paths may contain named parameters with optional rules and
//! quantifiers:
//!
//! ```text
//!  Syntax              Meaning
//!  :name               one path segment
//!  :name(\d+)          one segment constrained by a rule
//!  :name?              optional segment
//!  :name+  :name*      one-or-more / zero-or-more segments
//!  {name}              synonym for :name
//! ```
//!
//! ```text
//!  Path: /blog/:category/:post
//!
//!   /blog/rust/request-routers   match: category="rust", post="routers"
//!   /blog/rust/                  no match
//! ```
//!
//! Numeric-looking captures are coerced to numbers; everything else stays a
//! string. A domain template (`:sub.example.com`) compiles into the same
//! constraint list and restricts matching by host, case-insensitively.
//!
//! ## Nested definitions
//!
//! Definitions nest: children inherit the parent's path prefix, dotted name
//! prefix, middleware, rules, defaults and bindings. Every `GET` route gets
//! a hidden HEAD twin used for matching but excluded from dumps.
//!
//! ```
//! use uniroute::{handler_fn, Response, RouteDefinition, Router};
//! use http::Method;
//!
//! # fn main() -> Result<(), uniroute::RouterError> {
//! let mut router = Router::new();
//! router.register(
//!     RouteDefinition::new("/users").name("users").child(
//!         RouteDefinition::new("/:id")
//!             .name("show")
//!             .method(Method::GET)
//!             .handler(handler_fn(|_| async { Ok(Response::ok()) })),
//!     ),
//! )?;
//!
//! assert!(router.has_route("users.show"));
//! assert_eq!(
//!     router.generate(
//!         "users.show",
//!         &uniroute::GenerateOptions::default().param("id", 42),
//!     )?,
//!     "/users/42",
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Method-not-allowed and OPTIONS
//!
//! When a path matches but the method does not, dispatch fails with a
//! method-not-allowed error carrying the allowed set, unless the event is
//! an `OPTIONS` request, which is answered automatically with
//! `{"Allow": "..."}` and an `Allow` header.

#![forbid(unsafe_code)]

pub mod collection;
pub mod definition;
pub mod dispatch;
pub mod emitter;
pub mod error;
pub mod event;
pub mod handler;
pub mod history;
pub mod mapper;
pub mod matchers;
pub(crate) mod path;
pub mod pattern;
pub mod resolver;
pub mod response;
pub mod route;
pub mod router;

#[doc(inline)]
pub use collection::RouteCollection;
#[doc(inline)]
pub use definition::RouteDefinition;
#[doc(inline)]
pub use dispatch::{default_dispatchers, Dispatcher};
#[doc(inline)]
pub use emitter::{EventEmitter, Listener, ListenerEmitter};
#[doc(inline)]
pub use error::{render, ErrorKind, RouterError};
#[doc(inline)]
pub use event::{Event, PreferredType, Protocol, RequestEvent, RouteResolverFn};
#[doc(inline)]
pub use handler::{
    handler_fn, AliasBinding, Binding, Callable, ComponentHandler, Controller, ControllerHandler,
    ControllerSource, Handler, HandlerFn, HandlerFuture, HandlerKind, Redirect, RouteBinder,
};
#[doc(inline)]
pub use history::{History, MemoryHistory};
#[doc(inline)]
pub use mapper::{MapperOptions, RouteMapper, DEFAULT_MAX_DEPTH};
#[doc(inline)]
pub use matchers::{default_matchers, Matcher, MatcherKind};
#[doc(inline)]
pub use resolver::{AliasBinder, Resolver, StaticResolver};
#[doc(inline)]
pub use response::{Body, Component, Response};
#[doc(inline)]
pub use route::{GenerateOptions, Param, Params, Route, RouteOptions, RouteSummary};
#[doc(inline)]
pub use router::{MiddlewareDriver, Router, RouterOptions, FALLBACK_PATH};
