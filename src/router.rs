//! The router façade.
//!
//! Registration goes through verb methods, groups or raw definitions; each
//! registration is expanded by the mapper and added to the collection.
//! Dispatching is totally ordered: the `routing` event fires before
//! matching, the matched route is bound, middleware is gathered, the
//! `routed` event fires, then the route runs.
//!
//! ```
//! use uniroute::{handler_fn, RequestEvent, Response, Router};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), uniroute::RouterError> {
//! let mut router = Router::new();
//! router.get("/hello/:user", handler_fn(|event| async move {
//!     Ok(Response::text(format!("Hello, {}", event.pathname())))
//! }))?;
//!
//! let event = Arc::new(RequestEvent::get("http://localhost/hello/gordon")?);
//! let response = router.dispatch(event).await?;
//! assert_eq!(response.status, 200);
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use http::Method;
use serde_json::{json, Value};
use tracing::debug;

use crate::collection::RouteCollection;
use crate::definition::RouteDefinition;
use crate::dispatch::{default_dispatchers, Dispatcher};
use crate::emitter::{EventEmitter, Listener};
use crate::error::RouterError;
use crate::event::Event;
use crate::handler::{Binding, Handler, HandlerKind};
use crate::history::History;
use crate::mapper::{MapperOptions, RouteMapper, DEFAULT_MAX_DEPTH};
use crate::matchers::{default_matchers, Matcher};
use crate::path::join_names;
use crate::resolver::Resolver;
use crate::response::Response;
use crate::route::{GenerateOptions, Params, Route, RouteSummary};

/// The catch-all template registered by [`Router::fallback`].
pub const FALLBACK_PATH: &str = "/:__fallback__(.*)*";

const ANY_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// User-facing router configuration.
#[derive(Clone)]
pub struct RouterOptions {
    /// Global middleware, gathered ahead of route middleware.
    pub middleware: Vec<String>,
    pub rules: HashMap<String, String>,
    pub defaults: HashMap<String, Value>,
    pub bindings: HashMap<String, Binding>,
    pub matchers: Vec<Arc<dyn Matcher>>,
    pub dispatchers: HashMap<HandlerKind, Arc<dyn Dispatcher>>,
    pub resolver: Option<Arc<dyn Resolver>>,
    pub max_depth: usize,
    /// Gather an empty middleware stack regardless of registration.
    pub skip_middleware: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        RouterOptions {
            middleware: Vec::new(),
            rules: HashMap::new(),
            defaults: HashMap::new(),
            bindings: HashMap::new(),
            matchers: default_matchers(),
            dispatchers: default_dispatchers(),
            resolver: None,
            max_depth: DEFAULT_MAX_DEPTH,
            skip_middleware: false,
        }
    }
}

/// Optional hook executing the gathered middleware stack around the route.
/// Without one, the router runs the route directly; pipeline execution
/// belongs to the embedding framework.
#[async_trait]
pub trait MiddlewareDriver: Send + Sync {
    async fn run(
        &self,
        stack: &[String],
        event: Arc<dyn Event>,
        route: Arc<Route>,
    ) -> Result<Response, RouterError>;
}

pub struct Router {
    options: RouterOptions,
    definitions: Vec<RouteDefinition>,
    routes: RouteCollection,
    current: Arc<RwLock<Option<Arc<Route>>>>,
    group: Option<RouteDefinition>,
    emitter: Option<Arc<dyn EventEmitter>>,
    history: Option<Arc<dyn History>>,
    driver: Option<Arc<dyn MiddlewareDriver>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

impl Default for Router {
    fn default() -> Self {
        Router {
            options: RouterOptions::default(),
            definitions: Vec::new(),
            routes: RouteCollection::new(),
            current: Arc::new(RwLock::new(None)),
            group: None,
            emitter: None,
            history: None,
            driver: None,
        }
    }
}

impl Router {
    pub fn new() -> Self {
        Router::default()
    }

    // ----- wiring --------------------------------------------------------

    pub fn set_emitter(&mut self, emitter: Arc<dyn EventEmitter>) -> &mut Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn set_history(&mut self, history: Arc<dyn History>) -> &mut Self {
        self.history = Some(history);
        self
    }

    pub fn set_middleware_driver(&mut self, driver: Arc<dyn MiddlewareDriver>) -> &mut Self {
        self.driver = Some(driver);
        self
    }

    /// Subscribe to router events through the configured emitter.
    pub fn on(&self, name: &str, listener: Listener) {
        if let Some(emitter) = &self.emitter {
            emitter.on(name, listener);
        }
    }

    fn emit(&self, name: &str, payload: Option<Value>) {
        if let Some(emitter) = &self.emitter {
            emitter.emit(name, payload);
        }
    }

    fn mapper(&self) -> Result<RouteMapper, RouterError> {
        RouteMapper::new(MapperOptions {
            max_depth: self.options.max_depth,
            prefix: String::new(),
            rules: self.options.rules.clone(),
            defaults: self.options.defaults.clone(),
            bindings: self.options.bindings.clone(),
            matchers: self.options.matchers.clone(),
            dispatchers: self.options.dispatchers.clone(),
            resolver: self.options.resolver.clone(),
        })
    }

    // ----- registration --------------------------------------------------

    /// Register one definition, nesting it under the active group when one
    /// is set.
    pub fn register(&mut self, definition: RouteDefinition) -> Result<&mut Self, RouterError> {
        let definition = match &self.group {
            Some(group) => group.clone().child(definition),
            None => definition,
        };
        let routes = self.mapper()?.to_routes(std::slice::from_ref(&definition))?;
        for route in routes {
            self.routes.add(route);
        }
        self.definitions.push(definition);
        Ok(self)
    }

    fn verb(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        self.register(RouteDefinition::new(path).method(method).handler(handler))
    }

    pub fn get(
        &mut self,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        self.verb(Method::GET, path, handler)
    }

    pub fn post(
        &mut self,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        self.verb(Method::POST, path, handler)
    }

    pub fn put(
        &mut self,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        self.verb(Method::PUT, path, handler)
    }

    pub fn patch(
        &mut self,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        self.verb(Method::PATCH, path, handler)
    }

    pub fn delete(
        &mut self,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        self.verb(Method::DELETE, path, handler)
    }

    pub fn options(
        &mut self,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        self.verb(Method::OPTIONS, path, handler)
    }

    /// Register for every verb except HEAD (HEAD is synthesized from GET).
    pub fn any(
        &mut self,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        self.register(
            RouteDefinition::new(path)
                .methods(ANY_METHODS.clone())
                .handler(handler),
        )
    }

    /// GET alias for page-style registrations.
    pub fn page(
        &mut self,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        self.get(path, handler)
    }

    /// GET alias.
    pub fn add(
        &mut self,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        self.get(path, handler)
    }

    /// Register one definition for an explicit set of verbs.
    pub fn match_methods(
        &mut self,
        path: impl Into<String>,
        definition: RouteDefinition,
        methods: impl IntoIterator<Item = Method>,
    ) -> Result<&mut Self, RouterError> {
        let mut definition = definition.methods(methods);
        definition.path = Some(path.into());
        self.register(definition)
    }

    /// Register the catch-all fallback route.
    pub fn fallback(&mut self, handler: Handler) -> Result<&mut Self, RouterError> {
        self.register(
            RouteDefinition::new(FALLBACK_PATH)
                .method(Method::GET)
                .handler(handler)
                .fallback(true),
        )
    }

    /// Activate a group definition merged into subsequent registrations.
    pub fn group(
        &mut self,
        prefix: impl Into<String>,
        mut definition: RouteDefinition,
    ) -> &mut Self {
        definition.path = Some(prefix.into());
        self.group = Some(definition);
        self
    }

    /// Deactivate the current group.
    pub fn no_group(&mut self) -> &mut Self {
        self.group = None;
        self
    }

    /// Register a batch of definitions.
    pub fn define(
        &mut self,
        definitions: impl IntoIterator<Item = RouteDefinition>,
    ) -> Result<&mut Self, RouterError> {
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(self)
    }

    /// Replace the backing collection.
    pub fn set_routes(&mut self, routes: RouteCollection) -> &mut Self {
        self.routes = routes;
        self
    }

    /// Replace the options and rebuild the collection from the retained
    /// definitions.
    pub fn configure(&mut self, options: RouterOptions) -> Result<&mut Self, RouterError> {
        self.options = options;
        let mapper = self.mapper()?;
        let mut routes = RouteCollection::new();
        for route in mapper.to_routes(&self.definitions)? {
            routes.add(route);
        }
        self.routes = routes;
        Ok(self)
    }

    // ----- middleware ----------------------------------------------------

    /// Append global middleware.
    pub fn use_middleware(&mut self, middleware: impl Into<String>) -> &mut Self {
        self.options.middleware.push(middleware.into());
        self
    }

    /// Append middleware to named routes: the registered definition is
    /// updated, and so is the compiled route when one exists.
    pub fn use_middleware_on(
        &mut self,
        names: &[&str],
        middleware: impl Into<String>,
    ) -> Result<&mut Self, RouterError> {
        let middleware = middleware.into();
        for name in names {
            let compiled = self.routes.get_by_name(name);
            if let Some(route) = &compiled {
                route.add_middleware(middleware.clone());
            }
            let in_definitions =
                append_to_definition(&mut self.definitions, "", name, &middleware);
            if compiled.is_none() && !in_definitions {
                return Err(RouterError::UnknownNamedRoute(name.to_string()));
            }
        }
        Ok(self)
    }

    /// The ordered, deduplicated middleware stack for a route: global
    /// middleware first, then route middleware, exclusions applied.
    pub fn gather_route_middleware(&self, route: &Route) -> Vec<String> {
        if self.options.skip_middleware {
            return Vec::new();
        }
        let mut seen = HashSet::new();
        let mut stack = Vec::new();
        for entry in self
            .options
            .middleware
            .iter()
            .cloned()
            .chain(route.middleware())
        {
            if route.is_middleware_excluded(&entry) {
                continue;
            }
            if seen.insert(entry.clone()) {
                stack.push(entry);
            }
        }
        stack
    }

    // ----- dispatch ------------------------------------------------------

    /// Resolve an event to a response: match, bind, gather middleware, run.
    pub async fn dispatch(&self, event: Arc<dyn Event>) -> Result<Response, RouterError> {
        self.emit(
            "routing",
            Some(json!({
                "method": event.method().as_str(),
                "path": event.pathname(),
            })),
        );

        let slot = self.current.clone();
        event.set_route_resolver(Arc::new(move || slot.read().unwrap().clone()));

        let route = self.routes.match_event(event.as_ref())?;
        route.set_dispatchers(self.options.dispatchers.clone());
        route.set_resolver(self.options.resolver.clone());
        *self.current.write().unwrap() = Some(route.clone());

        route.bind(event.clone()).await?;
        let stack = self.gather_route_middleware(&route);
        debug!(path = route.path(), middleware = stack.len(), "routed");
        self.emit(
            "routed",
            Some(json!({
                "path": route.path(),
                "name": route.name(),
            })),
        );

        match &self.driver {
            Some(driver) => driver.run(&stack, event, route).await,
            None => route.run(event).await,
        }
    }

    /// Bind and run the named route directly.
    pub async fn respond_with_route_name(
        &self,
        event: Arc<dyn Event>,
        name: &str,
    ) -> Result<Response, RouterError> {
        let route = self
            .routes
            .get_by_name(name)
            .ok_or_else(|| RouterError::UnknownNamedRoute(name.to_string()))?;
        route.set_dispatchers(self.options.dispatchers.clone());
        route.set_resolver(self.options.resolver.clone());
        route.bind(event.clone()).await?;
        *self.current.write().unwrap() = Some(route.clone());
        route.run(event).await
    }

    /// Generate a URL for a named route.
    pub fn generate(&self, name: &str, options: &GenerateOptions) -> Result<String, RouterError> {
        let route = self
            .routes
            .get_by_name(name)
            .ok_or_else(|| RouterError::UnknownNamedRoute(name.to_string()))?;
        route.generate(options)
    }

    /// Push (or replace) a history entry and announce it. Fails without a
    /// history backend.
    pub fn navigate(&self, target: &str, replace: bool) -> Result<(), RouterError> {
        let history = self.history.clone().ok_or(RouterError::NoHistory)?;
        if replace {
            history.replace(target);
        } else {
            history.push(target);
        }
        self.emit("popstate", Some(json!({ "url": target })));
        Ok(())
    }

    // ----- introspection -------------------------------------------------

    pub fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    pub fn current_route(&self) -> Option<Arc<Route>> {
        self.current.read().unwrap().clone()
    }

    pub fn current_route_name(&self) -> Option<String> {
        self.current_route()
            .and_then(|route| route.name().map(str::to_string))
    }

    pub fn is_current_route_named(&self, name: &str) -> bool {
        self.current_route_name().as_deref() == Some(name)
    }

    pub fn params(&self) -> Option<Params> {
        self.current_route().and_then(|route| route.params().ok())
    }

    pub fn param(&self, name: &str) -> Option<Value> {
        self.current_route().and_then(|route| route.get_param(name))
    }

    pub fn param_or(&self, name: &str, fallback: Value) -> Value {
        self.param(name).unwrap_or(fallback)
    }

    pub fn has_route(&self, name: &str) -> bool {
        self.routes.has_named_route(name)
    }

    /// True when every name is registered.
    pub fn has_routes(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.has_route(name))
    }

    pub async fn dump_routes(&self) -> Result<Vec<RouteSummary>, RouterError> {
        self.routes.dump().await
    }
}

/// Append middleware to the definition whose composed name matches.
fn append_to_definition(
    definitions: &mut [RouteDefinition],
    parent: &str,
    name: &str,
    middleware: &str,
) -> bool {
    for definition in definitions {
        let composed = match &definition.name {
            Some(own) => join_names(parent, own),
            None => parent.to_string(),
        };
        if composed == name {
            definition.middleware.push(middleware.to_string());
            return true;
        }
        if append_to_definition(&mut definition.children, &composed, name, middleware) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::ListenerEmitter;
    use crate::event::RequestEvent;
    use crate::handler::handler_fn;
    use crate::history::MemoryHistory;
    use crate::response::Body;
    use std::sync::Mutex;

    fn ok_handler() -> Handler {
        handler_fn(|_event| async { Ok(Response::ok()) })
    }

    fn event(method: Method, url: &str) -> Arc<dyn Event> {
        Arc::new(RequestEvent::new(method, url).unwrap())
    }

    #[tokio::test]
    async fn dispatch_binds_and_runs() {
        let mut router = Router::new();
        router
            .get(
                "/users/:id",
                handler_fn(|event| async move {
                    let id = event
                        .route_resolver()
                        .and_then(|resolve| resolve())
                        .and_then(|route| route.get_param("id"))
                        .unwrap();
                    Ok(Response::json(json!({ "id": id })))
                }),
            )
            .unwrap();

        let response = router
            .dispatch(event(Method::GET, "http://localhost/users/42"))
            .await
            .unwrap();
        match response.body {
            Body::Json(v) => assert_eq!(v["id"], 42),
            other => panic!("unexpected body {other:?}"),
        }
        assert_eq!(router.param("id"), Some(json!(42)));
    }

    #[tokio::test]
    async fn events_fire_in_order_around_the_handler() {
        let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let emitter = Arc::new(ListenerEmitter::new());

        let mut router = Router::new();
        router.set_emitter(emitter.clone());
        for name in ["routing", "routed"] {
            let log = log.clone();
            router.on(
                name,
                Arc::new(move |_payload| log.lock().unwrap().push(name.to_string())),
            );
        }

        let handler_log = log.clone();
        router
            .get(
                "/x",
                handler_fn(move |_event| {
                    let log = handler_log.clone();
                    async move {
                        log.lock().unwrap().push("handler".to_string());
                        Ok(Response::ok())
                    }
                }),
            )
            .unwrap();

        router
            .dispatch(event(Method::GET, "http://localhost/x"))
            .await
            .unwrap();
        assert_eq!(*log.lock().unwrap(), ["routing", "routed", "handler"]);
    }

    #[tokio::test]
    async fn groups_apply_until_cleared() {
        let mut router = Router::new();
        router.group(
            "/api",
            RouteDefinition::group().name("api").middleware("throttle"),
        );
        router.get("/users", ok_handler()).unwrap();
        router.no_group();
        router.get("/health", ok_handler()).unwrap();

        let matched = router
            .routes()
            .match_event(event(Method::GET, "http://localhost/api/users").as_ref())
            .unwrap();
        assert_eq!(matched.path(), "/api/users");
        assert_eq!(matched.middleware(), ["throttle"]);

        let health = router
            .routes()
            .match_event(event(Method::GET, "http://localhost/health").as_ref())
            .unwrap();
        assert!(health.middleware().is_empty());
    }

    #[tokio::test]
    async fn gather_dedups_and_honors_exclusions() {
        let mut router = Router::new();
        router.use_middleware("auth");
        router.use_middleware("trace");
        router
            .register(
                RouteDefinition::new("/x")
                    .method(Method::GET)
                    .handler(ok_handler())
                    .middleware("auth")
                    .middleware("csrf")
                    .exclude_middleware("trace"),
            )
            .unwrap();

        let route = router
            .routes()
            .match_event(event(Method::GET, "http://localhost/x").as_ref())
            .unwrap();
        assert_eq!(router.gather_route_middleware(&route), ["auth", "csrf"]);
    }

    #[tokio::test]
    async fn skip_middleware_empties_the_stack() {
        let mut router = Router::new();
        router.use_middleware("auth");
        router.get("/x", ok_handler()).unwrap();
        router.options.skip_middleware = true;

        let route = router
            .routes()
            .match_event(event(Method::GET, "http://localhost/x").as_ref())
            .unwrap();
        assert!(router.gather_route_middleware(&route).is_empty());
    }

    #[tokio::test]
    async fn middleware_driver_wraps_the_run() {
        struct RecordingDriver(Mutex<Vec<String>>);

        #[async_trait]
        impl MiddlewareDriver for RecordingDriver {
            async fn run(
                &self,
                stack: &[String],
                event: Arc<dyn Event>,
                route: Arc<Route>,
            ) -> Result<Response, RouterError> {
                self.0.lock().unwrap().extend(stack.iter().cloned());
                route.run(event).await
            }
        }

        let driver = Arc::new(RecordingDriver(Mutex::new(Vec::new())));
        let mut router = Router::new();
        router.use_middleware("auth");
        router.set_middleware_driver(driver.clone());
        router.get("/x", ok_handler()).unwrap();

        router
            .dispatch(event(Method::GET, "http://localhost/x"))
            .await
            .unwrap();
        assert_eq!(*driver.0.lock().unwrap(), ["auth"]);
    }

    #[tokio::test]
    async fn use_middleware_on_updates_compiled_routes() {
        let mut router = Router::new();
        router
            .register(
                RouteDefinition::new("/profile")
                    .name("profile")
                    .method(Method::GET)
                    .handler(ok_handler()),
            )
            .unwrap();
        router.use_middleware_on(&["profile"], "auth").unwrap();

        let route = router.routes().get_by_name("profile").unwrap();
        assert_eq!(route.middleware(), ["auth"]);

        let err = router.use_middleware_on(&["missing"], "auth").unwrap_err();
        assert!(matches!(err, RouterError::UnknownNamedRoute(_)));
    }

    #[tokio::test]
    async fn named_navigation_and_generation() {
        let mut router = Router::new();
        router
            .register(
                RouteDefinition::new("/users/:id")
                    .name("users.show")
                    .method(Method::GET)
                    .handler(ok_handler()),
            )
            .unwrap();

        let url = router
            .generate("users.show", &GenerateOptions::default().param("id", 7))
            .unwrap();
        assert_eq!(url, "/users/7");

        let response = router
            .respond_with_route_name(
                event(Method::GET, "http://localhost/users/7"),
                "users.show",
            )
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert!(router.is_current_route_named("users.show"));

        let err = router
            .respond_with_route_name(event(Method::GET, "http://localhost/x"), "absent")
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::UnknownNamedRoute(_)));
    }

    #[tokio::test]
    async fn navigate_requires_a_history_backend() {
        let router = Router::new();
        assert!(matches!(
            router.navigate("/next", false),
            Err(RouterError::NoHistory)
        ));

        let history = Arc::new(MemoryHistory::new());
        let emitter = Arc::new(ListenerEmitter::new());
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        let mut router = Router::new();
        router.set_history(history.clone());
        router.set_emitter(emitter);
        router.on(
            "popstate",
            Arc::new(move |payload| {
                let url = payload.unwrap()["url"].as_str().unwrap().to_string();
                log.lock().unwrap().push(url);
            }),
        );

        router.navigate("/a", false).unwrap();
        router.navigate("/b", true).unwrap();
        assert_eq!(history.entries(), ["/b"]);
        assert_eq!(*seen.lock().unwrap(), ["/a", "/b"]);
    }

    #[tokio::test]
    async fn fallback_catches_everything_left() {
        let mut router = Router::new();
        router.get("/known", ok_handler()).unwrap();
        router
            .fallback(handler_fn(|_event| async { Ok(Response::text("lost")) }))
            .unwrap();

        let response = router
            .dispatch(event(Method::GET, "http://localhost/no/such/page"))
            .await
            .unwrap();
        match response.body {
            Body::Text(s) => assert_eq!(s, "lost"),
            other => panic!("unexpected body {other:?}"),
        }
        let route = router.current_route().unwrap();
        assert!(route.is_fallback());
    }

    #[tokio::test]
    async fn configure_rebuilds_the_collection() {
        let mut router = Router::new();
        router
            .register(
                RouteDefinition::new("/users/:id")
                    .name("users.show")
                    .method(Method::GET)
                    .handler(ok_handler()),
            )
            .unwrap();

        router
            .configure(RouterOptions {
                rules: HashMap::from([("id".to_string(), r"\d+".to_string())]),
                ..RouterOptions::default()
            })
            .unwrap();

        assert!(router.has_route("users.show"));
        let err = router
            .dispatch(event(Method::GET, "http://localhost/users/abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::NoRouteMatched { .. }));

        router
            .dispatch(event(Method::GET, "http://localhost/users/42"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn any_registers_every_verb_but_head() {
        let mut router = Router::new();
        router.any("/each", ok_handler()).unwrap();
        for method in ANY_METHODS {
            router
                .dispatch(event(method, "http://localhost/each"))
                .await
                .unwrap();
        }
        // HEAD is still served by the synthesized twin
        router
            .dispatch(event(Method::HEAD, "http://localhost/each"))
            .await
            .unwrap();
    }
}
