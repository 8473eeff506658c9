//! Definition expansion.
//!
//! The mapper flattens a tree of [`RouteDefinition`]s into single-method
//! routes: prefixes and names concatenate down the tree, middleware merges
//! child-first, rules/defaults/bindings shallow-merge with the child
//! overriding, and remaining attributes inherit when unset. Multi-method
//! definitions fan out into one route per verb, and every produced `GET`
//! route gains a hidden HEAD twin unless the same expansion produced an
//! explicit HEAD for that path.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use http::Method;
use serde_json::Value;
use tracing::debug;

use crate::definition::RouteDefinition;
use crate::dispatch::{default_dispatchers, Dispatcher};
use crate::error::RouterError;
use crate::event::Protocol;
use crate::handler::{Binding, HandlerKind};
use crate::matchers::{default_matchers, Matcher};
use crate::path::{join_names, join_paths};
use crate::resolver::Resolver;
use crate::route::{Route, RouteOptions};

pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Mapper configuration: the nesting limit, root-level inherited
/// attributes, and what gets injected into every produced route.
#[derive(Clone)]
pub struct MapperOptions {
    pub max_depth: usize,
    /// Prefix prepended to every expanded path.
    pub prefix: String,
    pub rules: HashMap<String, String>,
    pub defaults: HashMap<String, Value>,
    pub bindings: HashMap<String, Binding>,
    pub matchers: Vec<Arc<dyn Matcher>>,
    pub dispatchers: HashMap<HandlerKind, Arc<dyn Dispatcher>>,
    pub resolver: Option<Arc<dyn Resolver>>,
}

impl Default for MapperOptions {
    fn default() -> Self {
        MapperOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            prefix: String::new(),
            rules: HashMap::new(),
            defaults: HashMap::new(),
            bindings: HashMap::new(),
            matchers: default_matchers(),
            dispatchers: default_dispatchers(),
            resolver: None,
        }
    }
}

/// Attributes inherited down the definition tree.
#[derive(Clone)]
struct Scope {
    prefix: String,
    name: String,
    middleware: Vec<String>,
    exclude: Vec<String>,
    rules: HashMap<String, String>,
    defaults: HashMap<String, Value>,
    bindings: HashMap<String, Binding>,
    protocol: Option<Protocol>,
    domain: Option<String>,
    strict: Option<bool>,
    fallback: Option<bool>,
    page_layout: Option<Value>,
    custom_options: Option<Value>,
}

impl Scope {
    fn root(options: &MapperOptions) -> Self {
        Scope {
            prefix: options.prefix.clone(),
            name: String::new(),
            middleware: Vec::new(),
            exclude: Vec::new(),
            rules: options.rules.clone(),
            defaults: options.defaults.clone(),
            bindings: options.bindings.clone(),
            protocol: None,
            domain: None,
            strict: None,
            fallback: None,
            page_layout: None,
            custom_options: None,
        }
    }
}

fn is_supported(method: &Method) -> bool {
    matches!(
        method.as_str(),
        "GET" | "HEAD" | "POST" | "PUT" | "PATCH" | "DELETE" | "OPTIONS"
    )
}

pub struct RouteMapper {
    options: MapperOptions,
}

impl std::fmt::Debug for RouteMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMapper").finish_non_exhaustive()
    }
}

impl RouteMapper {
    /// Fails when the depth limit is not positive.
    pub fn new(options: MapperOptions) -> Result<Self, RouterError> {
        if options.max_depth == 0 {
            return Err(RouterError::InvalidDepth);
        }
        Ok(RouteMapper { options })
    }

    /// Flatten definitions into compiled routes.
    pub fn to_routes(
        &self,
        definitions: &[RouteDefinition],
    ) -> Result<Vec<Arc<Route>>, RouterError> {
        let scope = Scope::root(&self.options);
        let mut flats: Vec<RouteOptions> = Vec::new();
        for definition in definitions {
            self.expand(definition, &scope, 1, &mut flats)?;
        }

        // a user-defined HEAD suppresses synthesis for its path
        let explicit_heads: HashSet<String> = flats
            .iter()
            .filter(|options| options.method == Method::HEAD)
            .map(|options| options.path.clone())
            .collect();

        let mut routes = Vec::new();
        for options in flats {
            let twin = if options.method == Method::GET && !explicit_heads.contains(&options.path)
            {
                Some(RouteOptions {
                    method: Method::HEAD,
                    name: None,
                    is_internal_header: true,
                    ..options.clone()
                })
            } else {
                None
            };
            routes.push(self.build(options)?);
            if let Some(twin) = twin {
                routes.push(self.build(twin)?);
            }
        }
        Ok(routes)
    }

    fn expand(
        &self,
        def: &RouteDefinition,
        scope: &Scope,
        depth: usize,
        flats: &mut Vec<RouteOptions>,
    ) -> Result<(), RouterError> {
        if depth > self.options.max_depth {
            return Err(RouterError::DepthExceeded(self.options.max_depth));
        }

        let mut merged = scope.clone();
        if let Some(path) = &def.path {
            merged.prefix = join_paths(&scope.prefix, path);
        }
        if let Some(name) = &def.name {
            merged.name = join_names(&scope.name, name);
        }
        let mut middleware = Vec::new();
        for entry in def.middleware.iter().chain(scope.middleware.iter()) {
            if !middleware.contains(entry) {
                middleware.push(entry.clone());
            }
        }
        merged.middleware = middleware;
        merged.exclude.extend(def.exclude_middleware.iter().cloned());
        merged.rules.extend(def.rules.iter().cloned());
        merged.defaults.extend(def.defaults.iter().cloned());
        merged.bindings.extend(def.bindings.iter().cloned());
        if def.protocol.is_some() {
            merged.protocol = def.protocol;
        }
        if def.domain.is_some() {
            merged.domain = def.domain.clone();
        }
        if def.strict.is_some() {
            merged.strict = def.strict;
        }
        if def.fallback.is_some() {
            merged.fallback = def.fallback;
        }
        if def.page_layout.is_some() {
            merged.page_layout = def.page_layout.clone();
        }
        if def.custom_options.is_some() {
            merged.custom_options = def.custom_options.clone();
        }

        let produces = def.handler.is_some() || def.redirect.is_some();
        if produces {
            if def.path.is_none() {
                return Err(RouterError::MissingOption("path"));
            }
            let methods: Vec<Method> = if !def.methods.is_empty() {
                def.methods.clone()
            } else if def.redirect.is_some() {
                vec![Method::GET]
            } else if !def.children.is_empty() {
                Vec::new() // group only
            } else {
                return Err(RouterError::MissingOption("method"));
            };
            for method in &methods {
                if !is_supported(method) {
                    return Err(RouterError::UnsupportedMethod(method.clone()));
                }
            }
            for method in methods {
                flats.push(RouteOptions {
                    path: merged.prefix.clone(),
                    method,
                    handler: def.handler.clone(),
                    redirect: def.redirect.clone(),
                    // inherited name prefixes only attach to leaves that
                    // name themselves
                    name: (def.name.is_some() && !merged.name.is_empty())
                        .then(|| merged.name.clone()),
                    domain: merged.domain.clone(),
                    protocol: merged.protocol,
                    rules: merged.rules.clone(),
                    defaults: merged.defaults.clone(),
                    bindings: merged.bindings.clone(),
                    middleware: merged.middleware.clone(),
                    exclude_middleware: merged.exclude.clone(),
                    strict: merged.strict.unwrap_or(false),
                    fallback: merged.fallback.unwrap_or(false),
                    page_layout: merged.page_layout.clone(),
                    custom_options: merged.custom_options.clone(),
                    is_internal_header: false,
                });
            }
        } else if def.children.is_empty() {
            return Err(RouterError::MissingOption("handler"));
        }

        for child in &def.children {
            self.expand(child, &merged, depth + 1, flats)?;
        }
        Ok(())
    }

    fn build(&self, options: RouteOptions) -> Result<Arc<Route>, RouterError> {
        debug!(
            method = %options.method,
            path = %options.path,
            name = options.name.as_deref().unwrap_or(""),
            "mapped route"
        );
        let route = Route::new(options)?;
        route.set_matchers(self.options.matchers.clone());
        route.set_dispatchers(self.options.dispatchers.clone());
        route.set_resolver(self.options.resolver.clone());
        Ok(Arc::new(route))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{handler_fn, ControllerHandler, Handler, Redirect};
    use crate::response::Response;
    use serde_json::json;

    fn mapper() -> RouteMapper {
        RouteMapper::new(MapperOptions::default()).unwrap()
    }

    fn noop() -> Handler {
        handler_fn(|_event| async { Ok(Response::ok()) })
    }

    #[test]
    fn zero_depth_fails_construction() {
        let err = RouteMapper::new(MapperOptions {
            max_depth: 0,
            ..MapperOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, RouterError::InvalidDepth));
    }

    #[test]
    fn nested_names_and_paths_concatenate() {
        let mapper = RouteMapper::new(MapperOptions {
            prefix: "/api".to_string(),
            ..MapperOptions::default()
        })
        .unwrap();

        let definitions = vec![RouteDefinition::new("/users").name("users").child(
            RouteDefinition::new("/:id").name("show").method(Method::GET).handler(
                Handler::Controller(ControllerHandler::by_id("Users").with_action("show")),
            ),
        )];

        let routes = mapper.to_routes(&definitions).unwrap();
        assert_eq!(routes.len(), 2); // GET + internal HEAD twin

        let get = &routes[0];
        assert_eq!(get.path(), "/api/users/:id");
        assert_eq!(get.name(), Some("users.show"));
        assert_eq!(get.method(), &Method::GET);

        let head = &routes[1];
        assert_eq!(head.method(), &Method::HEAD);
        assert_eq!(head.path(), "/api/users/:id");
        assert!(head.is_internal_header());
    }

    #[test]
    fn multi_method_definitions_fan_out() {
        let routes = mapper()
            .to_routes(&[RouteDefinition::new("/things")
                .methods([Method::GET, Method::POST])
                .handler(noop())])
            .unwrap();
        let methods: Vec<_> = routes.iter().map(|r| r.method().clone()).collect();
        assert_eq!(methods, [Method::GET, Method::HEAD, Method::POST]);
        assert!(routes[1].is_internal_header());
    }

    #[test]
    fn user_defined_head_suppresses_synthesis() {
        let routes = mapper()
            .to_routes(&[RouteDefinition::new("/doc")
                .methods([Method::GET, Method::HEAD])
                .handler(noop())])
            .unwrap();
        let heads: Vec<_> = routes
            .iter()
            .filter(|r| r.method() == &Method::HEAD)
            .collect();
        assert_eq!(heads.len(), 1);
        assert!(!heads[0].is_internal_header());
    }

    #[test]
    fn redirect_definitions_default_to_get() {
        let routes = mapper()
            .to_routes(&[RouteDefinition::new("/old").redirect(Redirect::to("/new"))])
            .unwrap();
        assert_eq!(routes[0].method(), &Method::GET);
        assert!(routes[0].redirect().is_some());
        // redirects still get the hidden HEAD twin
        assert!(routes[1].is_internal_header());
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mapper = RouteMapper::new(MapperOptions {
            max_depth: 2,
            ..MapperOptions::default()
        })
        .unwrap();

        let ok = RouteDefinition::group().name("a").child(
            RouteDefinition::new("/leaf").method(Method::GET).handler(noop()),
        );
        assert!(mapper.to_routes(&[ok]).is_ok());

        let too_deep = RouteDefinition::group().name("a").child(
            RouteDefinition::group().name("b").child(
                RouteDefinition::new("/leaf").method(Method::GET).handler(noop()),
            ),
        );
        let err = mapper.to_routes(&[too_deep]).unwrap_err();
        assert!(matches!(err, RouterError::DepthExceeded(2)));
    }

    #[test]
    fn middleware_merges_child_first_and_dedups() {
        let routes = mapper()
            .to_routes(&[RouteDefinition::new("/admin")
                .middleware("auth")
                .middleware("audit")
                .child(
                    RouteDefinition::new("/panel")
                        .method(Method::GET)
                        .handler(noop())
                        .middleware("csrf")
                        .middleware("auth"),
                )])
            .unwrap();
        assert_eq!(routes[0].middleware(), ["csrf", "auth", "audit"]);
    }

    #[test]
    fn rules_defaults_and_flags_inherit_with_child_override() {
        let routes = mapper()
            .to_routes(&[RouteDefinition::group()
                .rule("id", r"\d+")
                .default_value("page", 1)
                .protocol(Protocol::Https)
                .child(
                    RouteDefinition::new("/u/:id/:page?")
                        .method(Method::GET)
                        .handler(noop())
                        .default_value("page", 2),
                )])
            .unwrap();
        let route = &routes[0];
        assert_eq!(route.options().rules.get("id").map(String::as_str), Some(r"\d+"));
        assert_eq!(route.options().defaults.get("page"), Some(&json!(2)));
        assert!(route.is_https_only());
    }

    #[test]
    fn validation_failures() {
        // leaf without a path
        let err = mapper()
            .to_routes(&[RouteDefinition::group().method(Method::GET).handler(noop())])
            .unwrap_err();
        assert!(matches!(err, RouterError::MissingOption("path")));

        // no handler, no redirect, no children
        let err = mapper()
            .to_routes(&[RouteDefinition::new("/empty")])
            .unwrap_err();
        assert!(matches!(err, RouterError::MissingOption("handler")));

        // handler with no method and no children
        let err = mapper()
            .to_routes(&[RouteDefinition::new("/nomethod").handler(noop())])
            .unwrap_err();
        assert!(matches!(err, RouterError::MissingOption("method")));

        // verbs outside the allowed set
        let err = mapper()
            .to_routes(&[RouteDefinition::new("/trace")
                .method(Method::TRACE)
                .handler(noop())])
            .unwrap_err();
        assert!(matches!(err, RouterError::UnsupportedMethod(_)));
    }
}
