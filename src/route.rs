//! A compiled, matchable route.
//!
//! A [`Route`] holds its original options, the compiled constraint list and
//! regex, the matcher list and dispatcher table, and per-dispatch bind
//! state. Binding extracts captures, applies defaults, runs declared
//! binders, coerces numeric-looking values and stores the result; `run`
//! selects the dispatcher by handler shape. Concurrent dispatches over one
//! route require per-call clones or external isolation: the bind state is a
//! single slot, overwritten per dispatch.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Index;
use std::sync::{Arc, LazyLock, RwLock};

use http::Method;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::dispatch::{default_dispatchers, Dispatcher};
use crate::error::RouterError;
use crate::event::{Event, Protocol};
use crate::handler::{handler_fn, Binding, Handler, HandlerKind, Redirect};
use crate::matchers::{default_matchers, Matcher, MatcherKind};
use crate::path::collapse_slashes;
use crate::pattern::{self, CompileOptions, CompiledPattern};
use crate::resolver::Resolver;
use crate::response::Response;

/// Flat, single-method options a route is compiled from. Produced by the
/// mapper; construct directly when bypassing definitions.
#[derive(Debug, Clone)]
pub struct RouteOptions {
    pub path: String,
    pub method: Method,
    pub handler: Option<Handler>,
    pub redirect: Option<Redirect>,
    pub name: Option<String>,
    pub domain: Option<String>,
    pub protocol: Option<Protocol>,
    pub rules: HashMap<String, String>,
    pub defaults: HashMap<String, Value>,
    pub bindings: HashMap<String, Binding>,
    pub middleware: Vec<String>,
    pub exclude_middleware: Vec<String>,
    pub strict: bool,
    pub fallback: bool,
    pub page_layout: Option<Value>,
    pub custom_options: Option<Value>,
    pub is_internal_header: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        RouteOptions {
            path: String::new(),
            method: Method::GET,
            handler: None,
            redirect: None,
            name: None,
            domain: None,
            protocol: None,
            rules: HashMap::new(),
            defaults: HashMap::new(),
            bindings: HashMap::new(),
            middleware: Vec::new(),
            exclude_middleware: Vec::new(),
            strict: false,
            fallback: false,
            page_layout: None,
            custom_options: None,
            is_internal_header: false,
        }
    }
}

/// One bound parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub key: String,
    pub value: Value,
}

/// Bound parameters in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Params(Vec<Param>);

impl Params {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|p| p.key == key).map(|p| &p.value)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.0.iter_mut().find(|p| p.key == key) {
            Some(existing) => existing.value = value,
            None => self.0.push(Param { key, value }),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.0.iter()
    }
}

impl Index<usize> for Params {
    type Output = Param;

    fn index(&self, index: usize) -> &Param {
        &self.0[index]
    }
}

/// Inputs to URL generation.
#[derive(Clone, Debug, Default)]
pub struct GenerateOptions {
    pub params: HashMap<String, Value>,
    pub query: Vec<(String, String)>,
    pub hash: Option<String>,
    pub with_domain: bool,
    pub protocol: Option<Protocol>,
}

impl GenerateOptions {
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_domain(mut self) -> Self {
        self.with_domain = true;
        self
    }
}

/// Route dump entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub path: String,
    pub method: String,
    pub handler: String,
    pub name: String,
    pub domain: String,
    pub fallback: bool,
}

#[derive(Clone)]
struct BindState {
    params: Params,
    query: HashMap<String, String>,
    url: Url,
}

static ROOT_URL: LazyLock<Url> = LazyLock::new(|| Url::parse("http://localhost/").unwrap());

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d+)?$").unwrap());

/// Numeric-looking raw captures with no binding become JSON numbers.
fn coerce(raw: String) -> Value {
    if NUMERIC.is_match(&raw) {
        if let Ok(int) = raw.parse::<i64>() {
            return Value::from(int);
        }
        if let Ok(float) = raw.parse::<f64>() {
            return Value::from(float);
        }
    }
    Value::String(raw)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct Route {
    options: RouteOptions,
    pattern: CompiledPattern,
    matchers: RwLock<Vec<Arc<dyn Matcher>>>,
    dispatchers: RwLock<HashMap<HandlerKind, Arc<dyn Dispatcher>>>,
    resolver: RwLock<Option<Arc<dyn Resolver>>>,
    middleware: RwLock<Vec<String>>,
    state: RwLock<Option<BindState>>,
}

impl Route {
    /// Compile a route from options. Fails on a missing path or an invalid
    /// template.
    pub fn new(options: RouteOptions) -> Result<Self, RouterError> {
        if options.path.is_empty() {
            return Err(RouterError::MissingOption("path"));
        }
        let aliases: HashMap<String, String> = options
            .bindings
            .iter()
            .filter_map(|(param, binding)| {
                binding.alias().map(|alias| (param.clone(), alias.to_string()))
            })
            .collect();
        let pattern = pattern::compile(
            &options.path,
            options.domain.as_deref(),
            &CompileOptions {
                rules: &options.rules,
                defaults: &options.defaults,
                aliases: &aliases,
                strict: options.strict,
            },
        )?;
        let middleware = options.middleware.clone();
        Ok(Route {
            pattern,
            matchers: RwLock::new(default_matchers()),
            dispatchers: RwLock::new(default_dispatchers()),
            resolver: RwLock::new(None),
            middleware: RwLock::new(middleware),
            state: RwLock::new(None),
            options,
        })
    }

    /// The synthetic route answering an OPTIONS event when other methods
    /// match the path.
    pub(crate) fn options_fallback(path: &str, allowed: &[Method]) -> Result<Self, RouterError> {
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(",");
        Route::new(RouteOptions {
            path: path.to_string(),
            method: Method::OPTIONS,
            handler: Some(handler_fn(move |_event| {
                let allow = allow.clone();
                async move { Ok(Response::options(&allow)) }
            })),
            ..RouteOptions::default()
        })
    }

    // ----- accessors -------------------------------------------------

    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    /// The path template.
    pub fn path(&self) -> &str {
        &self.options.path
    }

    pub fn method(&self) -> &Method {
        &self.options.method
    }

    pub fn name(&self) -> Option<&str> {
        self.options.name.as_deref()
    }

    /// The domain template, when one was declared.
    pub fn domain(&self) -> Option<&str> {
        self.options.domain.as_deref()
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    pub fn protocol_restriction(&self) -> Option<Protocol> {
        self.options.protocol
    }

    pub fn is_http_only(&self) -> bool {
        self.options.protocol == Some(Protocol::Http)
    }

    pub fn is_https_only(&self) -> bool {
        self.options.protocol == Some(Protocol::Https)
    }

    pub fn is_strict(&self) -> bool {
        self.options.strict
    }

    pub fn is_fallback(&self) -> bool {
        self.options.fallback
    }

    pub fn is_internal_header(&self) -> bool {
        self.options.is_internal_header
    }

    pub fn handler(&self) -> Option<&Handler> {
        self.options.handler.as_ref()
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        self.options.redirect.as_ref()
    }

    // ----- URL accessors (bound event URL, or a synthetic root) ------

    fn current_url(&self) -> Url {
        self.state
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.url.clone())
            .unwrap_or_else(|| ROOT_URL.clone())
    }

    pub fn uri(&self) -> String {
        self.current_url().to_string()
    }

    pub fn current_path(&self) -> String {
        self.current_url().path().to_string()
    }

    pub fn current_host(&self) -> String {
        self.current_url().host_str().unwrap_or("").to_string()
    }

    pub fn hash(&self) -> Option<String> {
        self.current_url().fragment().map(str::to_string)
    }

    pub fn query_string(&self) -> Option<String> {
        self.current_url().query().map(str::to_string)
    }

    pub fn protocol(&self) -> Protocol {
        if self.is_bound() {
            match self.current_url().scheme() {
                "https" => Protocol::Https,
                _ => Protocol::Http,
            }
        } else {
            self.options.protocol.unwrap_or(Protocol::Http)
        }
    }

    pub fn is_secure(&self) -> bool {
        self.protocol() == Protocol::Https
    }

    // ----- fluent setters -------------------------------------------

    pub fn set_matchers(&self, matchers: Vec<Arc<dyn Matcher>>) -> &Self {
        *self.matchers.write().unwrap() = matchers;
        self
    }

    pub fn set_dispatchers(&self, dispatchers: HashMap<HandlerKind, Arc<dyn Dispatcher>>) -> &Self {
        *self.dispatchers.write().unwrap() = dispatchers;
        self
    }

    pub fn set_resolver(&self, resolver: Option<Arc<dyn Resolver>>) -> &Self {
        *self.resolver.write().unwrap() = resolver;
        self
    }

    pub fn add_middleware(&self, middleware: impl Into<String>) -> &Self {
        self.middleware.write().unwrap().push(middleware.into());
        self
    }

    pub fn middleware(&self) -> Vec<String> {
        self.middleware.read().unwrap().clone()
    }

    pub fn is_middleware_excluded(&self, middleware: &str) -> bool {
        self.options
            .exclude_middleware
            .iter()
            .any(|excluded| excluded == middleware)
    }

    pub fn resolver(&self) -> Option<Arc<dyn Resolver>> {
        self.resolver.read().unwrap().clone()
    }

    // ----- matching --------------------------------------------------

    /// Evaluate the matcher list in registration order, short-circuiting on
    /// the first failure. `include_method: false` skips the method matcher.
    pub fn matches(&self, event: &dyn Event, include_method: bool) -> bool {
        let matchers = self.matchers.read().unwrap().clone();
        for matcher in matchers {
            if !include_method && matcher.kind() == MatcherKind::Method {
                continue;
            }
            if !matcher.matches(event, self) {
                return false;
            }
        }
        true
    }

    // ----- parameters ------------------------------------------------

    pub fn is_bound(&self) -> bool {
        self.state.read().unwrap().is_some()
    }

    /// Bound parameters. Fails until [`Route::bind`] has succeeded.
    pub fn params(&self) -> Result<Params, RouterError> {
        self.state
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.params.clone())
            .ok_or(RouterError::Unbound)
    }

    pub fn query(&self) -> HashMap<String, String> {
        self.state
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.query.clone())
            .unwrap_or_default()
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.get_param(name).is_some()
    }

    pub fn get_param(&self, name: &str) -> Option<Value> {
        self.state
            .read()
            .unwrap()
            .as_ref()
            .and_then(|s| s.params.get(name).cloned())
    }

    pub fn get_param_or(&self, name: &str, fallback: Value) -> Value {
        self.get_param(name).unwrap_or(fallback)
    }

    /// Declared parameter names, in template order.
    pub fn param_names(&self) -> Vec<String> {
        self.pattern
            .params()
            .filter_map(|c| c.param.clone())
            .collect()
    }

    /// Bound parameters with non-null values.
    pub fn defined_params(&self) -> Params {
        let mut defined = Params::default();
        if let Some(state) = self.state.read().unwrap().as_ref() {
            for param in state.params.iter() {
                if !param.value.is_null() {
                    defined.insert(param.key.clone(), param.value.clone());
                }
            }
        }
        defined
    }

    pub fn optional_param_names(&self) -> Vec<String> {
        self.pattern
            .params()
            .filter(|c| c.is_optional())
            .filter_map(|c| c.param.clone())
            .collect()
    }

    pub fn is_param_optional(&self, name: &str) -> bool {
        self.pattern
            .param(name)
            .map(|c| c.is_optional())
            .unwrap_or(false)
    }

    // ----- binding ---------------------------------------------------

    /// Bind an event: run the compiled regex over the decoded URI, coerce
    /// numeric-looking captures, apply defaults and declared binders, and
    /// persist params, query and URL. A failed bind leaves the previous
    /// state untouched.
    pub async fn bind(&self, event: Arc<dyn Event>) -> Result<(), RouterError> {
        let path = event
            .decoded_pathname()
            .unwrap_or_else(|| event.pathname().to_string());
        let target = if self.pattern.has_host() {
            format!("{}{}", event.host(), path)
        } else {
            path
        };
        let captures =
            self.pattern
                .regex
                .captures(&target)
                .ok_or_else(|| RouterError::NoRouteMatched {
                    method: event.method().clone(),
                    path: event.pathname().to_string(),
                })?;

        let mut raw_values: Vec<(String, Option<Value>, Option<String>, bool)> = Vec::new();
        for constraint in self.pattern.params() {
            let name = constraint.param.clone().unwrap_or_default();
            let raw = captures
                .name(&name)
                .map(|m| coerce(m.as_str().to_string()))
                .or_else(|| constraint.default.clone());
            raw_values.push((
                name,
                raw,
                constraint.alias.clone(),
                constraint.is_optional(),
            ));
        }

        let mut params = Params::default();
        for (name, raw, alias, optional) in raw_values {
            let bound = match (self.options.bindings.get(&name), raw) {
                (Some(binding), Some(raw)) => {
                    let key = alias.as_deref().unwrap_or(&name);
                    Some(self.resolve_binding(binding, key, raw, event.clone()).await?)
                }
                (None, Some(raw)) => Some(raw),
                (_, None) => None,
            };
            match bound {
                Some(value) => {
                    params.insert(name, value.clone());
                    if let Some(alias) = alias {
                        params.insert(alias, value);
                    }
                }
                None if optional => {}
                None => return Err(RouterError::UnboundParameter(name)),
            }
        }

        trace!(path = %self.options.path, params = params.len(), "bound route");
        *self.state.write().unwrap() = Some(BindState {
            params,
            query: event.query(),
            url: event.url().clone(),
        });
        Ok(())
    }

    async fn resolve_binding(
        &self,
        binding: &Binding,
        key: &str,
        raw: Value,
        event: Arc<dyn Event>,
    ) -> Result<Value, RouterError> {
        match binding {
            Binding::Func(f) => f(key, raw, event).await,
            Binding::Binder(binder) => binder.resolve_route_binding(key, raw, event).await,
            Binding::Alias(alias) => {
                let resolver = self
                    .resolver()
                    .ok_or_else(|| RouterError::UnresolvableBinding(alias.alias.clone()))?;
                let binder = resolver
                    .resolve_binder(&alias.alias)
                    .ok_or_else(|| RouterError::UnresolvableBinding(alias.alias.clone()))?;
                binder.call(&alias.method, key, raw).await
            }
        }
    }

    // ----- generation ------------------------------------------------

    /// Generate a URL from this route's constraints. Unknown parameters
    /// become query entries; missing required parameters fail; optional
    /// segments without a value are omitted.
    pub fn generate(&self, opts: &GenerateOptions) -> Result<String, RouterError> {
        let mut path = String::new();
        let mut host = String::new();
        let mut used: HashSet<String> = HashSet::new();

        for constraint in &self.pattern.constraints {
            let out = if constraint.host { &mut host } else { &mut path };
            if let Some(literal) = &constraint.literal {
                out.push_str(literal);
                continue;
            }
            let name = constraint.param.clone().unwrap_or_default();
            let value = opts
                .params
                .get(&name)
                .filter(|v| !v.is_null())
                .cloned()
                .or_else(|| constraint.default.clone());
            match value {
                Some(value) => {
                    used.insert(name);
                    out.push_str(&constraint.prefix);
                    out.push_str(&value_to_string(&value));
                    out.push_str(&constraint.suffix);
                }
                None if constraint.is_optional() => {}
                None => return Err(RouterError::MissingParameter(name)),
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        let mut url = collapse_slashes(&path);

        let mut extras: Vec<(&String, &Value)> = opts
            .params
            .iter()
            .filter(|(name, _)| !used.contains(*name))
            .collect();
        extras.sort_by(|a, b| a.0.cmp(b.0));
        if !extras.is_empty() || !opts.query.is_empty() {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            for (name, value) in extras {
                serializer.append_pair(name, &value_to_string(value));
            }
            for (key, value) in &opts.query {
                serializer.append_pair(key, value);
            }
            url.push('?');
            url.push_str(&serializer.finish());
        }

        if let Some(hash) = &opts.hash {
            url.push('#');
            url.push_str(hash.trim_start_matches('#'));
        }

        if opts.with_domain {
            let domain = if host.is_empty() {
                self.current_host()
            } else {
                host
            };
            let protocol = opts
                .protocol
                .or(self.options.protocol)
                .unwrap_or(Protocol::Http);
            return Ok(format!("{protocol}://{domain}{url}"));
        }
        Ok(url)
    }

    // ----- dispatch --------------------------------------------------

    fn selected_kind(&self) -> Result<HandlerKind, RouterError> {
        if self.options.redirect.is_some() {
            return Ok(HandlerKind::Redirect);
        }
        match &self.options.handler {
            Some(handler) => Ok(handler.kind()),
            None => Err(RouterError::InvalidHandler(
                "route has neither handler nor redirect".to_string(),
            )),
        }
    }

    /// Run the dispatcher selected by the handler shape.
    pub async fn run(&self, event: Arc<dyn Event>) -> Result<Response, RouterError> {
        let kind = self.selected_kind()?;
        let dispatcher = self
            .dispatchers
            .read()
            .unwrap()
            .get(&kind)
            .cloned()
            .ok_or(RouterError::UnknownDispatcher(kind))?;
        dispatcher.dispatch(event, self).await
    }

    /// Dump entry for this route.
    pub async fn summary(&self) -> Result<RouteSummary, RouterError> {
        let kind = self.selected_kind()?;
        let dispatcher = self
            .dispatchers
            .read()
            .unwrap()
            .get(&kind)
            .cloned()
            .ok_or(RouterError::UnknownDispatcher(kind))?;
        Ok(RouteSummary {
            path: self.options.path.clone(),
            method: self.options.method.to_string(),
            handler: dispatcher.name(self).await?,
            name: self.options.name.clone().unwrap_or_else(|| "N/A".to_string()),
            domain: self.options.domain.clone().unwrap_or_else(|| "N/A".to_string()),
            fallback: self.options.fallback,
        })
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.options.method)
            .field("path", &self.options.path)
            .field("name", &self.options.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RequestEvent;
    use crate::handler::RouteBinder;
    use async_trait::async_trait;
    use serde_json::json;

    fn event(url: &str) -> Arc<dyn Event> {
        Arc::new(RequestEvent::get(url).unwrap())
    }

    fn compiled(options: RouteOptions) -> Route {
        Route::new(options).unwrap()
    }

    #[tokio::test]
    async fn bind_coerces_numeric_captures() {
        let route = compiled(RouteOptions {
            path: "/users/:id".to_string(),
            ..RouteOptions::default()
        });
        route.bind(event("http://localhost/users/42")).await.unwrap();
        assert_eq!(route.get_param("id"), Some(json!(42)));

        route.bind(event("http://localhost/users/alice")).await.unwrap();
        assert_eq!(route.get_param("id"), Some(json!("alice")));
    }

    #[tokio::test]
    async fn bind_applies_defaults_for_missing_optionals() {
        let route = compiled(RouteOptions {
            path: "/list/:page?".to_string(),
            defaults: HashMap::from([("page".to_string(), json!(1))]),
            ..RouteOptions::default()
        });
        route.bind(event("http://localhost/list")).await.unwrap();
        assert_eq!(route.get_param("page"), Some(json!(1)));
    }

    #[tokio::test]
    async fn bind_fails_before_access() {
        let route = compiled(RouteOptions {
            path: "/x".to_string(),
            ..RouteOptions::default()
        });
        assert!(matches!(route.params(), Err(RouterError::Unbound)));
    }

    #[tokio::test]
    async fn failed_bind_keeps_previous_state() {
        let route = compiled(RouteOptions {
            path: "/users/:id".to_string(),
            ..RouteOptions::default()
        });
        route.bind(event("http://localhost/users/7")).await.unwrap();
        let err = route.bind(event("http://localhost/nope")).await.unwrap_err();
        assert!(matches!(err, RouterError::NoRouteMatched { .. }));
        assert_eq!(route.get_param("id"), Some(json!(7)));
    }

    struct UpperBinder;

    #[async_trait]
    impl RouteBinder for UpperBinder {
        async fn resolve_route_binding(
            &self,
            key: &str,
            raw: Value,
            _event: Arc<dyn Event>,
        ) -> Result<Value, RouterError> {
            assert_eq!(key, "slug");
            match raw {
                Value::String(s) => Ok(Value::String(s.to_uppercase())),
                other => Ok(other),
            }
        }
    }

    #[tokio::test]
    async fn binder_output_replaces_the_capture() {
        let route = compiled(RouteOptions {
            path: "/posts/:slug".to_string(),
            bindings: HashMap::from([(
                "slug".to_string(),
                Binding::binder(Arc::new(UpperBinder)),
            )]),
            ..RouteOptions::default()
        });
        route.bind(event("http://localhost/posts/hello")).await.unwrap();
        assert_eq!(route.get_param("slug"), Some(json!("HELLO")));
    }

    #[tokio::test]
    async fn required_param_without_value_is_not_found() {
        // an empty-able rule lets the regex match while the capture is
        // absent
        let route = compiled(RouteOptions {
            path: "/a/:x+".to_string(),
            ..RouteOptions::default()
        });
        let err = route.bind(event("http://localhost/a")).await.unwrap_err();
        assert!(matches!(err, RouterError::NoRouteMatched { .. }));
    }

    #[test]
    fn optionality_reflects_constraints() {
        let route = compiled(RouteOptions {
            path: "/a/:b/:c?/:d*".to_string(),
            defaults: HashMap::from([("b".to_string(), json!("x"))]),
            ..RouteOptions::default()
        });
        assert!(route.is_param_optional("b"));
        assert!(route.is_param_optional("c"));
        assert!(route.is_param_optional("d"));
        assert_eq!(route.optional_param_names(), ["b", "c", "d"]);
        assert_eq!(route.param_names(), ["b", "c", "d"]);
    }

    #[test]
    fn generate_fills_params_and_queries() {
        let route = compiled(RouteOptions {
            path: "/users/:id/posts/:slug?".to_string(),
            ..RouteOptions::default()
        });
        let url = route
            .generate(
                &GenerateOptions::default()
                    .param("id", 42)
                    .param("extra", "x"),
            )
            .unwrap();
        assert_eq!(url, "/users/42/posts?extra=x");

        let url = route
            .generate(
                &GenerateOptions::default()
                    .param("id", 42)
                    .param("slug", "intro")
                    .query_pair("page", "2"),
            )
            .unwrap();
        assert_eq!(url, "/users/42/posts/intro?page=2");
    }

    #[test]
    fn generate_fails_on_missing_required_param() {
        let route = compiled(RouteOptions {
            path: "/users/:id".to_string(),
            ..RouteOptions::default()
        });
        let err = route.generate(&GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, RouterError::MissingParameter(name) if name == "id"));
    }

    #[test]
    fn generate_with_domain_prepends_protocol_and_host() {
        let route = compiled(RouteOptions {
            path: "/dash".to_string(),
            domain: Some(":sub.example.com".to_string()),
            protocol: Some(Protocol::Https),
            ..RouteOptions::default()
        });
        let url = route
            .generate(&GenerateOptions::default().param("sub", "admin").with_domain())
            .unwrap();
        assert_eq!(url, "https://admin.example.com/dash");
    }

    #[tokio::test]
    async fn url_accessors_default_to_synthetic_root() {
        let route = compiled(RouteOptions {
            path: "/x".to_string(),
            ..RouteOptions::default()
        });
        assert_eq!(route.uri(), "http://localhost/");
        assert_eq!(route.current_path(), "/");

        route
            .bind(event("https://example.com/x?a=1#frag"))
            .await
            .unwrap();
        assert_eq!(route.current_path(), "/x");
        assert_eq!(route.current_host(), "example.com");
        assert_eq!(route.hash().as_deref(), Some("frag"));
        assert_eq!(route.query_string().as_deref(), Some("a=1"));
        assert!(route.is_secure());
    }

    #[tokio::test]
    async fn summary_reports_dispatcher_name() {
        let route = compiled(RouteOptions {
            path: "/old".to_string(),
            redirect: Some(Redirect::to("/new")),
            name: Some("legacy".to_string()),
            ..RouteOptions::default()
        });
        let summary = route.summary().await.unwrap();
        assert_eq!(summary.handler, "redirect:/new");
        assert_eq!(summary.name, "legacy");
        assert_eq!(summary.domain, "N/A");
        assert_eq!(summary.method, "GET");
    }
}
