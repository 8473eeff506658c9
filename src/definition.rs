//! User-authored route definitions.
//!
//! A [`RouteDefinition`] is a declarative, possibly-nested record: leaves
//! carry a path and a handler (or redirect), groups carry children that
//! inherit the parent's prefix, name, middleware, rules, defaults and
//! bindings. The mapper flattens the tree into single-method routes.

use http::Method;
use serde_json::Value;

use crate::event::Protocol;
use crate::handler::{Binding, Handler, Redirect};

#[derive(Debug, Clone, Default)]
pub struct RouteDefinition {
    pub(crate) path: Option<String>,
    pub(crate) methods: Vec<Method>,
    pub(crate) handler: Option<Handler>,
    pub(crate) redirect: Option<Redirect>,
    pub(crate) name: Option<String>,
    pub(crate) domain: Option<String>,
    pub(crate) protocol: Option<Protocol>,
    pub(crate) rules: Vec<(String, String)>,
    pub(crate) defaults: Vec<(String, Value)>,
    pub(crate) bindings: Vec<(String, Binding)>,
    pub(crate) middleware: Vec<String>,
    pub(crate) exclude_middleware: Vec<String>,
    pub(crate) strict: Option<bool>,
    pub(crate) fallback: Option<bool>,
    pub(crate) children: Vec<RouteDefinition>,
    pub(crate) page_layout: Option<Value>,
    pub(crate) custom_options: Option<Value>,
}

impl RouteDefinition {
    /// A definition rooted at a path template.
    pub fn new(path: impl Into<String>) -> Self {
        RouteDefinition {
            path: Some(path.into()),
            ..RouteDefinition::default()
        }
    }

    /// A group definition without its own path.
    pub fn group() -> Self {
        RouteDefinition::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods.extend(methods);
        self
    }

    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn redirect(mut self, redirect: Redirect) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Shorthand for a plain 302 redirect.
    pub fn redirect_to(self, location: impl Into<String>) -> Self {
        self.redirect(Redirect::to(location))
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn rule(mut self, param: impl Into<String>, rule: impl Into<String>) -> Self {
        self.rules.push((param.into(), rule.into()));
        self
    }

    pub fn default_value(mut self, param: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.push((param.into(), value.into()));
        self
    }

    pub fn binding(mut self, param: impl Into<String>, binding: Binding) -> Self {
        self.bindings.push((param.into(), binding));
        self
    }

    pub fn middleware(mut self, middleware: impl Into<String>) -> Self {
        self.middleware.push(middleware.into());
        self
    }

    pub fn exclude_middleware(mut self, middleware: impl Into<String>) -> Self {
        self.exclude_middleware.push(middleware.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn fallback(mut self, fallback: bool) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn child(mut self, child: RouteDefinition) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = RouteDefinition>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn page_layout(mut self, layout: impl Into<Value>) -> Self {
        self.page_layout = Some(layout.into());
        self
    }

    pub fn custom_options(mut self, options: impl Into<Value>) -> Self {
        self.custom_options = Some(options.into());
        self
    }
}
