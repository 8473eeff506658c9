//! Handler shapes and parameter bindings.
//!
//! A route dispatches to one of four shapes: a callable (plain function or
//! factory), a controller (an instance or a container id plus an action), a
//! UI component (eager or lazily loaded), or a redirect. The shape is a
//! tagged variant; dispatchers are selected by [`Handler::kind`].
//!
//! Bindings transform a captured parameter into a domain value before it is
//! stored on the route: a plain async function, a [`RouteBinder`]
//! implementation, or an `"Alias@method"` reference resolved through the
//! external container at bind time.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, LazyLock, OnceLock};

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use http::StatusCode;
use regex::Regex;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::error::RouterError;
use crate::event::Event;
use crate::resolver::Resolver;
use crate::response::{Component, Response};
use crate::route::Route;

/// Boxed future returned by handlers.
pub type HandlerFuture = BoxFuture<'static, Result<Response, RouterError>>;

/// A ready-to-invoke handler function.
pub type HandlerFn = Arc<dyn Fn(Arc<dyn Event>) -> HandlerFuture + Send + Sync>;

/// A factory invoked once (with the external resolver, when configured) to
/// obtain the real handler function.
pub type FactoryFn =
    Arc<dyn Fn(Option<Arc<dyn Resolver>>) -> Result<HandlerFn, RouterError> + Send + Sync>;

/// Async loader for a lazy component.
pub type LazyLoader =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Component, RouterError>> + Send + Sync>;

/// Wrap an async function into a callable [`Handler`].
pub fn handler_fn<F, R>(f: F) -> Handler
where
    F: Fn(Arc<dyn Event>) -> R + Send + Sync + 'static,
    R: Future<Output = Result<Response, RouterError>> + Send + 'static,
{
    Handler::Callable(Callable::func(move |event| Box::pin(f(event))))
}

/// The selectable handler kinds. `Redirect` is keyed by the presence of the
/// `redirect` option rather than a handler value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Callable,
    Controller,
    Component,
    Redirect,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandlerKind::Callable => "callable",
            HandlerKind::Controller => "controller",
            HandlerKind::Component => "component",
            HandlerKind::Redirect => "redirect",
        })
    }
}

/// A route handler.
#[derive(Clone)]
pub enum Handler {
    Callable(Callable),
    Controller(ControllerHandler),
    Component(ComponentHandler),
}

impl Handler {
    pub fn kind(&self) -> HandlerKind {
        match self {
            Handler::Callable(_) => HandlerKind::Callable,
            Handler::Controller(_) => HandlerKind::Controller,
            Handler::Component(_) => HandlerKind::Component,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler::{}", self.kind())
    }
}

/// A function handler, possibly behind a factory that is invoked once.
#[derive(Clone)]
pub struct Callable {
    kind: CallableKind,
}

#[derive(Clone)]
enum CallableKind {
    Func(HandlerFn),
    Factory {
        factory: FactoryFn,
        memo: Arc<OnceLock<HandlerFn>>,
    },
}

impl Callable {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(Arc<dyn Event>) -> HandlerFuture + Send + Sync + 'static,
    {
        Callable {
            kind: CallableKind::Func(Arc::new(f)),
        }
    }

    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(Option<Arc<dyn Resolver>>) -> Result<HandlerFn, RouterError> + Send + Sync + 'static,
    {
        Callable {
            kind: CallableKind::Factory {
                factory: Arc::new(f),
                memo: Arc::new(OnceLock::new()),
            },
        }
    }

    /// The concrete handler function, invoking the factory on first use.
    pub fn resolve(
        &self,
        resolver: Option<Arc<dyn Resolver>>,
    ) -> Result<HandlerFn, RouterError> {
        match &self.kind {
            CallableKind::Func(f) => Ok(f.clone()),
            CallableKind::Factory { factory, memo } => {
                if let Some(f) = memo.get() {
                    return Ok(f.clone());
                }
                let produced = factory(resolver)?;
                Ok(memo.get_or_init(|| produced).clone())
            }
        }
    }
}

/// A controller exposing named actions. The "class" handler shape.
#[async_trait]
pub trait Controller: Send + Sync {
    fn name(&self) -> &str;

    /// Invoke the named action. Implementations return
    /// [`RouterError::UnknownAction`] for actions they do not expose.
    async fn call(&self, action: &str, event: Arc<dyn Event>) -> Result<Response, RouterError>;
}

/// Controller handler: an instance, or a container id resolved at dispatch
/// time, plus the action to invoke.
#[derive(Clone)]
pub struct ControllerHandler {
    pub source: ControllerSource,
    pub action: Option<String>,
}

#[derive(Clone)]
pub enum ControllerSource {
    Instance(Arc<dyn Controller>),
    Id(String),
}

impl ControllerHandler {
    pub fn new(controller: Arc<dyn Controller>) -> Self {
        ControllerHandler {
            source: ControllerSource::Instance(controller),
            action: None,
        }
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        ControllerHandler {
            source: ControllerSource::Id(id.into()),
            action: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// The action to invoke, defaulting to `handle`.
    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or("handle")
    }
}

/// Component handler. Lazy components carry a loader awaited once; the
/// resolved component replaces it for every later use.
#[derive(Clone)]
pub struct ComponentHandler {
    name: Option<String>,
    source: ComponentSource,
}

#[derive(Clone)]
enum ComponentSource {
    Eager(Component),
    Lazy {
        loader: LazyLoader,
        cell: Arc<OnceCell<Component>>,
    },
}

impl ComponentHandler {
    pub fn eager(component: Component) -> Self {
        ComponentHandler {
            name: None,
            source: ComponentSource::Eager(component),
        }
    }

    pub fn lazy<F>(loader: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<Component, RouterError>> + Send + Sync + 'static,
    {
        ComponentHandler {
            name: None,
            source: ComponentSource::Lazy {
                loader: Arc::new(loader),
                cell: Arc::new(OnceCell::new()),
            },
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("component")
    }

    /// True until a lazy loader has produced its component.
    pub fn is_lazy(&self) -> bool {
        match &self.source {
            ComponentSource::Eager(_) => false,
            ComponentSource::Lazy { cell, .. } => cell.get().is_none(),
        }
    }

    /// The concrete component, awaiting the loader on first use.
    pub async fn resolve(&self) -> Result<Component, RouterError> {
        match &self.source {
            ComponentSource::Eager(component) => Ok(component.clone()),
            ComponentSource::Lazy { loader, cell } => {
                cell.get_or_try_init(|| loader()).await.map(Arc::clone)
            }
        }
    }
}

/// Redirect target resolver function; may return another redirect, which is
/// resolved in turn.
pub type RedirectFn = Arc<dyn Fn(&Route, &dyn Event) -> Redirect + Send + Sync>;

/// A redirect: a bare location (302), a location with an explicit status,
/// or a function of the route and event.
#[derive(Clone)]
pub enum Redirect {
    To(String),
    WithStatus { location: String, status: StatusCode },
    Dynamic(RedirectFn),
}

const REDIRECT_DEPTH: usize = 32;

impl Redirect {
    pub fn to(location: impl Into<String>) -> Self {
        Redirect::To(location.into())
    }

    pub fn permanent(location: impl Into<String>) -> Self {
        Redirect::WithStatus {
            location: location.into(),
            status: StatusCode::MOVED_PERMANENTLY,
        }
    }

    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&Route, &dyn Event) -> Redirect + Send + Sync + 'static,
    {
        Redirect::Dynamic(Arc::new(f))
    }

    /// Resolve to a concrete location and status, recursing through
    /// function targets. Empty locations fail.
    pub fn resolve(
        &self,
        route: &Route,
        event: &dyn Event,
    ) -> Result<(String, StatusCode), RouterError> {
        let mut current = self.clone();
        for _ in 0..REDIRECT_DEPTH {
            match current {
                Redirect::To(location) => {
                    if location.is_empty() {
                        return Err(RouterError::EmptyRedirect);
                    }
                    return Ok((location, StatusCode::FOUND));
                }
                Redirect::WithStatus { location, status } => {
                    if location.is_empty() {
                        return Err(RouterError::EmptyRedirect);
                    }
                    return Ok((location, status));
                }
                Redirect::Dynamic(f) => current = f(route, event),
            }
        }
        Err(RouterError::InvalidHandler(
            "redirect resolution did not terminate".to_string(),
        ))
    }
}

impl fmt::Debug for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Redirect::To(location) => f.debug_tuple("To").field(location).finish(),
            Redirect::WithStatus { location, status } => f
                .debug_struct("WithStatus")
                .field("location", location)
                .field("status", status)
                .finish(),
            Redirect::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A parameter binder function: `(key, raw, event) -> value`.
pub type BinderFn = Arc<
    dyn Fn(&str, Value, Arc<dyn Event>) -> BoxFuture<'static, Result<Value, RouterError>>
        + Send
        + Sync,
>;

/// The "class with `resolveRouteBinding`" binder shape.
#[async_trait]
pub trait RouteBinder: Send + Sync {
    async fn resolve_route_binding(
        &self,
        key: &str,
        raw: Value,
        event: Arc<dyn Event>,
    ) -> Result<Value, RouterError>;
}

/// A declared parameter binding.
#[derive(Clone)]
pub enum Binding {
    Func(BinderFn),
    Binder(Arc<dyn RouteBinder>),
    Alias(AliasBinding),
}

impl Binding {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&str, Value, Arc<dyn Event>) -> BoxFuture<'static, Result<Value, RouterError>>
            + Send
            + Sync
            + 'static,
    {
        Binding::Func(Arc::new(f))
    }

    pub fn binder(binder: Arc<dyn RouteBinder>) -> Self {
        Binding::Binder(binder)
    }

    /// The alias name, when this is an alias binding.
    pub fn alias(&self) -> Option<&str> {
        match self {
            Binding::Alias(alias) => Some(&alias.alias),
            _ => None,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Func(_) => f.write_str("Binding::Func(..)"),
            Binding::Binder(_) => f.write_str("Binding::Binder(..)"),
            Binding::Alias(alias) => f.debug_tuple("Binding::Alias").field(alias).finish(),
        }
    }
}

static ALIAS_BINDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)@([A-Za-z_][A-Za-z0-9_]*)$").unwrap()
});

/// An `"Alias@method"` binding, parsed at mapping time and resolved against
/// the external container at bind time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasBinding {
    pub alias: String,
    pub method: String,
}

impl FromStr for AliasBinding {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = ALIAS_BINDING
            .captures(s)
            .ok_or_else(|| RouterError::InvalidBinding(s.to_string()))?;
        Ok(AliasBinding {
            alias: caps[1].to_string(),
            method: caps[2].to_string(),
        })
    }
}
