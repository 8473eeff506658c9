//! Dispatchers: strategy objects converting a matched, bound route plus an
//! event into an outgoing response.
//!
//! Selection follows the handler shape: a `redirect` option wins outright,
//! otherwise the handler's tag picks the dispatcher. `Route::run` looks the
//! strategy up in the route's dispatcher table and fails when the slot is
//! empty.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::error::RouterError;
use crate::event::Event;
use crate::handler::{ControllerSource, Handler, HandlerKind};
use crate::response::Response;
use crate::route::Route;

#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Human-readable handler name used in route dumps.
    async fn name(&self, route: &Route) -> Result<String, RouterError>;

    async fn dispatch(&self, event: Arc<dyn Event>, route: &Route)
        -> Result<Response, RouterError>;
}

/// The default dispatcher table covering all four handler kinds.
pub fn default_dispatchers() -> HashMap<HandlerKind, Arc<dyn Dispatcher>> {
    let mut table: HashMap<HandlerKind, Arc<dyn Dispatcher>> = HashMap::new();
    table.insert(HandlerKind::Callable, Arc::new(CallableDispatcher));
    table.insert(HandlerKind::Controller, Arc::new(ControllerDispatcher));
    table.insert(HandlerKind::Component, Arc::new(ComponentDispatcher));
    table.insert(HandlerKind::Redirect, Arc::new(RedirectDispatcher));
    table
}

pub struct RedirectDispatcher;

#[async_trait]
impl Dispatcher for RedirectDispatcher {
    async fn name(&self, route: &Route) -> Result<String, RouterError> {
        use crate::handler::Redirect;
        match route.redirect() {
            Some(Redirect::To(location)) => Ok(format!("redirect:{location}")),
            Some(Redirect::WithStatus { location, .. }) => Ok(format!("redirect:{location}")),
            Some(Redirect::Dynamic(_)) => Ok("redirect:dynamic".to_string()),
            None => Err(RouterError::InvalidHandler(
                "redirect dispatcher selected without a redirect".to_string(),
            )),
        }
    }

    async fn dispatch(
        &self,
        event: Arc<dyn Event>,
        route: &Route,
    ) -> Result<Response, RouterError> {
        let redirect = route.redirect().ok_or_else(|| {
            RouterError::InvalidHandler("redirect dispatcher selected without a redirect".into())
        })?;
        let (location, status) = redirect.resolve(route, event.as_ref())?;
        trace!(%location, %status, "redirecting");
        Ok(Response::redirect(&location, status))
    }
}

pub struct ComponentDispatcher;

#[async_trait]
impl Dispatcher for ComponentDispatcher {
    async fn name(&self, route: &Route) -> Result<String, RouterError> {
        match route.handler() {
            Some(Handler::Component(component)) => Ok(component.name().to_string()),
            _ => Err(RouterError::InvalidHandler(
                "component dispatcher selected for a non-component handler".to_string(),
            )),
        }
    }

    async fn dispatch(
        &self,
        _event: Arc<dyn Event>,
        route: &Route,
    ) -> Result<Response, RouterError> {
        match route.handler() {
            Some(Handler::Component(component)) => {
                let resolved = component.resolve().await?;
                Ok(Response::view(resolved))
            }
            _ => Err(RouterError::InvalidHandler(
                "component dispatcher selected for a non-component handler".to_string(),
            )),
        }
    }
}

pub struct ControllerDispatcher;

#[async_trait]
impl Dispatcher for ControllerDispatcher {
    async fn name(&self, route: &Route) -> Result<String, RouterError> {
        match route.handler() {
            Some(Handler::Controller(handler)) => {
                let controller = match &handler.source {
                    ControllerSource::Instance(instance) => instance.name().to_string(),
                    ControllerSource::Id(id) => id.clone(),
                };
                Ok(format!("{controller}@{}", handler.action()))
            }
            _ => Err(RouterError::InvalidHandler(
                "controller dispatcher selected for a non-controller handler".to_string(),
            )),
        }
    }

    async fn dispatch(
        &self,
        event: Arc<dyn Event>,
        route: &Route,
    ) -> Result<Response, RouterError> {
        let handler = match route.handler() {
            Some(Handler::Controller(handler)) => handler,
            _ => {
                return Err(RouterError::InvalidHandler(
                    "controller dispatcher selected for a non-controller handler".to_string(),
                ))
            }
        };
        let instance = match &handler.source {
            ControllerSource::Instance(instance) => instance.clone(),
            ControllerSource::Id(id) => {
                let resolver = route.resolver().ok_or_else(|| {
                    RouterError::InvalidHandler(format!(
                        "controller `{id}` needs a resolver to instantiate"
                    ))
                })?;
                resolver.resolve_controller(id).ok_or_else(|| {
                    RouterError::InvalidHandler(format!("controller `{id}` not resolvable"))
                })?
            }
        };
        trace!(controller = instance.name(), action = handler.action(), "dispatching");
        instance.call(handler.action(), event).await
    }
}

pub struct CallableDispatcher;

#[async_trait]
impl Dispatcher for CallableDispatcher {
    async fn name(&self, _route: &Route) -> Result<String, RouterError> {
        Ok("callable".to_string())
    }

    async fn dispatch(
        &self,
        event: Arc<dyn Event>,
        route: &Route,
    ) -> Result<Response, RouterError> {
        match route.handler() {
            Some(Handler::Callable(callable)) => {
                let f = callable.resolve(route.resolver())?;
                f(event).await
            }
            _ => Err(RouterError::InvalidHandler(
                "callable dispatcher selected for a non-callable handler".to_string(),
            )),
        }
    }
}
