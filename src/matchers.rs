//! Route matchers.
//!
//! Each matcher is an independent predicate over `(event, route)`. A route
//! evaluates its matcher list in registration order and short-circuits on
//! the first `false`. The method matcher is skippable: the collection skips
//! it both when the per-method bucket already guarantees the method and
//! when probing for a method-not-allowed answer.

use std::sync::Arc;

use http::Method;

use crate::event::Event;
use crate::route::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    Uri,
    Method,
    Host,
    Protocol,
}

pub trait Matcher: Send + Sync {
    fn kind(&self) -> MatcherKind;

    fn matches(&self, event: &dyn Event, route: &Route) -> bool;
}

/// The default matcher list, in evaluation order.
pub fn default_matchers() -> Vec<Arc<dyn Matcher>> {
    vec![
        Arc::new(UriMatcher),
        Arc::new(MethodMatcher),
        Arc::new(HostMatcher),
        Arc::new(ProtocolMatcher),
    ]
}

/// The compiled regex must match the decoded pathname, host included when
/// the route carries a domain constraint.
pub struct UriMatcher;

impl Matcher for UriMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::Uri
    }

    fn matches(&self, event: &dyn Event, route: &Route) -> bool {
        let path = event
            .decoded_pathname()
            .unwrap_or_else(|| event.pathname().to_string());
        let pattern = route.pattern();
        if pattern.has_host() {
            pattern.regex.is_match(&format!("{}{}", event.host(), path))
        } else {
            pattern.regex.is_match(&path)
        }
    }
}

/// Event method equals the route method. An internal HEAD twin also accepts
/// a HEAD event against its GET origin.
pub struct MethodMatcher;

impl Matcher for MethodMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::Method
    }

    fn matches(&self, event: &dyn Event, route: &Route) -> bool {
        event.method() == route.method()
            || (route.is_internal_header()
                && route.method() == Method::GET
                && event.is_method(&Method::HEAD))
    }
}

/// The host portion of the pattern must match, when a domain was declared.
pub struct HostMatcher;

impl Matcher for HostMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::Host
    }

    fn matches(&self, event: &dyn Event, route: &Route) -> bool {
        match &route.pattern().host_regex {
            Some(host_regex) => host_regex.is_match(&event.host()),
            None => true,
        }
    }
}

/// Protocol restriction, when the route declares one.
pub struct ProtocolMatcher;

impl Matcher for ProtocolMatcher {
    fn kind(&self) -> MatcherKind {
        MatcherKind::Protocol
    }

    fn matches(&self, event: &dyn Event, route: &Route) -> bool {
        match route.protocol_restriction() {
            Some(protocol) => event.protocol() == protocol,
            None => true,
        }
    }
}
