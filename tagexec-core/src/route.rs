//! Routes and route resolution.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, sync::Arc};

/// The matched routing target of a request.
///
/// Only the name (for logging) and the tag set (for step activation) are
/// consumed here; storage and matching belong to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Human-readable route name.
    pub name: String,
    /// Tags attached to the route.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Route {
    /// Create an untagged route.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeSet::new(),
        }
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add several tags.
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Exact, case-sensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Resolves the route matched for the request owning context `C`.
///
/// Called once per phase invocation.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot resolve routes from context `{C}`",
    label = "missing `RouteResolver<{C}>` implementation",
    note = "Wrap a closure with `resolver_fn` or implement `current_route`."
)]
pub trait RouteResolver<C>: Send + Sync {
    /// The current route, or `None` when the request has not been matched.
    fn current_route(&self, ctx: &C) -> Option<Arc<Route>>;
}

impl<C, R: RouteResolver<C> + ?Sized> RouteResolver<C> for Arc<R> {
    fn current_route(&self, ctx: &C) -> Option<Arc<Route>> {
        (**self).current_route(ctx)
    }
}

/// A [`RouteResolver`] backed by a closure. Created by [`resolver_fn`].
#[derive(Clone, Copy)]
pub struct FnResolver<F>(F);

/// Build a resolver from a closure.
///
/// ```rust,ignore
/// let resolver = resolver_fn(|ctx: &RequestCtx| ctx.matched_route.clone());
/// ```
pub fn resolver_fn<C, F>(f: F) -> FnResolver<F>
where
    F: Fn(&C) -> Option<Arc<Route>> + Send + Sync,
{
    FnResolver(f)
}

impl<C, F> RouteResolver<C> for FnResolver<F>
where
    F: Fn(&C) -> Option<Arc<Route>> + Send + Sync,
{
    fn current_route(&self, ctx: &C) -> Option<Arc<Route>> {
        (self.0)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_membership_is_exact() {
        let route = Route::new("api").with_tags(["beta", "Tag"]);
        assert!(route.has_tag("beta"));
        assert!(route.has_tag("Tag"));
        assert!(!route.has_tag("tag"));
        assert!(!route.has_tag("bet"));
        assert!(!route.has_tag(""));
    }

    #[test]
    fn test_resolver_fn() {
        let route = Arc::new(Route::new("api").with_tag("beta"));
        let shared = Arc::clone(&route);
        let resolver = resolver_fn(move |matched: &bool| matched.then(|| Arc::clone(&shared)));

        assert_eq!(resolver.current_route(&true), Some(route));
        assert_eq!(resolver.current_route(&false), None);
    }

    #[test]
    fn test_route_deserialize_without_tags() {
        let route: Route = serde_json::from_str(r#"{"name":"plain"}"#).unwrap();
        assert_eq!(route, Route::new("plain"));
    }
}
