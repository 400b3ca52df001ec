//! Route table.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Resolve (method, path) to an action factory and path parameters
//! - Report the methods a path accepts, for automatic `OPTIONS`
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over routes (acceptable for the size of the API)
//! - Most specific pattern wins; registration order never matters
//! - Explicit `NotFound` factory rather than a no-match error

use axum::http::Method;
use thiserror::Error;

use crate::actions::errors::NotFound;
use crate::actions::{factory, ActionFactory, PathParams};
use crate::routing::matcher::Pattern;

/// Route table construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("duplicate route {method} {pattern} (already registered as {existing})")]
    Duplicate {
        method: Method,
        pattern: String,
        existing: String,
    },
}

struct Route {
    method: Method,
    pattern: Pattern,
    factory: ActionFactory,
}

/// Outcome of resolving a request.
pub struct RouteMatch {
    pub factory: ActionFactory,
    pub params: PathParams,
    /// Pattern that matched, `None` for the not-found fallback.
    pub pattern: Option<String>,
}

impl std::fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMatch")
            .field("params", &self.params)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        factory: ActionFactory,
    ) -> Result<&mut Self, RouteError> {
        let pattern = Pattern::parse(pattern)?;
        if let Some(existing) = self
            .routes
            .iter()
            .find(|route| route.method == method && route.pattern.same_shape(&pattern))
        {
            return Err(RouteError::Duplicate {
                method,
                pattern: pattern.as_str().to_string(),
                existing: existing.pattern.as_str().to_string(),
            });
        }

        tracing::debug!(%method, pattern = %pattern, "Registered route");
        self.routes.push(Route {
            method,
            pattern,
            factory,
        });
        Ok(self)
    }

    pub fn get(&mut self, pattern: &str, factory: ActionFactory) -> Result<&mut Self, RouteError> {
        self.register(Method::GET, pattern, factory)
    }

    /// Resolve a request. Unmatched requests get the not-found action.
    pub fn resolve(&self, method: &Method, path: &str) -> RouteMatch {
        let method = if *method == Method::HEAD {
            &Method::GET
        } else {
            method
        };

        let best = self
            .routes
            .iter()
            .filter(|route| route.method == *method)
            .filter_map(|route| route.pattern.matches(path).map(|params| (route, params)))
            .max_by(|(a, _), (b, _)| a.pattern.specificity(&b.pattern));

        match best {
            Some((route, params)) => RouteMatch {
                factory: route.factory,
                params,
                pattern: Some(route.pattern.as_str().to_string()),
            },
            None => RouteMatch {
                factory: factory::<NotFound>,
                params: PathParams::new(),
                pattern: None,
            },
        }
    }

    /// Methods accepted on `path`, in registration order.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = Vec::new();
        for route in &self.routes {
            if route.pattern.matches(path).is_some() && !methods.contains(&route.method) {
                methods.push(route.method.clone());
            }
        }
        methods
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(
                self.routes
                    .iter()
                    .map(|route| format!("{} {}", route.method, route.pattern)),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::errors::NotImplemented;
    use crate::actions::ledgers::{LedgerIndex, LedgerShow};
    use crate::actions::root::Root;

    fn name_of(matched: &RouteMatch) -> &'static str {
        (matched.factory)().name()
    }

    #[test]
    fn resolves_params_and_falls_back() {
        let mut router = Router::new();
        router
            .get("/ledgers", factory::<LedgerIndex>)
            .unwrap()
            .get("/ledgers/:id", factory::<LedgerShow>)
            .unwrap();

        let matched = router.resolve(&Method::GET, "/ledgers/42");
        assert_eq!(name_of(&matched), "ledger_show");
        assert_eq!(matched.params.get("id"), Some("42"));

        let missing = router.resolve(&Method::GET, "/nope");
        assert_eq!(name_of(&missing), "not_found");
        assert!(missing.pattern.is_none());
    }

    #[test]
    fn literal_wins_regardless_of_order() {
        let mut router = Router::new();
        router
            .get("/ledgers/:id", factory::<LedgerShow>)
            .unwrap()
            .get("/ledgers/latest", factory::<Root>)
            .unwrap();
        assert_eq!(name_of(&router.resolve(&Method::GET, "/ledgers/latest")), "root");
        assert_eq!(name_of(&router.resolve(&Method::GET, "/ledgers/7")), "ledger_show");
    }

    #[test]
    fn head_uses_get_routes_and_other_methods_miss() {
        let mut router = Router::new();
        router.get("/", factory::<Root>).unwrap();
        assert_eq!(name_of(&router.resolve(&Method::HEAD, "/")), "root");
        assert_eq!(name_of(&router.resolve(&Method::POST, "/")), "not_found");
    }

    #[test]
    fn duplicate_shapes_are_rejected() {
        let mut router = Router::new();
        router.get("/operations/:id", factory::<NotImplemented>).unwrap();
        let error = router
            .get("/operations/:tx_id", factory::<NotImplemented>)
            .unwrap_err();
        assert!(matches!(error, RouteError::Duplicate { .. }));

        // Same shape under another method is fine.
        router
            .register(Method::POST, "/operations/:id", factory::<NotImplemented>)
            .unwrap();
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn allowed_methods_cover_matching_routes() {
        let mut router = Router::new();
        router.get("/accounts/:id", factory::<Root>).unwrap();
        router
            .register(Method::POST, "/accounts/:id", factory::<Root>)
            .unwrap();
        assert_eq!(
            router.allowed_methods("/accounts/GABC"),
            vec![Method::GET, Method::POST]
        );
        assert!(router.allowed_methods("/nope").is_empty());
    }
}
