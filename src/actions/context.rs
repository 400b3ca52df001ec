//! Per-request state shared by the dispatcher and the running action.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use axum::extract::Query;
use axum::http::{request::Parts, HeaderMap, Method, Uri};

use crate::actions::Problem;
use crate::app::AppContext;
use crate::http::request::RequestId;

/// Lifecycle of one action.
///
/// ```text
/// Created → Prepared → Executed → Responded
///    └─────────┴──→ Failed ──────────↗
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Prepared,
    Executed,
    Failed,
    Responded,
}

impl Lifecycle {
    pub fn can_transition(self, to: Lifecycle) -> bool {
        use Lifecycle::*;
        matches!(
            (self, to),
            (Created, Prepared)
                | (Created, Failed)
                | (Prepared, Executed)
                | (Prepared, Failed)
                | (Executed, Responded)
                | (Failed, Responded)
        )
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Named path parameters extracted by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Request-scoped bag owned by exactly one in-flight request.
#[derive(Debug)]
pub struct RequestContext {
    request_id: Option<RequestId>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: PathParams,
    query: HashMap<String, String>,
    app: Arc<AppContext>,
    state: Lifecycle,
    error: Option<Problem>,
}

impl RequestContext {
    pub fn new(parts: &Parts, params: PathParams, app: Arc<AppContext>) -> Self {
        // An undecodable query behaves like an empty one; actions reject
        // missing required values themselves.
        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .unwrap_or_default();

        Self {
            request_id: parts.extensions.get::<RequestId>().cloned(),
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            params,
            query,
            app,
            state: Lifecycle::Created,
            error: None,
        }
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Parse a path parameter, reporting a validation problem on failure.
    pub fn parse_param<T: FromStr>(&self, name: &str, expected: &str) -> Result<T, Problem> {
        let raw = self
            .param(name)
            .ok_or_else(|| Problem::bad_request(name, "missing"))?;
        raw.parse()
            .map_err(|_| Problem::bad_request(name, format!("expected {expected}")))
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn error(&self) -> Option<&Problem> {
        self.error.as_ref()
    }

    /// Move to `to`; invalid transitions are refused and logged.
    pub(crate) fn transition(&mut self, to: Lifecycle) -> bool {
        if self.state.can_transition(to) {
            self.state = to;
            true
        } else {
            tracing::error!(from = %self.state, to = %to, "Invalid action lifecycle transition");
            false
        }
    }

    /// Record an error and move to `Failed`.
    pub(crate) fn fail(&mut self, problem: Problem) {
        self.transition(Lifecycle::Failed);
        self.error = Some(problem);
    }

    pub(crate) fn take_error(&mut self) -> Option<Problem> {
        self.error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        use Lifecycle::*;
        assert!(Created.can_transition(Prepared));
        assert!(Prepared.can_transition(Executed));
        assert!(Executed.can_transition(Responded));
    }

    #[test]
    fn failure_transitions() {
        use Lifecycle::*;
        assert!(Created.can_transition(Failed));
        assert!(Prepared.can_transition(Failed));
        assert!(Failed.can_transition(Responded));
        assert!(!Responded.can_transition(Failed));
        assert!(!Executed.can_transition(Prepared));
        assert!(!Created.can_transition(Executed));
        assert!(!Responded.can_transition(Responded));
    }

    #[test]
    fn params_lookup() {
        let mut params = PathParams::new();
        params.push("account_id", "GABC");
        assert_eq!(params.get("account_id"), Some("GABC"));
        assert_eq!(params.get("id"), None);
        assert_eq!(params.len(), 1);
    }
}
