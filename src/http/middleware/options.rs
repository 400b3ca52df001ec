//! Automatic `OPTIONS` responses.
//!
//! The matched action never runs, but the request is still timed and booked
//! as one request, like everything else that enters the chain.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::app::SharedApp;
use crate::http::middleware::cors;
use crate::observability::Outcome;
use crate::routing::Router;

/// State for [`automatic_options`]: the route table and the registry owner.
pub type OptionsState = (Arc<Router>, SharedApp);

/// Answer `OPTIONS` from the route table.
pub async fn automatic_options(
    State((routes, app)): State<OptionsState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    let mut timer = app.metrics().start_request();
    let response = preflight(&routes, request.uri().path());
    timer.settle(Outcome::from_status(response.status()));
    response
}

fn preflight(routes: &Router, path: &str) -> Response {
    let allow = allow_header(&routes.allowed_methods(path));
    tracing::debug!(allow = %allow, "Answering OPTIONS");

    let mut response = StatusCode::OK.into_response();
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    cors::preflight(response.headers_mut());
    response
}

fn allow_header(registered: &[Method]) -> String {
    let mut methods: Vec<&str> = registered.iter().map(Method::as_str).collect();
    if registered.contains(&Method::GET) && !registered.contains(&Method::HEAD) {
        methods.push(Method::HEAD.as_str());
    }
    methods.push(Method::OPTIONS.as_str());
    methods.join(", ")
}
