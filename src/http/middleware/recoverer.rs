//! Panic recovery.
//!
//! A panic anywhere inside the chain becomes a `500` problem response; the
//! connection task and the process survive.
//!
//! The stage is two layers: `CatchPanicLayer` renders the 500 from the panic
//! payload alone, and [`attach_request_id`] around it stamps the request id
//! into the problem's `instance`, since the panic handler never sees the
//! request.

use std::any::Any;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tower_http::catch_panic::CatchPanicLayer;

use crate::actions::Problem;
use crate::http::middleware::cors;
use crate::http::request::RequestIdExt;

pub type RecovererLayer = CatchPanicLayer<fn(Box<dyn Any + Send + 'static>) -> Response>;

/// Marks a response rendered from a caught panic.
#[derive(Debug, Clone)]
struct Recovered(String);

pub fn layer() -> RecovererLayer {
    CatchPanicLayer::custom(recover as fn(Box<dyn Any + Send + 'static>) -> Response)
}

/// Re-render recovered responses with the request id as the problem instance.
pub async fn attach_request_id(request: Request, next: Next) -> Response {
    let id = request.request_id().cloned();
    let response = next.run(request).await;

    let recovered = response
        .extensions()
        .get::<Recovered>()
        .map(|Recovered(message)| message.clone());

    match (id, recovered) {
        (Some(id), Some(message)) => render(message, Some(id.as_str())),
        _ => response,
    }
}

fn recover(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    };

    // Runs inside the access-log span, so the request id is attached.
    tracing::error!(panic = %message, "Recovered from panic while serving request");

    render(message, None)
}

fn render(message: String, instance: Option<&str>) -> Response {
    let mut response = Problem::ServerError(message.clone()).into_response_for(instance);
    cors::allow_any_origin(response.headers_mut());
    response.extensions_mut().insert(Recovered(message));
    response
}
