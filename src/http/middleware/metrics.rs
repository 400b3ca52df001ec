//! Per-request metrics instrumentation.
//!
//! # Responsibilities
//! - Time every dispatched request into `requests.total`
//! - Book exactly one of `requests.succeeded` / `requests.failed`
//!
//! # Design Decisions
//! - The timer records on drop; a request that unwinds is booked as failed
//! - Streaming responses carry the timer in their body, so the sample spans
//!   the whole connection and a body error flips the outcome to failed

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use futures_util::StreamExt;

use crate::actions::Streaming;
use crate::app::SharedApp;
use crate::observability::Outcome;

pub async fn record(request: Request, next: Next) -> Response {
    let Some(app) = request.extensions().get::<SharedApp>().cloned() else {
        tracing::warn!("Metrics stage reached without an application context");
        return next.run(request).await;
    };

    let mut timer = app.metrics().start_request();
    let response = next.run(request).await;
    timer.settle(Outcome::from_status(response.status()));

    if response.extensions().get::<Streaming>().is_none() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let body = body.into_data_stream().map(move |chunk| {
        if chunk.is_err() {
            timer.settle(Outcome::Failed);
        }
        chunk
    });
    Response::from_parts(parts, Body::from_stream(body))
}
