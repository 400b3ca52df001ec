//! Application-context injection.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::app::SharedApp;

/// Attach the shared [`AppContext`](crate::app::AppContext) to the request.
pub async fn inject(State(app): State<SharedApp>, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(app);
    next.run(request).await
}
