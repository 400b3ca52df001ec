//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID for every request (UUID v4)
//! - Make it available to inner stages via request extensions
//! - Echo it on the response for client-side correlation
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Client-supplied `x-request-id` values are replaced, never reused

use std::fmt;
use std::task::{Context, Poll};

use axum::http::{HeaderName, HeaderValue, Request, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request ID in both directions.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Unique identifier of one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0).ok()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access the request ID attached by [`RequestIdLayer`].
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

impl<B> RequestIdExt for Response<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Layer that tags every request with a new [`RequestId`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let id = RequestId::generate();
        let header = id.header_value();

        match &header {
            Some(value) => {
                request.headers_mut().insert(X_REQUEST_ID.clone(), value.clone());
            }
            None => {
                request.headers_mut().remove(&X_REQUEST_ID);
            }
        }
        request.extensions_mut().insert(id.clone());

        let future = self.inner.call(request);
        Box::pin(async move {
            let mut response = future.await?;
            if let Some(value) = header {
                response.headers_mut().insert(X_REQUEST_ID.clone(), value);
            }
            response.extensions_mut().insert(id);
            Ok(response)
        })
    }
}
