//! Error responses.
//!
//! Every expected failure an action can report is a [`Problem`]. Problems
//! are recorded on the request context and rendered once, by the dispatcher,
//! as `application/problem+json`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::data::DataError;

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Problem {
    /// Malformed input detected while preparing an action.
    #[error("invalid parameter '{param}': {reason}")]
    BadRequest { param: String, reason: String },

    #[error("resource not found")]
    NotFound,

    #[error("resource not yet implemented")]
    NotImplemented,

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// Unexpected fault. The message is logged, never rendered.
    #[error("internal error: {0}")]
    ServerError(String),
}

impl Problem {
    pub fn bad_request(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Problem::BadRequest {
            param: param.into(),
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Problem::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Problem::NotFound => StatusCode::NOT_FOUND,
            Problem::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Problem::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Problem::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable problem type.
    pub fn kind(&self) -> &'static str {
        match self {
            Problem::BadRequest { .. } => "bad_request",
            Problem::NotFound => "not_found",
            Problem::NotImplemented => "not_implemented",
            Problem::RateLimitExceeded => "rate_limit_exceeded",
            Problem::ServerError(_) => "server_error",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Problem::BadRequest { .. } => "Bad Request",
            Problem::NotFound => "Resource Missing",
            Problem::NotImplemented => "Resource Not Yet Implemented",
            Problem::RateLimitExceeded => "Rate Limit Exceeded",
            Problem::ServerError(_) => "Internal Server Error",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Problem::BadRequest { param, reason } => {
                format!("The request has an invalid parameter '{param}': {reason}.")
            }
            Problem::NotFound => "The resource at the requested URL was not found. Either the URL \
                 is not valid or no data matches the parameters provided."
                .to_string(),
            Problem::NotImplemented => "The requested URL will point to a valid resource, but \
                 the resource has not been implemented yet."
                .to_string(),
            Problem::RateLimitExceeded => "The rate limit for this client has been exceeded. \
                 Wait before retrying."
                .to_string(),
            Problem::ServerError(_) => "An error occurred while processing this request. The \
                 failure has been logged with the request id."
                .to_string(),
        }
    }

    pub fn body(&self, instance: Option<&str>) -> ProblemBody {
        ProblemBody {
            kind: self.kind(),
            title: self.title(),
            status: self.status().as_u16(),
            detail: self.detail(),
            instance: instance.map(str::to_string),
        }
    }

    /// Render with the request id as the problem instance.
    pub fn into_response_for(self, instance: Option<&str>) -> Response {
        let body = self.body(instance);
        let mut response = (self.status(), axum::Json(body)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PROBLEM_CONTENT_TYPE),
        );
        response
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        self.into_response_for(None)
    }
}

impl From<DataError> for Problem {
    fn from(error: DataError) -> Self {
        Problem::ServerError(error.to_string())
    }
}

impl From<serde_json::Error> for Problem {
    fn from(error: serde_json::Error) -> Self {
        Problem::ServerError(format!("failed to encode resource: {error}"))
    }
}

/// Uniform error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemBody {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}
