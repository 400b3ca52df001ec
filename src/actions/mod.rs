//! Actions: the unit of work behind every route.
//!
//! # Data Flow
//! ```text
//! Router match → ActionFactory → Box<dyn Action>
//!     → prepare(&RequestContext)      validate inputs, fill working state
//!     → execute(&RequestContext)      query the ledger source
//!     → dispatch                      Reply or Problem → HTTP response
//! ```
//!
//! # Design Decisions
//! - One contract for every variant; `dispatch` never inspects which action runs
//! - Expected failures are `Problem` values recorded on the context
//! - Panics are left to the recoverer middleware

pub mod accounts;
pub mod context;
pub mod dispatch;
pub mod errors;
pub mod ledgers;
pub mod metrics;
pub mod offers;
pub mod operations;
pub mod params;
pub mod payments;
pub mod problem;
pub mod root;
pub mod stream;
#[cfg(test)]
pub(crate) mod testing;
pub mod transactions;

use async_trait::async_trait;
use axum::response::Response;
use serde::Serialize;

pub use context::{Lifecycle, PathParams, RequestContext};
pub use dispatch::dispatch;
pub use problem::{Problem, ProblemBody};

/// Two-phase contract implemented by every route handler.
#[async_trait]
pub trait Action: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Validate and extract inputs. Must not produce a response.
    fn prepare(&mut self, ctx: &RequestContext) -> Result<(), Problem>;

    /// Produce the result, usually by querying the ledger source.
    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem>;
}

/// Constructor stored in the route table.
pub type ActionFactory = fn() -> Box<dyn Action>;

/// Build an action from its default state.
pub fn factory<A>() -> Box<dyn Action>
where
    A: Action + Default + 'static,
{
    Box::<A>::default()
}

/// Successful result of `execute`.
#[derive(Debug)]
pub enum Reply {
    /// JSON resource rendered with `200 OK`.
    Resource(serde_json::Value),
    /// Long-lived response whose body outlives the handler.
    Stream(Response),
}

impl Reply {
    pub fn resource<T: Serialize>(value: &T) -> Result<Self, Problem> {
        Ok(Reply::Resource(serde_json::to_value(value)?))
    }
}

/// Response extension marking a streaming body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Streaming;
