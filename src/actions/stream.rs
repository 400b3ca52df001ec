//! Server-Sent Events stream of closed ledgers.
//!
//! # Responsibilities
//! - Subscribe to the ledger source and forward each close as a `ledger` event
//! - Keep idle connections alive with comment frames
//! - End on client disconnect, upstream error, shutdown or max lifetime
//!
//! # Design Decisions
//! - `execute` returns as soon as the response is built; the body owns the
//!   subscription, so dropping the body (client gone) releases it
//! - Nothing is emitted after the first upstream error

use std::future::ready;
use std::time::Duration;

use async_trait::async_trait;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use futures_util::StreamExt;
use thiserror::Error;

use crate::actions::{Action, Problem, Reply, RequestContext};
use crate::data::DataError;

/// Failure that terminates an open stream.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("failed to encode event: {0}")]
    Encode(#[source] axum::Error),
}

/// `GET /stream`
#[derive(Debug, Default)]
pub struct Stream {
    keep_alive: Duration,
    max_lifetime: Duration,
}

#[async_trait]
impl Action for Stream {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn prepare(&mut self, ctx: &RequestContext) -> Result<(), Problem> {
        let streaming = &ctx.app().config().streaming;
        self.keep_alive = Duration::from_secs(streaming.keep_alive_secs);
        self.max_lifetime = Duration::from_secs(streaming.max_lifetime_secs);
        Ok(())
    }

    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
        let updates = ctx.app().source().subscribe();
        let mut shutdown = ctx.app().shutdown().subscribe();
        let max_lifetime = self.max_lifetime;

        let stop = async move {
            tokio::select! {
                _ = tokio::time::sleep(max_lifetime) => {
                    tracing::debug!("Stream reached its maximum lifetime");
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Stream closed for shutdown");
                }
            }
        };

        let events = updates
            .take_until(stop)
            .map(|update| -> Result<Event, StreamError> {
                let ledger = update?;
                Event::default()
                    .event("ledger")
                    .id(ledger.sequence.to_string())
                    .json_data(&ledger)
                    .map_err(StreamError::Encode)
            })
            .scan(false, |failed: &mut bool, event| {
                if *failed {
                    return ready(None);
                }
                if let Err(error) = &event {
                    tracing::warn!(error = %error, "Ledger stream failed");
                    *failed = true;
                }
                ready(Some(event))
            });

        tracing::debug!(
            request_id = ?ctx.request_id().map(|id| id.as_str()),
            max_lifetime_secs = max_lifetime.as_secs(),
            "Ledger stream opened"
        );

        let sse = Sse::new(events).keep_alive(KeepAlive::new().interval(self.keep_alive));
        Ok(Reply::Stream(sse.into_response()))
    }
}
