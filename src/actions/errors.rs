//! Terminal actions that only ever produce an error.

use async_trait::async_trait;

use crate::actions::{Action, Problem, Reply, RequestContext};

macro_rules! problem_action {
    ($(#[$doc:meta])* $name:ident, $label:literal, $problem:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default)]
        pub struct $name;

        #[async_trait]
        impl Action for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn prepare(&mut self, _ctx: &RequestContext) -> Result<(), Problem> {
                Ok(())
            }

            async fn execute(&mut self, _ctx: &RequestContext) -> Result<Reply, Problem> {
                Err($problem)
            }
        }
    };
}

problem_action!(
    /// Fallback for unmatched routes.
    NotFound,
    "not_found",
    Problem::NotFound
);

problem_action!(
    /// Routes that are reserved but not served yet.
    NotImplemented,
    "not_implemented",
    Problem::NotImplemented
);

problem_action!(
    /// Substituted for the matched action when the client is throttled.
    RateLimitExceeded,
    "rate_limit_exceeded",
    Problem::RateLimitExceeded
);
