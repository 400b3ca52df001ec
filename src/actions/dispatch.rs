//! Generic dispatch routine shared by every route.

use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::actions::{ActionFactory, Lifecycle, Problem, Reply, RequestContext, Streaming};

/// Instantiate the action, run `prepare` then `execute`, and render the result.
pub async fn dispatch(factory: ActionFactory, mut ctx: RequestContext) -> Response {
    run(factory, &mut ctx).await
}

pub(crate) async fn run(factory: ActionFactory, ctx: &mut RequestContext) -> Response {
    let mut action = factory();
    let name = action.name();
    tracing::debug!(action = name, "Dispatching action");

    let outcome = match action.prepare(ctx) {
        Ok(()) => {
            ctx.transition(Lifecycle::Prepared);
            action.execute(ctx).await
        }
        Err(problem) => Err(problem),
    };

    let response = match outcome {
        Ok(reply) => {
            ctx.transition(Lifecycle::Executed);
            render_reply(reply)
        }
        Err(problem) => {
            ctx.fail(problem);
            render_error(name, ctx)
        }
    };

    ctx.transition(Lifecycle::Responded);
    response
}

fn render_reply(reply: Reply) -> Response {
    match reply {
        Reply::Resource(value) => Json(value).into_response(),
        Reply::Stream(mut response) => {
            response.extensions_mut().insert(Streaming);
            response
        }
    }
}

fn render_error(action: &'static str, ctx: &mut RequestContext) -> Response {
    let request_id = ctx.request_id().map(|id| id.as_str().to_string());
    let problem = ctx
        .take_error()
        .unwrap_or_else(|| Problem::ServerError("failed action recorded no error".into()));

    match &problem {
        Problem::ServerError(cause) => {
            tracing::error!(action, request_id = ?request_id, error = %cause, "Action failed");
        }
        other => {
            tracing::debug!(action, status = other.status().as_u16(), problem = %other, "Action rejected request");
        }
    }

    problem.into_response_for(request_id.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::context;
    use crate::actions::{factory, Action};
    use async_trait::async_trait;
    use axum::http::StatusCode;

    #[derive(Default)]
    struct Echo;

    #[async_trait]
    impl Action for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn prepare(&mut self, _ctx: &RequestContext) -> Result<(), Problem> {
            Ok(())
        }

        async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
            Reply::resource(&serde_json::json!({ "path": ctx.uri().path() }))
        }
    }

    #[derive(Default)]
    struct Rejecting;

    #[async_trait]
    impl Action for Rejecting {
        fn name(&self) -> &'static str {
            "rejecting"
        }

        fn prepare(&mut self, _ctx: &RequestContext) -> Result<(), Problem> {
            Err(Problem::bad_request("id", "expected a number"))
        }

        async fn execute(&mut self, _ctx: &RequestContext) -> Result<Reply, Problem> {
            unreachable!("execute must not run after a failed prepare")
        }
    }

    #[derive(Default)]
    struct Missing;

    #[async_trait]
    impl Action for Missing {
        fn name(&self) -> &'static str {
            "missing"
        }

        fn prepare(&mut self, _ctx: &RequestContext) -> Result<(), Problem> {
            Ok(())
        }

        async fn execute(&mut self, _ctx: &RequestContext) -> Result<Reply, Problem> {
            Err(Problem::NotFound)
        }
    }

    #[tokio::test]
    async fn success_reaches_responded() {
        let mut ctx = context("/echo", &[]);
        let response = run(factory::<Echo>, &mut ctx).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ctx.state(), Lifecycle::Responded);
        assert!(ctx.error().is_none());
    }

    #[tokio::test]
    async fn prepare_failure_skips_execute() {
        let mut ctx = context("/reject", &[]);
        let response = run(factory::<Rejecting>, &mut ctx).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ctx.state(), Lifecycle::Responded);
    }

    #[tokio::test]
    async fn execute_failure_renders_problem() {
        let mut ctx = context("/missing", &[]);
        let response = run(factory::<Missing>, &mut ctx).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            crate::actions::problem::PROBLEM_CONTENT_TYPE
        );
    }
}
