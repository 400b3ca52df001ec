use async_trait::async_trait;

use crate::actions::{Action, Problem, Reply, RequestContext};

/// Snapshot of the request metrics registry.
#[derive(Debug, Default)]
pub struct MetricsReport;

#[async_trait]
impl Action for MetricsReport {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn prepare(&mut self, _ctx: &RequestContext) -> Result<(), Problem> {
        Ok(())
    }

    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
        Reply::resource(&ctx.app().metrics().snapshot())
    }
}
