use async_trait::async_trait;

use crate::actions::params::{self, Page};
use crate::actions::{Action, Problem, Reply, RequestContext};
use crate::data::{PageQuery, Scope};

/// `GET /operations`, optionally scoped by account, ledger or transaction.
#[derive(Debug, Default)]
pub struct OperationIndex {
    scope: Scope,
    page: PageQuery,
}

#[async_trait]
impl Action for OperationIndex {
    fn name(&self) -> &'static str {
        "operation_index"
    }

    fn prepare(&mut self, ctx: &RequestContext) -> Result<(), Problem> {
        self.scope = params::scope(ctx)?;
        self.page = params::page_query(ctx)?;
        Ok(())
    }

    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
        let records = ctx
            .app()
            .source()
            .operations(&self.scope, &self.page)
            .await?;
        Page::new(ctx.uri().path(), &self.page, records).into_reply()
    }
}

/// `GET /operations/:id`
#[derive(Debug, Default)]
pub struct OperationShow {
    id: u64,
}

#[async_trait]
impl Action for OperationShow {
    fn name(&self) -> &'static str {
        "operation_show"
    }

    fn prepare(&mut self, ctx: &RequestContext) -> Result<(), Problem> {
        self.id = params::operation_id(ctx, "id")?;
        Ok(())
    }

    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
        match ctx.app().source().operation(self.id).await? {
            Some(operation) => Reply::resource(&operation),
            None => Err(Problem::NotFound),
        }
    }
}
