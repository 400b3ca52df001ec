use async_trait::async_trait;

use crate::actions::params::{self, Page};
use crate::actions::{Action, Problem, Reply, RequestContext};
use crate::data::{PageQuery, Scope};

/// `GET /transactions`, optionally scoped by account or ledger.
#[derive(Debug, Default)]
pub struct TransactionIndex {
    scope: Scope,
    page: PageQuery,
}

#[async_trait]
impl Action for TransactionIndex {
    fn name(&self) -> &'static str {
        "transaction_index"
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
            .transactions(&self.scope, &self.page)
            .await?;
        Page::new(ctx.uri().path(), &self.page, records).into_reply()
    }
}

/// `GET /transactions/:id`
#[derive(Debug, Default)]
pub struct TransactionShow {
    id: String,
}

#[async_trait]
impl Action for TransactionShow {
    fn name(&self) -> &'static str {
        "transaction_show"
    }

    fn prepare(&mut self, ctx: &RequestContext) -> Result<(), Problem> {
        self.id = params::transaction_id(ctx, "id")?;
        Ok(())
    }

    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
        match ctx.app().source().transaction(&self.id).await? {
            Some(transaction) => Reply::resource(&transaction),
            None => Err(Problem::NotFound),
        }
    }
}
