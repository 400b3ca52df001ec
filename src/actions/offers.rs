use async_trait::async_trait;

use crate::actions::params::{self, Page};
use crate::actions::{Action, Problem, Reply, RequestContext};
use crate::data::PageQuery;

/// `GET /accounts/:account_id/offers`
#[derive(Debug, Default)]
pub struct OffersByAccount {
    account: String,
    page: PageQuery,
}

#[async_trait]
impl Action for OffersByAccount {
    fn name(&self) -> &'static str {
        "offers_by_account"
    }

    fn prepare(&mut self, ctx: &RequestContext) -> Result<(), Problem> {
        self.account = params::account_id(ctx, "account_id")?;
        self.page = params::page_query(ctx)?;
        Ok(())
    }

    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
        let records = ctx
            .app()
            .source()
            .offers(&self.account, &self.page)
            .await?;
        Page::new(ctx.uri().path(), &self.page, records).into_reply()
    }
}
