use async_trait::async_trait;

use crate::actions::params::{self, Page};
use crate::actions::{Action, Problem, Reply, RequestContext};
use crate::data::PageQuery;

/// `GET /accounts`
#[derive(Debug, Default)]
pub struct AccountIndex {
    page: PageQuery,
}

#[async_trait]
impl Action for AccountIndex {
    fn name(&self) -> &'static str {
        "account_index"
    }

    fn prepare(&mut self, ctx: &RequestContext) -> Result<(), Problem> {
        self.page = params::page_query(ctx)?;
        Ok(())
    }

    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
        let records = ctx.app().source().accounts(&self.page).await?;
        Page::new(ctx.uri().path(), &self.page, records).into_reply()
    }
}

/// `GET /accounts/:id`
#[derive(Debug, Default)]
pub struct AccountShow {
    id: String,
}

#[async_trait]
impl Action for AccountShow {
    fn name(&self) -> &'static str {
        "account_show"
    }

    fn prepare(&mut self, ctx: &RequestContext) -> Result<(), Problem> {
        self.id = params::account_id(ctx, "id")?;
        Ok(())
    }

    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
        match ctx.app().source().account(&self.id).await? {
            Some(account) => Reply::resource(&account),
            None => Err(Problem::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::{app, context, context_with};
    use crate::data::{Account, Asset, Balance, InMemoryLedgerSource};
    use std::sync::Arc;

    fn account(id: &str, paging_token: u64) -> Account {
        Account {
            id: id.to_string(),
            paging_token,
            sequence: 1,
            balances: vec![Balance {
                asset: Asset::Native,
                amount: "100.0000000".into(),
            }],
        }
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let ctx = context("/accounts/GABCD", &[("id", "GABCD")]);
        let mut action = AccountShow::default();
        action.prepare(&ctx).unwrap();
        assert_eq!(action.execute(&ctx).await.unwrap_err(), Problem::NotFound);
    }

    #[tokio::test]
    async fn known_account_renders_balances() {
        let source = Arc::new(InMemoryLedgerSource::new());
        source.insert_account(account("GAAA", 1));
        let ctx = context_with(app(source), "/accounts/GAAA", &[("id", "GAAA")]);

        let mut action = AccountShow::default();
        action.prepare(&ctx).unwrap();
        let Reply::Resource(body) = action.execute(&ctx).await.unwrap() else {
            panic!("expected a resource");
        };
        assert_eq!(body["id"], "GAAA");
        assert_eq!(body["balances"][0]["asset_type"], "native");
    }

    #[test]
    fn malformed_account_id_is_rejected() {
        let ctx = context("/accounts/not-an-id", &[("id", "not-an-id")]);
        assert!(AccountShow::default().prepare(&ctx).is_err());
    }

    #[tokio::test]
    async fn index_lists_accounts() {
        let source = Arc::new(InMemoryLedgerSource::new());
        source.insert_account(account("GAAA", 1));
        source.insert_account(account("GBBB", 2));
        let ctx = context_with(app(source), "/accounts", &[]);

        let mut action = AccountIndex::default();
        action.prepare(&ctx).unwrap();
        let Reply::Resource(body) = action.execute(&ctx).await.unwrap() else {
            panic!("expected a resource");
        };
        assert_eq!(body["_embedded"]["records"].as_array().unwrap().len(), 2);
    }
}
