use async_trait::async_trait;

use crate::actions::params::{self, Page};
use crate::actions::{Action, Problem, Reply, RequestContext};
use crate::data::{PageQuery, Scope};

/// `GET /payments` and `GET /accounts/:account_id/payments`
#[derive(Debug, Default)]
pub struct PaymentsIndex {
    scope: Scope,
    page: PageQuery,
}

#[async_trait]
impl Action for PaymentsIndex {
    fn name(&self) -> &'static str {
        "payments_index"
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
            .payments(&self.scope, &self.page)
            .await?;
        Page::new(ctx.uri().path(), &self.page, records).into_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::{app, context_with};
    use crate::data::{Asset, InMemoryLedgerSource, Operation, OperationBody};
    use std::sync::Arc;

    #[tokio::test]
    async fn only_fund_movements_are_listed() {
        let source = Arc::new(InMemoryLedgerSource::new());
        source.insert_operation(Operation {
            id: 1,
            transaction_id: "01".into(),
            ledger: 2,
            source_account: "GAAA".into(),
            body: OperationBody::CreateAccount {
                account: "GBBB".into(),
                starting_balance: "20.0".into(),
            },
        });
        source.insert_operation(Operation {
            id: 2,
            transaction_id: "02".into(),
            ledger: 3,
            source_account: "GBBB".into(),
            body: OperationBody::SetOptions,
        });
        source.insert_operation(Operation {
            id: 3,
            transaction_id: "03".into(),
            ledger: 4,
            source_account: "GCCC".into(),
            body: OperationBody::Payment {
                from: "GCCC".into(),
                to: "GBBB".into(),
                asset: Asset::Native,
                amount: "5.0".into(),
            },
        });

        let ctx = context_with(
            app(source),
            "/accounts/GBBB/payments",
            &[("account_id", "GBBB")],
        );
        let mut action = PaymentsIndex::default();
        action.prepare(&ctx).unwrap();
        let Reply::Resource(body) = action.execute(&ctx).await.unwrap() else {
            panic!("expected a resource");
        };
        let types: Vec<&str> = body["_embedded"]["records"]
            .as_array()
            .unwrap()
            .iter()
            .map(|record| record["type"].as_str().unwrap())
            .collect();
        assert_eq!(types, vec!["create_account", "payment"]);
    }
}
