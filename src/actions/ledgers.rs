use async_trait::async_trait;

use crate::actions::params::{self, Page};
use crate::actions::{Action, Problem, Reply, RequestContext};
use crate::data::PageQuery;

/// `GET /ledgers`
#[derive(Debug, Default)]
pub struct LedgerIndex {
    page: PageQuery,
}

#[async_trait]
impl Action for LedgerIndex {
    fn name(&self) -> &'static str {
        "ledger_index"
    }

    fn prepare(&mut self, ctx: &RequestContext) -> Result<(), Problem> {
        self.page = params::page_query(ctx)?;
        Ok(())
    }

    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
        let records = ctx.app().source().ledgers(&self.page).await?;
        Page::new(ctx.uri().path(), &self.page, records).into_reply()
    }
}

/// `GET /ledgers/:id`
#[derive(Debug, Default)]
pub struct LedgerShow {
    sequence: u32,
}

#[async_trait]
impl Action for LedgerShow {
    fn name(&self) -> &'static str {
        "ledger_show"
    }

    fn prepare(&mut self, ctx: &RequestContext) -> Result<(), Problem> {
        self.sequence = params::ledger_sequence(ctx, "id")?;
        Ok(())
    }

    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
        match ctx.app().source().ledger(self.sequence).await? {
            Some(ledger) => Reply::resource(&ledger),
            None => Err(Problem::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::{app, context, context_with, ledger};
    use crate::data::InMemoryLedgerSource;
    use std::sync::Arc;

    fn seeded() -> Arc<InMemoryLedgerSource> {
        let source = Arc::new(InMemoryLedgerSource::new());
        for sequence in 40..=45 {
            source.close_ledger(ledger(sequence));
        }
        source
    }

    #[tokio::test]
    async fn show_finds_ledger() {
        let ctx = context_with(app(seeded()), "/ledgers/42", &[("id", "42")]);
        let mut action = LedgerShow::default();
        action.prepare(&ctx).unwrap();
        assert_eq!(action.sequence, 42);

        let Reply::Resource(body) = action.execute(&ctx).await.unwrap() else {
            panic!("expected a resource");
        };
        assert_eq!(body["sequence"], 42);
    }

    #[tokio::test]
    async fn show_rejects_non_numeric_id() {
        let ctx = context("/ledgers/abc", &[("id", "abc")]);
        let error = LedgerShow::default().prepare(&ctx).unwrap_err();
        assert!(matches!(error, Problem::BadRequest { ref param, .. } if param == "id"));
    }

    #[tokio::test]
    async fn show_missing_ledger_is_not_found() {
        let ctx = context_with(app(seeded()), "/ledgers/7", &[("id", "7")]);
        let mut action = LedgerShow::default();
        action.prepare(&ctx).unwrap();
        assert_eq!(action.execute(&ctx).await.unwrap_err(), Problem::NotFound);
    }

    #[tokio::test]
    async fn index_pages_descending() {
        let ctx = context_with(app(seeded()), "/ledgers?order=desc&limit=3", &[]);
        let mut action = LedgerIndex::default();
        action.prepare(&ctx).unwrap();

        let Reply::Resource(body) = action.execute(&ctx).await.unwrap() else {
            panic!("expected a resource");
        };
        let sequences: Vec<u64> = body["_embedded"]["records"]
            .as_array()
            .unwrap()
            .iter()
            .map(|record| record["sequence"].as_u64().unwrap())
            .collect();
        assert_eq!(sequences, vec![45, 44, 43]);
        assert_eq!(
            body["_links"]["next"]["href"],
            "/ledgers?order=desc&limit=3&cursor=43"
        );
    }
}
