use async_trait::async_trait;
use serde::Serialize;

use crate::actions::{Action, Problem, Reply, RequestContext};

#[derive(Debug, Serialize)]
struct Link {
    href: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    templated: bool,
}

impl Link {
    fn new(href: &'static str) -> Self {
        Self {
            href,
            templated: false,
        }
    }

    fn templated(href: &'static str) -> Self {
        Self {
            href,
            templated: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct RootLinks {
    account: Link,
    ledger: Link,
    ledgers: Link,
    metrics: Link,
    stream: Link,
}

#[derive(Debug, Serialize)]
struct RootResource {
    #[serde(rename = "_links")]
    links: RootLinks,
    horizon_version: &'static str,
    network_passphrase: String,
    history_latest_ledger: Option<u32>,
}

/// Server information and entry points into the API.
#[derive(Debug, Default)]
pub struct Root;

#[async_trait]
impl Action for Root {
    fn name(&self) -> &'static str {
        "root"
    }

    fn prepare(&mut self, _ctx: &RequestContext) -> Result<(), Problem> {
        Ok(())
    }

    async fn execute(&mut self, ctx: &RequestContext) -> Result<Reply, Problem> {
        let latest = ctx.app().source().latest_ledger().await?;

        Reply::resource(&RootResource {
            links: RootLinks {
                account: Link::templated("/accounts/{account_id}"),
                ledger: Link::templated("/ledgers/{sequence}"),
                ledgers: Link::new("/ledgers"),
                metrics: Link::new("/metrics"),
                stream: Link::new("/stream"),
            },
            horizon_version: env!("CARGO_PKG_VERSION"),
            network_passphrase: ctx.app().config().network.passphrase.clone(),
            history_latest_ledger: latest.map(|ledger| ledger.sequence),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::{app, context_with, ledger};
    use crate::data::InMemoryLedgerSource;
    use std::sync::Arc;

    #[tokio::test]
    async fn reports_latest_ledger_and_network() {
        let source = Arc::new(InMemoryLedgerSource::new());
        source.close_ledger(ledger(3));
        source.close_ledger(ledger(4));
        let ctx = context_with(app(source), "/", &[]);

        let Reply::Resource(body) = Root.execute(&ctx).await.unwrap() else {
            panic!("expected a resource");
        };
        assert_eq!(body["history_latest_ledger"], 4);
        assert_eq!(body["network_passphrase"], "Test SDF Network ; September 2015");
        assert_eq!(body["_links"]["ledgers"]["href"], "/ledgers");
        assert_eq!(body["_links"]["account"]["templated"], true);
        assert!(body["_links"]["ledgers"].get("templated").is_none());
    }
}
