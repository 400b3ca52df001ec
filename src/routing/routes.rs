//! The API route table.

use crate::actions::accounts::{AccountIndex, AccountShow};
use crate::actions::errors::NotImplemented;
use crate::actions::ledgers::{LedgerIndex, LedgerShow};
use crate::actions::metrics::MetricsReport;
use crate::actions::offers::OffersByAccount;
use crate::actions::operations::{OperationIndex, OperationShow};
use crate::actions::payments::PaymentsIndex;
use crate::actions::root::Root;
use crate::actions::stream::Stream;
use crate::actions::transactions::{TransactionIndex, TransactionShow};
use crate::actions::{factory, ActionFactory};
use crate::config::RoutesConfig;
use crate::routing::{RouteError, Router};

/// Build the route table. Built once at startup, read-only afterwards.
pub fn install_actions(config: &RoutesConfig) -> Result<Router, RouteError> {
    let mut router = Router::new();

    // Served unless experimental routes are enabled.
    let stub = |action: ActionFactory| -> ActionFactory {
        if config.experimental {
            action
        } else {
            factory::<NotImplemented>
        }
    };

    router
        .get("/", factory::<Root>)?
        .get("/metrics", factory::<MetricsReport>)?
        .get("/ledgers", factory::<LedgerIndex>)?
        .get("/ledgers/:id", factory::<LedgerShow>)?
        .get("/ledgers/:ledger_id/transactions", stub(factory::<TransactionIndex>))?
        .get("/ledgers/:ledger_id/operations", stub(factory::<OperationIndex>))?
        .get("/ledgers/:ledger_id/effects", factory::<NotImplemented>)?
        .get("/accounts", stub(factory::<AccountIndex>))?
        .get("/accounts/:id", factory::<AccountShow>)?
        .get("/accounts/:account_id/transactions", stub(factory::<TransactionIndex>))?
        .get("/accounts/:account_id/operations", stub(factory::<OperationIndex>))?
        .get("/accounts/:account_id/effects", factory::<NotImplemented>)?
        .get("/transactions", stub(factory::<TransactionIndex>))?
        .get("/transactions/:id", stub(factory::<TransactionShow>))?
        .get("/transactions/:tx_id/operations", stub(factory::<OperationIndex>))?
        .get("/transactions/:tx_id/effects", factory::<NotImplemented>)?
        .get("/operations", stub(factory::<OperationIndex>))?
        .get("/operations/:id", stub(factory::<OperationShow>))?
        .get("/operations/:tx_id/effects", factory::<NotImplemented>)?
        .get("/stream", factory::<Stream>)?;

    if config.experimental {
        router
            .get("/accounts/:account_id/offers", factory::<OffersByAccount>)?
            .get("/accounts/:account_id/payments", factory::<PaymentsIndex>)?
            .get("/payments", factory::<PaymentsIndex>)?;
    }

    tracing::info!(
        routes = router.len(),
        experimental = config.experimental,
        "Route table installed"
    );
    Ok(router)
}
