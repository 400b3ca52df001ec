//! Data-access boundary.
//!
//! Actions never touch storage directly; they query a [`LedgerSource`] taken
//! from the application context during `execute`.
//!
//! # Data Flow
//! ```text
//! Action::execute
//!     → AppContext::source() (shared Arc<dyn LedgerSource>)
//!     → query (ledger, account, transactions, ...) or subscribe()
//!     → resource types (types.rs) serialized by the action
//! ```
//!
//! # Design Decisions
//! - Lookups of single resources return `Option`; absence is not an error
//! - Concurrency safety of the source is the implementation's concern
//! - `subscribe` hands out an owned stream; dropping it releases the subscription

pub mod memory;
pub mod types;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

pub use memory::InMemoryLedgerSource;
pub use types::{
    Account, Asset, Balance, DataError, DataResult, Ledger, Offer, Operation, OperationBody, Order,
    PageQuery, Paged, Scope, Transaction,
};

/// Stream of closed ledgers handed to streaming actions.
pub type LedgerStream = BoxStream<'static, DataResult<Ledger>>;

/// Read-only query interface over ledger history.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    async fn latest_ledger(&self) -> DataResult<Option<Ledger>>;

    async fn ledgers(&self, page: &PageQuery) -> DataResult<Vec<Ledger>>;

    async fn ledger(&self, sequence: u32) -> DataResult<Option<Ledger>>;

    async fn accounts(&self, page: &PageQuery) -> DataResult<Vec<Account>>;

    async fn account(&self, id: &str) -> DataResult<Option<Account>>;

    async fn transactions(&self, scope: &Scope, page: &PageQuery) -> DataResult<Vec<Transaction>>;

    async fn transaction(&self, id: &str) -> DataResult<Option<Transaction>>;

    async fn operations(&self, scope: &Scope, page: &PageQuery) -> DataResult<Vec<Operation>>;

    async fn operation(&self, id: u64) -> DataResult<Option<Operation>>;

    /// Operations that move funds (account creation and payments).
    async fn payments(&self, scope: &Scope, page: &PageQuery) -> DataResult<Vec<Operation>>;

    async fn offers(&self, account: &str, page: &PageQuery) -> DataResult<Vec<Offer>>;

    /// Subscribe to ledgers as they close.
    fn subscribe(&self) -> LedgerStream;
}
