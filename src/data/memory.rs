//! In-memory ledger source.
//!
//! Backs the development binary and the test suite. Ledger closes are fanned
//! out to subscribers through a broadcast channel.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use super::types::{
    Account, DataError, DataResult, Ledger, Offer, Operation, Order, PageQuery, Paged, Scope,
    Transaction,
};
use super::{LedgerSource, LedgerStream};

/// Events buffered per subscriber before it is considered lagging.
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Default)]
struct Store {
    ledgers: BTreeMap<u32, Ledger>,
    accounts: BTreeMap<String, Account>,
    transactions: Vec<Transaction>,
    operations: Vec<Operation>,
    offers: Vec<Offer>,
}

/// Thread-safe in-memory ledger history.
#[derive(Debug)]
pub struct InMemoryLedgerSource {
    store: RwLock<Store>,
    events: broadcast::Sender<DataResult<Ledger>>,
}

impl InMemoryLedgerSource {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            store: RwLock::new(Store::default()),
            events,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a closed ledger and notify subscribers.
    pub fn close_ledger(&self, ledger: Ledger) {
        self.write().ledgers.insert(ledger.sequence, ledger.clone());
        // No subscribers is fine.
        let _ = self.events.send(Ok(ledger));
    }

    /// Push an upstream failure to every live subscriber.
    pub fn interrupt(&self, error: DataError) {
        let _ = self.events.send(Err(error));
    }

    pub fn insert_account(&self, account: Account) {
        self.write().accounts.insert(account.id.clone(), account);
    }

    pub fn insert_transaction(&self, transaction: Transaction) {
        self.write().transactions.push(transaction);
    }

    pub fn insert_operation(&self, operation: Operation) {
        self.write().operations.push(operation);
    }

    pub fn insert_offer(&self, offer: Offer) {
        self.write().offers.push(offer);
    }

    /// Number of live ledger subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }
}

impl Default for InMemoryLedgerSource {
    fn default() -> Self {
        Self::new()
    }
}

fn paginate<'a, T>(items: impl Iterator<Item = &'a T>, page: &PageQuery) -> Vec<T>
where
    T: Paged + Clone + 'a,
{
    let mut selected: Vec<T> = items
        .filter(|item| match (page.cursor, page.order) {
            (None, _) => true,
            (Some(cursor), Order::Asc) => item.paging_token() > cursor,
            (Some(cursor), Order::Desc) => item.paging_token() < cursor,
        })
        .cloned()
        .collect();

    selected.sort_by_key(Paged::paging_token);
    if page.order == Order::Desc {
        selected.reverse();
    }
    selected.truncate(page.limit as usize);
    selected
}

fn transaction_in_scope(tx: &Transaction, scope: &Scope) -> bool {
    match scope {
        Scope::All => true,
        Scope::Account(account) => &tx.source_account == account,
        Scope::Ledger(sequence) => tx.ledger == *sequence,
        Scope::Transaction(id) => &tx.id == id,
    }
}

fn operation_in_scope(op: &Operation, scope: &Scope) -> bool {
    match scope {
        Scope::All => true,
        Scope::Account(account) => op.involves(account),
        Scope::Ledger(sequence) => op.ledger == *sequence,
        Scope::Transaction(id) => &op.transaction_id == id,
    }
}

#[async_trait]
impl LedgerSource for InMemoryLedgerSource {
    async fn latest_ledger(&self) -> DataResult<Option<Ledger>> {
        Ok(self.read().ledgers.values().next_back().cloned())
    }

    async fn ledgers(&self, page: &PageQuery) -> DataResult<Vec<Ledger>> {
        Ok(paginate(self.read().ledgers.values(), page))
    }

    async fn ledger(&self, sequence: u32) -> DataResult<Option<Ledger>> {
        Ok(self.read().ledgers.get(&sequence).cloned())
    }

    async fn accounts(&self, page: &PageQuery) -> DataResult<Vec<Account>> {
        Ok(paginate(self.read().accounts.values(), page))
    }

    async fn account(&self, id: &str) -> DataResult<Option<Account>> {
        Ok(self.read().accounts.get(id).cloned())
    }

    async fn transactions(&self, scope: &Scope, page: &PageQuery) -> DataResult<Vec<Transaction>> {
        let store = self.read();
        let matching = store
            .transactions
            .iter()
            .filter(|tx| transaction_in_scope(tx, scope));
        Ok(paginate(matching, page))
    }

    async fn transaction(&self, id: &str) -> DataResult<Option<Transaction>> {
        Ok(self.read().transactions.iter().find(|tx| tx.id == id).cloned())
    }

    async fn operations(&self, scope: &Scope, page: &PageQuery) -> DataResult<Vec<Operation>> {
        let store = self.read();
        let matching = store
            .operations
            .iter()
            .filter(|op| operation_in_scope(op, scope));
        Ok(paginate(matching, page))
    }

    async fn operation(&self, id: u64) -> DataResult<Option<Operation>> {
        Ok(self.read().operations.iter().find(|op| op.id == id).cloned())
    }

    async fn payments(&self, scope: &Scope, page: &PageQuery) -> DataResult<Vec<Operation>> {
        let store = self.read();
        let matching = store
            .operations
            .iter()
            .filter(|op| op.is_payment() && operation_in_scope(op, scope));
        Ok(paginate(matching, page))
    }

    async fn offers(&self, account: &str, page: &PageQuery) -> DataResult<Vec<Offer>> {
        let store = self.read();
        let matching = store.offers.iter().filter(|offer| offer.seller == account);
        Ok(paginate(matching, page))
    }

    fn subscribe(&self) -> LedgerStream {
        BroadcastStream::new(self.events.subscribe())
            .map(|item| match item {
                Ok(event) => event,
                Err(BroadcastStreamRecvError::Lagged(missed)) => Err(DataError::Lagged(missed)),
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(sequence: u32) -> Ledger {
        Ledger {
            sequence,
            hash: format!("{:064x}", sequence),
            prev_hash: None,
            transaction_count: 0,
            operation_count: 0,
            closed_at: 1_700_000_000 + u64::from(sequence),
        }
    }

    #[tokio::test]
    async fn pages_in_both_directions() {
        let source = InMemoryLedgerSource::new();
        for sequence in 1..=5 {
            source.close_ledger(ledger(sequence));
        }

        let asc = PageQuery {
            cursor: Some(2),
            order: Order::Asc,
            limit: 2,
        };
        let page: Vec<u32> = source.ledgers(&asc).await.unwrap().iter().map(|l| l.sequence).collect();
        assert_eq!(page, vec![3, 4]);

        let desc = PageQuery {
            cursor: Some(4),
            order: Order::Desc,
            limit: 10,
        };
        let page: Vec<u32> = source.ledgers(&desc).await.unwrap().iter().map(|l| l.sequence).collect();
        assert_eq!(page, vec![3, 2, 1]);

        assert_eq!(source.latest_ledger().await.unwrap().map(|l| l.sequence), Some(5));
    }

    #[tokio::test]
    async fn subscription_is_released_on_drop() {
        let source = InMemoryLedgerSource::new();
        let mut stream = source.subscribe();
        assert_eq!(source.subscriber_count(), 1);

        source.close_ledger(ledger(9));
        let received = stream.next().await.unwrap().unwrap();
        assert_eq!(received.sequence, 9);

        drop(stream);
        assert_eq!(source.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn interrupt_reaches_subscribers() {
        let source = InMemoryLedgerSource::new();
        let mut stream = source.subscribe();
        source.interrupt(DataError::Unavailable("core offline".into()));

        let received = stream.next().await.unwrap();
        assert_eq!(received, Err(DataError::Unavailable("core offline".into())));
    }
}
