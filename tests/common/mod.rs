//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use futures_util::stream;
use horizon::config::HorizonConfig;
use horizon::data::{
    Account, DataResult, InMemoryLedgerSource, Ledger, LedgerSource, LedgerStream, Offer,
    Operation, PageQuery, Scope, Transaction,
};
use horizon::http::HttpServer;
use horizon::lifecycle::Shutdown;
use horizon::observability::MetricsSnapshot;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;

/// A server wired to an in-memory source.
pub struct TestApp {
    pub server: HttpServer,
    pub source: Arc<InMemoryLedgerSource>,
    pub shutdown: Shutdown,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(HorizonConfig::default())
    }

    pub fn with_config(config: HorizonConfig) -> Self {
        let source = Arc::new(InMemoryLedgerSource::new());
        let shutdown = Shutdown::new();
        let server = HttpServer::new(config, source.clone(), shutdown.clone()).unwrap();
        Self {
            server,
            source,
            shutdown,
        }
    }

    pub async fn request(&self, method: Method, uri: &str) -> Response<Body> {
        send(&self.server, method, uri).await
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Method::GET, uri).await
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.server.app().metrics().snapshot()
    }
}

pub async fn send(server: &HttpServer, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    server.router().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn ledger(sequence: u32) -> Ledger {
    Ledger {
        sequence,
        hash: format!("{:064x}", sequence),
        prev_hash: None,
        transaction_count: 0,
        operation_count: 0,
        closed_at: 1_700_000_000 + u64::from(sequence),
    }
}

/// Source whose queries panic, for exercising the recoverer.
pub struct PanickingSource;

#[async_trait]
impl LedgerSource for PanickingSource {
    async fn latest_ledger(&self) -> DataResult<Option<Ledger>> {
        panic!("ledger store corrupted")
    }

    async fn ledgers(&self, _page: &PageQuery) -> DataResult<Vec<Ledger>> {
        panic!("ledger store corrupted")
    }

    async fn ledger(&self, _sequence: u32) -> DataResult<Option<Ledger>> {
        panic!("ledger store corrupted")
    }

    async fn accounts(&self, _page: &PageQuery) -> DataResult<Vec<Account>> {
        panic!("ledger store corrupted")
    }

    async fn account(&self, _id: &str) -> DataResult<Option<Account>> {
        panic!("ledger store corrupted")
    }

    async fn transactions(&self, _scope: &Scope, _page: &PageQuery) -> DataResult<Vec<Transaction>> {
        panic!("ledger store corrupted")
    }

    async fn transaction(&self, _id: &str) -> DataResult<Option<Transaction>> {
        panic!("ledger store corrupted")
    }

    async fn operations(&self, _scope: &Scope, _page: &PageQuery) -> DataResult<Vec<Operation>> {
        panic!("ledger store corrupted")
    }

    async fn operation(&self, _id: u64) -> DataResult<Option<Operation>> {
        panic!("ledger store corrupted")
    }

    async fn payments(&self, _scope: &Scope, _page: &PageQuery) -> DataResult<Vec<Operation>> {
        panic!("ledger store corrupted")
    }

    async fn offers(&self, _account: &str, _page: &PageQuery) -> DataResult<Vec<Offer>> {
        panic!("ledger store corrupted")
    }

    fn subscribe(&self) -> LedgerStream {
        Box::pin(stream::empty())
    }
}

/// Start a server on an ephemeral port.
pub async fn start_server(app: TestApp) -> (SocketAddr, Shutdown, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = app.shutdown.clone();
    let handle = tokio::spawn(async move {
        app.server.run(listener).await.unwrap();
    });
    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(20)).await;
    (addr, shutdown, handle)
}

/// Issue a raw HTTP/1.1 request and return the whole response text.
pub async fn raw_request(addr: SocketAddr, method: &str, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}
