//! Running server over real TCP connections.

use std::time::Duration;

use horizon::config::HorizonConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

use common::{ledger, raw_request, start_server, TestApp};

#[tokio::test]
async fn serves_over_tcp_and_shuts_down() {
    let app = TestApp::new();
    app.source.close_ledger(ledger(5));
    let (addr, shutdown, handle) = start_server(app).await;

    let response = raw_request(addr, "GET", "/ledgers/5").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.to_ascii_lowercase().contains("x-request-id:"), "{response}");
    assert!(response.contains("\"sequence\":5"), "{response}");

    let response = raw_request(addr, "OPTIONS", "/ledgers").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn shutdown_waits_for_streams_to_close() {
    let app = TestApp::with_config(HorizonConfig::default());
    let source = app.source.clone();
    let (addr, shutdown, handle) = start_server(app).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET /stream HTTP/1.1\r\nHost: {addr}\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    // Wait for the response head, then for the subscription to exist.
    let mut head = [0u8; 512];
    let read = stream.read(&mut head).await.unwrap();
    assert!(String::from_utf8_lossy(&head[..read]).starts_with("HTTP/1.1 200"));
    for _ in 0..50 {
        if source.subscriber_count() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(source.subscriber_count(), 1);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("open stream blocked shutdown")
        .unwrap();
    assert_eq!(source.subscriber_count(), 0);
}
