//! Shared utilities for integration tests.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{Method, StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};

use wsbridge::config::BridgeConfig;
use wsbridge::http::BridgeServer;

/// A scriptable backend that answers one request at a time.
///
/// Every request the backend receives is rendered as `METHOD /path body`
/// onto `requests`; the handler then blocks until a `(status, body)` pair is
/// taken from `responses`. Queue the response before triggering the
/// request and the test runs in lock-step with the bridge.
pub struct LockStepBackend {
    pub url: String,
    pub requests: mpsc::Receiver<String>,
    responses: mpsc::Sender<(u16, String)>,
}

impl LockStepBackend {
    /// Queue the response for the next backend request.
    pub async fn respond(&self, status: u16, body: &str) {
        self.responses
            .send((status, body.to_string()))
            .await
            .expect("backend handler gone");
    }

    /// Take the next observed request line.
    pub async fn request(&mut self) -> String {
        self.requests.recv().await.expect("backend handler gone")
    }
}

pub async fn start_lock_step_backend() -> LockStepBackend {
    let (request_tx, request_rx) = mpsc::channel::<String>(16);
    let (response_tx, response_rx) = mpsc::channel::<(u16, String)>(16);
    let response_rx = Arc::new(Mutex::new(response_rx));

    let app = Router::new().fallback(move |method: Method, uri: Uri, body: Bytes| {
        let request_tx = request_tx.clone();
        let response_rx = Arc::clone(&response_rx);
        async move {
            let body = String::from_utf8_lossy(&body).into_owned();
            let line = format!("{} {} {}", method, uri.path(), body)
                .trim()
                .to_string();
            request_tx.send(line).await.expect("test dropped requests");
            let (status, text) = response_rx
                .lock()
                .await
                .recv()
                .await
                .expect("no scripted response");
            (StatusCode::from_u16(status).unwrap(), text)
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    LockStepBackend {
        url: format!("http://{addr}/"),
        requests: request_rx,
        responses: response_tx,
    }
}

/// A bridge instance on an ephemeral port, with fast retries so tests that
/// exhaust the retry budget stay quick.
pub struct TestBridge {
    pub url: String,
    pub ws_url: String,
}

pub async fn start_bridge(backend_url: &str) -> TestBridge {
    let mut config = BridgeConfig::default();
    config.backend.base_url = backend_url.to_string();
    config.retries.base_delay_ms = 20;
    config.retries.max_jitter_ms = 5;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = BridgeServer::new(&config).unwrap();
    tokio::spawn(async move {
        server.run(listener).await.unwrap();
    });

    TestBridge {
        url: format!("http://{addr}"),
        ws_url: format!("ws://{addr}"),
    }
}

/// Wait until a counter reaches a value. Session registration finishes
/// after the 101 response is on the wire, so tests that immediately act on
/// the registered address park here first.
#[allow(dead_code)]
pub async fn wait_for_counter(bridge_url: &str, name: &str, value: u64) {
    for _ in 0..100 {
        if counter(bridge_url, name).await >= value {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("counter {name} never reached {value}");
}

/// Read one counter from the bridge's statistics page.
#[allow(dead_code)]
pub async fn counter(bridge_url: &str, name: &str) -> u64 {
    let page = reqwest::get(bridge_url).await.unwrap().text().await.unwrap();
    for line in page.lines() {
        let mut parts = line.splitn(2, ' ');
        if parts.next() == Some(name) {
            return parts.next().and_then(|v| v.trim().parse().ok()).unwrap_or(0);
        }
    }
    0
}
