//! Shared utilities for integration tests.

use resilient_client::chaos::{self, ChaosConfig};
use resilient_client::ClientConfig;
use serde_json::Value;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a programmable backend on an ephemeral port.
///
/// `f` is invoked once per request and returns `(status, body)`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = std::sync::Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        // Drain the request head before answering.
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Host the chaos dependency in-process on an ephemeral port.
#[allow(dead_code)]
pub async fn start_chaos_backend(config: ChaosConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, chaos::router(config)).await;
    });
    addr
}

/// Client config pointed at `backend`, with fast timings and no background loop.
pub fn client_config(backend: SocketAddr) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.dependency.url = format!("http://{}/work", backend);
    config.dependency.request_timeout_ms = 1000;
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.retries.base_delay_ms = 10;
    config.retries.max_delay_ms = 50;
    config.driver.enabled = false;
    config
}

/// GET a JSON endpoint, returning status and body.
pub async fn get_json(client: &reqwest::Client, url: String) -> (u16, Value) {
    let res = client.get(url).send().await.expect("service unreachable");
    let status = res.status().as_u16();
    (status, res.json().await.expect("body should be JSON"))
}

/// Poll `check` until it returns true or `deadline` passes.
#[allow(dead_code)]
pub async fn eventually<F, Fut>(deadline: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = tokio::time::Instant::now();
    while start.elapsed() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}
