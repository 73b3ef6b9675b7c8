//! Concurrent callers sharing one breaker through the passthrough endpoint.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use resilient_client::lifecycle;
use tokio::task::JoinSet;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_half_open_admits_single_probe_under_load() {
    let call_count = Arc::new(AtomicU32::new(0));
    let healthy = Arc::new(AtomicBool::new(false));
    let (cc, h) = (call_count.clone(), healthy.clone());
    let backend = common::start_programmable_backend(move || {
        cc.fetch_add(1, Ordering::SeqCst);
        let ok = h.load(Ordering::SeqCst);
        async move {
            if ok {
                // Keep the probe in flight while the other callers arrive.
                tokio::time::sleep(Duration::from_millis(300)).await;
                (200, r#"{"ok":true}"#.into())
            } else {
                (500, "backend error".into())
            }
        }
    })
    .await;

    let mut config = common::client_config(backend);
    config.breaker.failure_threshold = 1;
    config.breaker.reset_timeout_ms = 200;
    config.breaker.half_open_max_probes = 1;
    config.retries.max_attempts = 1;
    let service = lifecycle::start(config).await.unwrap();
    let client = reqwest::Client::new();
    let call_url = format!("http://{}/call", service.local_addr());

    let (status, _) = common::get_json(&client, call_url.clone()).await;
    assert_eq!(status, 502);
    assert_eq!(call_count.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(250)).await;
    healthy.store(true, Ordering::SeqCst);

    let mut tasks = JoinSet::new();
    for _ in 0..10 {
        let (client, url) = (client.clone(), call_url.clone());
        tasks.spawn(async move { common::get_json(&client, url).await });
    }

    let mut successes = 0;
    let mut rejected = 0;
    while let Some(result) = tasks.join_next().await {
        let (status, body) = result.unwrap();
        match status {
            200 => successes += 1,
            503 => {
                assert_eq!(body["status"], "circuit_open");
                rejected += 1;
            }
            other => panic!("unexpected status {other}: {body}"),
        }
    }

    assert_eq!(call_count.load(Ordering::SeqCst), 2, "exactly one probe reaches the backend");
    assert_eq!(successes, 1);
    assert_eq!(rejected, 9);

    let (_, health) = common::get_json(&client, format!("http://{}/health", service.local_addr())).await;
    assert_eq!(health["breaker_state"], "CLOSED");

    service.shutdown().await;
}
