//! End-to-end tests against mock noun and adjective services.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use insult_service::upstream::{DependencyClient, DependencyKind, WordSource};

mod common;

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

async fn start_words(noun: SocketAddr, adjective: SocketAddr) {
    common::start_programmable_backend(noun, || async { (200, r#"{"noun":"badger"}"#.to_string()) }).await;
    common::start_programmable_backend(adjective, || async { (200, r#"{"adjective":"smelly"}"#.to_string()) }).await;
}

#[tokio::test]
async fn test_composes_from_live_dependencies() {
    let (noun, adjective, service) = (addr(28301), addr(28302), addr(28303));
    start_words(noun, adjective).await;
    let shutdown = common::start_service(service, common::local_config(noun, adjective)).await;

    let res = common::client()
        .get(format!("http://{}/api/v1/insult", service))
        .send()
        .await
        .expect("service unreachable");
    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "noun": "badger", "adj1": "smelly", "adj2": "smelly" }));

    shutdown.trigger();
}

#[tokio::test]
async fn test_http_error_message_format() {
    let noun = addr(28311);
    common::start_programmable_backend(noun, || async { (503, "down".to_string()) }).await;

    let config = common::local_config(noun, addr(28312));
    let client = DependencyClient::new(&config).unwrap();
    let err = client.fetch_word(DependencyKind::Noun).await.unwrap_err();
    assert_eq!(err.to_string(), "503: Service Unavailable\ndown");
}

#[tokio::test]
async fn test_http_error_keeps_server_reason_phrase() {
    let (custom, unknown) = (addr(28313), addr(28314));
    common::start_status_line_backend(custom, "503 Down For Maintenance", "down").await;
    common::start_status_line_backend(unknown, "599 Network Timeout", "down").await;

    let client = DependencyClient::new(&common::local_config(custom, unknown)).unwrap();
    let noun = client.fetch_word(DependencyKind::Noun).await.unwrap_err();
    assert_eq!(noun.to_string(), "503: Down For Maintenance\ndown");

    let adjective = client.fetch_word(DependencyKind::Adjective).await.unwrap_err();
    assert_eq!(adjective.to_string(), "599: Network Timeout\ndown");
}

#[tokio::test]
async fn test_noun_outage_degrades_to_marker() {
    let (noun, adjective, service) = (addr(28321), addr(28322), addr(28323));
    common::start_programmable_backend(noun, || async { (503, "down".to_string()) }).await;
    common::start_programmable_backend(adjective, || async { (200, r#"{"adjective":"smelly"}"#.to_string()) }).await;
    let shutdown = common::start_service(service, common::local_config(noun, adjective)).await;

    let body: Value = common::client()
        .get(format!("http://{}/api/v1/insult", service))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "noun": "[failure]", "adj1": "smelly", "adj2": "smelly" }));

    shutdown.trigger();
}

#[tokio::test]
async fn test_open_breaker_stops_network_calls() {
    let (noun, adjective, service) = (addr(28331), addr(28332), addr(28333));
    common::start_programmable_backend(noun, || async { (200, r#"{"noun":"badger"}"#.to_string()) }).await;

    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    common::start_programmable_backend(adjective, move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (503, "down".to_string())
        }
    })
    .await;

    let mut config = common::local_config(noun, adjective);
    config.breaker.max_retries = 0;
    config.breaker.max_failures = 2;
    let shutdown = common::start_service(service, config).await;
    let client = common::client();
    let url = format!("http://{}/api/v1/insult", service);

    let first: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(first, json!({ "noun": "badger", "adj1": "[failure]", "adj2": "[failure]" }));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let second: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(second, json!({ "noun": "badger", "adj1": "[open]", "adj2": "[open]" }));
    assert_eq!(calls.load(Ordering::SeqCst), 2, "open breaker must not call the dependency");

    let health: Value = client
        .get(format!("http://{}/health", service))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, json!({ "noun": "CLOSED", "adj": "OPEN", "status": "OK" }));

    shutdown.trigger();
}

#[tokio::test]
async fn test_slow_dependency_bounded_by_breaker_timeout() {
    let (noun, adjective, service) = (addr(28341), addr(28342), addr(28343));
    common::start_programmable_backend(noun, || async { (200, r#"{"noun":"badger"}"#.to_string()) }).await;
    common::start_programmable_backend(adjective, || async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, r#"{"adjective":"smelly"}"#.to_string())
    })
    .await;

    let mut config = common::local_config(noun, adjective);
    config.breaker.max_retries = 0;
    let shutdown = common::start_service(service, config).await;

    let start = Instant::now();
    let body: Value = common::client()
        .get(format!("http://{}/api/v1/insult", service))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(body, json!({ "noun": "badger", "adj1": "[failure]", "adj2": "[failure]" }));

    shutdown.trigger();
}

#[tokio::test]
async fn test_health_before_any_request() {
    let (noun, adjective, service) = (addr(28351), addr(28352), addr(28353));
    let shutdown = common::start_service(service, common::local_config(noun, adjective)).await;

    let res = common::client()
        .get(format!("http://{}/health", service))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "noun": "CLOSED", "adj": "CLOSED", "status": "DEGRADED" }));

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_assigned_and_propagated() {
    let (noun, adjective, service) = (addr(28361), addr(28362), addr(28363));
    let shutdown = common::start_service(service, common::local_config(noun, adjective)).await;
    let client = common::client();
    let url = format!("http://{}/health", service);

    let res = client.get(&url).send().await.unwrap();
    let generated = res.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    let res = client.get(&url).header("x-request-id", "trace-42").send().await.unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), "trace-42");

    shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let (noun, adjective, service) = (addr(28371), addr(28372), addr(28373));
    let shutdown = common::start_service(service, common::local_config(noun, adjective)).await;
    let url = format!("http://{}/health", service);

    assert!(common::client().get(&url).send().await.is_ok());

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(common::client().get(&url).send().await.is_err());
}
