//! Reconciliation passes against fake registry and monitor services

mod common;

use axum::http::StatusCode;
use common::{monitor_entry, stream_row, FakeCouch, FakeMonitor, TOKEN};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use streamwatch_daemon::config::{MonitorConfig, RegistryConfig};
use streamwatch_daemon::{CouchRegistry, HlsMonitorClient, Reconciler, StaticToken, SyncError};

fn reconciler(couch: SocketAddr, monitor: SocketAddr) -> Reconciler {
    let registry = CouchRegistry::new(&RegistryConfig {
        url: format!("http://{}", couch),
        ..RegistryConfig::default()
    })
    .unwrap();
    let monitor = HlsMonitorClient::new(&MonitorConfig {
        url: format!("http://{}", monitor),
        ..MonitorConfig::default()
    })
    .unwrap();

    Reconciler::new(
        Arc::new(registry),
        Arc::new(monitor),
        Arc::new(StaticToken::new(Some(TOKEN.to_string()))),
    )
}

#[tokio::test]
async fn registers_exactly_the_missing_stream() {
    let couch = FakeCouch::with_rows(vec![
        stream_row("a", "https://a/master.m3u8"),
        stream_row("b", "https://b/master.m3u8"),
    ]);
    let monitor = FakeMonitor::with_monitors(json!({
        "m1": monitor_entry(&[("s1", "https://a/master.m3u8")])
    }));
    let reconciler = reconciler(couch.start().await, monitor.start().await);

    let report = reconciler.reconcile_once().await.unwrap();

    assert_eq!(monitor.posted_urls(), vec!["https://b/master.m3u8"]);
    assert_eq!(report.registered, 1);
}

#[tokio::test]
async fn second_pass_after_convergence_issues_no_calls() {
    let couch = FakeCouch::with_rows(vec![
        stream_row("a", "https://a/master.m3u8"),
        stream_row("b", "https://b/master.m3u8"),
    ]);
    let monitor = FakeMonitor::with_monitors(json!({}));
    let reconciler = reconciler(couch.start().await, monitor.start().await);

    reconciler.reconcile_once().await.unwrap();
    assert_eq!(monitor.posted_urls().len(), 2);

    let second = reconciler.reconcile_once().await.unwrap();
    assert_eq!(second.missing, 0);
    assert_eq!(monitor.posted_urls().len(), 2);
}

#[tokio::test]
async fn failing_registration_does_not_block_the_rest() {
    let couch = FakeCouch::with_rows(vec![
        stream_row("one", "https://1/master.m3u8"),
        stream_row("two", "https://2/master.m3u8"),
        stream_row("three", "https://3/master.m3u8"),
    ]);
    let monitor = FakeMonitor::with_monitors(json!({}));
    monitor
        .state
        .lock()
        .unwrap()
        .rejected_urls
        .insert("https://2/master.m3u8".to_string());
    let reconciler = reconciler(couch.start().await, monitor.start().await);

    let report = reconciler.reconcile_once().await.unwrap();

    assert_eq!(
        monitor.posted_urls(),
        vec![
            "https://1/master.m3u8",
            "https://2/master.m3u8",
            "https://3/master.m3u8"
        ]
    );
    assert_eq!(report.registered, 2);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn monitor_protocol_failure_aborts_pass() {
    let couch = FakeCouch::with_rows(vec![stream_row("a", "https://a/master.m3u8")]);
    let monitor = FakeMonitor::with_monitors(json!({}));
    monitor.state.lock().unwrap().list_status = Some(StatusCode::INTERNAL_SERVER_ERROR);
    let reconciler = reconciler(couch.start().await, monitor.start().await);

    let err = reconciler.reconcile_once().await.unwrap_err();

    assert!(matches!(err, SyncError::Monitor(_)));
    assert!(monitor.posted_urls().is_empty());
}

#[tokio::test]
async fn registry_rows_without_documents_never_get_registered() {
    let couch = FakeCouch::with_rows(vec![
        json!({ "id": "gone", "key": "gone", "value": { "rev": "3-z", "deleted": true }, "doc": null }),
        stream_row("a", "https://a/master.m3u8"),
    ]);
    let monitor = FakeMonitor::with_monitors(json!({}));
    let reconciler = reconciler(couch.start().await, monitor.start().await);

    let report = reconciler.reconcile_once().await.unwrap();

    assert_eq!(report.registry_streams, 1);
    assert_eq!(monitor.posted_urls(), vec!["https://a/master.m3u8"]);
}

#[tokio::test]
async fn entry_with_odd_metadata_still_counts_as_tracking() {
    let couch = FakeCouch::with_rows(vec![stream_row("a", "https://a/master.m3u8")]);
    let monitor = FakeMonitor::with_monitors(json!({
        "m1": {
            "streams": [{ "id": "s1", "url": "https://a/master.m3u8" }],
            "state": null,
            "errorCount": -3
        }
    }));
    let reconciler = reconciler(couch.start().await, monitor.start().await);

    let report = reconciler.reconcile_once().await.unwrap();

    assert_eq!(report.missing, 0);
    assert!(monitor.posted_urls().is_empty());
}
