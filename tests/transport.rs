//! Request log policy over a real hyper client and mock backends.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use storage_request_log::{RequestLogLayer, RequestLogOptions, Severity};
use tower::{Layer, Service, ServiceExt};

mod common;
use common::{Channel, RecordingSink};

fn client() -> Client<HttpConnector, Body> {
    Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(0)
        .build(HttpConnector::new())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-ms-version", "2016-05-31")
        .header("authorization", "SharedKey acct:c2lnbmF0dXJl")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn retried_operation_logs_each_attempt() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let addr = common::start_programmable_backend(move || {
        let cc = cc.clone();
        async move {
            let count = cc.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                (503u16, "Service Unavailable".to_string())
            } else {
                (200u16, "Success".to_string())
            }
        }
    })
    .await;

    let sink = RecordingSink::accepting(Severity::Info);
    let layer = RequestLogLayer::new(RequestLogOptions::default(), sink.clone());
    let mut operation = layer.layer(client());

    let uri = format!("http://{}/container/blob?comp=metadata&sig=c2VjcmV0", addr);
    let mut last = None;
    for _ in 0..3 {
        let response = operation.ready().await.unwrap().call(get(&uri)).await.unwrap();
        last = Some(response.status());
        if !response.status().is_server_error() {
            break;
        }
    }

    assert_eq!(last, Some(StatusCode::OK));
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
    assert_eq!(operation.attempt().try_count(), 3);

    let forced = sink.on(Channel::Forced);
    assert_eq!(forced.len(), 2);
    for record in &forced {
        assert_eq!(record.severity, Severity::Error);
        assert!(record.message.contains("RESPONSE Status: 503 Service Unavailable"));
    }
    assert!(forced[0].message.contains("(Try=1,"));
    assert!(forced[1].message.contains("(Try=2,"));

    let filtered = sink.on(Channel::Filtered);
    let last_report = filtered.last().unwrap();
    assert_eq!(last_report.severity, Severity::Info);
    assert!(last_report.message.contains("(Try=3,"));
    assert!(last_report.message.contains("SUCCESSFUL OPERATION"));

    for record in sink.records() {
        assert!(record.message.contains("?comp=metadata&sig=REDACTED"));
        assert!(record.message.contains("   authorization: REDACTED\n"));
        assert!(!record.message.contains("c2VjcmV0"));
        assert!(!record.message.contains("c2lnbmF0dXJl"));
    }
}

#[tokio::test]
async fn allow_listed_conflict_is_not_forced() {
    let addr = common::start_programmable_backend(|| async { (409u16, "LeaseAlreadyPresent".to_string()) }).await;

    let sink = RecordingSink::accepting(Severity::Warning);
    let layer = RequestLogLayer::new(RequestLogOptions::default(), sink.clone());
    let mut operation = layer.layer(client());

    let response = operation
        .ready()
        .await
        .unwrap()
        .call(get(&format!("http://{}/container/blob?comp=lease", addr)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
    let addr = common::closed_port().await;

    let sink = RecordingSink::rejecting_all();
    let layer = RequestLogLayer::new(RequestLogOptions::default(), sink.clone());
    let mut operation = layer.layer(client());

    let result = operation
        .ready()
        .await
        .unwrap()
        .call(get(&format!("http://{}/container?restype=container&sig=abc", addr)))
        .await;
    assert!(result.is_err());

    let forced = sink.on(Channel::Forced);
    assert_eq!(forced.len(), 1);
    assert_eq!(forced[0].severity, Severity::Error);
    assert!(forced[0].message.contains("-- NETWORK ERROR:\n"));
    assert!(forced[0].message.contains("restype=container&sig=REDACTED"));
    assert!(!forced[0].message.contains("RESPONSE Status"));
}
