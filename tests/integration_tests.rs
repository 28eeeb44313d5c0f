// File: tests/integration_tests.rs
//
// End-to-end scenarios driving the HTTP router against a latency-simulating
// point service.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use futures::future::join_all;
use point_ledger::api_gateway::config::AppConfig;
use point_ledger::api_gateway::{app, AppState};
use point_ledger::point_service::{PointService, PointServiceConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with_latency(latency_ms: u64) -> Router {
    let config = PointServiceConfig::new(latency_ms, None, false);
    let service = Arc::new(PointService::with_config(&config));
    app(Arc::new(AppState::new(service, &AppConfig::default())))
}

async fn patch(app: Router, uri: String, amount: i64) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::PATCH)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json!({ "amount": amount }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: Router, uri: &str) -> Value {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_http_charges_converge() {
    let app = app_with_latency(10);

    let responses = join_all((0..10).map(|_| {
        let app = app.clone();
        tokio::spawn(patch(app, "/point/1/charge".to_string(), 1000))
    }))
    .await;
    for response in responses {
        let (status, _) = response.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let point = get(app.clone(), "/point/1").await;
    assert_eq!(point["data"]["point"], 10_000);
    let histories = get(app, "/point/1/histories").await;
    assert_eq!(histories["data"].as_array().unwrap().len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_overdraw_never_goes_negative() {
    let app = app_with_latency(10);
    let (status, _) = patch(app.clone(), "/point/1/charge".to_string(), 1000).await;
    assert_eq!(status, StatusCode::OK);

    // Only three of these can succeed
    let responses = join_all((0..8).map(|_| {
        let app = app.clone();
        tokio::spawn(patch(app, "/point/1/use".to_string(), 300))
    }))
    .await;

    let mut succeeded = 0;
    for response in responses {
        let (status, body) = response.unwrap();
        if status == StatusCode::OK {
            succeeded += 1;
        } else {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "insufficient_balance");
        }
    }

    assert_eq!(succeeded, 3);
    let point = get(app.clone(), "/point/1").await;
    assert_eq!(point["data"]["point"], 100);
    let histories = get(app, "/point/1/histories").await;
    assert_eq!(histories["data"].as_array().unwrap().len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_distinct_users_over_http_run_in_parallel() {
    let app = app_with_latency(50);

    let started = Instant::now();
    let responses = join_all((1..=8).map(|user_id| {
        let app = app.clone();
        tokio::spawn(patch(app, format!("/point/{}/charge", user_id), 1000))
    }))
    .await;
    let elapsed = started.elapsed();

    for response in responses {
        assert_eq!(response.unwrap().0, StatusCode::OK);
    }
    // One charge is three 50ms store calls; serial execution would take 1.2s
    assert!(elapsed < Duration::from_millis(450), "took {:?}", elapsed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_dropped_request_keeps_balance_and_history_in_step() {
    let app = app_with_latency(50);

    // The store calls take 150ms in total; the request is dropped during the append
    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/point/1/charge")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "amount": 1000 }).to_string()))
        .unwrap();
    let dropped = tokio::time::timeout(Duration::from_millis(125), app.clone().oneshot(request)).await;
    assert!(dropped.is_err());

    // Waits on the user's lock until the dropped request's section finishes
    let (status, body) = patch(app.clone(), "/point/1/charge".to_string(), 1000).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["point"], 2000);

    let histories = get(app, "/point/1/histories").await;
    let records = histories["data"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["transaction_type"] == "CHARGE"));
}
