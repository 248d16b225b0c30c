mod common;

use axum::http::{Method, StatusCode};
use kitchen_inventory::services::detection::StatusBasis;
use serde_json::json;

use common::{response_json, TestApp};

fn frame(labels: &[&str]) -> serde_json::Value {
    json!({
        "detections": labels
            .iter()
            .map(|label| json!({ "label": label, "confidence": 0.9 }))
            .collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn frame_counts_allowed_labels_and_drops_the_rest() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/detections",
            Some(frame(&["apple", "apple", "dog"])),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = response_json(response).await;
    assert_eq!(report["dropped"], 1);
    assert_eq!(report["failed"].as_array().unwrap().len(), 0);
    let applied = report["applied"].as_array().unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0]["label"], "apple");
    assert_eq!(applied[0]["count"], 2);
    assert_eq!(applied[0]["created"], true);
    assert_eq!(applied[0]["status"], "Danger");
    assert_eq!(applied[0]["stock_label"], "Critical");

    let rows = app.stored_items().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "apple");
    assert_eq!(rows[0].quantity, 2);
    assert_eq!(rows[0].cost, "100");
}

#[tokio::test]
async fn repeated_frames_accumulate_stock() {
    let app = TestApp::new().await;

    for _ in 0..3 {
        let response = app
            .request(
                Method::POST,
                "/api/detections",
                Some(frame(&["Banana", "banana"])),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let rows = app.stored_items().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "banana");
    assert_eq!(rows[0].quantity, 6);
    assert_eq!(rows[0].status.to_string(), "Good");
}

#[tokio::test]
async fn frame_basis_uses_the_per_frame_count() {
    let app = TestApp::with_config(|cfg| cfg.detection.status_basis = StatusBasis::Frame).await;

    for _ in 0..4 {
        app.request(Method::POST, "/api/detections", Some(frame(&["onion"])))
            .await;
    }

    let rows = app.stored_items().await;
    assert_eq!(rows[0].quantity, 4);
    assert_eq!(rows[0].status.to_string(), "Danger");
}

#[tokio::test]
async fn detections_merge_into_manually_added_items() {
    let app = TestApp::new().await;
    app.request(
        Method::PUT,
        "/api/inventory/add/carrot",
        Some(json!({ "quantity": 5, "cost": "3.20", "expiry": "2025-06-01", "status": "Good" })),
    )
    .await;

    app.request(
        Method::POST,
        "/api/detections",
        Some(frame(&["carrot"])),
    )
    .await;

    let rows = app.stored_items().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 6);
    assert_eq!(rows[0].cost, "100");
}

#[tokio::test]
async fn empty_and_malformed_frames() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/api/detections", Some(json!({ "detections": [] })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = response_json(response).await;
    assert_eq!(report["dropped"], 0);
    assert!(report["applied"].as_array().unwrap().is_empty());

    let response = app
        .request_raw(Method::POST, "/api/detections", "[{\"label\":")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(app.stored_items().await.is_empty());
}

#[tokio::test]
async fn oversized_frames_are_rejected() {
    let app = TestApp::new().await;
    let labels = vec!["apple"; 1_001];

    let response = app
        .request(Method::POST, "/api/detections", Some(frame(&labels)))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.stored_items().await.is_empty());
}
