mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{response_json, TestApp};

fn add_body(quantity: i64, cost: &str, expiry: &str, status: &str) -> serde_json::Value {
    json!({ "quantity": quantity, "cost": cost, "expiry": expiry, "status": status })
}

#[tokio::test]
async fn add_creates_then_merges_tomato() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::PUT,
            "/api/inventory/add/tomato",
            Some(add_body(3, "10", "2025-01-01", "Good")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "New item added successfully");
    assert_eq!(body["data"]["quantity"], 3);
    let id = body["data"]["id"].as_i64().expect("item id");

    let response = app
        .request(
            Method::PUT,
            "/api/inventory/add/tomato",
            Some(add_body(2, "12", "2025-01-02", "Warning")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Item quantity updated successfully");
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["quantity"], 5);
    assert_eq!(body["data"]["cost"], "12");
    assert_eq!(body["data"]["expiry"], "2025-01-02");
    assert_eq!(body["data"]["status"], "Warning");

    let rows = app.stored_items().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 5);
}

#[tokio::test]
async fn names_are_case_sensitive() {
    let app = TestApp::new().await;

    for name in ["Tomato", "tomato"] {
        let response = app
            .request(
                Method::PUT,
                &format!("/api/inventory/add/{name}"),
                Some(add_body(1, "1", "2025-01-01", "Danger")),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    assert_eq!(app.stored_items().await.len(), 2);
}

#[tokio::test]
async fn list_returns_every_item_as_a_bare_array() {
    let app = TestApp::new().await;
    for name in ["rice", "flour"] {
        app.request(
            Method::PUT,
            &format!("/api/inventory/add/{name}"),
            Some(add_body(4, "2.5", "2025-03-01", "Warning")),
        )
        .await;
    }

    let response = app.request(Method::GET, "/api/inventory", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let items = body.as_array().expect("array body");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "rice");
    assert_eq!(items[1]["name"], "flour");
}

#[tokio::test]
async fn update_by_id_keeps_quantity() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::PUT,
            "/api/inventory/add/cheese",
            Some(add_body(10, "8", "2025-01-15", "Good")),
        )
        .await;
    let id = response_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/inventory/update/{id}"),
            Some(json!({ "cost": "5", "expiry": "2025-02-01", "status": "Danger" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Item updated successfully");
    assert_eq!(body["data"]["quantity"], 10);
    assert_eq!(body["data"]["status"], "Danger");
    assert_eq!(body["data"]["cost"], "5");

    let response = app
        .request(Method::GET, &format!("/api/inventory/{id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["expiry"], "2025-02-01");
    assert_eq!(body["quantity"], 10);
}

#[tokio::test]
async fn update_of_unknown_id_is_404_and_creates_nothing() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::PUT,
            "/api/inventory/update/42",
            Some(json!({ "cost": "5", "expiry": "2025-02-01", "status": "Danger" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Not Found");
    assert!(body["request_id"].is_string());

    assert!(app.stored_items().await.is_empty());
}

#[tokio::test]
async fn missing_fields_are_rejected_without_mutation() {
    let app = TestApp::new().await;
    app.request(
        Method::PUT,
        "/api/inventory/add/milk",
        Some(add_body(2, "3", "2025-01-05", "Danger")),
    )
    .await;

    let response = app
        .request(
            Method::PUT,
            "/api/inventory/add/milk",
            Some(json!({ "quantity": 4, "expiry": "2025-01-06" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Missing required fields: cost, status"));

    let response = app
        .request(
            Method::PUT,
            "/api/inventory/add/milk",
            Some(json!({ "cost": "3", "expiry": "2025-01-06", "status": "Good" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let rows = app.stored_items().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 2);
    assert_eq!(rows[0].expiry.to_string(), "2025-01-05");
}

#[tokio::test]
async fn malformed_requests_are_bad_requests() {
    let app = TestApp::new().await;

    let response = app
        .request_raw(Method::PUT, "/api/inventory/add/eggs", "{not json")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::PUT,
            "/api/inventory/update/abc",
            Some(json!({ "cost": "5", "expiry": "2025-02-01", "status": "Danger" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::PUT,
            "/api/inventory/add/eggs",
            Some(add_body(-1, "5", "2025-02-01", "Good")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::PUT,
            "/api/inventory/add/eggs",
            Some(add_body(1, "5", "February 1st", "Good")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(app.stored_items().await.is_empty());
}

#[tokio::test]
async fn auto_status_follows_the_merged_total() {
    let app = TestApp::new().await;

    let mut last = serde_json::Value::Null;
    for _ in 0..3 {
        let response = app
            .request(
                Method::PUT,
                "/api/inventory/add/lemon",
                Some(add_body(2, "1", "2025-01-01", "auto")),
            )
            .await;
        last = response_json(response).await;
    }

    assert_eq!(last["data"]["quantity"], 6);
    assert_eq!(last["data"]["status"], "Good");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/inventory/999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let header = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("request id header");
    let body = response_json(response).await;
    assert_eq!(body["request_id"], header.as_str());
}

#[tokio::test]
async fn status_and_health_report_ok() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["data"]["status"], "ok");

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response_json(response).await["data"]["checks"]["database"],
        "healthy"
    );
}

#[tokio::test]
async fn stats_are_computed_from_the_store() {
    let app = TestApp::new().await;
    app.request(
        Method::PUT,
        "/api/inventory/add/oil",
        Some(add_body(4, "2.50", "2099-01-01", "Warning")),
    )
    .await;
    app.request(
        Method::PUT,
        "/api/inventory/add/salt",
        Some(add_body(10, "1", "2000-01-01", "Good")),
    )
    .await;

    let response = app.request(Method::GET, "/api/stats", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["totalInventoryItems"], 2);
    assert_eq!(body["totalQuantity"], 14);
    assert_eq!(body["byStatus"]["warning"], 1);
    assert_eq!(body["byStatus"]["good"], 1);
    assert_eq!(body["expired"], 1);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["paths"]["/api/inventory/add/{name}"].is_object());
}
