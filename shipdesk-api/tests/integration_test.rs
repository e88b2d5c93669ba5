use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shipdesk_api::{app, AppState};
use shipdesk_catalog::ShippingPricer;
use async_trait::async_trait;
use shipdesk_order::{InMemoryOrderRepository, Order, OrderManager, OrderRepository, StoreError};
use shipdesk_store::{CachedOrderRepository, EventBus};
use tower::ServiceExt;

const CAIRO: &str = "القاهرة";
const CAIRO_ENCODED: &str = "%D8%A7%D9%84%D9%82%D8%A7%D9%87%D8%B1%D8%A9";

/// Primary store that never answers.
struct DownStore;

#[async_trait]
impl OrderRepository for DownStore {
    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
    async fn get(&self, _id: &str) -> Result<Option<Order>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
    async fn upsert(&self, _order: &Order) -> Result<Order, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
    async fn delete(&self, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

fn test_app() -> (Router, EventBus) {
    let repo = Arc::new(CachedOrderRepository::new(Arc::new(InMemoryOrderRepository::new())));
    let events = EventBus::new(64);
    let manager = OrderManager::new(repo, Arc::new(ShippingPricer::default())).with_events(events.sender());
    let state = AppState {
        manager: Arc::new(manager),
        events: events.clone(),
    };
    (app(state), events)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn create_order(app: &Router, city: &str, total: Value, paid: Value) -> Value {
    let (status, order) = send(
        app,
        "POST",
        "/v1/orders",
        Some(json!({
            "customer_name": "Mona Adel",
            "customer_phone": "01012345678",
            "city": city,
            "address": "12 Tahrir St",
            "order_details": "Whey protein x2",
            "sales_username": "rep1",
            "total_amount": total,
            "paid": paid,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    order
}

fn num(value: &Value, field: &str) -> f64 {
    value[field].as_f64().unwrap_or_else(|| panic!("{field} missing in {value}"))
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_weight_tiered_dispatch_flow() {
    let (app, _) = test_app();
    let order = create_order(&app, CAIRO, json!(500), json!("200")).await;
    let id = order["id"].as_str().unwrap();

    assert_eq!(order["shipping_company"], "NONE");
    assert_eq!(order["shipping_status"], "pending");
    assert_eq!(num(&order, "remaining"), 300.0);

    let (status, dispatched) = send(
        &app,
        "POST",
        &format!("/v1/orders/{id}/dispatch"),
        Some(json!({ "shipping_company": "JT", "weight": "3", "profit": 20 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{dispatched}");
    // 40 + 2 * 5 + 5
    assert_eq!(num(&dispatched, "shipping_fee"), 55.0);
    assert_eq!(num(&dispatched, "shipping_profit"), 20.0);
    assert_eq!(num(&dispatched, "weight"), 3.0);
    assert_eq!(num(&dispatched, "remaining"), 375.0);
    assert_eq!(dispatched["shipping_company"], "JT");
    assert_eq!(dispatched["shipping_status"], "processing");

    // the phone number is delivered in the clear to the desk
    assert_eq!(dispatched["customer_phone"], "01012345678");
}

#[tokio::test]
async fn test_dispatch_without_carrier_is_rejected() {
    let (app, _) = test_app();
    let order = create_order(&app, CAIRO, json!(500), json!(200)).await;
    let id = order["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/orders/{id}/dispatch"),
        Some(json!({ "weight": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());

    let (_, stored) = send(&app, "GET", &format!("/v1/orders/{id}"), None).await;
    assert_eq!(stored["shipping_company"], "NONE");
    assert_eq!(stored["shipping_status"], "pending");
    assert_eq!(num(&stored, "shipping_fee"), 0.0);
}

#[tokio::test]
async fn test_manual_fee_dispatch() {
    let (app, _) = test_app();
    let order = create_order(&app, "مطروح", json!(800), json!(800)).await;
    let id = order["id"].as_str().unwrap();

    let (status, dispatched) = send(
        &app,
        "POST",
        &format!("/v1/orders/{id}/dispatch"),
        Some(json!({ "shipping_company": "POSTA", "manual_fee": "30", "weight": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{dispatched}");
    assert_eq!(dispatched["shipping_company"], "POSTA");
    assert_eq!(num(&dispatched, "shipping_fee"), 30.0);
    // default margin for manual-fee carriers
    assert_eq!(num(&dispatched, "shipping_profit"), 5.0);
    assert_eq!(num(&dispatched, "weight"), 1.0);
    assert_eq!(num(&dispatched, "remaining"), 35.0);
}

#[tokio::test]
async fn test_manual_fee_dispatch_ignores_weight_field() {
    let (app, _) = test_app();
    let order = create_order(&app, "مطروح", json!(800), json!(800)).await;
    let id = order["id"].as_str().unwrap();

    let (status, quote) = send(
        &app,
        "POST",
        &format!("/v1/orders/{id}/shipping/quote"),
        Some(json!({ "shipping_company": "POSTA", "manual_fee": 30, "weight": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{quote}");
    assert_eq!(num(&quote, "remaining"), 35.0);

    let (status, dispatched) = send(
        &app,
        "POST",
        &format!("/v1/orders/{id}/dispatch"),
        Some(json!({ "shipping_company": "POSTA", "manual_fee": 30, "weight": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{dispatched}");
    assert_eq!(num(&dispatched, "weight"), 1.0);
    assert_eq!(num(&dispatched, "remaining"), 35.0);
}

#[tokio::test]
async fn test_oversized_numbers_are_rejected() {
    let (app, _) = test_app();
    let order = create_order(&app, CAIRO, json!(500), json!(200)).await;
    let id = order["id"].as_str().unwrap();
    let huge = "79228162514264337593543950335";

    for path in ["dispatch", "shipping/quote"] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/v1/orders/{id}/{path}"),
            Some(json!({ "shipping_company": "JT", "weight": huge })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(body["error"].as_str().unwrap().contains("weight"));
    }

    let (status, _) = send(&app, "PUT", &format!("/v1/orders/{id}"), Some(json!({ "total_amount": huge }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stored) = send(&app, "GET", &format!("/v1/orders/{id}"), None).await;
    assert_eq!(stored["shipping_company"], "NONE");
    assert_eq!(num(&stored, "remaining"), 300.0);
}

#[tokio::test]
async fn test_store_outage_is_service_unavailable() {
    let events = EventBus::new(8);
    let repo = Arc::new(CachedOrderRepository::new(Arc::new(DownStore)));
    let manager = OrderManager::new(repo, Arc::new(ShippingPricer::default()));
    let app = app(AppState { manager: Arc::new(manager), events });

    // never listed, so the snapshot cannot answer for it
    let (status, body) = send(&app, "GET", "/v1/orders/ORD-REAL", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().is_some());

    let (status, _) = send(
        &app,
        "POST",
        "/v1/orders/ORD-REAL/dispatch",
        Some(json!({ "shipping_company": "JT" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_second_dispatch_conflicts() {
    let (app, _) = test_app();
    let order = create_order(&app, CAIRO, json!(500), json!(0)).await;
    let uri = format!("/v1/orders/{}/dispatch", order["id"].as_str().unwrap());

    let (status, _) = send(&app, "POST", &uri, Some(json!({ "shipping_company": "JT" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", &uri, Some(json!({ "shipping_company": "POSTA" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_numbers_are_rejected() {
    let (app, _) = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/v1/orders",
        Some(json!({
            "customer_name": "Mona Adel",
            "customer_phone": "01012345678",
            "city": CAIRO,
            "total_amount": "abc",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("total_amount"));

    let order = create_order(&app, CAIRO, json!(500), json!(0)).await;
    let id = order["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/orders/{id}/dispatch"),
        Some(json!({ "shipping_company": "JT", "weight": "0.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shipping_status_has_no_ordering_guard() {
    let (app, _) = test_app();
    let order = create_order(&app, CAIRO, json!(500), json!(0)).await;
    let uri = format!("/v1/orders/{}/shipping-status", order["id"].as_str().unwrap());

    for status in ["delivered", "pending", "returned", "shipped"] {
        let (code, body) = send(&app, "PUT", &uri, Some(json!({ "shipping_status": status }))).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["shipping_status"], status);
    }

    let (code, body) = send(&app, "PUT", &uri, Some(json!({ "shipping_status": "lost" }))).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some(), "{body}");
}

#[tokio::test]
async fn test_quote_does_not_persist() {
    let (app, _) = test_app();
    let order = create_order(&app, CAIRO, json!(500), json!(200)).await;
    let id = order["id"].as_str().unwrap();

    let (status, quote) = send(
        &app,
        "POST",
        &format!("/v1/orders/{id}/shipping/quote"),
        Some(json!({ "shipping_company": "JT", "weight": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{quote}");
    assert_eq!(num(&quote["fee"], "total"), 55.0);
    assert_eq!(num(&quote, "remaining"), 375.0);

    let (_, preview) = send(&app, "POST", &format!("/v1/orders/{id}/shipping/quote"), Some(json!({}))).await;
    assert!(preview["fee"].is_null());
    assert_eq!(num(&preview, "remaining"), 300.0);

    let (_, stored) = send(&app, "GET", &format!("/v1/orders/{id}"), None).await;
    assert_eq!(stored["shipping_company"], "NONE");
    assert_eq!(num(&stored, "shipping_fee"), 0.0);
}

#[tokio::test]
async fn test_zone_lookup() {
    let (app, _) = test_app();

    let (status, zone) = send(&app, "GET", &format!("/v1/zones?city={CAIRO_ENCODED}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(zone["city"], CAIRO);
    assert_eq!(num(&zone, "base_price"), 40.0);
    assert_eq!(num(&zone, "extra_per_kg"), 5.0);

    let (_, remote) = send(&app, "GET", "/v1/zones?city=Atlantis", None).await;
    assert_eq!(num(&remote, "base_price"), 100.0);
    assert_eq!(num(&remote, "extra_per_kg"), 15.0);
}

#[tokio::test]
async fn test_queue_filter_and_search() {
    let (app, _) = test_app();
    let pending = create_order(&app, CAIRO, json!(500), json!(0)).await;
    let assigned = create_order(&app, "أسوان", json!(300), json!(0)).await;
    let assigned_id = assigned["id"].as_str().unwrap();

    send(
        &app,
        "POST",
        &format!("/v1/orders/{assigned_id}/dispatch"),
        Some(json!({ "shipping_company": "JT" })),
    )
    .await;

    let (_, list) = send(&app, "GET", "/v1/orders?queue=pending", None).await;
    assert_eq!(list["count"], 1);
    assert_eq!(list["orders"][0]["id"], pending["id"]);

    let (_, list) = send(&app, "GET", "/v1/orders?queue=assigned", None).await;
    assert_eq!(list["count"], 1);
    assert_eq!(list["orders"][0]["id"], assigned["id"]);

    let (_, list) = send(&app, "GET", &format!("/v1/orders?search={CAIRO_ENCODED}"), None).await;
    assert_eq!(list["count"], 1);

    let (_, list) = send(&app, "GET", "/v1/orders", None).await;
    assert_eq!(list["count"], 2);
}

#[tokio::test]
async fn test_edit_invoice_and_delete() {
    let (app, _) = test_app();
    let order = create_order(&app, CAIRO, json!(500), json!(0)).await;
    let id = order["id"].as_str().unwrap();

    let (status, edited) = send(&app, "PUT", &format!("/v1/orders/{id}"), Some(json!({ "paid": "200" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(num(&edited, "remaining"), 300.0);

    send(
        &app,
        "POST",
        &format!("/v1/orders/{id}/dispatch"),
        Some(json!({ "shipping_company": "JT", "weight": 3 })),
    )
    .await;

    let (status, invoice) = send(&app, "GET", &format!("/v1/orders/{id}/invoice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(num(&invoice, "shipping_total"), 75.0);
    assert_eq!(num(&invoice, "grand_total"), 575.0);
    assert_eq!(num(&invoice, "remaining"), 375.0);

    let (status, _) = send(&app, "DELETE", &format!("/v1/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/v1/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(id));
}

#[tokio::test]
async fn test_finance_summary() {
    let (app, _) = test_app();
    let first = create_order(&app, CAIRO, json!(500), json!(200)).await;
    create_order(&app, CAIRO, json!(300), json!(300)).await;

    send(
        &app,
        "POST",
        &format!("/v1/orders/{}/dispatch", first["id"].as_str().unwrap()),
        Some(json!({ "shipping_company": "JT", "weight": 3 })),
    )
    .await;

    let (status, summary) = send(&app, "GET", "/v1/finance/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["order_count"], 2);
    assert_eq!(summary["dispatched_count"], 1);
    assert_eq!(num(&summary, "total_collected"), 500.0);
    assert_eq!(num(&summary, "total_outstanding"), 375.0);
    assert_eq!(num(&summary, "shipping_fees"), 55.0);
    assert_eq!(summary["by_city"][0]["orders"], 2);
}

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let (app, _) = test_app();
    let (status, _) = send(
        &app,
        "PUT",
        "/v1/orders/ORD-NOPE/shipping-status",
        Some(json!({ "shipping_status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_writes_publish_events() {
    let (app, events) = test_app();
    let mut rx = events.subscribe();

    let order = create_order(&app, CAIRO, json!(500), json!(0)).await;

    let created = rx.recv().await.unwrap();
    assert_eq!(created.name(), "order_created");
    assert_eq!(created.order_id.as_deref(), order["id"].as_str());
    assert_eq!(rx.recv().await.unwrap().name(), "orders_refreshed");
}
