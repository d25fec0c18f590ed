use actix_web::{http::StatusCode, test, App};
use mockall::predicate::eq;
use reward_points_engine::{
    db_types::{CustomerId, OrderEvent, OrderId},
    BackendError,
    ProcessedOrderStore,
};
use rpg_common::Cents;

use super::{
    helpers::{post_webhook, test_api, Signature},
    mocks::MockStoreBackend,
};
use crate::routes::health;

const PAID_ORDER: &str = r##"{
    "id": 820982911946154508,
    "name": "#1001",
    "total_price": "99.99",
    "currency": "USD",
    "financial_status": "paid",
    "fulfillment_status": null,
    "customer": { "id": 42, "email": "jon@example.com" },
    "note_attributes": []
}"##;

const GUEST_ORDER: &str = r#"{"id": 820982911946154509, "total_price": "99.99", "customer": null}"#;

const UNFULFILLED_ORDER: &str =
    r#"{"id": 820982911946154510, "total_price": "150.00", "fulfillment_status": "partial", "customer": {"id": 42}}"#;

const FULFILLED_ORDER: &str =
    r#"{"id": 820982911946154511, "total_price": "150.00", "fulfillment_status": "fulfilled", "customer": {"id": 42}}"#;

fn customer_42() -> CustomerId {
    CustomerId::new("42")
}

#[actix_web::test]
async fn health_check() {
    let app = test::init_service(App::new().service(health)).await;
    let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn paid_order_awards_points() {
    let mut backend = MockStoreBackend::new();
    backend.expect_fetch_points().with(eq(customer_42())).times(1).returning(|_| Ok(Some(5)));
    backend.expect_write_points().with(eq(customer_42()), eq(14)).times(1).returning(|_, _| Ok(()));
    let api = test_api(backend);
    let (status, body) = post_webhook(api.clone(), "/webhooks/orders/paid", PAID_ORDER, Signature::Valid).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""success":true"#), "{body}");
    assert!(body.contains("5 -> 14"), "{body}");
    let record = api.ledger().fetch(&OrderId::new("820982911946154508")).await.unwrap().unwrap();
    assert_eq!(record.points_earned, 9);
}

#[actix_web::test]
async fn redelivered_order_is_acknowledged_once() {
    let mut backend = MockStoreBackend::new();
    backend.expect_fetch_points().times(1).returning(|_| Ok(Some(0)));
    backend.expect_write_points().times(1).returning(|_, _| Ok(()));
    let api = test_api(backend);
    let (status, _) = post_webhook(api.clone(), "/webhooks/orders/paid", PAID_ORDER, Signature::Valid).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = post_webhook(api, "/webhooks/orders/paid", PAID_ORDER, Signature::Valid).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("already been processed"), "{body}");
}

#[actix_web::test]
async fn guest_order_is_a_bad_request() {
    let api = test_api(MockStoreBackend::new());
    let (status, body) = post_webhook(api, "/webhooks/orders/paid", GUEST_ORDER, Signature::Valid).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("no customer information"), "{body}");
}

#[actix_web::test]
async fn missing_signature_is_unauthorized() {
    let api = test_api(MockStoreBackend::new());
    let (status, body) = post_webhook(api.clone(), "/webhooks/orders/paid", PAID_ORDER, Signature::Missing).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains(r#""success":false"#), "{body}");
    assert!(api.ledger().is_empty());
}

#[actix_web::test]
async fn wrong_secret_is_unauthorized() {
    let api = test_api(MockStoreBackend::new());
    let (status, _) = post_webhook(api, "/webhooks/orders/paid", PAID_ORDER, Signature::WrongSecret).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unknown_topic_is_not_found() {
    let api = test_api(MockStoreBackend::new());
    let (status, body) = post_webhook(api, "/webhooks/customers/create", r#"{"id": 1}"#, Signature::Valid).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"success":false,"message":"Unhandled webhook topic"}"#);
}

#[actix_web::test]
async fn malformed_payload_is_a_bad_request() {
    let api = test_api(MockStoreBackend::new());
    let (status, _) = post_webhook(api, "/webhooks/orders/paid", "{not json", Signature::Valid).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn failed_write_is_a_server_error_and_can_be_retried() {
    let mut backend = MockStoreBackend::new();
    backend.expect_fetch_points().times(1).returning(|_| Ok(Some(5)));
    backend
        .expect_write_points()
        .times(1)
        .returning(|_, _| Err(BackendError::Unavailable("502 Bad Gateway".to_string())));
    let api = test_api(backend);
    let (status, body) = post_webhook(api.clone(), "/webhooks/orders/paid", PAID_ORDER, Signature::Valid).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("502 Bad Gateway"), "{body}");
    assert!(!api.ledger().contains(&OrderId::new("820982911946154508")).await.unwrap());
}

#[actix_web::test]
async fn unfulfilled_order_is_acknowledged_without_changes() {
    let api = test_api(MockStoreBackend::new());
    let (status, body) =
        post_webhook(api.clone(), "/webhooks/orders/fulfilled", UNFULFILLED_ORDER, Signature::Valid).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("does not qualify"), "{body}");
    assert!(api.ledger().is_empty());
}

#[actix_web::test]
async fn fulfilled_order_is_confirmed_then_awarded() {
    let mut backend = MockStoreBackend::new();
    backend.expect_fetch_order().with(eq(OrderId::new("820982911946154511"))).times(1).returning(|id| {
        Ok(OrderEvent::new(id.as_str())
            .with_customer("42")
            .with_total_price(Cents::from(15_000))
            .with_fulfillment_status("fulfilled"))
    });
    backend.expect_fetch_points().times(1).returning(|_| Ok(None));
    backend.expect_write_points().with(eq(customer_42()), eq(15)).times(1).returning(|_, _| Ok(()));
    let api = test_api(backend);
    let (status, _) = post_webhook(api, "/webhooks/orders/fulfilled", FULFILLED_ORDER, Signature::Valid).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn logging_topics_are_acknowledged() {
    let api = test_api(MockStoreBackend::new());
    let (status, _) = post_webhook(api.clone(), "/webhooks/orders/create", PAID_ORDER, Signature::Valid).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_webhook(api.clone(), "/webhooks/orders/delete", r#"{"id": 1001}"#, Signature::Valid).await;
    assert_eq!(status, StatusCode::OK);
    let product = r#"{"id": 632910392, "title": "IPod Nano - 8GB", "variants": [
        {"id": 808950810, "title": "Pink", "price": "199.00", "inventory_quantity": 10},
        {"id": 49148385, "title": "Red", "price": "199.00", "inventory_quantity": 20}]}"#;
    let (status, _) = post_webhook(api.clone(), "/webhooks/products/update", product, Signature::Valid).await;
    assert_eq!(status, StatusCode::OK);
    assert!(api.ledger().is_empty());
}

#[actix_web::test]
async fn rejected_balance_update_is_a_bad_request() {
    let mut backend = MockStoreBackend::new();
    backend.expect_fetch_points().times(1).returning(|_| Ok(Some(5)));
    backend.expect_write_points().times(1).returning(|_, _| {
        Err(BackendError::InvalidData("Shopify rejected the update: Value must be an integer".to_string()))
    });
    let api = test_api(backend);
    let (status, body) = post_webhook(api.clone(), "/webhooks/orders/paid", PAID_ORDER, Signature::Valid).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("must be an integer"), "{body}");
    assert!(!api.ledger().contains(&OrderId::new("820982911946154508")).await.unwrap());
}

#[actix_web::test]
async fn large_order_bodies_are_accepted() {
    let mut backend = MockStoreBackend::new();
    backend.expect_fetch_points().times(1).returning(|_| Ok(Some(0)));
    backend.expect_write_points().with(eq(customer_42()), eq(9)).times(1).returning(|_, _| Ok(()));
    let api = test_api(backend);
    let note = "x".repeat(512 * 1024);
    let order = format!(
        r#"{{"id": 820982911946154512, "total_price": "99.99", "customer": {{"id": 42}}, "note": "{note}"}}"#
    );
    let (status, body) = post_webhook(api, "/webhooks/orders/paid", &order, Signature::Valid).await;
    assert_eq!(status, StatusCode::OK, "{}", &body[..body.len().min(200)]);
}
