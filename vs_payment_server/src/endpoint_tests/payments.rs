use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::json;
use vs_payment_engine::{traits::Reconciliation, ReconciliationApi};

use crate::{
    endpoint_tests::{
        helpers::{frontend_config, location_of, send_request},
        mocks::{pending_order, MockCache, MockGateway, MockStore},
    },
    routes::api_scope,
};

fn install(cfg: &mut ServiceConfig, store: MockStore, gateway: MockGateway, cache: MockCache) {
    let api = ReconciliationApi::new(store, gateway, cache);
    cfg.app_data(web::Data::new(api))
        .app_data(web::Data::new(frontend_config()))
        .service(api_scope::<MockStore, MockGateway, MockCache>());
}

#[actix_web::test]
async fn orders_require_the_user_header() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/api/orders").set_json(json!({"items": [{"product_id": 1, "quantity": 1}]}));
    let (status, _, body) = send_request(req, configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Missing X-User-Id header"), "unexpected body: {body}");
}

#[actix_web::test]
async fn orders_are_created_and_echoed_back() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/api/orders")
        .insert_header(("X-User-Id", "alice"))
        .set_json(json!({"items": [{"product_id": 1, "quantity": 2}]}));
    let (status, _, body) = send_request(req, configure_create_order).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains(r#""id":7"#), "unexpected body: {body}");
    assert!(body.contains(r#""status":"PENDING""#), "unexpected body: {body}");
}

fn configure_create_order(cfg: &mut ServiceConfig) {
    let mut store = MockStore::new();
    let mut cache = MockCache::new();
    store
        .expect_create_order()
        .withf(|order| {
            order.user_id == "alice"
                && order.items.len() == 1
                && order.items[0].product_id == 1
                && order.items[0].quantity == 2
        })
        .returning(|_| Ok(pending_order(7, 20_000)));
    cache.expect_delete_pattern().times(2).returning(|_| Ok(0));
    install(cfg, store, MockGateway::new(), cache);
}

#[actix_web::test]
async fn payment_intents_return_the_gateway_links() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/api/payments/create-payment")
        .insert_header(("X-User-Id", "alice"))
        .set_json(json!({"orderId": 7}));
    let (status, _, body) = send_request(req, configure_create_payment).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"id":"5O190127TN364715T","links":[{"href":"https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T","rel":"approve","method":"GET"}]}"#
    );
}

fn configure_create_payment(cfg: &mut ServiceConfig) {
    use paypal_tools::{CheckoutIntent, IntentLink};
    let mut store = MockStore::new();
    let mut gateway = MockGateway::new();
    store.expect_fetch_order().returning(|_, _| Ok(Some(pending_order(7, 20_000))));
    gateway.expect_create_intent().withf(|_, currency, _| currency == "USD").returning(|_, _, _| {
        Ok(CheckoutIntent {
            id: "5O190127TN364715T".to_string(),
            links: vec![IntentLink {
                href: "https://www.sandbox.paypal.com/checkoutnow?token=5O190127TN364715T".to_string(),
                rel: "approve".to_string(),
                method: "GET".to_string(),
            }],
            create_time: None,
            raw: serde_json::json!({"id": "5O190127TN364715T"}),
        })
    });
    store.expect_record_intent().returning(|_| Ok(Default::default()));
    install(cfg, store, gateway, MockCache::new());
}

#[actix_web::test]
async fn payment_intents_for_unknown_orders_are_404() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post()
        .uri("/api/payments/create-payment")
        .insert_header(("X-User-Id", "mallory"))
        .set_json(json!({"orderId": 7}));
    let (status, _, body) = send_request(req, configure_unknown_order).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("not found"), "unexpected body: {body}");
}

fn configure_unknown_order(cfg: &mut ServiceConfig) {
    let mut store = MockStore::new();
    store.expect_fetch_order().returning(|_, _| Ok(None));
    install(cfg, store, MockGateway::new(), MockCache::new());
}

#[actix_web::test]
async fn returns_without_both_params_are_400() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/api/payments/return?token=5O190127TN364715T");
    let (status, _, _) = send_request(req, configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::get().uri("/api/payments/return?PayerID=HYLQHC8B2CDGN");
    let (status, _, _) = send_request(req, configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn successful_returns_redirect_to_the_checkout_page() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/api/payments/return?token=5O190127TN364715T&PayerID=HYLQHC8B2CDGN");
    let (status, headers, _) = send_request(req, configure_return_ok).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location_of(&headers), "http://frontend/checkout/ORDER-1717000000000-0042");
}

fn configure_return_ok(cfg: &mut ServiceConfig) {
    use paypal_tools::CaptureResult;
    let mut store = MockStore::new();
    let mut gateway = MockGateway::new();
    gateway.expect_capture_intent().returning(|_| {
        Ok(CaptureResult { invoice_id: "ORDER-1717000000000-0042".to_string(), raw: serde_json::json!({}) })
    });
    store.expect_apply_terminal_update().returning(|_, _, _| Ok(Reconciliation::Applied { order_id: 7 }));
    install(cfg, store, gateway, MockCache::new());
}

#[actix_web::test]
async fn failed_captures_redirect_to_the_error_page() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/api/payments/return?token=5O190127TN364715T&PayerID=HYLQHC8B2CDGN");
    let (status, headers, _) = send_request(req, configure_return_failure).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location_of(&headers), "http://frontend/error");
}

fn configure_return_failure(cfg: &mut ServiceConfig) {
    use vs_payment_engine::traits::GatewayError;
    let mut gateway = MockGateway::new();
    gateway.expect_capture_intent().returning(|id| Err(GatewayError::IntentNotFound(id.to_string())));
    install(cfg, MockStore::new(), gateway, MockCache::new());
}

#[actix_web::test]
async fn cancels_without_a_token_are_400() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/api/payments/cancel");
    let (status, _, _) = send_request(req, configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn cancels_redirect_back_to_the_cart() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/api/payments/cancel?token=5O190127TN364715T");
    let (status, headers, _) = send_request(req, configure_cancel).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(location_of(&headers), "http://frontend/cart");
}

fn configure_cancel(cfg: &mut ServiceConfig) {
    let mut store = MockStore::new();
    store
        .expect_apply_terminal_update()
        .withf(|key, _, canceled| key == "5O190127TN364715T" && *canceled)
        .returning(|_, _, _| Ok(Reconciliation::Applied { order_id: 7 }));
    install(cfg, store, MockGateway::new(), MockCache::new());
}

/// Mocks with no expectations: the request must bounce before any backend call happens.
fn configure_untouched(cfg: &mut ServiceConfig) {
    install(cfg, MockStore::new(), MockGateway::new(), MockCache::new());
}
