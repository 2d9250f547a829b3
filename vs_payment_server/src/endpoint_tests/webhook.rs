use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::json;
use vs_payment_engine::{traits::Reconciliation, ReconciliationApi};

use crate::{
    endpoint_tests::{
        helpers::{frontend_config, send_request},
        mocks::{MockCache, MockGateway, MockStore},
    },
    routes::api_scope,
};

fn install(cfg: &mut ServiceConfig, store: MockStore, gateway: MockGateway, cache: MockCache) {
    let api = ReconciliationApi::new(store, gateway, cache);
    cfg.app_data(web::Data::new(api))
        .app_data(web::Data::new(frontend_config()))
        .service(api_scope::<MockStore, MockGateway, MockCache>());
}

fn webhook_request() -> TestRequest {
    TestRequest::post().uri("/api/payments/webhook").set_json(json!({
        "event_type": "PAYMENT.CAPTURE.COMPLETED",
        "resource": {"invoice_id": "ORDER-1717000000000-0042"},
    }))
}

fn signature_headers(req: TestRequest) -> TestRequest {
    req.insert_header(("paypal-auth-algo", "SHA256withRSA"))
        .insert_header(("paypal-cert-url", "https://api.sandbox.paypal.com/cert"))
        .insert_header(("paypal-transmission-id", "tx-0001"))
        .insert_header(("paypal-transmission-sig", "c2ln"))
        .insert_header(("paypal-transmission-time", "2024-06-01T00:00:00Z"))
}

#[actix_web::test]
async fn deliveries_without_a_signature_never_reach_the_gateway() {
    let _ = env_logger::try_init().ok();
    let (status, _, body) = send_request(webhook_request(), configure_untouched).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"received":false,"reason":"no-signature"}"#);
}

#[actix_web::test]
async fn verified_deliveries_are_reconciled_and_acknowledged() {
    let _ = env_logger::try_init().ok();
    let (status, _, body) = send_request(signature_headers(webhook_request()), configure_reconciled).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"ok":true}"#);
}

fn configure_reconciled(cfg: &mut ServiceConfig) {
    use paypal_tools::SignatureVerification;
    let mut store = MockStore::new();
    let mut gateway = MockGateway::new();
    let mut cache = MockCache::new();
    gateway.expect_verify_signature().withf(|n| n.transmission_id == "tx-0001").returning(|_| {
        Ok(SignatureVerification::from_raw(json!({"verification_status": "SUCCESS"})))
    });
    store.expect_apply_status_transition().returning(|_| Ok(Reconciliation::Applied { order_id: 7 }));
    cache.expect_delete_pattern().times(2).returning(|_| Ok(0));
    install(cfg, store, gateway, cache);
}

#[actix_web::test]
async fn backend_failures_still_acknowledge_with_200() {
    let _ = env_logger::try_init().ok();
    let (status, _, body) = send_request(signature_headers(webhook_request()), configure_backend_failure).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"ok":false,"reason":"internal-error"}"#);
}

fn configure_backend_failure(cfg: &mut ServiceConfig) {
    use paypal_tools::SignatureVerification;
    use vs_payment_engine::traits::PaymentGatewayError;
    let mut store = MockStore::new();
    let mut gateway = MockGateway::new();
    gateway
        .expect_verify_signature()
        .returning(|_| Ok(SignatureVerification::from_raw(json!({"verification_status": "SUCCESS"}))));
    store
        .expect_apply_status_transition()
        .returning(|_| Err(PaymentGatewayError::DatabaseError("database is locked".to_string())));
    install(cfg, store, gateway, MockCache::new());
}

/// Mocks with no expectations: nothing downstream may be touched.
fn configure_untouched(cfg: &mut ServiceConfig) {
    install(cfg, MockStore::new(), MockGateway::new(), MockCache::new());
}
