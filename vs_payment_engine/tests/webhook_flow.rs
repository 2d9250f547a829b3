//! Orchestration tests for [`ReconciliationApi`], with every seam mocked out.
use chrono::Utc;
use mockall::{mock, predicate::eq, Sequence};
use paypal_tools::{CaptureResult, CheckoutIntent, SignatureVerification, WebhookNotification};
use serde_json::{json, Value};
use vs_payment_engine::{
    db_types::{InvoiceId, NewOrder, NewOrderItem, NewPaymentIntent, Order, OrderStatusType, Payment},
    traits::{
        CacheError,
        GatewayError,
        IntentBookkeeping,
        ObjectCache,
        PaymentGateway,
        PaymentGatewayError,
        Reconciliation,
        ReconciliationStore,
        StatusTransition,
    },
    ReconciliationApi,
    WebhookAck,
};
use vsp_common::Money;

mock! {
    pub Store {}
    impl ReconciliationStore for Store {
        fn url(&self) -> &str;
        async fn create_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError>;
        async fn fetch_order(&self, order_id: i64, user_id: &str) -> Result<Option<Order>, PaymentGatewayError>;
        async fn record_intent(&self, intent: NewPaymentIntent) -> Result<IntentBookkeeping, PaymentGatewayError>;
        async fn apply_terminal_update(&self, correlation_key: &str, payload: &Value, canceled: bool) -> Result<Reconciliation, PaymentGatewayError>;
        async fn apply_status_transition(&self, transition: StatusTransition) -> Result<Reconciliation, PaymentGatewayError>;
        async fn fetch_payment_by_correlation_key(&self, key: &str) -> Result<Option<Payment>, PaymentGatewayError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_intent(&self, invoice_id: &str, currency: &str, amount: Money) -> Result<CheckoutIntent, GatewayError>;
        async fn capture_intent(&self, gateway_order_id: &str) -> Result<CaptureResult, GatewayError>;
        async fn verify_signature(&self, notification: &WebhookNotification) -> Result<SignatureVerification, GatewayError>;
        fn invalidate_credentials(&self);
    }
}

mock! {
    pub Cache {}
    impl ObjectCache for Cache {
        async fn get(&self, key: &str) -> Option<Value>;
        async fn put(&self, key: &str, value: Value);
        async fn delete(&self, key: &str);
        async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError>;
    }
}

fn notification(event_type: &str, invoice_id: Option<&str>) -> WebhookNotification {
    let mut event = json!({"event_type": event_type, "resource": {}});
    if let Some(inv) = invoice_id {
        event["resource"]["invoice_id"] = json!(inv);
    }
    WebhookNotification {
        auth_algo: "SHA256withRSA".into(),
        cert_url: "https://api.sandbox.paypal.com/cert".into(),
        transmission_id: "tx-0001".into(),
        transmission_sig: "c2ln".into(),
        transmission_time: "2024-06-01T00:00:00Z".into(),
        event,
    }
}

fn success_verification() -> SignatureVerification {
    SignatureVerification::from_raw(json!({"verification_status": "SUCCESS"}))
}

fn pending_order(id: i64, user_id: &str, total_cents: i64) -> Order {
    Order {
        id,
        user_id: user_id.into(),
        total_amount: Money::from_cents(total_cents),
        total_items: 1,
        status: OrderStatusType::Pending,
        paid: false,
        paid_at: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn completed_webhook_applies_transition_and_flushes_caches() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut gateway = MockGateway::new();
    let mut cache = MockCache::new();

    gateway.expect_verify_signature().times(1).returning(|_| Ok(success_verification()));
    store
        .expect_apply_status_transition()
        .withf(|t| t.invoice_id == InvoiceId("ORDER-1717000000000-0042".into()))
        .times(1)
        .returning(|_| Ok(Reconciliation::Applied { order_id: 7 }));
    cache.expect_delete_pattern().with(eq("orders:user:*")).times(1).returning(|_| Ok(3));
    cache.expect_delete_pattern().with(eq("orders:oneuser:*")).times(1).returning(|_| Ok(1));

    let api = ReconciliationApi::new(store, gateway, cache);
    let ack = api
        .handle_webhook(notification("PAYMENT.CAPTURE.COMPLETED", Some("ORDER-1717000000000-0042")))
        .await
        .unwrap();
    assert_eq!(ack, WebhookAck::ok());
}

#[tokio::test]
async fn verification_failure_refreshes_credentials_and_retries_exactly_once() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut gateway = MockGateway::new();
    let mut cache = MockCache::new();
    let mut seq = Sequence::new();

    gateway
        .expect_verify_signature()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(GatewayError::AuthRejected));
    gateway.expect_invalidate_credentials().times(1).in_sequence(&mut seq).return_const(());
    gateway.expect_verify_signature().times(1).in_sequence(&mut seq).returning(|_| Ok(success_verification()));
    store.expect_apply_status_transition().times(1).returning(|_| Ok(Reconciliation::Applied { order_id: 7 }));
    cache.expect_delete_pattern().times(2).returning(|_| Ok(0));

    let api = ReconciliationApi::new(store, gateway, cache);
    let ack = api.handle_webhook(notification("PAYMENT.CAPTURE.COMPLETED", Some("ORDER-1"))).await.unwrap();
    assert_eq!(ack, WebhookAck::ok());
}

#[tokio::test]
async fn verification_failing_twice_rejects_without_touching_the_store() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    // Exactly two attempts, never a third.
    gateway.expect_verify_signature().times(2).returning(|_| Err(GatewayError::CallFailed("timeout".into())));
    gateway.expect_invalidate_credentials().times(1).return_const(());

    let api = ReconciliationApi::new(MockStore::new(), gateway, MockCache::new());
    let ack = api.handle_webhook(notification("PAYMENT.CAPTURE.COMPLETED", Some("ORDER-1"))).await.unwrap();
    assert_eq!(ack, WebhookAck::rejected("verification-unavailable"));
}

#[tokio::test]
async fn invalid_signature_rejects_without_touching_the_store() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_verify_signature()
        .times(1)
        .returning(|_| Ok(SignatureVerification::from_raw(json!({"verification_status": "FAILURE"}))));

    let api = ReconciliationApi::new(MockStore::new(), gateway, MockCache::new());
    let ack = api.handle_webhook(notification("PAYMENT.CAPTURE.COMPLETED", Some("ORDER-1"))).await.unwrap();
    assert_eq!(ack, WebhookAck::rejected("invalid-signature"));
}

#[tokio::test]
async fn unmapped_events_are_acknowledged_and_ignored() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify_signature().times(1).returning(|_| Ok(success_verification()));

    let api = ReconciliationApi::new(MockStore::new(), gateway, MockCache::new());
    let ack = api.handle_webhook(notification("CHECKOUT.ORDER.APPROVED", Some("ORDER-1"))).await.unwrap();
    assert_eq!(ack, WebhookAck::ok());
}

#[tokio::test]
async fn mapped_event_without_an_invoice_id_is_reported_as_not_received() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_verify_signature().times(1).returning(|_| Ok(success_verification()));

    let api = ReconciliationApi::new(MockStore::new(), gateway, MockCache::new());
    let ack = api.handle_webhook(notification("PAYMENT.CAPTURE.COMPLETED", None)).await.unwrap();
    assert_eq!(ack, WebhookAck::not_received("no-invoice-id"));
}

#[tokio::test]
async fn already_final_orders_are_acknowledged_without_cache_invalidation() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut gateway = MockGateway::new();
    gateway.expect_verify_signature().times(1).returning(|_| Ok(success_verification()));
    store
        .expect_apply_status_transition()
        .times(1)
        .returning(|_| Ok(Reconciliation::AlreadyFinal { order_id: 7, status: OrderStatusType::Completed }));

    // No cache expectations: an untouched order means untouched caches.
    let api = ReconciliationApi::new(store, gateway, MockCache::new());
    let ack = api.handle_webhook(notification("PAYMENT.CAPTURE.DENIED", Some("ORDER-1"))).await.unwrap();
    assert_eq!(ack, WebhookAck::ok());
}

#[tokio::test]
async fn unknown_invoice_is_reported_as_not_received() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut gateway = MockGateway::new();
    gateway.expect_verify_signature().times(1).returning(|_| Ok(success_verification()));
    store
        .expect_apply_status_transition()
        .times(1)
        .returning(|_| Ok(Reconciliation::NotFound { what: "Payment", key: "ORDER-1".into() }));

    let api = ReconciliationApi::new(store, gateway, MockCache::new());
    let ack = api.handle_webhook(notification("PAYMENT.CAPTURE.COMPLETED", Some("ORDER-1"))).await.unwrap();
    assert_eq!(ack, WebhookAck::not_received("not-found"));
}

#[tokio::test]
async fn creating_an_order_invalidates_the_users_cached_views() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut cache = MockCache::new();
    store.expect_create_order().times(1).returning(|_| Ok(pending_order(7, "alice", 10_000)));
    cache.expect_delete_pattern().with(eq("orders:user:*")).times(1).returning(|_| Ok(1));
    cache.expect_delete_pattern().with(eq("orders:oneuser:alice")).times(1).returning(|_| Ok(0));

    let api = ReconciliationApi::new(store, MockGateway::new(), cache);
    let order = api
        .create_order(NewOrder::new("alice", vec![NewOrderItem { product_id: 1, quantity: 1 }]))
        .await
        .unwrap();
    assert_eq!(order.id, 7);
}

#[tokio::test]
async fn intent_amount_is_the_order_total_and_bookkeeping_is_best_effort() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut gateway = MockGateway::new();
    store.expect_fetch_order().with(eq(7), eq("alice")).times(1).returning(|_, _| Ok(Some(pending_order(7, "alice", 22_550))));
    gateway
        .expect_create_intent()
        .withf(|invoice_id, currency, amount| {
            invoice_id.starts_with("ORDER-") && currency == "USD" && *amount == Money::from_cents(22_550)
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(CheckoutIntent {
                id: "5O190127TN364715T".into(),
                links: vec![],
                create_time: None,
                raw: json!({"id": "5O190127TN364715T"}),
            })
        });
    // The store write blows up, but the intent was already created at the gateway and must still be returned.
    store
        .expect_record_intent()
        .times(1)
        .returning(|_| Err(PaymentGatewayError::DatabaseError("disk full".into())));

    let api = ReconciliationApi::new(store, gateway, MockCache::new());
    let intent = api.create_payment_intent(7, "alice", "USD").await.unwrap();
    assert_eq!(intent.id, "5O190127TN364715T");
}

#[tokio::test]
async fn intents_require_an_order_owned_by_the_caller() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_order().times(1).returning(|_, _| Ok(None));

    let api = ReconciliationApi::new(store, MockGateway::new(), MockCache::new());
    let err = api.create_payment_intent(7, "mallory", "USD").await.unwrap_err();
    assert_eq!(err.to_string(), "Order 7 does not exist for this user");
}

#[tokio::test]
async fn returns_are_keyed_by_the_captures_invoice_id() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut gateway = MockGateway::new();
    gateway
        .expect_capture_intent()
        .with(eq("5O190127TN364715T"))
        .times(1)
        .returning(|_| Ok(CaptureResult { invoice_id: "ORDER-42".into(), raw: json!({"status": "COMPLETED"}) }));
    store
        .expect_apply_terminal_update()
        .withf(|key, _, canceled| key == "ORDER-42" && !canceled)
        .times(1)
        .returning(|_, _, _| Ok(Reconciliation::NotFound { what: "Payment", key: "ORDER-42".into() }));

    // A capture with no matching local rows still resolves; the warning is the paper trail.
    let api = ReconciliationApi::new(store, gateway, MockCache::new());
    let invoice_id = api.handle_return("5O190127TN364715T").await.unwrap();
    assert_eq!(invoice_id, InvoiceId("ORDER-42".into()));
}

#[tokio::test]
async fn cancels_mark_the_payment_canceled_by_gateway_token() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store
        .expect_apply_terminal_update()
        .withf(|key, payload, canceled| key == "5O190127TN364715T" && *payload == json!("ORDER_NOT_APPROVED") && *canceled)
        .times(1)
        .returning(|_, _, _| Ok(Reconciliation::Applied { order_id: 7 }));

    let api = ReconciliationApi::new(store, MockGateway::new(), MockCache::new());
    let outcome = api.handle_cancel("5O190127TN364715T").await.unwrap();
    assert_eq!(outcome, Reconciliation::Applied { order_id: 7 });
}

#[tokio::test]
async fn cache_invalidation_failures_are_swallowed() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    let mut cache = MockCache::new();
    store.expect_create_order().times(1).returning(|_| Ok(pending_order(7, "alice", 10_000)));
    cache.expect_delete_pattern().times(2).returning(|p| Err(CacheError::InvalidPattern(p.to_string())));

    let api = ReconciliationApi::new(store, MockGateway::new(), cache);
    assert!(api.create_order(NewOrder::new("alice", vec![NewOrderItem { product_id: 1, quantity: 1 }])).await.is_ok());
}
