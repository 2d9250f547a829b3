use mockall::mock;
use paypal_tools::{CaptureResult, CheckoutIntent, SignatureVerification, WebhookNotification};
use serde_json::Value;
use vs_payment_engine::{
    db_types::{NewOrder, NewPaymentIntent, Order, OrderStatusType, Payment},
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

/// A pending order for user `alice`, as the store would return it.
pub fn pending_order(id: i64, total_cents: i64) -> Order {
    Order {
        id,
        user_id: "alice".to_string(),
        total_amount: Money::from_cents(total_cents),
        total_items: 1,
        status: OrderStatusType::Pending,
        paid: false,
        paid_at: None,
        created_at: chrono::Utc::now(),
    }
}
