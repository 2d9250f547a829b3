use paypal_tools::{CheckoutIntent, IntentLink};
use serde::{Deserialize, Serialize};
use vs_payment_engine::db_types::NewOrderItem;

/// Body of `POST /api/orders`. The user id comes from the `X-User-Id` header, not the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub items: Vec<NewOrderItem>,
}

/// Body of `POST /api/payments/create-payment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub order_id: i64,
    /// ISO-4217 code; defaults to USD when absent.
    pub currency: Option<String>,
}

/// What the storefront gets back for a freshly created intent: the gateway's id and its links (including the
/// `approve` link the shopper must be sent to). The full gateway response stays in the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentResult {
    pub id: String,
    pub links: Vec<IntentLink>,
}

impl From<CheckoutIntent> for CreatePaymentResult {
    fn from(intent: CheckoutIntent) -> Self {
        Self { id: intent.id, links: intent.links }
    }
}

/// Query parameters of the gateway's return redirect. Both are required; they are `Option`s so that a missing
/// one produces our own 400 rather than a framework error.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnParams {
    pub token: Option<String>,
    #[serde(rename = "PayerID")]
    pub payer_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelParams {
    pub token: Option<String>,
}
