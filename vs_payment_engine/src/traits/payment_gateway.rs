use paypal_tools::{CaptureResult, CheckoutIntent, PayPalApiError, SignatureVerification, WebhookNotification};
use thiserror::Error;
use vsp_common::Money;

/// The engine's view of the external payment provider.
///
/// None of these calls retries internally. The engine owns the retry policy (exactly one retry after
/// [`invalidate_credentials`](PaymentGateway::invalidate_credentials) for verification calls), which keeps retry
/// storms against a downed gateway structurally impossible.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Creates a CAPTURE intent at the gateway for the given invoice id and locally computed amount.
    async fn create_intent(
        &self,
        invoice_id: &str,
        currency: &str,
        amount: Money,
    ) -> Result<CheckoutIntent, GatewayError>;

    /// Finalizes a previously approved intent. The returned invoice id comes from the capture response and is
    /// the authoritative link back to local records.
    async fn capture_intent(&self, gateway_order_id: &str) -> Result<CaptureResult, GatewayError>;

    /// Asks the gateway whether the notification is authentic.
    async fn verify_signature(&self, notification: &WebhookNotification) -> Result<SignatureVerification, GatewayError>;

    /// Evicts the cached gateway credential so the next call performs a fresh exchange.
    fn invalidate_credentials(&self);
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("The gateway rejected our credentials")]
    AuthRejected,
    #[error("No intent with id {0} exists at the gateway")]
    IntentNotFound(String),
    #[error("Gateway call failed: {0}")]
    CallFailed(String),
}

impl From<PayPalApiError> for GatewayError {
    fn from(e: PayPalApiError) -> Self {
        match e {
            PayPalApiError::AuthRejected | PayPalApiError::AuthFailed(_) => Self::AuthRejected,
            PayPalApiError::IntentNotFound(id) => Self::IntentNotFound(id),
            other => Self::CallFailed(other.to_string()),
        }
    }
}
