//! Glue between the engine's [`PaymentGateway`] seam and the concrete [`PayPalApi`] client.
use paypal_tools::{CaptureResult, CheckoutIntent, PayPalApi, PayPalConfig, SignatureVerification, WebhookNotification};
use vs_payment_engine::traits::{GatewayError, PaymentGateway};
use vsp_common::Money;

use crate::errors::ServerError;

#[derive(Clone)]
pub struct PayPalGateway(PayPalApi);

impl PayPalGateway {
    pub fn new(config: PayPalConfig) -> Result<Self, ServerError> {
        let api = PayPalApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self(api))
    }

    pub fn api(&self) -> &PayPalApi {
        &self.0
    }
}

impl PaymentGateway for PayPalGateway {
    async fn create_intent(&self, invoice_id: &str, currency: &str, amount: Money) -> Result<CheckoutIntent, GatewayError> {
        let intent = self.0.create_intent(invoice_id, currency, amount).await?;
        Ok(intent)
    }

    async fn capture_intent(&self, gateway_order_id: &str) -> Result<CaptureResult, GatewayError> {
        let capture = self.0.capture_intent(gateway_order_id).await?;
        Ok(capture)
    }

    async fn verify_signature(&self, notification: &WebhookNotification) -> Result<SignatureVerification, GatewayError> {
        let verification = self.0.verify_webhook_signature(notification).await?;
        Ok(verification)
    }

    fn invalidate_credentials(&self) {
        self.0.credentials().invalidate();
    }
}
