use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::*;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use vsp_common::Money;

use crate::{
    config::PayPalConfig,
    data_objects::{AccessToken, CaptureResult, CheckoutIntent, SignatureVerification, VerifySignatureRequest, WebhookNotification},
    error::PayPalApiError,
    token::CredentialCache,
};

/// A thin client over the gateway's REST API. All calls carry the configured timeout; none of them retries by
/// itself. Retry policy (one retry after a forced credential refresh) belongs to the caller.
#[derive(Clone)]
pub struct PayPalApi {
    config: PayPalConfig,
    client: Arc<Client>,
    credentials: Arc<CredentialCache>,
}

impl PayPalApi {
    pub fn new(config: PayPalConfig) -> Result<Self, PayPalApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PayPalApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), credentials: Arc::new(CredentialCache::new()) })
    }

    pub fn config(&self) -> &PayPalConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Returns a bearer token for the gateway, performing a client-credentials exchange if the cached one is
    /// stale or absent.
    pub async fn access_token(&self) -> Result<String, PayPalApiError> {
        self.credentials.get_or_refresh(|| self.exchange_token()).await
    }

    async fn exchange_token(&self) -> Result<AccessToken, PayPalApiError> {
        trace!("🅿️ Requesting a fresh access token from the gateway");
        let response = self
            .client
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(self.config.client_secret.reveal()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PayPalApiError::AuthFailed(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!("🅿️ Gateway credential exchange failed with status {status}");
            return Err(PayPalApiError::AuthFailed(format!("status {status}. {message}")));
        }
        response.json::<AccessToken>().await.map_err(|e| PayPalApiError::JsonError(e.to_string()))
    }

    /// Asks the gateway whether `notification` was genuinely sent by it. A 401/403 response surfaces as
    /// [`PayPalApiError::AuthRejected`] so that the caller can evict the credential and retry.
    pub async fn verify_webhook_signature(
        &self,
        notification: &WebhookNotification,
    ) -> Result<SignatureVerification, PayPalApiError> {
        let token = self.access_token().await?;
        let body = VerifySignatureRequest {
            auth_algo: &notification.auth_algo,
            cert_url: &notification.cert_url,
            transmission_id: &notification.transmission_id,
            transmission_sig: &notification.transmission_sig,
            transmission_time: &notification.transmission_time,
            webhook_id: &self.config.webhook_id,
            webhook_event: &notification.event,
        };
        trace!("🅿️ Verifying webhook signature for transmission {}", notification.transmission_id);
        let response = self
            .client
            .post(self.url("/v1/notifications/verify-webhook-signature"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PayPalApiError::RequestError(e.to_string()))?;
        match response.status() {
            s if s.is_success() => {
                let raw = response.json::<Value>().await.map_err(|e| PayPalApiError::JsonError(e.to_string()))?;
                Ok(SignatureVerification::from_raw(raw))
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PayPalApiError::AuthRejected),
            s => {
                let message = response.text().await.unwrap_or_default();
                Err(PayPalApiError::QueryError { status: s.as_u16(), message })
            },
        }
    }

    /// Creates a `CAPTURE` checkout intent at the gateway.
    ///
    /// The amount must be the locally computed order total; it is copied verbatim onto the wire and never
    /// re-derived from client input.
    pub async fn create_intent(
        &self,
        invoice_id: &str,
        currency: &str,
        amount: Money,
    ) -> Result<CheckoutIntent, PayPalApiError> {
        let token = self.access_token().await?;
        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": currency,
                    "value": amount.to_decimal_string(),
                },
                "invoice_id": invoice_id,
            }],
            "application_context": {
                "brand_name": self.config.brand_name,
                "landing_page": "NO_PREFERENCE",
                "user_action": "PAY_NOW",
                "return_url": self.config.return_url,
                "cancel_url": self.config.cancel_url,
            },
        });
        debug!("🅿️ Creating checkout intent for invoice {invoice_id} ({amount} {currency})");
        let response = self
            .client
            .post(self.url("/v2/checkout/orders"))
            .bearer_auth(token)
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .map_err(|e| PayPalApiError::RequestError(e.to_string()))?;
        let raw = Self::json_or_error(response).await?;
        let id = raw["id"].as_str().ok_or_else(|| PayPalApiError::MissingField("id".to_string()))?.to_string();
        let links = serde_json::from_value(raw["links"].clone()).unwrap_or_default();
        let create_time = raw["create_time"]
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));
        trace!("🅿️ Gateway created intent {id} for invoice {invoice_id}");
        Ok(CheckoutIntent { id, links, create_time, raw })
    }

    /// Finalizes a previously approved intent. Returns the invoice id extracted from the capture response, which
    /// is the only trustworthy link back to the local Payment and Audit rows.
    pub async fn capture_intent(&self, gateway_order_id: &str) -> Result<CaptureResult, PayPalApiError> {
        let token = self.access_token().await?;
        debug!("🅿️ Capturing checkout intent {gateway_order_id}");
        let response = self
            .client
            .post(self.url(&format!("/v2/checkout/orders/{gateway_order_id}/capture")))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| PayPalApiError::RequestError(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PayPalApiError::IntentNotFound(gateway_order_id.to_string()));
        }
        let raw = Self::json_or_error(response).await?;
        let invoice_id = raw["purchase_units"][0]["payments"]["captures"][0]["invoice_id"]
            .as_str()
            .ok_or_else(|| PayPalApiError::MissingField("purchase_units[0].payments.captures[0].invoice_id".to_string()))?
            .to_string();
        trace!("🅿️ Capture of {gateway_order_id} complete. Invoice id is {invoice_id}");
        Ok(CaptureResult { invoice_id, raw })
    }

    async fn json_or_error(response: reqwest::Response) -> Result<Value, PayPalApiError> {
        if response.status().is_success() {
            response.json::<Value>().await.map_err(|e| PayPalApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PayPalApiError::ResponseError(e.to_string()))?;
            Err(PayPalApiError::QueryError { status, message })
        }
    }
}
