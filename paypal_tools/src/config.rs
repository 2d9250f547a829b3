use std::time::Duration;

use log::*;
use vsp_common::Secret;

pub const DEFAULT_PAYPAL_API_URL: &str = "https://api-m.sandbox.paypal.com";
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct PayPalConfig {
    /// Base url of the gateway REST API, e.g. `https://api-m.sandbox.paypal.com`
    pub api_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    /// The id of the webhook registered with the gateway. It is part of every signature verification request.
    pub webhook_id: String,
    pub brand_name: String,
    /// Where the gateway sends the shopper after approving a payment.
    pub return_url: String,
    /// Where the gateway sends the shopper after abandoning a payment.
    pub cancel_url: String,
    /// Applied to every request made against the gateway.
    pub timeout: Duration,
}

impl Default for PayPalConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_PAYPAL_API_URL.to_string(),
            client_id: String::default(),
            client_secret: Secret::default(),
            webhook_id: String::default(),
            brand_name: "Virtual Store".to_string(),
            return_url: String::default(),
            cancel_url: String::default(),
            timeout: Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS),
        }
    }
}

impl PayPalConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("VSP_PAYPAL_API_URL").unwrap_or_else(|_| {
            warn!("VSP_PAYPAL_API_URL not set, using the sandbox url");
            DEFAULT_PAYPAL_API_URL.to_string()
        });
        let client_id = std::env::var("VSP_PAYPAL_CLIENT_ID").unwrap_or_else(|_| {
            warn!("VSP_PAYPAL_CLIENT_ID not set, using (probably useless) default");
            "sb-client-id".to_string()
        });
        let client_secret = Secret::new(std::env::var("VSP_PAYPAL_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("VSP_PAYPAL_CLIENT_SECRET not set, using (probably useless) default");
            "sb-client-secret".to_string()
        }));
        let webhook_id = std::env::var("VSP_PAYPAL_WEBHOOK_ID").unwrap_or_else(|_| {
            warn!("VSP_PAYPAL_WEBHOOK_ID not set, signature verification will fail");
            String::default()
        });
        let brand_name = std::env::var("VSP_BRAND_NAME").unwrap_or_else(|_| "Virtual Store".to_string());
        let backend_url = std::env::var("VSP_BACKEND_URL").unwrap_or_else(|_| {
            warn!("VSP_BACKEND_URL not set, using localhost");
            "http://localhost:8480".to_string()
        });
        let return_url = format!("{backend_url}/api/payments/return");
        let cancel_url = format!("{backend_url}/api/payments/cancel");
        let timeout = std::env::var("VSP_GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS));
        Self { api_url, client_id, client_secret, webhook_id, brand_name, return_url, cancel_url, timeout }
    }
}
