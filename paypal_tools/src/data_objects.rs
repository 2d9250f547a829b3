use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The result of a client-credentials exchange against the gateway's oauth endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Advertised token lifetime, in seconds.
    pub expires_in: i64,
}

/// An inbound webhook notification, as assembled from the gateway's signature headers and the raw event body.
///
/// The raw event body is kept as an opaque [`Value`] and passed through to the verification endpoint and the audit
/// trail verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookNotification {
    pub auth_algo: String,
    pub cert_url: String,
    pub transmission_id: String,
    pub transmission_sig: String,
    pub transmission_time: String,
    pub event: Value,
}

impl WebhookNotification {
    pub fn event_type(&self) -> Option<&str> {
        self.event["event_type"].as_str()
    }

    /// The merchant invoice id carried in the event resource, if any.
    pub fn invoice_id(&self) -> Option<&str> {
        self.event["resource"]["invoice_id"].as_str()
    }
}

/// Wire format of the gateway's verify-webhook-signature endpoint.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct VerifySignatureRequest<'a> {
    pub auth_algo: &'a str,
    pub cert_url: &'a str,
    pub transmission_id: &'a str,
    pub transmission_sig: &'a str,
    pub transmission_time: &'a str,
    pub webhook_id: &'a str,
    pub webhook_event: &'a Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureVerification {
    pub verification_status: String,
    /// The verification response exactly as the gateway returned it, for the audit trail.
    pub raw: Value,
}

impl SignatureVerification {
    pub fn from_raw(raw: Value) -> Self {
        let verification_status = raw["verification_status"].as_str().unwrap_or_default().to_string();
        Self { verification_status, raw }
    }

    /// Only the literal status `SUCCESS` authorizes acting on a notification. Anything else is an invalid
    /// signature, not a system error.
    pub fn is_success(&self) -> bool {
        self.verification_status == "SUCCESS"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentLink {
    pub href: String,
    pub rel: String,
    pub method: String,
}

/// A checkout intent as created at the gateway. The shopper must approve it (via the `approve` link) before it can
/// be captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutIntent {
    /// The gateway's id for the intent. Not the same identifier space as our invoice id.
    pub id: String,
    #[serde(default)]
    pub links: Vec<IntentLink>,
    pub create_time: Option<DateTime<Utc>>,
    /// The complete creation response, kept verbatim for the audit trail.
    pub raw: Value,
}

/// The result of capturing an approved intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureResult {
    /// The authoritative invoice id, extracted from the capture response. This value, not anything the client
    /// sent, links the capture back to the local Payment and Audit rows.
    pub invoice_id: String,
    pub raw: Value,
}
