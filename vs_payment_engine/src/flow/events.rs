use serde::{Deserialize, Serialize};

use crate::db_types::{OrderStatusType, PaymentStatusType};

/// Maps a gateway event type onto the (payment status, order status) pair it implies.
///
/// The mapping is deliberately exhaustive and closed: any event type outside these three is accepted and
/// acknowledged but causes no state change.
pub fn transition_for_event(event_type: &str) -> Option<(PaymentStatusType, OrderStatusType)> {
    match event_type {
        "PAYMENT.CAPTURE.COMPLETED" => Some((PaymentStatusType::Approved, OrderStatusType::Completed)),
        "PAYMENT.CAPTURE.PENDING" => Some((PaymentStatusType::Pending, OrderStatusType::Pending)),
        "PAYMENT.CAPTURE.DENIED" => Some((PaymentStatusType::Canceled, OrderStatusType::Canceled)),
        _ => None,
    }
}

/// The acknowledgment body returned to the gateway for a webhook delivery. Always sent with HTTP 200: a
/// processed-but-rejected event must not make the gateway retry forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WebhookAck {
    pub fn ok() -> Self {
        Self { ok: Some(true), received: None, reason: None }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self { ok: Some(false), received: None, reason: Some(reason.into()) }
    }

    pub fn not_received(reason: impl Into<String>) -> Self {
        Self { ok: None, received: Some(false), reason: Some(reason.into()) }
    }
}
