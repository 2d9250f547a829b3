use serde_json::Value;

use crate::db_types::{AuditRecord, InvoiceId, OrderStatusType, Payment, PaymentStatusType};

/// The outcome of trying to reconcile an inbound gateway event against local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// All affected records were updated in a single transaction.
    Applied { order_id: i64 },
    /// A record needed for reconciliation does not exist. Duplicate, late and irrelevant deliveries are
    /// expected traffic, so this is a benign no-op, not an error.
    NotFound { what: &'static str, key: String },
    /// The order already sits in a different terminal state; the event was acknowledged but nothing was
    /// written.
    AlreadyFinal { order_id: i64, status: OrderStatusType },
}

impl Reconciliation {
    /// The `received` flag reported back to the gateway.
    pub fn was_received(&self) -> bool {
        !matches!(self, Reconciliation::NotFound { .. })
    }
}

/// A webhook-driven state transition, applied atomically to Payment, Audit and Order.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    pub invoice_id: InvoiceId,
    pub payment_status: PaymentStatusType,
    pub order_status: OrderStatusType,
    /// Raw webhook body, appended to the audit trail verbatim.
    pub raw_body: Value,
    /// Raw signature-verification response, appended to the audit trail verbatim.
    pub raw_verification: Value,
}

/// What actually got persisted by a best-effort [`record_intent`](crate::traits::ReconciliationStore::record_intent)
/// call. Either side may be absent; reconciliation recovers from missing rows later.
#[derive(Debug, Clone, Default)]
pub struct IntentBookkeeping {
    pub payment: Option<Payment>,
    pub audit: Option<AuditRecord>,
}
