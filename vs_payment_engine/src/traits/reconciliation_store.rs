use serde_json::Value;
use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewPaymentIntent, Order, Payment},
    traits::{IntentBookkeeping, Reconciliation, StatusTransition},
};

/// Transactional persistence contract for the reconciliation engine.
///
/// Mutating operations that touch more than one entity must be atomic: a concurrent reader never observes a
/// half-applied transition. Lookups are keyed by business identifiers (invoice id, gateway payment id), which is
/// what makes duplicate webhook delivery safe to re-apply.
#[allow(async_fn_in_trait)]
pub trait ReconciliationStore {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Validates that every item carries a positive quantity and references a currently-active product
    /// (duplicate product ids are collapsed before lookup; any missing or inactive id fails the whole call),
    /// computes the total from authoritative catalog prices, and writes Order + OrderItems as one atomic unit.
    async fn create_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError>;

    /// Fetches an order, scoped to its owning user.
    async fn fetch_order(&self, order_id: i64, user_id: &str) -> Result<Option<Order>, PaymentGatewayError>;

    /// Best-effort insert of the Payment row and, independently, the Audit row for a gateway intent that has
    /// already been created. A failure of either insert is logged and does not roll back the other: the intent
    /// has real-world effect at the gateway regardless of local bookkeeping, so missing rows must be
    /// recoverable by reconciliation rather than fatal.
    async fn record_intent(&self, intent: NewPaymentIntent) -> Result<IntentBookkeeping, PaymentGatewayError>;

    /// Looks up Payment and Audit by `invoice_id OR gateway_payment_id` (different callback paths surface
    /// different identifiers) and atomically updates the payer/payment-method snapshots and the audit response.
    /// If either record is missing, returns [`Reconciliation::NotFound`] without writing anything.
    ///
    /// With `canceled = true` the payment is additionally marked canceled; the payload is stored verbatim in
    /// both snapshot columns, matching the shape the gateway gives us on an abandoned checkout.
    async fn apply_terminal_update(
        &self,
        correlation_key: &str,
        payload: &Value,
        canceled: bool,
    ) -> Result<Reconciliation, PaymentGatewayError>;

    /// Looks up Payment, Audit and Order by invoice id; if any is missing, returns
    /// [`Reconciliation::NotFound`] and writes nothing. Otherwise, in one transaction: sets the payment
    /// status, appends the raw webhook body and verification result to the audit row, and sets the order
    /// status. A `Completed` order status additionally sets `paid = true` and `paid_at = now`.
    ///
    /// Orders never leave a terminal state: a transition targeting a different state than the one a
    /// `Completed`/`Canceled` order is already in yields [`Reconciliation::AlreadyFinal`] with no writes.
    /// Re-applying the same terminal state is an idempotent re-write.
    async fn apply_status_transition(&self, transition: StatusTransition) -> Result<Reconciliation, PaymentGatewayError>;

    /// Finds a payment by any of its known correlation keys (invoice id or gateway payment id) in a single
    /// composite lookup.
    async fn fetch_payment_by_correlation_key(&self, key: &str) -> Result<Option<Payment>, PaymentGatewayError>;
}

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("An order must contain at least one item")]
    EmptyOrder,
    #[error("Item quantities must be positive")]
    InvalidQuantity,
    #[error("Some products in the order were not found or are inactive")]
    ProductsNotFound,
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
