use std::fmt::Debug;

use log::*;
use paypal_tools::{CheckoutIntent, SignatureVerification, WebhookNotification};
use serde_json::json;

use crate::{
    cache::keys,
    db_types::{InvoiceId, NewOrder, NewPaymentIntent, Order},
    flow::{
        errors::ReconciliationError,
        events::{transition_for_event, WebhookAck},
    },
    helpers::new_invoice_id,
    traits::{GatewayError, ObjectCache, PaymentGateway, Reconciliation, ReconciliationStore, StatusTransition},
};

/// `ReconciliationApi` is the primary API for driving the payment lifecycle: creating gateway intents,
/// handling the shopper's return/cancel redirects, and reconciling asynchronous webhook notifications
/// against local Order/Payment/Audit state.
pub struct ReconciliationApi<B, G, C> {
    db: B,
    gateway: G,
    cache: C,
}

impl<B, G, C> Debug for ReconciliationApi<B, G, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B, G, C> ReconciliationApi<B, G, C> {
    pub fn new(db: B, gateway: G, cache: C) -> Self {
        Self { db, gateway, cache }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B, G, C> ReconciliationApi<B, G, C>
where
    B: ReconciliationStore,
    G: PaymentGateway,
    C: ObjectCache,
{
    /// Places a new order: items are validated against the active catalog and the total is computed from
    /// catalog prices inside the store. Cached order lists and the user's per-order views are invalidated
    /// afterwards.
    pub async fn create_order(&self, order: NewOrder) -> Result<Order, ReconciliationError> {
        let user_id = order.user_id.clone();
        let order = self.db.create_order(order).await?;
        debug!("🔄️📦️ Order #{} created for user {user_id}", order.id);
        self.invalidate_caches(&[keys::ORDERS_ALL_USERS, &keys::one_user(&user_id)]).await;
        Ok(order)
    }

    /// Creates a payment intent at the gateway for an existing order.
    ///
    /// The amount sent to the gateway is the order total as computed at checkout; client input never touches
    /// it. Once the gateway call has succeeded the intent is real, so local bookkeeping
    /// ([`ReconciliationStore::record_intent`]) is best-effort: a failure there is logged and the intent is
    /// still returned to the caller.
    pub async fn create_payment_intent(
        &self,
        order_id: i64,
        user_id: &str,
        currency: &str,
    ) -> Result<CheckoutIntent, ReconciliationError> {
        let order = self
            .db
            .fetch_order(order_id, user_id)
            .await?
            .ok_or(ReconciliationError::OrderNotFound(order_id))?;
        let invoice_id = new_invoice_id();
        let intent = self.gateway.create_intent(invoice_id.as_str(), currency, order.total_amount).await?;
        info!("🔄️💳️ Gateway intent {} created for order #{order_id} (invoice {invoice_id})", intent.id);
        let bookkeeping = NewPaymentIntent {
            invoice_id: invoice_id.clone(),
            order_id,
            gateway_payment_id: Some(intent.id.clone()),
            raw_response: intent.raw.clone(),
            date_created: intent.create_time.unwrap_or_else(chrono::Utc::now),
        };
        if let Err(e) = self.db.record_intent(bookkeeping).await {
            // The intent exists at the gateway regardless; reconciliation will recover the missing rows.
            error!("🔄️💳️ Bookkeeping for invoice {invoice_id} failed and will need reconciliation. {e}");
        }
        Ok(intent)
    }

    /// The shopper approved the payment at the gateway and was redirected back to us. Captures the intent
    /// and applies the terminal update, keyed by the invoice id the *capture response* reports.
    ///
    /// Returns the resolved invoice id for the frontend redirect.
    pub async fn handle_return(&self, gateway_order_id: &str) -> Result<InvoiceId, ReconciliationError> {
        let capture = self.gateway.capture_intent(gateway_order_id).await?;
        debug!("🔄️💳️ Intent {gateway_order_id} captured; invoice id is {}", capture.invoice_id);
        let outcome = self.db.apply_terminal_update(&capture.invoice_id, &capture.raw, false).await?;
        if !outcome.was_received() {
            // The capture is real even if we have nothing to pin it to; the audit trail at the gateway plus
            // the raw capture response are what manual reconciliation will work from.
            warn!("🔄️💳️ No local records matched invoice {} after capture", capture.invoice_id);
        }
        Ok(InvoiceId(capture.invoice_id))
    }

    /// The shopper abandoned the payment at the gateway. No capture has occurred, so no gateway-side
    /// terminal state exists; the raw gateway order token is the only correlation key available.
    pub async fn handle_cancel(&self, gateway_order_id: &str) -> Result<Reconciliation, ReconciliationError> {
        let payload = json!("ORDER_NOT_APPROVED");
        let outcome = self.db.apply_terminal_update(gateway_order_id, &payload, true).await?;
        debug!("🔄️💳️ Cancel recorded for gateway order {gateway_order_id}: {outcome:?}");
        Ok(outcome)
    }

    /// Reconciles an asynchronous webhook notification.
    ///
    /// The notification is authenticated first; only a literal `SUCCESS` verification authorizes any state
    /// change. Mapped event types drive the state machine through a single atomic transition; everything
    /// else is acknowledged and ignored. Duplicate deliveries re-apply the same terminal state and are
    /// harmless by construction.
    pub async fn handle_webhook(&self, notification: WebhookNotification) -> Result<WebhookAck, ReconciliationError> {
        let verification = match self.verify_with_retry(&notification).await {
            Ok(v) => v,
            Err(e) => {
                warn!("🪝️ Webhook signature could not be verified. {e}");
                return Ok(WebhookAck::rejected("verification-unavailable"));
            },
        };
        if !verification.is_success() {
            warn!(
                "🪝️ Webhook transmission {} failed verification with status '{}'",
                notification.transmission_id, verification.verification_status
            );
            return Ok(WebhookAck::rejected("invalid-signature"));
        }
        let event_type = notification.event_type().unwrap_or_default().to_string();
        let Some((payment_status, order_status)) = transition_for_event(&event_type) else {
            debug!("🪝️ Ignoring unmapped event type '{event_type}'");
            return Ok(WebhookAck::ok());
        };
        let Some(invoice_id) = notification.invoice_id() else {
            warn!("🪝️ Event '{event_type}' carries no invoice id; nothing to reconcile");
            return Ok(WebhookAck::not_received("no-invoice-id"));
        };
        let transition = StatusTransition {
            invoice_id: InvoiceId(invoice_id.to_string()),
            payment_status,
            order_status,
            raw_body: notification.event.clone(),
            raw_verification: verification.raw.clone(),
        };
        // A persistence failure here leaves gateway and local state diverged and must surface, not vanish.
        match self.db.apply_status_transition(transition).await? {
            Reconciliation::Applied { order_id } => {
                info!("🪝️ {event_type} reconciled; order #{order_id} is now {order_status}");
                // The webhook carries no user id, so every user's cached order views go.
                self.invalidate_caches(&[keys::ORDERS_ALL_USERS, keys::ORDERS_ALL_SINGLE_USERS]).await;
                Ok(WebhookAck::ok())
            },
            Reconciliation::AlreadyFinal { order_id, status } => {
                info!("🪝️ {event_type} for order #{order_id} ignored; order is already {status}");
                Ok(WebhookAck::ok())
            },
            Reconciliation::NotFound { what, key } => {
                debug!("🪝️ {what} for correlation key {key} not found; treating delivery as benign");
                Ok(WebhookAck::not_received("not-found"))
            },
        }
    }

    /// Verification uses a short-lived credential that can expire mid-flow. On failure the cached credential
    /// is evicted and the call retried with a fresh one, exactly once.
    async fn verify_with_retry(
        &self,
        notification: &WebhookNotification,
    ) -> Result<SignatureVerification, GatewayError> {
        match self.gateway.verify_signature(notification).await {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!("🪝️ Signature verification failed ({e}). Refreshing the gateway credential and retrying once.");
                self.gateway.invalidate_credentials();
                self.gateway.verify_signature(notification).await
            },
        }
    }

    /// A stale cache entry is a bounded-staleness risk, not a crash; invalidation failures are logged and
    /// swallowed.
    async fn invalidate_caches(&self, patterns: &[&str]) {
        for pattern in patterns {
            if let Err(e) = self.cache.delete_pattern(pattern).await {
                warn!("🧹️ Could not invalidate cache pattern '{pattern}'. {e}");
            }
        }
    }
}
