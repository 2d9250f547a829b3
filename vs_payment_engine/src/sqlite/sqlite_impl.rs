//! `SqliteDatabase` is the concrete SQLite implementation of the [`ReconciliationStore`] contract.
use std::{collections::BTreeSet, fmt::Debug};

use log::*;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use vsp_common::Money;

use super::db::{audit, db_url, new_pool, orders, payments, products};
use crate::{
    db_types::{NewOrder, NewPaymentIntent, Order, Payment, PaymentStatusType},
    traits::{IntentBookkeeping, PaymentGatewayError, Reconciliation, ReconciliationStore, StatusTransition},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database named by `VSP_DATABASE_URL`, or the default location.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        Self::new_with_url(&db_url(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}

impl ReconciliationStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError> {
        if order.items.is_empty() {
            return Err(PaymentGatewayError::EmptyOrder);
        }
        if order.items.iter().any(|i| i.quantity < 1) {
            return Err(PaymentGatewayError::InvalidQuantity);
        }
        let mut tx = self.pool.begin().await?;
        // Duplicate product ids collapse into one lookup; missing or inactive ids fail the whole call.
        let ids = order.items.iter().map(|i| i.product_id).collect::<BTreeSet<_>>().into_iter().collect::<Vec<_>>();
        let catalog = products::fetch_active_products(&ids, &mut tx).await?;
        if catalog.len() != ids.len() {
            return Err(PaymentGatewayError::ProductsNotFound);
        }
        // Totals come from the catalog price at order time, never from client input.
        let price_of = |product_id: i64| -> Money {
            catalog.iter().find(|p| p.id == product_id).map(|p| p.price).unwrap_or_default()
        };
        let priced_items =
            order.items.iter().map(|i| (i.clone(), price_of(i.product_id))).collect::<Vec<_>>();
        let total_amount = priced_items.iter().map(|(i, price)| *price * i.quantity).sum::<Money>();
        let total_items = order.items.iter().map(|i| i.quantity).sum::<i64>();
        let new_order = orders::insert_order(&order.user_id, total_amount, total_items, &mut tx).await?;
        orders::insert_order_items(new_order.id, &priced_items, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{} created for user {} with {total_items} items ({total_amount})", new_order.id, order.user_id);
        Ok(new_order)
    }

    async fn fetch_order(&self, order_id: i64, user_id: &str) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_for_user(order_id, user_id, &mut conn).await?;
        Ok(order)
    }

    async fn record_intent(&self, intent: NewPaymentIntent) -> Result<IntentBookkeeping, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        // Both inserts are best-effort and independent. The gateway intent already exists whether or not the
        // local rows land; a lost row is recovered by reconciliation, not by failing order confirmation.
        let payment = match payments::insert_payment(&intent, &mut conn).await {
            Ok(p) => Some(p),
            Err(e) => {
                error!("🗃️ Could not save payment for invoice {}. {e}", intent.invoice_id);
                None
            },
        };
        let payment_id = payment.as_ref().map(|p| p.id.to_string()).unwrap_or_default();
        let response = intent.raw_response.to_string();
        let audit = match audit::insert_audit(
            intent.invoice_id.as_str(),
            intent.gateway_payment_id.as_deref().unwrap_or_default(),
            &payment_id,
            &response,
            &mut conn,
        )
        .await
        {
            Ok(a) => Some(a),
            Err(e) => {
                error!("🗃️ Could not save audit row for invoice {}. {e}", intent.invoice_id);
                None
            },
        };
        Ok(IntentBookkeeping { payment, audit })
    }

    async fn apply_terminal_update(
        &self,
        correlation_key: &str,
        payload: &Value,
        canceled: bool,
    ) -> Result<Reconciliation, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let payment = match payments::fetch_payment_by_correlation_key(correlation_key, &mut tx).await? {
            Some(p) => p,
            None => {
                warn!("🗃️ Payment with correlation key {correlation_key} not found");
                return Ok(Reconciliation::NotFound { what: "Payment", key: correlation_key.to_string() });
            },
        };
        let audit_row = match audit::fetch_audit_by_correlation_key(correlation_key, &mut tx).await? {
            Some(a) => a,
            None => {
                warn!("🗃️ Audit row with correlation key {correlation_key} not found");
                return Ok(Reconciliation::NotFound { what: "Audit", key: correlation_key.to_string() });
            },
        };
        let (payer, method, status) = if canceled {
            // No capture has happened; the whole payload is the best snapshot we have.
            (payload.to_string(), payload.to_string(), Some(PaymentStatusType::Canceled))
        } else {
            let payer = payload.get("payer").cloned().unwrap_or_else(|| json!({}));
            let method = payload["purchase_units"][0]["payments"]["captures"][0].clone();
            let method = if method.is_null() { json!({}) } else { method };
            (payer.to_string(), method.to_string(), None)
        };
        payments::update_payment_snapshots(payment.id, &payer, &method, status, &mut tx).await?;
        audit::update_audit_response(audit_row.id, &payload.to_string(), &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Terminal update applied for correlation key {correlation_key} (canceled: {canceled})");
        Ok(Reconciliation::Applied { order_id: payment.order_id })
    }

    async fn apply_status_transition(&self, transition: StatusTransition) -> Result<Reconciliation, PaymentGatewayError> {
        let invoice_id = transition.invoice_id.as_str();
        let mut tx = self.pool.begin().await?;
        let payment = match payments::fetch_payment_by_invoice_id(invoice_id, &mut tx).await? {
            Some(p) => p,
            None => {
                warn!("🗃️ Payment with invoice_id {invoice_id} not found");
                return Ok(Reconciliation::NotFound { what: "Payment", key: invoice_id.to_string() });
            },
        };
        let audit_row = match audit::fetch_audit_by_correlation_key(invoice_id, &mut tx).await? {
            Some(a) => a,
            None => {
                warn!("🗃️ Audit row with invoice_id {invoice_id} not found");
                return Ok(Reconciliation::NotFound { what: "Audit", key: invoice_id.to_string() });
            },
        };
        let order = match orders::fetch_order_by_id(payment.order_id, &mut tx).await? {
            Some(o) => o,
            None => {
                warn!("🗃️ Order for invoice_id {invoice_id} not found");
                return Ok(Reconciliation::NotFound { what: "Order", key: invoice_id.to_string() });
            },
        };
        if order.status.is_terminal() && order.status != transition.order_status {
            // COMPLETED and CANCELED are terminal. A late or contradictory event is acknowledged but must not
            // move the order; re-applying the *same* state falls through and is an idempotent re-write.
            warn!(
                "🗃️ Order #{} is already {} and will not move to {}. Acknowledging without writes.",
                order.id, order.status, transition.order_status
            );
            return Ok(Reconciliation::AlreadyFinal { order_id: order.id, status: order.status });
        }
        payments::update_payment_status(payment.id, transition.payment_status, &mut tx).await?;
        audit::update_audit_webhook(
            audit_row.id,
            &transition.raw_body.to_string(),
            &transition.raw_verification.to_string(),
            &mut tx,
        )
        .await?;
        orders::update_order_status(order.id, transition.order_status, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Status transition applied for invoice {invoice_id}: payment → {}, order #{} → {}",
            transition.payment_status, order.id, transition.order_status
        );
        Ok(Reconciliation::Applied { order_id: order.id })
    }

    async fn fetch_payment_by_correlation_key(&self, key: &str) -> Result<Option<Payment>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_by_correlation_key(key, &mut conn).await?;
        Ok(payment)
    }
}
