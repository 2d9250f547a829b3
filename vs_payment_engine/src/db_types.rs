use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Type};
use thiserror::Error;
use vsp_common::Money;

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct ConversionError(String);

//--------------------------------------   OrderStatusType   ---------------------------------------------------------
/// The lifecycle of an order. `Pending` is the only non-terminal state: once an order is `Completed` or
/// `Canceled` no transition ever leaves that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been placed and no terminal payment event has arrived yet.
    Pending,
    /// The gateway reported a completed capture; the order is paid.
    Completed,
    /// The gateway denied the capture, or the shopper abandoned the checkout.
    Canceled,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatusType::Pending)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "PENDING"),
            OrderStatusType::Completed => write!(f, "COMPLETED"),
            OrderStatusType::Canceled => write!(f, "CANCELED"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELED" => Ok(Self::Canceled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

//--------------------------------------  PaymentStatusType  ---------------------------------------------------------
/// Payment status mirrors the gateway's vocabulary, spelling included. The stored strings
/// (`created`/`aproved`/`pending`/`canceled`) are a wire-compatible contract; do not "fix" them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatusType {
    #[sqlx(rename = "created")]
    #[serde(rename = "created")]
    Created,
    #[sqlx(rename = "aproved")]
    #[serde(rename = "aproved")]
    Approved,
    #[sqlx(rename = "pending")]
    #[serde(rename = "pending")]
    Pending,
    #[sqlx(rename = "canceled")]
    #[serde(rename = "canceled")]
    Canceled,
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatusType::Created => write!(f, "created"),
            PaymentStatusType::Approved => write!(f, "aproved"),
            PaymentStatusType::Pending => write!(f, "pending"),
            PaymentStatusType::Canceled => write!(f, "canceled"),
        }
    }
}

impl FromStr for PaymentStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "aproved" => Ok(Self::Approved),
            "pending" => Ok(Self::Pending),
            "canceled" => Ok(Self::Canceled),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------      InvoiceId      ---------------------------------------------------------
/// The merchant-generated correlation key minted at intent-creation time. It is the sole stable join key between
/// local Payment/Audit rows and gateway webhooks; the gateway's own payment id may not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct InvoiceId(pub String);

impl FromStr for InvoiceId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for InvoiceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for InvoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl InvoiceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       Product       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub price: Money,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// The shopper that placed the order, as issued by the (out of scope) auth layer.
    pub user_id: String,
    pub total_amount: Money,
    pub total_items: i64,
    pub status: OrderStatusType,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      OrderItem      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// Catalog price at the moment the order was placed.
    pub price: Money,
    pub quantity: i64,
}

//--------------------------------------       NewOrder      ---------------------------------------------------------
/// An order as submitted at checkout. Prices are deliberately absent: totals are always computed from the
/// catalog, never from client input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
}

impl NewOrder {
    pub fn new(user_id: impl Into<String>, items: Vec<NewOrderItem>) -> Self {
        Self { user_id: user_id.into(), items }
    }
}

//--------------------------------------       Payment       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub invoice_id: InvoiceId,
    /// Assigned by the gateway when the intent is created. Absent until (and unless) the gateway responds.
    pub gateway_payment_id: Option<String>,
    pub order_id: i64,
    pub status: PaymentStatusType,
    /// Opaque JSON snapshot of the payer block from the gateway's terminal response.
    pub payer: Option<String>,
    /// Opaque JSON snapshot of the capture block from the gateway's terminal response.
    pub payment_method: Option<String>,
    pub date_created: DateTime<Utc>,
}

//--------------------------------------  NewPaymentIntent   ---------------------------------------------------------
/// Bookkeeping for a gateway intent that has already been created. The gateway call has real-world effect
/// regardless of whether these rows persist, which is why recording them is best-effort.
#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    pub invoice_id: InvoiceId,
    pub order_id: i64,
    pub gateway_payment_id: Option<String>,
    /// The raw intent-creation response, captured verbatim for replay.
    pub raw_response: Value,
    pub date_created: DateTime<Utc>,
}

//--------------------------------------     AuditRecord     ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    /// Equal to the payment's invoice id.
    pub external_reference: String,
    pub gateway_payment_id: String,
    /// Local payment id as a string; empty if the payment insert failed.
    pub payment_id: String,
    pub response_created_intent: Option<String>,
    pub requested_webhook: Option<String>,
    pub response_get_payment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
