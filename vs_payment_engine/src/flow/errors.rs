use thiserror::Error;

use crate::traits::{GatewayError, PaymentGatewayError};

#[derive(Debug, Error)]
pub enum ReconciliationError {
    #[error("Backend storage error: {0}")]
    StoreError(#[from] PaymentGatewayError),
    #[error("Gateway error: {0}")]
    GatewayError(#[from] GatewayError),
    #[error("Order {0} does not exist for this user")]
    OrderNotFound(i64),
}
