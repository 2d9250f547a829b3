use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use thiserror::Error;
use vs_payment_engine::{traits::PaymentGatewayError, ReconciliationError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("The payment gateway could not be reached. {0}")]
    GatewayUnavailable(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<ReconciliationError> for ServerError {
    fn from(e: ReconciliationError) -> Self {
        match e {
            ReconciliationError::OrderNotFound(id) => Self::NoRecordFound(format!("Order {id}")),
            ReconciliationError::StoreError(PaymentGatewayError::EmptyOrder) => {
                Self::InvalidRequestBody("An order must contain at least one item".to_string())
            },
            ReconciliationError::StoreError(PaymentGatewayError::ProductsNotFound) => {
                Self::InvalidRequestBody("Some products in the order were not found or are inactive".to_string())
            },
            ReconciliationError::StoreError(PaymentGatewayError::InvalidQuantity) => {
                Self::InvalidRequestBody("Item quantities must be positive".to_string())
            },
            ReconciliationError::StoreError(e) => Self::BackendError(e.to_string()),
            ReconciliationError::GatewayError(e) => Self::GatewayUnavailable(e.to_string()),
        }
    }
}
