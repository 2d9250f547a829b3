use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayPalApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Credential exchange with the gateway failed: {0}")]
    AuthFailed(String),
    #[error("The gateway rejected our access token")]
    AuthRejected,
    #[error("Invalid gateway request: {0}")]
    RequestError(String),
    #[error("Invalid gateway response: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("No checkout intent with id {0} exists at the gateway")]
    IntentNotFound(String),
    #[error("Gateway call failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Expected field {0} was missing from the gateway response")]
    MissingField(String),
}
