mod api;
mod config;
mod error;
mod token;

mod data_objects;

pub use api::PayPalApi;
pub use config::PayPalConfig;
pub use data_objects::{
    AccessToken,
    CaptureResult,
    CheckoutIntent,
    IntentLink,
    SignatureVerification,
    WebhookNotification,
};
pub use error::PayPalApiError;
pub use token::CredentialCache;
