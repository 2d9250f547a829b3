//! The reconciliation orchestrator: the piece that receives intent-created, return, cancel and webhook
//! inputs, drives the Order/Payment state machine, and keeps the store, the gateway and the cache in step.
mod errors;
mod events;
mod reconciliation_api;

pub use errors::ReconciliationError;
pub use events::{transition_for_event, WebhookAck};
pub use reconciliation_api::ReconciliationApi;
