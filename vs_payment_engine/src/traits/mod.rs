//! Interface contracts of the reconciliation engine.
//!
//! The engine core is written against three seams, so that backends can be swapped (and mocked) independently:
//!
//! * [`ReconciliationStore`]: transactional persistence for Order, Payment and Audit records.
//! * [`PaymentGateway`]: the external payment provider, covering intent create/capture and webhook
//!   signature verification.
//! * [`ObjectCache`]: the non-authoritative read cache with glob-pattern invalidation.
mod data_objects;
mod object_cache;
mod payment_gateway;
mod reconciliation_store;

pub use data_objects::{IntentBookkeeping, Reconciliation, StatusTransition};
pub use object_cache::{CacheError, ObjectCache};
pub use payment_gateway::{GatewayError, PaymentGateway};
pub use reconciliation_store::{PaymentGatewayError, ReconciliationStore};
