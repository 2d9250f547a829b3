//! Virtual Store Payment Engine
//!
//! The core of the Virtual Store backend: a payment reconciliation engine that creates checkout intents with
//! an external gateway, tracks their lifecycle through the Order/Payment state machine, and reconciles that
//! state against asynchronous, unordered, possibly-duplicated webhook notifications, all while keeping the
//! read cache consistent and maintaining an immutable audit trail.
//!
//! The library is divided into three main sections:
//! 1. Database management and control (the `sqlite` module). You should never need to access the database
//!    directly; use the engine's public API instead. The exception is the data types used in the database,
//!    which are defined in the `db_types` module and are public.
//! 2. The backend contracts ([`mod@traits`]). Specific backends (the SQLite store, the PayPal gateway
//!    adapter, the in-process cache) implement these traits in order to serve the engine; tests substitute
//!    mocks at the same seams.
//! 3. The reconciliation API ([`ReconciliationApi`]): the orchestrator that drives the state machine in
//!    response to intent, redirect and webhook inputs.
pub mod cache;
pub mod db_types;
mod flow;
pub mod helpers;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use cache::MemoryCache;
pub use flow::{transition_for_event, ReconciliationApi, ReconciliationError, WebhookAck};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
