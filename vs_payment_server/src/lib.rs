//! # Virtual Store payment server
//! This module hosts the HTTP layer of the Virtual Store payment backend. It is responsible for:
//! Accepting order and payment-intent requests from the storefront.
//! Handling the shopper's return/cancel redirects from the payment gateway.
//! Listening for incoming webhook notifications from the gateway and feeding them to the reconciliation
//! engine.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/orders`: Creates a new order.
//! * `/api/payments/create-payment`: Creates a checkout intent at the gateway.
//! * `/api/payments/return` and `/api/payments/cancel`: The gateway redirect targets.
//! * `/api/payments/webhook`: The webhook route for receiving payment events from the gateway.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
