//! # Reward points server
//! This crate hosts the HTTP front end for the reward points gateway. It is responsible for:
//! Listening for incoming webhook requests from Shopify.
//! Checking the HMAC signature of every webhook body.
//! Parsing the order payloads and handing paid and fulfilled orders to the reward points engine.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/webhooks/orders/paid`, `/webhooks/orders/fulfilled`: award reward points for an order.
//! * `/webhooks/orders/create`, `/webhooks/orders/delete`, `/webhooks/products/update`: logged and acknowledged.
//!
//! Any other path under `/webhooks` gets a 404.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
