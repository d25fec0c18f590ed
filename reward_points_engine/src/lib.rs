//! Reward Points Engine
//!
//! This library contains the core logic for awarding reward points in response to merchant order webhooks. It is
//! provider-agnostic: the storefront (Shopify, in practice) is reached through the [`RewardPointsBackend`] trait, and
//! the record of which orders have already been awarded lives behind [`ProcessedOrderStore`].
//!
//! The library is divided into these sections:
//! 1. Pure business rules. [`mod@calculator`] holds the "10 currency units = 1 point" rule and the balance clamp, and
//!    [`helpers`] holds the webhook signature check.
//! 2. Delivery deduplication ([`mod@ledger`]). An in-memory ledger is always available; a durable Sqlite ledger is
//!    provided behind the `sqlite` feature.
//! 3. The reconciliation API ([`RewardPointsApi`]), which ties the pieces together for a single verified order event.
pub mod calculator;
#[cfg(feature = "sqlite")]
mod db;
pub mod db_types;
pub mod helpers;
pub mod ledger;
mod rp_api;
pub mod traits;
pub mod webhook_types;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteOrderLedger;
pub use ledger::{DeliveryDeduplicator, MemoryOrderLedger};
pub use rp_api::{
    customer_locks::CustomerLocks,
    errors::ReconciliationError,
    reconciliation_objects::{PointsAward, ReconciliationOutcome, ReconciliationStage, ReconciliationState},
    reward_points_api::{RewardPointsApi, DEFAULT_CALL_TIMEOUT},
};
pub use traits::{BackendError, LedgerError, ProcessedOrderStore, RewardPointsBackend};
