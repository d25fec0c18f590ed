//! # Reward points reconciliation API
//!
//! [`reward_points_api::RewardPointsApi`] takes a verified order event and applies its reward points to the
//! customer's balance exactly once. It is created by supplying a storefront backend and a processed-order store:
//!
//! ```rust,ignore
//! use reward_points_engine::{MemoryOrderLedger, RewardPointsApi};
//! let api = RewardPointsApi::new(shopify_backend, MemoryOrderLedger::default());
//! let outcome = api.reconcile(event, AwardTrigger::OrderPaid).await?;
//! ```
pub mod customer_locks;
pub mod errors;
pub mod reconciliation_objects;
pub mod reward_points_api;
