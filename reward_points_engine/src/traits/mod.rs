//! # Backend contracts
//!
//! The engine never talks to the storefront or to a database directly. It is handed implementations of:
//!
//! * [`RewardPointsBackend`]: reads orders and reads/writes a customer's point balance on the storefront.
//! * [`ProcessedOrderStore`]: remembers which orders have already been awarded points.
mod processed_order_store;
mod reward_points_backend;

pub use processed_order_store::{LedgerError, ProcessedOrderStore};
pub use reward_points_backend::{BackendError, RewardPointsBackend};
