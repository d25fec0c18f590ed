use thiserror::Error;

use crate::db_types::{AwardRecord, OrderId};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} has already been recorded as processed")]
    AlreadyRecorded(OrderId),
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

/// Remembers which orders have already been awarded points, along with what was awarded.
///
/// Implementations must be safe to query and update from concurrent requests. Records are never removed.
#[allow(async_fn_in_trait)]
pub trait ProcessedOrderStore {
    async fn contains(&self, order_id: &OrderId) -> Result<bool, LedgerError>;

    /// Stores the record. Returns [`LedgerError::AlreadyRecorded`] if a record for the order already exists; the
    /// existing record is left untouched.
    async fn add(&self, record: AwardRecord) -> Result<(), LedgerError>;

    async fn fetch(&self, order_id: &OrderId) -> Result<Option<AwardRecord>, LedgerError>;
}
