use thiserror::Error;

use crate::db_types::{CustomerId, OrderEvent, OrderId};

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Customer {0} does not exist")]
    CustomerNotFound(CustomerId),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("The upstream service is unavailable. {0}")]
    Unavailable(String),
    #[error("The upstream service returned invalid data. {0}")]
    InvalidData(String),
}

/// The storefront that owns orders and customer point balances.
///
/// Balances are a plain read/write value on the storefront with no conditional write, so callers must serialize
/// read-modify-write cycles for a customer themselves.
#[allow(async_fn_in_trait)]
pub trait RewardPointsBackend {
    /// Fetches the current state of an order.
    async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderEvent, BackendError>;

    /// Fetches the customer's point balance. `None` means the customer exists but has never been assigned points.
    async fn fetch_points(&self, customer_id: &CustomerId) -> Result<Option<i64>, BackendError>;

    /// Overwrites the customer's point balance.
    async fn write_points(&self, customer_id: &CustomerId, points: i64) -> Result<(), BackendError>;
}
