use mockall::mock;
use reward_points_engine::{
    db_types::{CustomerId, OrderEvent, OrderId},
    BackendError,
    RewardPointsBackend,
};

mock! {
    pub StoreBackend {}
    impl RewardPointsBackend for StoreBackend {
        async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderEvent, BackendError>;
        async fn fetch_points(&self, customer_id: &CustomerId) -> Result<Option<i64>, BackendError>;
        async fn write_points(&self, customer_id: &CustomerId, points: i64) -> Result<(), BackendError>;
    }
}
