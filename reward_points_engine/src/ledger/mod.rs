//! Delivery deduplication.
//!
//! Webhooks are delivered at least once, so the same order can arrive many times. [`DeliveryDeduplicator`] applies
//! a first-seen-wins policy on top of any [`ProcessedOrderStore`].
mod memory;

use log::*;
pub use memory::MemoryOrderLedger;

use crate::{
    db_types::{AwardRecord, OrderId},
    traits::{LedgerError, ProcessedOrderStore},
};

pub struct DeliveryDeduplicator<L> {
    store: L,
}

impl<L> DeliveryDeduplicator<L> {
    pub fn new(store: L) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &L {
        &self.store
    }
}

impl<L> DeliveryDeduplicator<L>
where L: ProcessedOrderStore
{
    /// `false` if points have already been awarded for this order.
    pub async fn should_process(&self, order_id: &OrderId) -> Result<bool, LedgerError> {
        let seen = self.store.contains(order_id).await?;
        if seen {
            debug!("🗃️ Order {order_id} has already been processed");
        }
        Ok(!seen)
    }

    /// Records the award. Only call this once the new balance has been written to the storefront.
    pub async fn mark_processed(&self, record: AwardRecord) -> Result<(), LedgerError> {
        let order_id = record.order_id.clone();
        self.store.add(record).await?;
        trace!("🗃️ Order {order_id} marked as processed");
        Ok(())
    }

    pub async fn award_record(&self, order_id: &OrderId) -> Result<Option<AwardRecord>, LedgerError> {
        self.store.fetch(order_id).await
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;
    use crate::db_types::{AwardTrigger, CustomerId};

    fn record(order_id: &str) -> AwardRecord {
        AwardRecord {
            order_id: OrderId::new(order_id),
            customer_id: CustomerId::new("42"),
            trigger: AwardTrigger::OrderPaid,
            points_earned: 9,
            points_redeemed: 0,
            balance: 9,
            awarded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn first_seen_wins() {
        let dedup = DeliveryDeduplicator::new(MemoryOrderLedger::default());
        let id = OrderId::new("1001");
        assert!(dedup.should_process(&id).await.unwrap());
        dedup.mark_processed(record("1001")).await.unwrap();
        assert!(!dedup.should_process(&id).await.unwrap());
        assert!(dedup.should_process(&OrderId::new("1002")).await.unwrap());
        assert_eq!(dedup.award_record(&id).await.unwrap().unwrap().points_earned, 9);
    }

    #[tokio::test]
    async fn second_mark_is_rejected() {
        let dedup = DeliveryDeduplicator::new(MemoryOrderLedger::default());
        dedup.mark_processed(record("1001")).await.unwrap();
        let mut again = record("1001");
        again.points_earned = 100;
        let err = dedup.mark_processed(again).await.unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyRecorded(_)));
        let kept = dedup.award_record(&OrderId::new("1001")).await.unwrap().unwrap();
        assert_eq!(kept.points_earned, 9);
    }
}
