use std::{fmt::Debug, future::Future, time::Duration};

use chrono::Utc;
use log::*;
use tokio::time::timeout;

use crate::{
    calculator::{new_balance, order_delta, points_for_amount},
    db_types::{AwardRecord, AwardTrigger, CustomerId, OrderEvent, OrderId},
    ledger::DeliveryDeduplicator,
    rp_api::{
        customer_locks::CustomerLocks,
        errors::ReconciliationError,
        reconciliation_objects::{PointsAward, ReconciliationOutcome, ReconciliationStage, ReconciliationState},
    },
    traits::{BackendError, ProcessedOrderStore, RewardPointsBackend},
};

/// How long any single storefront call may take before it is treated as an upstream failure.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// `RewardPointsApi` turns verified order events into reward point balance updates.
///
/// For a given order, points are awarded at most once, however many times (and however concurrently) the event is
/// delivered. An order is only marked as processed once the new balance has been written to the storefront, so a
/// failed write can be retried by the webhook sender.
pub struct RewardPointsApi<B, L> {
    backend: B,
    dedup: DeliveryDeduplicator<L>,
    locks: CustomerLocks,
    call_timeout: Duration,
}

impl<B, L> Debug for RewardPointsApi<B, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RewardPointsApi (timeout {:?})", self.call_timeout)
    }
}

impl<B, L> RewardPointsApi<B, L> {
    pub fn new(backend: B, ledger: L) -> Self {
        Self {
            backend,
            dedup: DeliveryDeduplicator::new(ledger),
            locks: CustomerLocks::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn ledger(&self) -> &L {
        self.dedup.store()
    }
}

impl<B, L> RewardPointsApi<B, L>
where
    B: RewardPointsBackend,
    L: ProcessedOrderStore,
{
    /// Applies the reward points for an order event whose signature has already been checked.
    ///
    /// `trigger` is the lifecycle event that delivered the order. Paid orders are awarded straight away. Fulfilled
    /// orders are only awarded once the storefront confirms that the order really is fulfilled. Either way, an order
    /// is awarded at most once.
    pub async fn reconcile(
        &self,
        event: OrderEvent,
        trigger: AwardTrigger,
    ) -> Result<ReconciliationOutcome, ReconciliationError> {
        let order_id = event.order_id.clone();
        transition(&order_id, ReconciliationState::Received);
        transition(&order_id, ReconciliationState::Verified);
        let result = self.reconcile_verified(event, trigger).await;
        match &result {
            Ok(outcome) => {
                transition(&order_id, outcome.final_state());
                info!("🎁️ {outcome}");
            },
            Err(e) => {
                transition(&order_id, ReconciliationState::Failed);
                warn!("🎁️ Could not reconcile order {order_id}. {e}");
            },
        }
        result
    }

    async fn reconcile_verified(
        &self,
        event: OrderEvent,
        trigger: AwardTrigger,
    ) -> Result<ReconciliationOutcome, ReconciliationError> {
        let order_id = event.order_id.clone();
        let customer_id =
            event.customer_id.clone().ok_or_else(|| ReconciliationError::MissingAttribution(order_id.clone()))?;
        if trigger == AwardTrigger::OrderFulfilled && !event.is_fulfilled() {
            debug!(
                "🎁️ Order {order_id} fulfilment status is {}. No points yet.",
                event.fulfillment_status.as_deref().unwrap_or("unset")
            );
            return Ok(ReconciliationOutcome::NotEligible(order_id));
        }

        let _guard = self.locks.lock(&customer_id).await;
        trace!("🎁️ Acquired reconciliation lock for customer {customer_id}");
        if !self.dedup.should_process(&order_id).await? {
            return Ok(ReconciliationOutcome::Duplicate(order_id));
        }
        transition(&order_id, ReconciliationState::Deduplicated);

        let event = match trigger {
            AwardTrigger::OrderPaid => event,
            AwardTrigger::OrderFulfilled => {
                let current = self.bounded(ReconciliationStage::FetchOrder, self.backend.fetch_order(&order_id)).await?;
                if !current.is_fulfilled() {
                    info!("🎁️ Order {order_id} claims to be fulfilled, but the storefront disagrees. No points yet.");
                    return Ok(ReconciliationOutcome::NotEligible(order_id));
                }
                OrderEvent { total_price: current.total_price.or(event.total_price), ..event }
            },
        };

        let stored = self.bounded(ReconciliationStage::FetchPoints, self.backend.fetch_points(&customer_id)).await?;
        let previous_balance = stored.unwrap_or_else(|| {
            debug!("🎁️ Customer {customer_id} has no reward points yet. Starting from zero.");
            0
        });
        transition(&order_id, ReconciliationState::Fetched);

        let award = compute_award(&event, customer_id.clone(), trigger, previous_balance);
        transition(&order_id, ReconciliationState::Computed);

        self.bounded(ReconciliationStage::WritePoints, self.backend.write_points(&customer_id, award.new_balance))
            .await?;
        transition(&order_id, ReconciliationState::Written);

        let record = AwardRecord {
            order_id: order_id.clone(),
            customer_id,
            trigger,
            points_earned: award.points_earned,
            points_redeemed: award.points_redeemed,
            balance: award.new_balance,
            awarded_at: Utc::now(),
        };
        if let Err(e) = self.dedup.mark_processed(record).await {
            // The balance has already been written. Failing the request now would make the sender redeliver and the
            // order would be awarded a second time.
            error!("🎁️ Points for order {order_id} were written but the order could not be marked as processed. {e}");
        }
        Ok(ReconciliationOutcome::Awarded(award))
    }

    /// Runs a backend call under the call timeout. A timeout is reported the same way as any other upstream failure.
    async fn bounded<T, F>(&self, stage: ReconciliationStage, call: F) -> Result<T, ReconciliationError>
    where F: Future<Output = Result<T, BackendError>> {
        match timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(|e| ReconciliationError::from_backend(stage, e)),
            Err(_) => Err(ReconciliationError::UpstreamUnavailable {
                stage,
                reason: format!("No response within {:?}", self.call_timeout),
            }),
        }
    }
}

fn compute_award(event: &OrderEvent, customer_id: CustomerId, trigger: AwardTrigger, previous: i64) -> PointsAward {
    let points_earned = points_for_amount(event.total_price);
    let points_redeemed = event.points_redeemed.max(0);
    let delta = order_delta(event);
    let unclamped = previous.saturating_add(delta);
    if unclamped < 0 {
        warn!(
            "🎁️ Order {} would take customer {customer_id} to {unclamped} points ({previous} {delta:+}). Clamping to \
             zero.",
            event.order_id
        );
    }
    PointsAward {
        order_id: event.order_id.clone(),
        customer_id,
        trigger,
        previous_balance: previous,
        points_earned,
        points_redeemed,
        delta,
        new_balance: new_balance(previous, delta),
    }
}

fn transition(order_id: &OrderId, state: ReconciliationState) {
    trace!("🎁️ Order {order_id} -> {state}");
}
