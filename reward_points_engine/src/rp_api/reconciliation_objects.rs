use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::{AwardTrigger, CustomerId, OrderId};

/// The lifecycle of a single order event as it passes through reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciliationState {
    Received,
    Verified,
    Deduplicated,
    Fetched,
    Computed,
    Written,
    Done,
    /// The signature did not check out. Terminal.
    Rejected,
    /// The order was already awarded. Terminal.
    Skipped,
    /// Terminal.
    Failed,
}

impl ReconciliationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Rejected | Self::Skipped | Self::Failed)
    }
}

impl Display for ReconciliationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Received => "Received",
            Self::Verified => "Verified",
            Self::Deduplicated => "Deduplicated",
            Self::Fetched => "Fetched",
            Self::Computed => "Computed",
            Self::Written => "Written",
            Self::Done => "Done",
            Self::Rejected => "Rejected",
            Self::Skipped => "Skipped",
            Self::Failed => "Failed",
        };
        write!(f, "{s}")
    }
}

/// The backend call that was in progress when an upstream failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciliationStage {
    FetchOrder,
    FetchPoints,
    WritePoints,
}

impl Display for ReconciliationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchOrder => write!(f, "fetching the order"),
            Self::FetchPoints => write!(f, "fetching the customer's points"),
            Self::WritePoints => write!(f, "writing the customer's points"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsAward {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub trigger: AwardTrigger,
    pub previous_balance: i64,
    pub points_earned: i64,
    pub points_redeemed: i64,
    /// `points_earned - points_redeemed`, before clamping.
    pub delta: i64,
    pub new_balance: i64,
}

impl Display for PointsAward {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Customer {} balance {} -> {} (delta {:+}) for order {}",
            self.customer_id, self.previous_balance, self.new_balance, self.delta, self.order_id
        )
    }
}

/// The successful results of reconciling an order event. All of these are reported to the webhook sender as 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciliationOutcome {
    /// The customer's balance was updated.
    Awarded(PointsAward),
    /// Points were already awarded for this order. Nothing was changed.
    Duplicate(OrderId),
    /// The event does not qualify for points (e.g. a fulfilment webhook for an order that is not yet fulfilled).
    NotEligible(OrderId),
}

impl ReconciliationOutcome {
    pub fn award(&self) -> Option<&PointsAward> {
        match self {
            Self::Awarded(award) => Some(award),
            _ => None,
        }
    }

    pub fn final_state(&self) -> ReconciliationState {
        match self {
            Self::Awarded(_) | Self::NotEligible(_) => ReconciliationState::Done,
            Self::Duplicate(_) => ReconciliationState::Skipped,
        }
    }
}

impl Display for ReconciliationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Awarded(award) => write!(f, "{award}"),
            Self::Duplicate(id) => write!(f, "Order {id} has already been processed"),
            Self::NotEligible(id) => write!(f, "Order {id} does not qualify for reward points"),
        }
    }
}
