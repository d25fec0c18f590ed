use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use rpg_common::Cents;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------      OrderId       ----------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------     CustomerId     ----------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<u64> for CustomerId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------    AwardTrigger    ----------------------------------------------------------
/// The order lifecycle event that caused points to be awarded. An order is only ever awarded once, by whichever
/// qualifying trigger is reconciled first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AwardTrigger {
    OrderPaid,
    OrderFulfilled,
}

#[derive(Debug, Clone, Error)]
#[error("Invalid award trigger: {0}")]
pub struct AwardTriggerConversionError(String);

impl Display for AwardTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderPaid => write!(f, "OrderPaid"),
            Self::OrderFulfilled => write!(f, "OrderFulfilled"),
        }
    }
}

impl FromStr for AwardTrigger {
    type Err = AwardTriggerConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OrderPaid" => Ok(Self::OrderPaid),
            "OrderFulfilled" => Ok(Self::OrderFulfilled),
            s => Err(AwardTriggerConversionError(s.to_string())),
        }
    }
}

//--------------------------------------    AwardRecord     ----------------------------------------------------------
/// The durable "points already awarded" marker for a single order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardRecord {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub trigger: AwardTrigger,
    pub points_earned: i64,
    pub points_redeemed: i64,
    /// The customer's balance immediately after the award was written.
    pub balance: i64,
    pub awarded_at: DateTime<Utc>,
}

impl Display for AwardRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order {} ({}): +{} -{} points for customer {}. Balance {}",
            self.order_id, self.trigger, self.points_earned, self.points_redeemed, self.customer_id, self.balance
        )
    }
}

//--------------------------------------     OrderEvent     ----------------------------------------------------------
/// The parts of an order payload that matter for reward points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub order_id: OrderId,
    /// Absent for guest checkouts.
    pub customer_id: Option<CustomerId>,
    pub total_price: Option<Cents>,
    pub fulfillment_status: Option<String>,
    /// Points the customer chose to spend on this order at checkout.
    pub points_redeemed: i64,
}

impl OrderEvent {
    pub fn new<S: Into<String>>(order_id: S) -> Self {
        Self { order_id: OrderId::new(order_id), ..Default::default() }
    }

    pub fn with_customer<S: Into<String>>(mut self, customer_id: S) -> Self {
        self.customer_id = Some(CustomerId::new(customer_id));
        self
    }

    pub fn with_total_price(mut self, total_price: Cents) -> Self {
        self.total_price = Some(total_price);
        self
    }

    pub fn with_fulfillment_status<S: Into<String>>(mut self, status: S) -> Self {
        self.fulfillment_status = Some(status.into());
        self
    }

    pub fn with_points_redeemed(mut self, points: i64) -> Self {
        self.points_redeemed = points;
        self
    }

    pub fn is_fulfilled(&self) -> bool {
        self.fulfillment_status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("fulfilled"))
    }
}

impl Display for OrderEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let customer = self.customer_id.as_ref().map(|c| c.as_str()).unwrap_or("guest");
        let total = self.total_price.map(|p| p.to_string()).unwrap_or_else(|| "n/a".to_string());
        write!(f, "Order {} for {customer}. Total: {total}", self.order_id)
    }
}
