//! The reward point business rules. This is the only place where the exchange rate between money and points is
//! defined.
use rpg_common::Cents;

use crate::db_types::OrderEvent;

/// One point is awarded for every this-many whole currency units spent.
pub const CURRENCY_UNITS_PER_POINT: i64 = 10;
const CENTS_PER_POINT: i64 = CURRENCY_UNITS_PER_POINT * 100;

/// `floor(total_price / 10)`. Negative or missing totals earn nothing.
pub fn points_for_amount(total_price: Option<Cents>) -> i64 {
    match total_price {
        Some(total) if !total.is_negative() => total.value() / CENTS_PER_POINT,
        _ => 0,
    }
}

/// `max(0, current + delta)`. Balances never go negative, whatever the delta.
pub fn new_balance(current: i64, delta: i64) -> i64 {
    current.saturating_add(delta).max(0)
}

/// The net change an order makes to its customer's balance: points earned on the order total, less any points spent
/// at checkout.
pub fn order_delta(event: &OrderEvent) -> i64 {
    points_for_amount(event.total_price).saturating_sub(event.points_redeemed.max(0))
}
