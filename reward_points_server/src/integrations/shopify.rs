//! Glue between the Shopify Admin API client and the reward points engine.
//!
//! * [`order_event_from_shopify_order`] pulls the fields that matter for points out of a Shopify order.
//! * [`ShopifyBackend`] implements [`RewardPointsBackend`] on top of [`ShopifyApi`], keeping balances in the
//!   `custom.reward_points` customer metafield.
//! * [`ensure_webhook_subscriptions`] points the order webhooks at this server.
use log::*;
use reward_points_engine::{
    db_types::{CustomerId, OrderEvent, OrderId},
    webhook_types::WebhookTopic,
    BackendError,
    RewardPointsBackend,
};
use shopify_tools::{helpers::parse_shopify_price, ShopifyApi, ShopifyApiError, ShopifyOrder, Webhook};
use thiserror::Error;

/// The cart attribute the checkout extension sets to the number of points the customer spent on the order.
pub const REWARD_POINTS_USED_ATTRIBUTE: &str = "rewardPointsUsed";

/// The topics that can award points, and therefore need a subscription.
pub const REWARD_TOPICS: [WebhookTopic; 2] = [WebhookTopic::OrdersPaid, WebhookTopic::OrdersFulfilled];

#[derive(Debug, Error)]
pub enum OrderConversionError {
    #[error("The Shopify order contained invalid data. {0}")]
    FormatError(String),
}

pub fn order_event_from_shopify_order(order: ShopifyOrder) -> Result<OrderEvent, OrderConversionError> {
    trace!("Converting ShopifyOrder #{} to OrderEvent", order.id);
    let total_price = order
        .total_price
        .as_deref()
        .map(parse_shopify_price)
        .transpose()
        .map_err(|e| OrderConversionError::FormatError(format!("total_price: {e}")))?;
    let points_redeemed = match order.note_attribute(REWARD_POINTS_USED_ATTRIBUTE).map(str::trim) {
        None | Some("") => 0,
        Some(v) => v.parse::<i64>().ok().filter(|p| *p >= 0).ok_or_else(|| {
            OrderConversionError::FormatError(format!("{REWARD_POINTS_USED_ATTRIBUTE} is not a point count: {v}"))
        })?,
    };
    Ok(OrderEvent {
        order_id: OrderId::from(order.id),
        customer_id: order.customer_id().map(CustomerId::from),
        total_price,
        fulfillment_status: order.fulfillment_status,
        points_redeemed,
    })
}

/// A [`RewardPointsBackend`] that talks to a live Shopify store.
#[derive(Clone)]
pub struct ShopifyBackend {
    api: ShopifyApi,
}

impl ShopifyBackend {
    pub fn new(api: ShopifyApi) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ShopifyApi {
        &self.api
    }
}

impl RewardPointsBackend for ShopifyBackend {
    async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderEvent, BackendError> {
        let id = order_id
            .as_str()
            .parse::<u64>()
            .map_err(|e| BackendError::InvalidData(format!("{order_id} is not a Shopify order id. {e}")))?;
        let order = self.api.get_order(id).await.map_err(|e| backend_error(e, BackendError::OrderNotFound(order_id.clone())))?;
        order_event_from_shopify_order(order).map_err(|e| BackendError::InvalidData(e.to_string()))
    }

    async fn fetch_points(&self, customer_id: &CustomerId) -> Result<Option<i64>, BackendError> {
        let metafield = self
            .api
            .fetch_customer_reward_points(customer_id.as_str())
            .await
            .map_err(|e| backend_error(e, BackendError::CustomerNotFound(customer_id.clone())))?;
        metafield
            .map(|m| {
                m.value.trim().parse::<i64>().map_err(|e| {
                    BackendError::InvalidData(format!(
                        "reward_points metafield for customer {customer_id} is not an integer ({}). {e}",
                        m.value
                    ))
                })
            })
            .transpose()
    }

    async fn write_points(&self, customer_id: &CustomerId, points: i64) -> Result<(), BackendError> {
        self.api
            .set_customer_reward_points(customer_id.as_str(), points)
            .await
            .map_err(|e| backend_error(e, BackendError::CustomerNotFound(customer_id.clone())))?;
        Ok(())
    }
}

fn backend_error(e: ShopifyApiError, not_found: BackendError) -> BackendError {
    if e.is_not_found() {
        return not_found;
    }
    if e.is_rejection() {
        return BackendError::InvalidData(e.to_string());
    }
    BackendError::Unavailable(e.to_string())
}

/// A change needed to bring Shopify's webhook subscriptions in line with this server's address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionChange {
    Install { topic: WebhookTopic, address: String },
    Update { id: i64, topic: WebhookTopic, address: String },
}

/// Works out which reward topics are unsubscribed, or subscribed at a stale address.
pub fn plan_webhook_subscriptions(existing: &[Webhook], base_url: &str) -> Vec<SubscriptionChange> {
    let base_url = base_url.trim_end_matches('/');
    REWARD_TOPICS
        .iter()
        .filter_map(|&topic| {
            let address = format!("{base_url}/webhooks/{topic}");
            match existing.iter().find(|w| w.topic == topic.as_str()) {
                Some(w) if w.address == address => None,
                Some(w) => Some(SubscriptionChange::Update { id: w.id, topic, address }),
                None => Some(SubscriptionChange::Install { topic, address }),
            }
        })
        .collect()
}

/// Makes sure Shopify delivers `orders/paid` and `orders/fulfilled` to this server. Returns the number of
/// subscriptions that were created or moved.
pub async fn ensure_webhook_subscriptions(api: &ShopifyApi, base_url: &str) -> Result<usize, ShopifyApiError> {
    let existing = api.fetch_webhooks().await?;
    let changes = plan_webhook_subscriptions(&existing, base_url);
    for change in &changes {
        match change {
            SubscriptionChange::Install { topic, address } => {
                info!("🛍️ Subscribing to {topic} at {address}");
                api.install_webhook(address, topic.as_str()).await?;
            },
            SubscriptionChange::Update { id, topic, address } => {
                info!("🛍️ Moving {topic} subscription #{id} to {address}");
                api.update_webhook(*id, address).await?;
            },
        }
    }
    Ok(changes.len())
}
