use std::{fmt::Display, str::FromStr};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{db_types::AwardTrigger, helpers::verify_webhook_signature};

/// The webhook topics the gateway subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookTopic {
    OrdersCreate,
    OrdersDelete,
    OrdersPaid,
    OrdersFulfilled,
    ProductsUpdate,
}

#[derive(Debug, Clone, Error)]
#[error("Unhandled webhook topic: {0}")]
pub struct UnknownTopicError(pub String);

impl WebhookTopic {
    pub const ALL: [WebhookTopic; 5] =
        [Self::OrdersCreate, Self::OrdersDelete, Self::OrdersPaid, Self::OrdersFulfilled, Self::ProductsUpdate];

    /// The topic as Shopify spells it in the `X-Shopify-Topic` header and in subscription requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrdersCreate => "orders/create",
            Self::OrdersDelete => "orders/delete",
            Self::OrdersPaid => "orders/paid",
            Self::OrdersFulfilled => "orders/fulfilled",
            Self::ProductsUpdate => "products/update",
        }
    }

    /// Topics that can award points, and the trigger they award under.
    pub fn award_trigger(&self) -> Option<AwardTrigger> {
        match self {
            Self::OrdersPaid => Some(AwardTrigger::OrderPaid),
            Self::OrdersFulfilled => Some(AwardTrigger::OrderFulfilled),
            _ => None,
        }
    }
}

impl Display for WebhookTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookTopic {
    type Err = UnknownTopicError;

    /// Accepts both the REST spelling (`orders/paid`) and the GraphQL enum spelling (`ORDERS_PAID`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "/");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownTopicError(s.to_string()))
    }
}

/// A single inbound webhook delivery, after its signature has been checked.
///
/// `raw_body` holds the exact bytes that were received and signed. Payloads are always parsed from these bytes.
#[derive(Debug, Clone)]
pub struct WebhookEnvelope {
    pub topic: WebhookTopic,
    pub raw_body: Vec<u8>,
    pub shop_domain: Option<String>,
    /// Shopify's delivery id. Retries of the same delivery reuse it.
    pub webhook_id: Option<String>,
    /// The base64 HMAC Shopify sent with the delivery. Never logged.
    pub signature: Option<String>,
}

impl WebhookEnvelope {
    pub fn new(topic: WebhookTopic, raw_body: Vec<u8>) -> Self {
        Self { topic, raw_body, shop_domain: None, webhook_id: None, signature: None }
    }

    /// Checks the carried signature against the raw body. An envelope without a signature is never authentic.
    pub fn is_authentic(&self, shared_secret: &str) -> bool {
        self.signature
            .as_deref()
            .is_some_and(|sig| verify_webhook_signature(&self.raw_body, sig, shared_secret))
    }

    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.raw_body)
    }
}

impl Display for WebhookEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} from {} (delivery {}, {} bytes)",
            self.topic,
            self.shop_domain.as_deref().unwrap_or("unknown shop"),
            self.webhook_id.as_deref().unwrap_or("n/a"),
            self.raw_body.len()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::helpers::calculate_webhook_signature;

    #[test]
    fn topics_round_trip_through_both_spellings() {
        for topic in WebhookTopic::ALL {
            assert_eq!(topic.as_str().parse::<WebhookTopic>().unwrap(), topic);
        }
        assert_eq!("ORDERS_PAID".parse::<WebhookTopic>().unwrap(), WebhookTopic::OrdersPaid);
        assert_eq!("PRODUCTS_UPDATE".parse::<WebhookTopic>().unwrap(), WebhookTopic::ProductsUpdate);
        assert!("customers/create".parse::<WebhookTopic>().is_err());
    }

    #[test]
    fn only_order_paid_and_fulfilled_award_points() {
        assert_eq!(WebhookTopic::OrdersPaid.award_trigger(), Some(AwardTrigger::OrderPaid));
        assert_eq!(WebhookTopic::OrdersFulfilled.award_trigger(), Some(AwardTrigger::OrderFulfilled));
        assert!(WebhookTopic::OrdersCreate.award_trigger().is_none());
        assert!(WebhookTopic::OrdersDelete.award_trigger().is_none());
        assert!(WebhookTopic::ProductsUpdate.award_trigger().is_none());
    }

    #[test]
    fn envelope_parses_raw_body() {
        let env = WebhookEnvelope::new(WebhookTopic::OrdersPaid, br#"{"id": 1}"#.to_vec());
        let v: serde_json::Value = env.parse_payload().unwrap();
        assert_eq!(v["id"], 1);
        assert_eq!(env.to_string(), "orders/paid from unknown shop (delivery n/a, 9 bytes)");
    }

    #[test]
    fn envelope_carries_its_signature() {
        let body = br#"{"id": 1}"#.to_vec();
        let mut env = WebhookEnvelope::new(WebhookTopic::OrdersPaid, body.clone());
        assert!(!env.is_authentic("secret"));
        env.signature = Some(calculate_webhook_signature(&body, "secret"));
        assert!(env.is_authentic("secret"));
        assert!(!env.is_authentic("other"));
        assert!(!env.to_string().contains(env.signature.as_deref().unwrap()));
    }
}
