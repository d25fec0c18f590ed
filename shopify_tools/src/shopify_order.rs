use serde::{Deserialize, Serialize};

/// The subset of a Shopify order (REST / webhook representation) that the gateway cares about. Unknown fields are
/// ignored, and everything that Shopify omits for some order types is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopifyOrder {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub total_price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default)]
    pub customer: Option<ShopifyCustomer>,
    /// Older payloads (and hand-crafted test deliveries) carry the customer reference at the top level.
    #[serde(default)]
    pub customer_id: Option<u64>,
    #[serde(default)]
    pub note_attributes: Vec<NoteAttribute>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ShopifyOrder {
    pub fn customer_id(&self) -> Option<u64> {
        self.customer.as_ref().map(|c| c.id).or(self.customer_id)
    }

    pub fn note_attribute(&self, name: &str) -> Option<&str> {
        self.note_attributes.iter().find(|a| a.name == name).and_then(|a| a.value.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopifyCustomer {
    pub id: u64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Cart attributes written at checkout end up here. The checkout extension stores the points spent under
/// `rewardPointsUsed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteAttribute {
    pub name: String,
    #[serde(default, deserialize_with = "stringly")]
    pub value: Option<String>,
}

fn stringly<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where D: serde::Deserializer<'de> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(v) => Some(v.to_string()),
    })
}

/// Order webhooks arrive either as a bare order object, or wrapped in `{"order": {...}}` (the REST resource shape,
/// which some relays forward unchanged).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderPayload {
    Wrapped { order: ShopifyOrder },
    Bare(ShopifyOrder),
}

impl OrderPayload {
    pub fn into_order(self) -> ShopifyOrder {
        match self {
            Self::Wrapped { order } => order,
            Self::Bare(order) => order,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bare_order_payload() {
        let json = r#"{"id": 820982911946154508, "total_price": "99.99", "customer": {"id": 42, "email": "a@b.c"},
            "note_attributes": [{"name": "rewardPointsUsed", "value": "5"}], "line_items": []}"#;
        let order = serde_json::from_str::<OrderPayload>(json).unwrap().into_order();
        assert_eq!(order.id, 820982911946154508);
        assert_eq!(order.customer_id(), Some(42));
        assert_eq!(order.total_price.as_deref(), Some("99.99"));
        assert_eq!(order.note_attribute("rewardPointsUsed"), Some("5"));
        assert!(order.fulfillment_status.is_none());
    }

    #[test]
    fn wrapped_order_payload() {
        let json = r#"{"order": {"id": 7, "customer_id": 9, "total_price": "10.00", "fulfillment_status": "fulfilled"}}"#;
        let order = serde_json::from_str::<OrderPayload>(json).unwrap().into_order();
        assert_eq!(order.id, 7);
        assert_eq!(order.customer_id(), Some(9));
        assert_eq!(order.fulfillment_status.as_deref(), Some("fulfilled"));
    }

    #[test]
    fn guest_order_has_no_customer() {
        let json = r#"{"id": 7, "customer": null, "total_price": "10.00"}"#;
        let order = serde_json::from_str::<OrderPayload>(json).unwrap().into_order();
        assert_eq!(order.customer_id(), None);
    }

    #[test]
    fn numeric_note_attribute() {
        let json = r#"{"id": 7, "note_attributes": [{"name": "rewardPointsUsed", "value": 12}]}"#;
        let order = serde_json::from_str::<OrderPayload>(json).unwrap().into_order();
        assert_eq!(order.note_attribute("rewardPointsUsed"), Some("12"));
    }
}
