use serde::{Deserialize, Serialize};

/// The fields of a `products/update` webhook that are worth logging. Everything else is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopifyProduct {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub price: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

impl ShopifyProduct {
    /// Total stock across all variants, where Shopify reported it.
    pub fn inventory(&self) -> i64 {
        self.variants.iter().filter_map(|v| v.inventory_quantity).sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn inventory_sums_reported_stock() {
        let json = r#"{"id": 632910392, "title": "IPod Nano - 8GB", "variants": [
            {"id": 808950810, "price": "199.00", "inventory_quantity": 10},
            {"id": 49148385, "price": "199.00", "inventory_quantity": 20},
            {"id": 457924702, "price": "199.00"}]}"#;
        let product = serde_json::from_str::<ShopifyProduct>(json).unwrap();
        assert_eq!(product.variants.len(), 3);
        assert_eq!(product.inventory(), 30);
    }
}
