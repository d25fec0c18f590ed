use rpg_common::Cents;

use crate::ShopifyApiError;

const CUSTOMER_GID_PREFIX: &str = "gid://shopify/Customer/";

/// Shopify uses decimal numbers expressed as strings.
pub fn parse_shopify_price(price: &str) -> Result<Cents, ShopifyApiError> {
    price.parse::<Cents>().map_err(|e| ShopifyApiError::InvalidCurrencyAmount(e.to_string()))
}

/// REST payloads carry numeric ids, while the GraphQL API wants global ids. Accepts either form.
pub fn customer_gid(customer_id: &str) -> String {
    if customer_id.starts_with("gid://") {
        customer_id.to_string()
    } else {
        format!("{CUSTOMER_GID_PREFIX}{customer_id}")
    }
}

#[cfg(test)]
mod test {
    use rpg_common::Cents;

    use super::*;

    #[test]
    fn prices() {
        assert_eq!(parse_shopify_price("99.99").unwrap(), Cents::from(9999));
        assert!(matches!(parse_shopify_price("n/a"), Err(ShopifyApiError::InvalidCurrencyAmount(_))));
    }

    #[test]
    fn gids() {
        assert_eq!(customer_gid("42"), "gid://shopify/Customer/42");
        assert_eq!(customer_gid("gid://shopify/Customer/42"), "gid://shopify/Customer/42");
    }
}
