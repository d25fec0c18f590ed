//! A thin client over the parts of the Shopify Admin API that the reward points gateway needs: orders, the
//! `custom.reward_points` customer metafield and webhook subscriptions.
mod api;
mod config;
mod error;
mod shopify_order;
mod shopify_product;

mod data_objects;
pub mod helpers;

pub use api::ShopifyApi;
pub use config::ShopifyConfig;
pub use data_objects::{Metafield, NewWebhook, Webhook, REWARD_POINTS_KEY, REWARD_POINTS_NAMESPACE};
pub use error::ShopifyApiError;
pub use shopify_order::{NoteAttribute, OrderPayload, ShopifyCustomer, ShopifyOrder};
pub use shopify_product::{ShopifyProduct, Variant};
