use std::env;

use log::*;
use rpg_common::{helpers::parse_boolean_flag, Secret};
use shopify_tools::ShopifyConfig as ShopifyApiConfig;

const DEFAULT_RPG_HOST: &str = "127.0.0.1";
const DEFAULT_RPG_PORT: u16 = 8370;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Where processed orders are recorded. When unset, the record is kept in memory and is lost on restart.
    pub database_url: Option<String>,
    /// The public URL at which Shopify can reach this server, e.g. `https://rewards.example.com`. When set, the
    /// `orders/paid` and `orders/fulfilled` webhook subscriptions are pointed at it on startup.
    pub webhook_base_url: Option<String>,
    /// Shopify storefront configuration
    pub shopify_config: ShopifyConfig,
}

#[derive(Clone, Debug)]
pub struct ShopifyConfig {
    /// The secret Shopify signs webhook bodies with.
    pub hmac_secret: Secret<String>,
    /// When false, webhook signatures are not checked at all. **DANGER**. Never disable this in production.
    pub hmac_checks: bool,
    /// Admin API connection details: base url, access token and per-call timeout.
    pub api: ShopifyApiConfig,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self { hmac_secret: Secret::default(), hmac_checks: true, api: ShopifyApiConfig::default() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPG_HOST.to_string(),
            port: DEFAULT_RPG_PORT,
            database_url: None,
            webhook_base_url: None,
            shopify_config: ShopifyConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("RPG_HOST").ok().unwrap_or_else(|| DEFAULT_RPG_HOST.into());
        let port = env::var("RPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for RPG_PORT. {e} Using the default, {DEFAULT_RPG_PORT}, instead."
                    );
                    DEFAULT_RPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_RPG_PORT);
        let database_url = non_empty_var("RPG_DATABASE_URL");
        if database_url.is_none() {
            warn!(
                "🪛️ RPG_DATABASE_URL is not set. Processed orders will be tracked in memory only, and redeliveries \
                 that arrive after a restart will not be recognised as duplicates."
            );
        }
        let webhook_base_url = non_empty_var("RPG_WEBHOOK_BASE_URL").map(|s| s.trim_end_matches('/').to_string());
        let shopify_config = ShopifyConfig::from_env_or_defaults();
        Self { host, port, database_url, webhook_base_url, shopify_config }
    }
}

impl ShopifyConfig {
    pub fn from_env_or_defaults() -> Self {
        let api = ShopifyApiConfig::new_from_env_or_default();
        let hmac_secret = env::var("RPG_SHOPIFY_HMAC_SECRET").ok().unwrap_or_else(|| {
            error!(
                "🪛️ RPG_SHOPIFY_HMAC_SECRET is not set. Please set it to the HMAC signing key for your Shopify app. \
                 Every webhook will be rejected until you do."
            );
            String::default()
        });
        let hmac_secret = Secret::new(hmac_secret);
        let hmac_checks = parse_boolean_flag(env::var("RPG_SHOPIFY_HMAC_CHECKS").ok(), true);
        if !hmac_checks {
            warn!(
                "🚨️ Webhook HMAC checks are DISABLED. Anyone who can reach this server can award reward points. Set \
                 RPG_SHOPIFY_HMAC_CHECKS=true unless this is a development environment."
            );
        }
        Self { hmac_secret, hmac_checks, api }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
