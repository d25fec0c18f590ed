use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, web::ServiceConfig, App, HttpServer};
use log::*;
#[cfg(feature = "sqlite")]
use reward_points_engine::SqliteOrderLedger;
use reward_points_engine::{MemoryOrderLedger, ProcessedOrderStore, RewardPointsApi, RewardPointsBackend};
use rpg_common::Secret;
use shopify_tools::ShopifyApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::shopify::{ensure_webhook_subscriptions, ShopifyBackend},
    middleware::{HmacMiddlewareFactory, SHOPIFY_HMAC_HEADER},
    routes::{health, unhandled_topic},
    webhook_routes::{orders_create, orders_delete, products_update, OrdersFulfilledRoute, OrdersPaidRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if config.shopify_config.hmac_checks && config.shopify_config.hmac_secret.is_empty() {
        error!("🔐️ No webhook HMAC secret is configured. Every webhook will be rejected.");
    }
    let shopify =
        ShopifyApi::new(config.shopify_config.api.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if let Some(base_url) = &config.webhook_base_url {
        match ensure_webhook_subscriptions(&shopify, base_url).await {
            Ok(0) => info!("🛍️ Webhook subscriptions are up to date"),
            Ok(n) => info!("🛍️ {n} webhook subscriptions were created or updated"),
            Err(e) => warn!("🛍️ Could not configure webhook subscriptions. Continuing anyway. {e}"),
        }
    }
    let backend = ShopifyBackend::new(shopify);
    serve_with_configured_ledger(config, backend).await
}

#[cfg(feature = "sqlite")]
async fn serve_with_configured_ledger(config: ServerConfig, backend: ShopifyBackend) -> Result<(), ServerError> {
    match config.database_url.clone() {
        Some(url) => {
            let ledger = SqliteOrderLedger::new_with_url(&url, 5)
                .await
                .map_err(|e| ServerError::InitializeError(e.to_string()))?;
            serve(config, backend, ledger).await
        },
        None => serve(config, backend, MemoryOrderLedger::default()).await,
    }
}

#[cfg(not(feature = "sqlite"))]
async fn serve_with_configured_ledger(config: ServerConfig, backend: ShopifyBackend) -> Result<(), ServerError> {
    if config.database_url.is_some() {
        warn!("🗃️ RPG_DATABASE_URL is set, but this build has no sqlite support. Using the in-memory ledger.");
    }
    serve(config, backend, MemoryOrderLedger::default()).await
}

async fn serve<L>(config: ServerConfig, backend: ShopifyBackend, ledger: L) -> Result<(), ServerError>
where L: ProcessedOrderStore + Send + Sync + 'static {
    let api = RewardPointsApi::new(backend, ledger).with_call_timeout(config.shopify_config.api.timeout);
    let srv = create_server_instance(config, api)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Builds the HTTP server. A single [`RewardPointsApi`] is shared by all workers, so that the processed-order ledger
/// and the per-customer locks are process-wide.
pub fn create_server_instance<B, L>(config: ServerConfig, api: RewardPointsApi<B, L>) -> Result<Server, ServerError>
where
    B: RewardPointsBackend + Send + Sync + 'static,
    L: ProcessedOrderStore + Send + Sync + 'static,
{
    let api = web::Data::new(api);
    let hmac_secret = config.shopify_config.hmac_secret.clone();
    let hmac_checks = config.shopify_config.hmac_checks;
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("rpg::access_log"))
            .app_data(api.clone())
            .service(health)
            .configure(configure_webhooks::<B, L>(hmac_secret.clone(), hmac_checks))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("🚀️ Listening on {}:{}", config.host, config.port);
    Ok(srv)
}

/// Large orders easily exceed actix's 256 KiB default, and a rejected body would be redelivered forever.
pub const WEBHOOK_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Registers the `/webhooks` scope. Every route in it, including the unhandled-topic fallback, is behind the HMAC
/// check.
pub fn configure_webhooks<B, L>(hmac_secret: Secret<String>, hmac_checks: bool) -> impl FnOnce(&mut ServiceConfig)
where
    B: RewardPointsBackend + 'static,
    L: ProcessedOrderStore + 'static,
{
    move |cfg| {
        let scope = web::scope("/webhooks")
            .wrap(HmacMiddlewareFactory::new(SHOPIFY_HMAC_HEADER, hmac_secret, hmac_checks))
            .service(OrdersPaidRoute::<B, L>::new())
            .service(OrdersFulfilledRoute::<B, L>::new())
            .service(orders_create)
            .service(orders_delete)
            .service(products_update)
            .default_service(web::to(unhandled_topic));
        cfg.app_data(web::PayloadConfig::new(WEBHOOK_BODY_LIMIT)).service(scope);
    }
}
