//! Shopify webhook handlers.
//!
//! Every handler in this module sits behind the HMAC middleware, so by the time a handler runs the body is known to
//! come from Shopify. Shopify retries any delivery that does not get a 2xx response, so handlers only answer with an
//! error when a retry could help (5xx) or when the payload can never be processed (4xx).
use actix_web::{post, web, HttpRequest, HttpResponse};
use log::*;
use reward_points_engine::{
    db_types::AwardTrigger,
    webhook_types::{WebhookEnvelope, WebhookTopic},
    ProcessedOrderStore,
    RewardPointsApi,
    RewardPointsBackend,
};
use shopify_tools::{OrderPayload, ShopifyProduct};

use crate::{
    data_objects::{DeletedOrder, JsonResponse},
    errors::ServerError,
    integrations::shopify::order_event_from_shopify_order,
    middleware::SHOPIFY_HMAC_HEADER,
    route,
};

pub const SHOPIFY_TOPIC_HEADER: &str = "X-Shopify-Topic";
pub const SHOPIFY_SHOP_DOMAIN_HEADER: &str = "X-Shopify-Shop-Domain";
pub const SHOPIFY_WEBHOOK_ID_HEADER: &str = "X-Shopify-Webhook-Id";

//----------------------------------------------   Reward points  -----------------------------------------------
route!(orders_paid => Post "/orders/paid" impl RewardPointsBackend, ProcessedOrderStore);
pub async fn orders_paid<B, L>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<RewardPointsApi<B, L>>,
) -> Result<HttpResponse, ServerError>
where
    B: RewardPointsBackend,
    L: ProcessedOrderStore,
{
    let envelope = envelope_from_request(WebhookTopic::OrdersPaid, &req, body);
    award_points(envelope, AwardTrigger::OrderPaid, api.as_ref()).await
}

route!(orders_fulfilled => Post "/orders/fulfilled" impl RewardPointsBackend, ProcessedOrderStore);
pub async fn orders_fulfilled<B, L>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<RewardPointsApi<B, L>>,
) -> Result<HttpResponse, ServerError>
where
    B: RewardPointsBackend,
    L: ProcessedOrderStore,
{
    let envelope = envelope_from_request(WebhookTopic::OrdersFulfilled, &req, body);
    award_points(envelope, AwardTrigger::OrderFulfilled, api.as_ref()).await
}

async fn award_points<B, L>(
    envelope: WebhookEnvelope,
    trigger: AwardTrigger,
    api: &RewardPointsApi<B, L>,
) -> Result<HttpResponse, ServerError>
where
    B: RewardPointsBackend,
    L: ProcessedOrderStore,
{
    let order = parse_or_reject::<OrderPayload>(&envelope)?.into_order();
    let event = order_event_from_shopify_order(order).map_err(|e| {
        warn!("🛍️ Could not convert order. {e}");
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    let outcome = api.reconcile(event, trigger).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(outcome)))
}

//----------------------------------------------   Logging only  ------------------------------------------------
#[post("/orders/create")]
pub async fn orders_create(req: HttpRequest, body: web::Bytes) -> Result<HttpResponse, ServerError> {
    let envelope = envelope_from_request(WebhookTopic::OrdersCreate, &req, body);
    let order = parse_or_reject::<OrderPayload>(&envelope)?.into_order();
    info!(
        "🛍️ Order {} ({}) created. Total {} {}",
        order.id,
        order.name.as_deref().unwrap_or("unnamed"),
        order.total_price.as_deref().unwrap_or("?"),
        order.currency.as_deref().unwrap_or("")
    );
    Ok(HttpResponse::Ok().json(JsonResponse::success("Order creation logged.")))
}

#[post("/orders/delete")]
pub async fn orders_delete(req: HttpRequest, body: web::Bytes) -> Result<HttpResponse, ServerError> {
    let envelope = envelope_from_request(WebhookTopic::OrdersDelete, &req, body);
    let order = parse_or_reject::<DeletedOrder>(&envelope)?;
    info!("🛍️ Order {} deleted.", order.id);
    Ok(HttpResponse::Ok().json(JsonResponse::success("Order deletion logged.")))
}

#[post("/products/update")]
pub async fn products_update(req: HttpRequest, body: web::Bytes) -> Result<HttpResponse, ServerError> {
    let envelope = envelope_from_request(WebhookTopic::ProductsUpdate, &req, body);
    let product = parse_or_reject::<ShopifyProduct>(&envelope)?;
    info!(
        "🛍️ Product {} ({}) updated. {} variants, {} in stock.",
        product.title,
        product.id,
        product.variants.len(),
        product.inventory()
    );
    Ok(HttpResponse::Ok().json(JsonResponse::success("Product update logged.")))
}

//----------------------------------------------   Helpers  -----------------------------------------------------
fn envelope_from_request(topic: WebhookTopic, req: &HttpRequest, body: web::Bytes) -> WebhookEnvelope {
    let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok()).map(String::from);
    if let Some(claimed) = header(SHOPIFY_TOPIC_HEADER) {
        if claimed.parse::<WebhookTopic>().ok() != Some(topic) {
            warn!("🛍️ Webhook for {topic} arrived with a {SHOPIFY_TOPIC_HEADER} of {claimed}. Handling it as {topic}.");
        }
    }
    let mut envelope = WebhookEnvelope::new(topic, body.to_vec());
    envelope.shop_domain = header(SHOPIFY_SHOP_DOMAIN_HEADER);
    envelope.webhook_id = header(SHOPIFY_WEBHOOK_ID_HEADER);
    envelope.signature = header(SHOPIFY_HMAC_HEADER);
    envelope
}

fn parse_or_reject<T: serde::de::DeserializeOwned>(envelope: &WebhookEnvelope) -> Result<T, ServerError> {
    debug!("🛍️ Received {envelope}");
    envelope.parse_payload::<T>().map_err(|e| {
        warn!("🛍️ Could not parse {} payload. {e}", envelope.topic);
        ServerError::InvalidRequestBody(e.to_string())
    })
}
