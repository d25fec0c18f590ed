//! HMAC middleware for Actix Web.
//!
//! Shopify signs every webhook body with the app's shared secret and sends the base64-encoded HMAC-SHA256 in the
//! `X-Shopify-Hmac-SHA256` header. This middleware recomputes the signature over the exact bytes received and rejects
//! the request with a 401 if it does not match (or is missing). The body is then handed on, untouched, to the route.
//!
//! Wrap every webhook route with this middleware.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use reward_points_engine::{helpers::verify_webhook_signature, ReconciliationState};
use rpg_common::Secret;

use crate::errors::ServerError;

pub const SHOPIFY_HMAC_HEADER: &str = "X-Shopify-Hmac-SHA256";

pub struct HmacMiddlewareFactory {
    hmac_header: String,
    key: Secret<String>,
    // If false, then the middleware will not check the HMAC signature and always allow the call
    enabled: bool,
}

impl HmacMiddlewareFactory {
    pub fn new(hmac_header: &str, key: Secret<String>, enabled: bool) -> Self {
        HmacMiddlewareFactory { hmac_header: hmac_header.into(), key, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HmacMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacMiddlewareService {
            hmac_header: self.hmac_header.clone(),
            key: self.key.clone(),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct HmacMiddlewareService<S> {
    hmac_header: String,
    key: Secret<String>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HmacMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = self.key.clone();
        let hmac_header = self.hmac_header.clone();
        let enabled = self.enabled;
        Box::pin(async move {
            trace!("🔐️ Checking HMAC for {}", req.path());
            if !enabled {
                trace!("🔐️ HMAC checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {e}");
                ServerError::InvalidRequestBody("Failed to extract request data.".into())
            })?;
            let signature = req.headers().get(&hmac_header).and_then(|v| v.to_str().ok()).ok_or_else(|| {
                warn!("🔐️ No HMAC signature found in request to {}. Denying access.", req.path());
                rejection(req.path(), "No HMAC signature found.")
            })?;
            if verify_webhook_signature(data.as_ref(), signature, secret.reveal()) {
                trace!("🔐️ HMAC check for request ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                // Neither the provided nor the computed signature is logged
                warn!("🔐️ Invalid HMAC signature on request to {} ({} bytes). Denying access.", req.path(), data.len());
                Err(rejection(req.path(), "Invalid HMAC signature.").into())
            }
        })
    }
}

/// Unauthenticated deliveries never reach reconciliation, so their terminal state is recorded here.
fn rejection(path: &str, reason: &str) -> ServerError {
    trace!("🎁️ Delivery to {path} -> {}", ReconciliationState::Rejected);
    ServerError::AuthenticationFailure(reason.into())
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}

#[cfg(test)]
mod test {
    use actix_web::{http::StatusCode, ResponseError};

    use super::*;

    #[test]
    fn rejected_deliveries_are_unauthorized() {
        assert!(ReconciliationState::Rejected.is_terminal());
        let err = rejection("/webhooks/orders/paid", "Invalid HMAC signature.");
        assert!(matches!(&err, ServerError::AuthenticationFailure(m) if m == "Invalid HMAC signature."));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
