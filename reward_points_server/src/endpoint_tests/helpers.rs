use actix_web::{
    body::{to_bytes, MessageBody},
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    App,
};
use log::debug;
use reward_points_engine::{helpers::calculate_webhook_signature, MemoryOrderLedger, RewardPointsApi};
use rpg_common::Secret;

use super::mocks::MockStoreBackend;
use crate::{middleware::SHOPIFY_HMAC_HEADER, server::configure_webhooks};

pub const TEST_SECRET: &str = "test-webhook-secret-do-not-reuse";

pub type TestApi = RewardPointsApi<MockStoreBackend, MemoryOrderLedger>;

pub enum Signature {
    Valid,
    WrongSecret,
    Missing,
}

pub fn test_api(backend: MockStoreBackend) -> web::Data<TestApi> {
    let _ = env_logger::try_init();
    web::Data::new(RewardPointsApi::new(backend, MemoryOrderLedger::default()))
}

/// POSTs `body` to `path` through the full webhook scope, HMAC middleware included.
pub async fn post_webhook(
    api: web::Data<TestApi>,
    path: &str,
    body: &str,
    signature: Signature,
) -> (StatusCode, String) {
    let app = App::new().app_data(api).configure(configure_webhooks::<MockStoreBackend, MemoryOrderLedger>(
        Secret::new(TEST_SECRET.to_string()),
        true,
    ));
    let service = test::init_service(app).await;
    let mut req = TestRequest::post().uri(path).insert_header(("Content-Type", "application/json"));
    match signature {
        Signature::Valid => {
            req = req.insert_header((SHOPIFY_HMAC_HEADER, calculate_webhook_signature(body.as_bytes(), TEST_SECRET)))
        },
        Signature::WrongSecret => {
            req = req.insert_header((SHOPIFY_HMAC_HEADER, calculate_webhook_signature(body.as_bytes(), "guess")))
        },
        Signature::Missing => {},
    }
    let req = req.set_payload(body.to_string()).to_request();
    debug!("Making request to {path}");
    match test::try_call_service(&service, req).await {
        Ok(res) => {
            let status = res.status();
            (status, body_string(res.into_body()).await)
        },
        Err(e) => {
            let res = e.error_response();
            (res.status(), body_string(res.into_body()).await)
        },
    }
}

async fn body_string<B: MessageBody>(body: B) -> String
where B::Error: std::fmt::Debug {
    let bytes = to_bytes(body).await.expect("Could not read response body");
    String::from_utf8_lossy(&bytes).into_owned()
}
