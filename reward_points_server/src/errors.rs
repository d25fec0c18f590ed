use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use reward_points_engine::ReconciliationError;
use thiserror::Error;

use crate::data_objects::JsonResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Webhook signature is invalid or missing. {0}")]
    AuthenticationFailure(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Unhandled webhook topic")]
    UnhandledTopic,
    #[error("{0}")]
    ReconciliationError(#[from] ReconciliationError),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AuthenticationFailure(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::UnhandledTopic => StatusCode::NOT_FOUND,
            Self::ReconciliationError(e) => match e {
                ReconciliationError::MissingAttribution(_) => StatusCode::BAD_REQUEST,
                ReconciliationError::UnknownCustomer(_) => StatusCode::BAD_REQUEST,
                ReconciliationError::InvariantViolation(_) => StatusCode::BAD_REQUEST,
                // Shopify redelivers on any non-2xx, so these are the ones worth retrying
                ReconciliationError::UpstreamUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                ReconciliationError::LedgerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = serde_json::to_string(&JsonResponse::failure(self)).unwrap_or_default();
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body)
    }
}

#[cfg(test)]
mod test {
    use reward_points_engine::{db_types::OrderId, ReconciliationStage};

    use super::*;

    #[test]
    fn reconciliation_errors_map_to_status_codes() {
        let missing = ServerError::from(ReconciliationError::MissingAttribution(OrderId::new("1")));
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        let upstream = ServerError::from(ReconciliationError::UpstreamUnavailable {
            stage: ReconciliationStage::WritePoints,
            reason: "timeout".into(),
        });
        assert_eq!(upstream.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServerError::UnhandledTopic.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServerError::AuthenticationFailure("nope".into()).status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn error_body_is_a_json_response() {
        let res = ServerError::UnhandledTopic.error_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.headers().get("content-type").unwrap(), "application/json");
    }
}
