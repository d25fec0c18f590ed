use thiserror::Error;

use crate::{
    db_types::{CustomerId, OrderId},
    rp_api::reconciliation_objects::ReconciliationStage,
    traits::{BackendError, LedgerError},
};

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("Order {0} has no customer information, so points cannot be attributed")]
    MissingAttribution(OrderId),
    #[error("Customer {0} does not exist on the storefront")]
    UnknownCustomer(CustomerId),
    #[error("The storefront failed while {stage}. {reason}")]
    UpstreamUnavailable { stage: ReconciliationStage, reason: String },
    #[error("Invariant violation. {0}")]
    InvariantViolation(String),
    #[error("Could not query the processed-order ledger. {0}")]
    LedgerError(#[from] LedgerError),
}

impl ReconciliationError {
    pub fn from_backend(stage: ReconciliationStage, err: BackendError) -> Self {
        match err {
            BackendError::CustomerNotFound(id) => Self::UnknownCustomer(id),
            BackendError::OrderNotFound(id) => Self::InvariantViolation(format!("Order {id} does not exist")),
            BackendError::InvalidData(reason) => Self::InvariantViolation(reason),
            BackendError::Unavailable(reason) => Self::UpstreamUnavailable { stage, reason },
        }
    }

    /// Whether a redelivery of the same event could succeed. Retryable errors are reported as server errors so that
    /// the webhook sender tries again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. } | Self::LedgerError(_))
    }
}
