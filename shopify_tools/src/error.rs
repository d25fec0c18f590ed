use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopifyApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("The request to Shopify timed out. {0}")]
    Timeout(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Invalid GraphQL query: {0}")]
    InvalidGraphQL(String),
    #[error("GraphQL query failed: {0}")]
    GraphQLError(String),
    #[error("Shopify rejected the update: {0}")]
    UserErrors(String),
    #[error("Shopify returned an empty response")]
    EmptyResponse,
    #[error("Customer {0} does not exist")]
    CustomerNotFound(String),
    #[error("Invalid currency amount: {0}")]
    InvalidCurrencyAmount(String),
}

impl ShopifyApiError {
    /// True when the Admin API answered with a 404 for the requested resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::QueryError { status: 404, .. } | Self::CustomerNotFound(_))
    }

    /// True when Shopify understood the request but refused it. Sending the same request again will not help.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::UserErrors(_) | Self::JsonError(_))
    }
}

impl From<reqwest::Error> for ShopifyApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_builder() {
            Self::RestRequestError(e.to_string())
        } else {
            Self::RestResponseError(e.to_string())
        }
    }
}
