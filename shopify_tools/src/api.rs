use std::sync::Arc;

use graphql_parser::parse_query;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::ShopifyConfig,
    data_objects::{Metafield, NewWebhook, Webhook, REWARD_POINTS_KEY, REWARD_POINTS_NAMESPACE},
    helpers::customer_gid,
    ShopifyApiError,
    ShopifyOrder,
};

#[derive(Clone)]
pub struct ShopifyApi {
    config: ShopifyConfig,
    client: Arc<Client>,
}

const REWARD_POINTS_METAFIELD: &str = r#"metafield(namespace: "custom", key: "reward_points") { id value type }"#;

impl ShopifyApi {
    pub fn new(config: ShopifyConfig) -> Result<Self, ShopifyApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.admin_access_token.reveal().as_str())
            .map_err(|e| ShopifyApiError::Initialization(e.to_string()))?;
        headers.insert("X-Shopify-Access-Token", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ShopifyApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &ShopifyConfig {
        &self.config
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, ShopifyApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ShopifyApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await?;
            Err(ShopifyApiError::QueryError { status, message })
        }
    }

    pub async fn graphql_query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<T, ShopifyApiError> {
        let query = parse_query::<String>(query).map_err(|e| ShopifyApiError::InvalidGraphQL(e.to_string()))?;
        let mut body = serde_json::json!({
            "query": query.to_string(),
        });
        if let Some(vars) = variables {
            body["variables"] = vars;
        }
        trace!("Sending GraphQL query: {body}");
        let result = self.rest_query::<Value, Value>(Method::POST, "/graphql.json", &[], Some(body)).await?;
        if let Some(errors) = result["errors"].as_array() {
            let e = errors.iter().map(|e| e.to_string()).collect::<Vec<String>>().join(", ");
            return Err(ShopifyApiError::GraphQLError(e));
        }
        let data = result["data"].clone();
        trace!("GraphQL response: {data}");
        trace!("GraphQL costs: {}", result["extensions"]["cost"]);
        if data.is_null() {
            return Err(ShopifyApiError::EmptyResponse);
        }
        serde_json::from_value(data).map_err(|e| ShopifyApiError::JsonError(e.to_string()))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url())
    }

    pub async fn get_order(&self, order_id: u64) -> Result<ShopifyOrder, ShopifyApiError> {
        #[derive(Deserialize)]
        struct OrderResponse {
            order: ShopifyOrder,
        }
        let path = format!("/orders/{order_id}.json");
        debug!("Fetching order #{order_id}");
        let result = self.rest_query::<OrderResponse, ()>(Method::GET, &path, &[], None).await?;
        info!("Fetched order #{order_id}");
        Ok(result.order)
    }

    /// Reads the `custom.reward_points` metafield for the customer.
    ///
    /// Returns `Ok(None)` if the customer exists but has never had points assigned, and
    /// [`ShopifyApiError::CustomerNotFound`] if the customer does not exist.
    pub async fn fetch_customer_reward_points(&self, customer_id: &str) -> Result<Option<Metafield>, ShopifyApiError> {
        #[derive(Deserialize)]
        struct CustomerNode {
            metafield: Option<Metafield>,
        }
        #[derive(Deserialize)]
        struct CustomerResponse {
            customer: Option<CustomerNode>,
        }
        let query = format!("query customerRewardPoints($id: ID!) {{ customer(id: $id) {{ id {REWARD_POINTS_METAFIELD} }} }}");
        let variables = serde_json::json!({ "id": customer_gid(customer_id) });
        debug!("Fetching reward points for customer {customer_id}");
        let result = self.graphql_query::<CustomerResponse>(&query, Some(variables)).await?;
        let customer = result.customer.ok_or_else(|| ShopifyApiError::CustomerNotFound(customer_id.to_string()))?;
        Ok(customer.metafield)
    }

    /// Overwrites the `custom.reward_points` metafield for the customer. Shopify offers no conditional write, so the
    /// last writer wins.
    pub async fn set_customer_reward_points(
        &self,
        customer_id: &str,
        points: i64,
    ) -> Result<Metafield, ShopifyApiError> {
        let mutation = format!(
            "mutation updateCustomerRewardPoints($input: CustomerInput!) {{ customerUpdate(input: $input) {{ \
             customer {{ id {REWARD_POINTS_METAFIELD} }} userErrors {{ field message }} }} }}"
        );
        let variables = serde_json::json!({
            "input": {
                "id": customer_gid(customer_id),
                "metafields": [{
                    "namespace": REWARD_POINTS_NAMESPACE,
                    "key": REWARD_POINTS_KEY,
                    "type": "number_integer",
                    "value": points.to_string(),
                }]
            }
        });
        debug!("Setting reward points for customer {customer_id} to {points}");
        let response = self.graphql_query::<Value>(&mutation, Some(variables)).await?;
        if let Some(errors) = response["customerUpdate"]["userErrors"].as_array() {
            if !errors.is_empty() {
                let e = errors.iter().map(|e| e.to_string()).collect::<Vec<String>>().join(", ");
                return Err(ShopifyApiError::UserErrors(e));
            }
        }
        let customer = &response["customerUpdate"]["customer"];
        if customer.is_null() {
            return Err(ShopifyApiError::CustomerNotFound(customer_id.to_string()));
        }
        let metafield = serde_json::from_value::<Option<Metafield>>(customer["metafield"].clone())
            .map_err(|e| ShopifyApiError::JsonError(e.to_string()))?
            .ok_or(ShopifyApiError::EmptyResponse)?;
        info!("Reward points for customer {customer_id} are now {}", metafield.value);
        Ok(metafield)
    }

    pub async fn fetch_webhooks(&self) -> Result<Vec<Webhook>, ShopifyApiError> {
        #[derive(Deserialize)]
        struct WebhookResponse {
            webhooks: Vec<Webhook>,
        }
        debug!("Fetching webhooks");
        let result = self.rest_query::<WebhookResponse, ()>(Method::GET, "/webhooks.json", &[], None).await?;
        info!("Fetched {} webhooks", result.webhooks.len());
        Ok(result.webhooks)
    }

    pub async fn install_webhook(&self, address: &str, topic: &str) -> Result<Webhook, ShopifyApiError> {
        #[derive(Serialize)]
        struct WebhookInput {
            webhook: NewWebhook,
        }
        #[derive(Deserialize)]
        struct WebhookResponse {
            webhook: Webhook,
        }
        let webhook = NewWebhook { topic: topic.to_string(), address: address.to_string(), format: "json".to_string() };
        let input = WebhookInput { webhook };
        debug!("Installing webhook: {}", serde_json::to_string(&input).unwrap_or_default());
        let result =
            self.rest_query::<WebhookResponse, WebhookInput>(Method::POST, "/webhooks.json", &[], Some(input)).await?;
        info!("Installed webhook: {:?}", result.webhook.id);
        Ok(result.webhook)
    }

    pub async fn update_webhook(&self, id: i64, new_address: &str) -> Result<Webhook, ShopifyApiError> {
        #[derive(Serialize)]
        struct UpdateWebhook {
            id: String,
            address: String,
        }
        #[derive(Serialize)]
        struct WebhookInput {
            webhook: UpdateWebhook,
        }
        #[derive(Deserialize)]
        struct WebhookResponse {
            webhook: Webhook,
        }
        let input = WebhookInput { webhook: UpdateWebhook { id: id.to_string(), address: new_address.to_string() } };
        let path = format!("/webhooks/{id}.json");
        debug!("Updating webhook: {}", serde_json::to_string(&input).unwrap_or_default());
        let result = self.rest_query::<WebhookResponse, WebhookInput>(Method::PUT, &path, &[], Some(input)).await?;
        info!("Updated webhook: {:?}", result.webhook.id);
        Ok(result.webhook)
    }
}
