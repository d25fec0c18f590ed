use serde::{Deserialize, Serialize};

pub const REWARD_POINTS_NAMESPACE: &str = "custom";
pub const REWARD_POINTS_KEY: &str = "reward_points";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Metafield {
    pub id: Option<String>,
    pub namespace: Option<String>,
    pub key: Option<String>,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWebhook {
    pub topic: String,
    pub address: String,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    pub id: i64,
    pub address: String,
    pub topic: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub format: String,
    pub api_version: Option<String>,
}
