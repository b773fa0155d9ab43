use serde::{Deserialize, Serialize};

pub const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for the photo API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Base URL of the API stage, without a trailing slash.
    pub endpoint: String,
    pub api_key: String,
    pub region: String,
}

/// A partial [`ApiConfig`]; only the fields that are set get applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigUpdate {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub region: Option<String>,
}

impl ApiConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        ApiConfig {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            region: DEFAULT_REGION.to_string(),
        }
    }

    pub fn merge(&mut self, update: ConfigUpdate) {
        if let Some(endpoint) = update.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(api_key) = update.api_key {
            self.api_key = api_key;
        }
        if let Some(region) = update.region {
            self.region = region;
        }
    }
}
