use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

use super::{RestSource, SourceError};
use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockfrostNetwork {
    Mainnet,
    Preprod,
    Preview,
}

impl BlockfrostNetwork {
    pub fn base_url(&self) -> &'static str {
        match self {
            BlockfrostNetwork::Mainnet => "https://cardano-mainnet.blockfrost.io/api/v0",
            BlockfrostNetwork::Preprod => "https://cardano-preprod.blockfrost.io/api/v0",
            BlockfrostNetwork::Preview => "https://cardano-preview.blockfrost.io/api/v0",
        }
    }
}

/// [`RestSource`] backed by the Blockfrost API.
#[derive(Debug, Clone)]
pub struct BlockfrostClient {
    base_url: String,
    project_id: String,
    client: reqwest::Client,
}

impl BlockfrostClient {
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            client: http_client(),
        }
    }

    pub fn for_network(network: BlockfrostNetwork, project_id: impl Into<String>) -> Self {
        Self::new(network.base_url(), project_id)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.blockfrost_url(), config.blockfrost_project_id.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to configure http client, requests will not time out");
            reqwest::Client::new()
        })
}

impl RestSource for BlockfrostClient {
    async fn get_json(&self, path: &str) -> Result<serde_json::Value, SourceError> {
        let url = self.url(path);
        debug!(%url, "blockfrost request");

        let response = self
            .client
            .get(&url)
            .header("project_id", &self.project_id)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SourceError::NotFound {
                path: path.to_string(),
            }),
            status if !status.is_success() => Err(SourceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            }),
            _ => Ok(response.json().await?),
        }
    }
}
