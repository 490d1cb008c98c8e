use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ListingSettings;
use crate::error::{ListingError, ListingResult};

/// Source of raw search response bodies.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn get(&self, url: &str) -> ListingResult<String>;
}

/// `SearchClient` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    http: reqwest::Client,
}

impl HttpSearchClient {
    pub fn new(settings: &ListingSettings) -> ListingResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|source| ListingError::Network {
                url: String::new(),
                source,
            })?;
        Ok(Self { http })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl SearchClient for HttpSearchClient {
    async fn get(&self, url: &str) -> ListingResult<String> {
        let network = |source: reqwest::Error| ListingError::Network {
            url: url.to_string(),
            source,
        };
        let resp = self.http.get(url).send().await.map_err(network)?;
        debug!(url, status = %resp.status(), "search response");
        let resp = resp.error_for_status().map_err(network)?;
        resp.text().await.map_err(network)
    }
}
