use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{ExportConfig, ResolvedWindow, QUERY_API, RANGE_QUERY_API};
use crate::models::{InstantResponse, PromResponse, RangeResponse};
use crate::prom::PromApi;
use crate::Result;

/// Prometheus HTTP API client.
#[derive(Debug, Clone)]
pub struct PromClient {
    base_url: String,
    client: Client,
}

impl PromClient {
    pub fn new(config: &ExportConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(&config.host, client))
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    // Prometheus reports bad queries as JSON on 4xx/5xx, so the HTTP status
    // is not checked here; the envelope's `status` field decides.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<PromResponse<T>> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(params).send().await?;
        let http_status = response.status();
        let raw = response.text().await?;
        debug!("GET {} -> {} ({} bytes)", url, http_status, raw.len());

        let mut parsed: PromResponse<T> = serde_json::from_str(&raw)?;
        parsed.raw = raw;
        Ok(parsed)
    }
}

#[async_trait]
impl PromApi for PromClient {
    async fn query(&self, query: &str) -> Result<InstantResponse> {
        self.get(QUERY_API, &[("query", query)]).await
    }

    async fn query_range(
        &self,
        query: &str,
        window: &ResolvedWindow,
        step: &str,
    ) -> Result<RangeResponse> {
        self.get(
            RANGE_QUERY_API,
            &[
                ("query", query),
                ("start", window.start.as_str()),
                ("end", window.end.as_str()),
                ("step", step),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = PromClient::with_client("http://prometheus:9090/", Client::new());
        assert_eq!(client.base_url, "http://prometheus:9090");
    }
}
