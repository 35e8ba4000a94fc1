pub mod client;

use async_trait::async_trait;

use crate::config::ResolvedWindow;
use crate::models::{InstantResponse, RangeResponse};
use crate::Result;

pub use client::PromClient;

/// The two Prometheus HTTP endpoints the exporters consume.
#[async_trait]
pub trait PromApi: Send + Sync {
    /// Instant query against `/api/v1/query`.
    async fn query(&self, query: &str) -> Result<InstantResponse>;

    /// Range query against `/api/v1/query_range`.
    async fn query_range(
        &self,
        query: &str,
        window: &ResolvedWindow,
        step: &str,
    ) -> Result<RangeResponse>;
}
