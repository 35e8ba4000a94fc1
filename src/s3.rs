//! Object-store helpers for the RGW gateway: list a bucket, download one
//! object.
//!
//! Credentials come from the caller. Looking them up in a secret store is
//! left to the operator.

use std::path::Path;
use std::time::Duration;

use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::{Client, Config};
use tracing::{debug, info};

use crate::{ExportError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://rgw-vip";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 1;

const NOT_FOUND_CODES: &[&str] = &["NoSuchBucket", "NoSuchKey", "NotFound"];

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl StoreConfig {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            region: DEFAULT_REGION.to_string(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
        }
    }
}

fn store_error<E, R>(operation: &str, target: &str, err: SdkError<E, R>) -> ExportError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    match err.code() {
        Some(code) if NOT_FOUND_CODES.contains(&code) => {
            ExportError::NotFound(format!("{} {}: {}", operation, target, code))
        }
        _ => ExportError::ObjectStore(format!("{} {}: {}", operation, target, DisplayErrorContext(&err))),
    }
}

#[derive(Debug, Clone)]
pub struct ObjectStore {
    client: Client,
}

impl ObjectStore {
    pub fn new(config: &StoreConfig) -> Self {
        debug!("Using object store endpoint {}", config.endpoint);

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "prom2csv",
        );
        let timeouts = TimeoutConfig::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build();

        // RGW serves buckets under the path, not as virtual hosts.
        let s3_config = Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .force_path_style(true)
            .timeout_config(timeouts)
            .build();

        Self {
            client: Client::from_conf(s3_config),
        }
    }

    /// Every key in `bucket`, following continuation tokens.
    pub async fn list_keys(&self, bucket: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|e| store_error("list", bucket, e))?;

            keys.extend(page.contents().iter().filter_map(|o| o.key()).map(String::from));

            match page.next_continuation_token() {
                Some(next) if page.is_truncated().unwrap_or(false) => token = Some(next.to_string()),
                _ => break,
            }
        }

        debug!("Listed {} keys in {}", keys.len(), bucket);
        Ok(keys)
    }

    /// Downloads `bucket/key` into `path`. The file is only created once the
    /// whole object has been received. Returns the number of bytes written.
    pub async fn download(&self, bucket: &str, key: &str, path: &Path) -> Result<usize> {
        let target = format!("{}/{}", bucket, key);
        let object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| store_error("get", &target, e))?;

        let body = object
            .body
            .collect()
            .await
            .map_err(|e| ExportError::ObjectStore(format!("read {}: {}", target, e)))?
            .into_bytes();

        tokio::fs::write(path, &body).await?;
        info!("Downloaded {} ({} bytes) to {}", target, body.len(), path.display());
        Ok(body.len())
    }
}
