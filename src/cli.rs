//! Command-line surfaces of the exporter binaries.
//!
//! Clap owns usage errors: a missing `--host` prints usage and exits with 2,
//! `--help` prints usage and exits with 0. `-h` is taken by `--host`, so the
//! built-in help flag is replaced by a long-only one.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser};
use tracing::warn;

use crate::catalog::istio::DEFAULT_SERVICES;
use crate::config::{
    ExportConfig, FailurePolicy, TimeWindow, DEFAULT_OUTFILE, DEFAULT_PERIOD_MINUTES,
    DEFAULT_STEP, DEFAULT_TIMEOUT_SECS,
};
use crate::rebuild::DEFAULT_MANIFEST_DIR;
use crate::s3::{
    StoreConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_ENDPOINT, DEFAULT_READ_TIMEOUT_SECS,
    DEFAULT_REGION,
};

/// Flags shared by the range-query exporters.
#[derive(Debug, Clone, Args)]
pub struct ExporterArgs {
    /// Prometheus server URL, e.g. http://prometheus:9090
    #[arg(short = 'h', long, env = "PROMETHEUS_URL")]
    pub host: String,

    /// Output CSV file [default: result.csv]
    #[arg(short = 'o', long)]
    pub outfile: Option<PathBuf>,

    /// Query resolution step width [default: 10s]
    #[arg(short = 's', long)]
    pub step: Option<String>,

    /// Range start, Unix timestamp or RFC3339
    #[arg(long, requires = "end", conflicts_with = "period")]
    pub start: Option<String>,

    /// Range end, Unix timestamp or RFC3339
    #[arg(long, requires = "start", conflicts_with = "period")]
    pub end: Option<String>,

    /// Query the most recent N minutes instead of start/end
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub period: Option<u64>,

    /// What to do when a query after the first returns no data
    #[arg(long, value_enum, default_value_t = FailurePolicy::Lenient)]
    pub policy: FailurePolicy,

    /// Number of queries in flight at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl ExporterArgs {
    /// Fills in defaults, warning about each one the operator did not set.
    pub fn into_config(self) -> ExportConfig {
        let mut config = ExportConfig::new(self.host);

        match self.outfile {
            Some(outfile) => config.outfile = outfile,
            None => warn!(
                "You didn't specify output file's name, will use default name {}",
                DEFAULT_OUTFILE
            ),
        }
        match self.step {
            Some(step) => config.step = step,
            None => warn!(
                "You didn't specify query resolution step width, will use default value {}",
                DEFAULT_STEP
            ),
        }
        config.window = match (self.period, self.start, self.end) {
            (Some(minutes), _, _) => TimeWindow::Trailing { minutes },
            (None, Some(start), Some(end)) => TimeWindow::Explicit { start, end },
            _ => {
                warn!(
                    "You didn't specify query period or start&end time, will query the latest {} minutes' data",
                    DEFAULT_PERIOD_MINUTES
                );
                TimeWindow::default()
            }
        };
        config.policy = self.policy;
        config.concurrency = self.concurrency.max(1);
        config.timeout = Duration::from_secs(self.timeout_secs);
        config
    }
}

/// Export Istio request ratios and latency quantiles per service to CSV.
#[derive(Debug, Parser)]
#[command(name = "istio_prom_csv", version, disable_help_flag = true)]
pub struct IstioCli {
    #[command(flatten)]
    pub exporter: ExporterArgs,

    /// Services to report on, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect::<Vec<String>>())]
    pub services: Vec<String>,
}

/// Export memory, CPU and network metrics of every discovered node to CSV.
#[derive(Debug, Parser)]
#[command(name = "ncn_query_csv", version, disable_help_flag = true)]
pub struct NcnCli {
    #[command(flatten)]
    pub exporter: ExporterArgs,
}

/// Snapshot container resource consumption of critical services to CSV.
#[derive(Debug, Parser)]
#[command(name = "crc_query_csv", version)]
pub struct CrcCli {
    /// Prometheus server URL, e.g. http://prometheus:9090
    pub host: String,

    /// Rate window in Prometheus duration format, e.g. 30s, 10m or 5h
    pub window: String,

    /// Output CSV file
    pub outfile: PathBuf,

    /// Services to report on, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect::<Vec<String>>())]
    pub services: Vec<String>,

    /// Number of queries in flight at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl CrcCli {
    pub fn config(&self) -> ExportConfig {
        let mut config = ExportConfig::new(self.host.clone());
        config.outfile = self.outfile.clone();
        config.concurrency = self.concurrency.max(1);
        config.timeout = Duration::from_secs(self.timeout_secs);
        config
    }
}

/// Strip server-populated fields from a manifest saved during etcd restore.
#[derive(Debug, Parser)]
#[command(name = "edit_yaml_for_rebuild", version)]
pub struct RebuildCli {
    /// Manifest name, edits <dir>/<name>.yaml in place
    pub name: String,

    /// Directory holding the saved manifests
    #[arg(long, default_value = DEFAULT_MANIFEST_DIR)]
    pub dir: PathBuf,
}

/// Object store endpoint and credentials shared by the S3 utilities.
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// S3 endpoint URL
    #[arg(long, env = "S3_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Region name sent with signed requests
    #[arg(long, env = "S3_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    #[arg(long, env = "S3_ACCESS_KEY", hide_env_values = true)]
    pub access_key: String,

    #[arg(long, env = "S3_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT_SECS)]
    pub read_timeout_secs: u64,
}

impl StoreArgs {
    pub fn config(&self) -> StoreConfig {
        let mut config = StoreConfig::new(self.access_key.clone(), self.secret_key.clone());
        config.endpoint = self.endpoint.clone();
        config.region = self.region.clone();
        config.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        config.read_timeout = Duration::from_secs(self.read_timeout_secs);
        config
    }
}

/// Downloads a file from a bucket.
#[derive(Debug, Parser)]
#[command(name = "s3_download_file", version)]
pub struct DownloadCli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// The name of the bucket to download from
    #[arg(long)]
    pub bucket_name: String,

    /// The object's key name
    #[arg(long)]
    pub key_name: String,

    /// Local file to write the object to
    #[arg(long)]
    pub file_name: PathBuf,
}

/// Lists objects in a bucket.
#[derive(Debug, Parser)]
#[command(name = "s3_list_objects", version)]
pub struct ListObjectsCli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// The name of the bucket to list
    #[arg(long)]
    pub bucket_name: String,
}
