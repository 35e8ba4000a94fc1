use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ExportError, Result};

pub const QUERY_API: &str = "/api/v1/query";
pub const RANGE_QUERY_API: &str = "/api/v1/query_range";

pub const DEFAULT_OUTFILE: &str = "result.csv";
pub const DEFAULT_STEP: &str = "10s";
pub const DEFAULT_PERIOD_MINUTES: u64 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// What to do when a query after the first one comes back without data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the run.
    Strict,
    /// Drop the column and keep going.
    #[default]
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWindow {
    /// The last `minutes` minutes up to the moment the run starts.
    Trailing { minutes: u64 },
    /// Caller supplied bounds, epoch seconds or RFC3339, passed through as is.
    Explicit { start: String, end: String },
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow::Trailing {
            minutes: DEFAULT_PERIOD_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    /// Pins the window to concrete bounds. `now` is the run's single
    /// snapshot of the current time in epoch seconds.
    pub fn resolve(&self, now: i64) -> Result<ResolvedWindow> {
        match self {
            TimeWindow::Trailing { minutes } => {
                let start = i64::try_from(*minutes)
                    .ok()
                    .and_then(|m| m.checked_mul(60))
                    .and_then(|secs| now.checked_sub(secs))
                    .ok_or_else(|| {
                        ExportError::Config(format!("query period of {} minutes is out of range", minutes))
                    })?;
                Ok(ResolvedWindow {
                    start: start.to_string(),
                    end: now.to_string(),
                })
            }
            TimeWindow::Explicit { start, end } => Ok(ResolvedWindow {
                start: start.clone(),
                end: end.clone(),
            }),
        }
    }
}

/// Settings for one exporter run. Built once by the entry point and handed
/// to every stage by reference.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub host: String,
    pub outfile: PathBuf,
    pub step: String,
    pub window: TimeWindow,
    pub policy: FailurePolicy,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl ExportConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            outfile: PathBuf::from(DEFAULT_OUTFILE),
            step: DEFAULT_STEP.to_string(),
            window: TimeWindow::default(),
            policy: FailurePolicy::default(),
            concurrency: 1,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_window() {
        let window = TimeWindow::Trailing { minutes: 15 };
        let resolved = window.resolve(1_700_000_000).unwrap();
        assert_eq!(resolved.end, "1700000000");
        assert_eq!(resolved.start, (1_700_000_000 - 15 * 60).to_string());
    }

    #[test]
    fn test_trailing_window_out_of_range() {
        for minutes in [u64::MAX, i64::MAX as u64, (i64::MAX / 60 + 1) as u64] {
            let err = TimeWindow::Trailing { minutes }.resolve(1_700_000_000).unwrap_err();
            assert!(matches!(err, ExportError::Config(_)));
            assert_eq!(err.exit_code(), 2);
        }

        let longest = (i64::MAX as u64) / 60 / 2;
        let resolved = TimeWindow::Trailing { minutes: longest }.resolve(0).unwrap();
        assert!(resolved.start.parse::<i64>().unwrap() < 0);
    }

    #[test]
    fn test_explicit_window_is_verbatim() {
        let window = TimeWindow::Explicit {
            start: "2024-01-01T00:00:00Z".to_string(),
            end: "1704070800".to_string(),
        };
        let resolved = window.resolve(0).unwrap();
        assert_eq!(resolved.start, "2024-01-01T00:00:00Z");
        assert_eq!(resolved.end, "1704070800");
    }

    #[test]
    fn test_defaults() {
        let config = ExportConfig::new("http://prometheus:9090/");
        assert_eq!(config.host, "http://prometheus:9090");
        assert_eq!(config.outfile, PathBuf::from("result.csv"));
        assert_eq!(config.step, "10s");
        assert_eq!(config.window, TimeWindow::Trailing { minutes: 10 });
        assert_eq!(config.policy, FailurePolicy::Lenient);
    }
}
