//! Point-in-time container resource consumption per service.
//!
//! Unlike the range exporters, each service becomes one CSV row holding the
//! current value of every resource query.

use std::io::Write;
use std::path::Path;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::catalog::container::{self, RESOURCE_COLUMNS};
use crate::models::{InstantResponse, VectorSample};
use crate::prom::PromApi;
use crate::Result;

pub const SNAPSHOT_HEADER: &[&str] = &[
    "",
    "SERVICE NAME",
    "TIMESTAMP ",
    "MEMORY USAGE",
    "CPU USAGE",
    "NETWORK RECEIVE BYTES",
    "NETWORK TRANSMIT BYTES",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceUsage {
    /// `__name__` of the memory series; empty for aggregated queries.
    pub metric_name: String,
    pub service: String,
    pub timestamp: f64,
    /// One value per entry of [`RESOURCE_COLUMNS`].
    pub values: Vec<String>,
}

impl ServiceUsage {
    fn record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(SNAPSHOT_HEADER.len());
        record.push(self.metric_name.clone());
        record.push(self.service.clone());
        record.push(self.timestamp.to_string());
        record.extend(self.values.iter().cloned());
        record
    }
}

/// Queries every resource metric for every service. Services for which any
/// query returns nothing are left out.
pub async fn collect<A: PromApi + ?Sized, S: AsRef<str>>(
    api: &A,
    services: &[S],
    window: &str,
    concurrency: usize,
) -> Result<Vec<ServiceUsage>> {
    let catalog = container::catalog(services, window)?;

    let responses: Vec<Result<InstantResponse>> = stream::iter(catalog.entries().iter())
        .map(|entry| api.query(&entry.query))
        .buffered(concurrency.max(1))
        .collect()
        .await;
    let responses = responses.into_iter().collect::<Result<Vec<_>>>()?;

    let mut usages = Vec::new();
    let per_service = RESOURCE_COLUMNS.len();
    for (service, chunk) in services.iter().zip(responses.chunks(per_service)) {
        let mut first: Vec<VectorSample> = Vec::with_capacity(per_service);
        for response in chunk {
            if response.is_error() {
                warn!("Query failed for {}: {}", service.as_ref(), response.raw);
            }
            if let Some(sample) = response.samples().first() {
                first.push(sample.clone());
            }
        }

        if first.len() < per_service {
            warn!("Skipping {}: not every resource query returned data", service.as_ref());
            continue;
        }

        let memory = &first[0];
        usages.push(ServiceUsage {
            metric_name: memory.metric.get("__name__").cloned().unwrap_or_default(),
            service: service.as_ref().to_string(),
            timestamp: memory.value.0,
            values: first.iter().map(|s| s.value.1.clone()).collect(),
        });
    }

    info!("Collected resource consumption for {} of {} services", usages.len(), services.len());
    Ok(usages)
}

pub fn write_snapshot<W: Write>(out: W, usages: &[ServiceUsage]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(SNAPSHOT_HEADER)?;
    for usage in usages {
        writer.write_record(usage.record())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_snapshot_file(path: &Path, usages: &[ServiceUsage]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_snapshot(file, usages)
}
