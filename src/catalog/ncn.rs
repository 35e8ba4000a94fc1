use tracing::{error, info, warn};

use crate::catalog::{build_catalog, Catalog, MetricTemplate};
use crate::prom::PromApi;
use crate::{ExportError, Result};

/// Instant query that returns one series per running node exporter.
pub const DISCOVERY_QUERY: &str = r#"node_exporter_build_info{job="node-exporter"}"#;
pub const INSTANCE_LABEL: &str = "instance";

const NODE_TEMPLATES: &[(&str, &str)] = &[
    (
        r#"node_memory_Buffers_bytes{job="node-exporter", instance="${target}"}"#,
        "${target} node memory buffers bytes",
    ),
    (
        r#"node_memory_MemFree_bytes{job="node-exporter", instance="${target}"}"#,
        "${target} node memory free bytes",
    ),
    (
        r#"node_memory_Cached_bytes{job="node-exporter", instance="${target}"}"#,
        "${target} node memory cache bytes",
    ),
    (
        r#"node_memory_MemTotal_bytes{job="node-exporter", instance="${target}"}"#,
        "${target} node memory used bytes",
    ),
    (
        r#"sum(((  (1 - rate(node_cpu_seconds_total{job="node-exporter", mode="idle", instance="${target}"}[1m]))/ ignoring(cpu) group_left  count without (cpu)( node_cpu_seconds_total{job="node-exporter", mode="idle", instance="${target}"}))))"#,
        "${target} node cpu usage",
    ),
    (
        r#"sum(rate(node_network_receive_bytes_total{job="node-exporter", instance="${target}", device!="lo"}[1m]))"#,
        "${target} node network receive bytes",
    ),
    (
        r#"sum(rate(node_network_transmit_bytes_total{job="node-exporter", instance="${target}", device!="lo"}[1m]))"#,
        "${target} node network transmitted bytes",
    ),
];

pub fn templates() -> Result<Vec<MetricTemplate>> {
    NODE_TEMPLATES
        .iter()
        .map(|(query, label)| MetricTemplate::parse(query, label))
        .collect()
}

pub fn catalog<S: AsRef<str>>(nodes: &[S]) -> Result<Catalog> {
    Ok(build_catalog(&templates()?, nodes))
}

/// Lists node exporter instances in the order Prometheus returns them.
///
/// An error status from Prometheus is fatal. Series without an `instance`
/// label are skipped.
pub async fn discover_targets<A: PromApi + ?Sized>(api: &A) -> Result<Vec<String>> {
    let response = api.query(DISCOVERY_QUERY).await?;
    if response.is_error() {
        error!("{}", response.raw);
        return Err(ExportError::Upstream {
            query: DISCOVERY_QUERY.to_string(),
            body: response.raw,
        });
    }

    let mut nodes = Vec::new();
    for sample in response.samples() {
        match sample.metric.get(INSTANCE_LABEL) {
            Some(instance) if !instance.is_empty() => nodes.push(instance.clone()),
            _ => warn!("Skipping discovery result without an instance label: {:?}", sample.metric),
        }
    }

    info!("Discovered {} node exporter instances", nodes.len());
    Ok(nodes)
}

/// Discovers nodes and builds the node catalog for them.
pub async fn discover_catalog<A: PromApi + ?Sized>(api: &A) -> Result<Catalog> {
    let nodes = discover_targets(api).await?;
    catalog(&nodes)
}
