use crate::catalog::{build_catalog, Catalog, MetricTemplate};
use crate::Result;

/// Column headers of the resource snapshot, one per template, in order.
pub const RESOURCE_COLUMNS: &[&str] = &[
    "MEMORY USAGE",
    "CPU USAGE",
    "NETWORK RECEIVE BYTES",
    "NETWORK TRANSMIT BYTES",
];

/// Container resource templates. `window` is a Prometheus duration such as
/// `5m`, used as the rate range for the counters.
pub fn templates(window: &str) -> Result<Vec<MetricTemplate>> {
    let queries = [
        r#"sum(container_memory_usage_bytes{pod=~"${target}.*"})"#.to_string(),
        format!(
            r#"sum(rate(container_cpu_usage_seconds_total{{pod=~"${{target}}.*"}}[{}]))"#,
            window
        ),
        format!(
            r#"sum(rate(container_network_receive_bytes_total{{pod=~"${{target}}.*"}}[{}]))"#,
            window
        ),
        format!(
            r#"sum(rate(container_network_transmit_bytes_total{{pod=~"${{target}}.*"}}[{}]))"#,
            window
        ),
    ];

    queries
        .iter()
        .zip(RESOURCE_COLUMNS)
        .map(|(query, label)| MetricTemplate::parse(query, label))
        .collect()
}

pub fn catalog<S: AsRef<str>>(services: &[S], window: &str) -> Result<Catalog> {
    Ok(build_catalog(&templates(window)?, services))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_service_prefix_matcher() {
        let catalog = catalog(&["cray-bss"], "50m").unwrap();
        assert_eq!(catalog.len(), RESOURCE_COLUMNS.len());
        assert_eq!(
            catalog.entries()[0].query,
            r#"sum(container_memory_usage_bytes{pod=~"cray-bss.*"})"#
        );
        assert_eq!(
            catalog.entries()[1].query,
            r#"sum(rate(container_cpu_usage_seconds_total{pod=~"cray-bss.*"}[50m]))"#
        );
        assert_eq!(catalog.labels(), RESOURCE_COLUMNS);
    }
}
