use crate::catalog::{build_catalog, Catalog, MetricTemplate};
use crate::Result;

/// Services watched when no `--services` list is given.
pub const DEFAULT_SERVICES: &[&str] = &[
    "cray-smd",
    "cray-bss",
    "cray-capmc",
    "cray-hbtd",
    "cray-cps",
    "slurm",
];

const RESPONSE_CLASSES: &[(&str, &str)] = &[
    ("2XX", "2[0-9][0-9]"),
    ("3XX", "3[0-9][0-9]"),
    ("4XX", "4[0-9][0-9]"),
    ("5XX", "5[0-9][0-9]"),
];

/// (label, quantile, rate function over the milliseconds histogram).
const QUANTILES: &[(&str, &str, &str)] = &[
    ("P50", "0.50", "rate"),
    ("P90", "0.90", "irate"),
    ("P99", "0.99", "irate"),
];

fn response_ratio(code_regex: &str) -> String {
    format!(
        concat!(
            r#"sum(rate(istio_requests_total{{reporter="destination",destination_service=~".*${{target}}.*",response_code=~"{}"}}[5m]))"#,
            r#" / sum(rate(istio_requests_total{{reporter="destination",destination_service=~".*${{target}}.*"}}[5m])) * 100"#,
        ),
        code_regex
    )
}

// Older Istio releases only export the seconds histogram, newer ones only
// the milliseconds one.
fn request_duration(quantile: &str, ms_fn: &str) -> String {
    format!(
        concat!(
            r#"(histogram_quantile({q}, sum({f}(istio_request_duration_milliseconds_bucket{{reporter="destination",destination_service=~".*${{target}}.*"}}[1m])) by (le)) / 1000)"#,
            r#" or histogram_quantile({q}, sum(irate(istio_request_duration_seconds_bucket{{reporter="destination",destination_service=~".*${{target}}.*"}}[1m])) by (le))"#,
        ),
        q = quantile,
        f = ms_fn
    )
}

/// Per-service templates: response-code percentages then latency quantiles.
pub fn templates() -> Result<Vec<MetricTemplate>> {
    let mut templates = Vec::with_capacity(RESPONSE_CLASSES.len() + QUANTILES.len());

    for (class, regex) in RESPONSE_CLASSES {
        templates.push(MetricTemplate::parse(
            &response_ratio(regex),
            &format!("${{target}}  {} %", class),
        )?);
    }
    for (name, quantile, ms_fn) in QUANTILES {
        templates.push(MetricTemplate::parse(
            &request_duration(quantile, ms_fn),
            &format!("${{target}} {} server request duration sec", name),
        )?);
    }

    Ok(templates)
}

pub fn catalog<S: AsRef<str>>(services: &[S]) -> Result<Catalog> {
    Ok(build_catalog(&templates()?, services))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_query_names_the_service_twice() {
        for template in templates().unwrap() {
            assert_eq!(template.query.slot_count(), 2, "{}", template.query);
            assert_eq!(template.label.slot_count(), 1, "{}", template.label);
        }
    }

    #[test]
    fn test_catalog_shape() {
        let catalog = catalog(DEFAULT_SERVICES).unwrap();
        assert_eq!(catalog.len(), 7 * DEFAULT_SERVICES.len());

        let first = &catalog.entries()[0];
        assert_eq!(
            first.query,
            r#"sum(rate(istio_requests_total{reporter="destination",destination_service=~".*cray-smd.*",response_code=~"2[0-9][0-9]"}[5m])) / sum(rate(istio_requests_total{reporter="destination",destination_service=~".*cray-smd.*"}[5m])) * 100"#
        );
        assert_eq!(first.label, "cray-smd  2XX %");

        let p99 = &catalog.entries()[6];
        assert!(p99.query.starts_with("(histogram_quantile(0.99, "));
        assert_eq!(p99.label, "cray-smd P99 server request duration sec");

        assert_eq!(catalog.entries()[7].label, "cray-bss  2XX %");
    }

    #[test]
    fn test_latency_query_bodies() {
        let catalog = catalog(&["slurm"]).unwrap();
        let queries: Vec<&str> = catalog.entries()[4..].iter().map(|e| e.query.as_str()).collect();

        assert_eq!(
            queries[0],
            r#"(histogram_quantile(0.50, sum(rate(istio_request_duration_milliseconds_bucket{reporter="destination",destination_service=~".*slurm.*"}[1m])) by (le)) / 1000) or histogram_quantile(0.50, sum(irate(istio_request_duration_seconds_bucket{reporter="destination",destination_service=~".*slurm.*"}[1m])) by (le))"#
        );
        assert_eq!(
            queries[1],
            r#"(histogram_quantile(0.90, sum(irate(istio_request_duration_milliseconds_bucket{reporter="destination",destination_service=~".*slurm.*"}[1m])) by (le)) / 1000) or histogram_quantile(0.90, sum(irate(istio_request_duration_seconds_bucket{reporter="destination",destination_service=~".*slurm.*"}[1m])) by (le))"#
        );
        assert_eq!(
            queries[2],
            r#"(histogram_quantile(0.99, sum(irate(istio_request_duration_milliseconds_bucket{reporter="destination",destination_service=~".*slurm.*"}[1m])) by (le)) / 1000) or histogram_quantile(0.99, sum(irate(istio_request_duration_seconds_bucket{reporter="destination",destination_service=~".*slurm.*"}[1m])) by (le))"#
        );
    }
}
