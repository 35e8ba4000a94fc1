use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One `[timestamp, "value"]` pair as Prometheus encodes it.
pub type Sample = (f64, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Envelope shared by `/api/v1/query` and `/api/v1/query_range`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromResponse<T> {
    pub status: ResponseStatus,
    pub data: Option<T>,
    #[serde(rename = "errorType", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Response body exactly as received, kept for error logs.
    #[serde(skip)]
    pub raw: String,
}

impl<T> PromResponse<T> {
    pub fn is_error(&self) -> bool {
        self.status == ResponseStatus::Error
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixData {
    #[serde(rename = "resultType", default)]
    pub result_type: String,
    #[serde(default)]
    pub result: Vec<MatrixSeries>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixSeries {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    #[serde(default)]
    pub values: Vec<Sample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorData {
    #[serde(rename = "resultType", default)]
    pub result_type: String,
    #[serde(default)]
    pub result: Vec<VectorSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSample {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    pub value: Sample,
}

pub type RangeResponse = PromResponse<MatrixData>;
pub type InstantResponse = PromResponse<VectorData>;

impl RangeResponse {
    /// Samples of the first matched series. Queries are expected to be
    /// aggregated down to a single series, so the rest are ignored.
    pub fn first_series(&self) -> Option<&[Sample]> {
        self.data
            .as_ref()
            .and_then(|d| d.result.first())
            .map(|s| s.values.as_slice())
    }
}

impl InstantResponse {
    pub fn samples(&self) -> &[VectorSample] {
        self.data.as_ref().map(|d| d.result.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_matrix() {
        let body = r#"{"status":"success","data":{"resultType":"matrix","result":[
            {"metric":{},"values":[[1700000000,"1.5"],[1700000010.5,"2"]]}]}}"#;
        let resp: RangeResponse = serde_json::from_str(body).unwrap();
        assert!(!resp.is_error());
        let series = resp.first_series().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[1], (1700000010.5, "2".to_string()));
    }

    #[test]
    fn test_decode_error_without_data() {
        let body = r#"{"status":"error","errorType":"bad_data","error":"parse error"}"#;
        let resp: RangeResponse = serde_json::from_str(body).unwrap();
        assert!(resp.is_error());
        assert!(resp.first_series().is_none());
        assert_eq!(resp.error_type.as_deref(), Some("bad_data"));
        assert!(resp.data.is_none());
    }

    #[test]
    fn test_decode_vector() {
        let body = r#"{"status":"success","data":{"resultType":"vector","result":[
            {"metric":{"instance":"ncn-m001:9100"},"value":[1700000000.123,"1"]}]}}"#;
        let resp: InstantResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.samples()[0].metric["instance"], "ncn-m001:9100");
    }
}
