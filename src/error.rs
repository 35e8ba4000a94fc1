use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("HTTP error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Query `{query}` failed: {body}")]
    Upstream { query: String, body: String },

    #[error("Query `{query}` returned no series: {body}")]
    EmptyResult { query: String, body: String },

    #[error("Series for `{label}` does not line up with the first series at timestamp {timestamp_ms}ms")]
    Misaligned { label: String, timestamp_ms: i64 },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Object store error: {0}")]
    ObjectStore(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExportError {
    /// Process exit status for this error. Argument and upstream query
    /// failures, and missing buckets or objects, exit with 2. Everything else
    /// exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::Config(_)
            | ExportError::Upstream { .. }
            | ExportError::EmptyResult { .. }
            | ExportError::Misaligned { .. }
            | ExportError::NotFound(_) => 2,
            _ => 1,
        }
    }
}

impl From<reqwest::Error> for ExportError {
    fn from(err: reqwest::Error) -> Self {
        ExportError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Decode(err.to_string())
    }
}

impl From<serde_yaml::Error> for ExportError {
    fn from(err: serde_yaml::Error) -> Self {
        ExportError::Yaml(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let upstream = ExportError::Upstream {
            query: "up".to_string(),
            body: "{}".to_string(),
        };
        assert_eq!(upstream.exit_code(), 2);
        assert_eq!(ExportError::Config("missing host".to_string()).exit_code(), 2);
        assert_eq!(ExportError::Transport("refused".to_string()).exit_code(), 1);
        assert_eq!(ExportError::Io("denied".to_string()).exit_code(), 1);
        assert_eq!(ExportError::NotFound("get b/k: NoSuchKey".to_string()).exit_code(), 2);
        assert_eq!(ExportError::ObjectStore("get b/k: timeout".to_string()).exit_code(), 1);
    }
}
