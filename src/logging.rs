use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{ExportError, Result};

/// Sets up the logging subscriber for an exporter binary.
///
/// `RUST_LOG` wins when set. Otherwise the binary's own target and the
/// library both log at INFO.
///
/// # Arguments
/// * `binary` - Crate target name of the calling binary (e.g. `ncn_query_csv`)
pub fn init_logger(binary: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={},{}={}",
            binary,
            Level::INFO,
            env!("CARGO_CRATE_NAME"),
            Level::INFO
        ))
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_ansi(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ExportError::Internal(format!("Failed to initialize logger: {}", e)))
}
