use std::process;

use clap::Parser;
use prom2csv::{catalog::istio, cli::IstioCli, export, logging, prom::PromClient, Result};
use tracing::error;

async fn run(cli: IstioCli) -> Result<()> {
    let config = cli.exporter.into_config();
    let client = PromClient::new(&config)?;
    let catalog = istio::catalog(&cli.services)?;

    let now = chrono::Utc::now().timestamp();
    export::run_export(&client, &config, &catalog, now).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = IstioCli::parse();

    if let Err(e) = logging::init_logger(env!("CARGO_CRATE_NAME")) {
        eprintln!("{}", e);
    }

    if let Err(e) = run(cli).await {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
