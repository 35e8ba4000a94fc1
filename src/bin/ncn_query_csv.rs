use std::process;

use clap::Parser;
use prom2csv::{catalog::ncn, cli::NcnCli, export, logging, prom::PromClient, Result};
use tracing::error;

async fn run(cli: NcnCli) -> Result<()> {
    let config = cli.exporter.into_config();
    let client = PromClient::new(&config)?;
    let catalog = ncn::discover_catalog(&client).await?;

    let now = chrono::Utc::now().timestamp();
    export::run_export(&client, &config, &catalog, now).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = NcnCli::parse();

    if let Err(e) = logging::init_logger(env!("CARGO_CRATE_NAME")) {
        eprintln!("{}", e);
    }

    if let Err(e) = run(cli).await {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
