use std::process;

use clap::Parser;
use prom2csv::{cli::CrcCli, logging, prom::PromClient, snapshot, Result};
use tracing::{error, info};

const BANNER_WIDTH: usize = 80;

fn banner(text: &str) {
    info!("{:$^width$}", text, width = BANNER_WIDTH);
}

async fn run(cli: CrcCli) -> Result<()> {
    let config = cli.config();
    let client = PromClient::new(&config)?;

    banner("STARTING");
    let usages = snapshot::collect(&client, &cli.services, &cli.window, config.concurrency).await?;
    snapshot::write_snapshot_file(&config.outfile, &usages)?;

    banner("  Collected the Boot Critical Service Resource Consumption  ");
    banner(&format!("  Please Refer {} output file  ", config.outfile.display()));
    banner("DONE");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = CrcCli::parse();

    if let Err(e) = logging::init_logger(env!("CARGO_CRATE_NAME")) {
        eprintln!("{}", e);
    }

    if let Err(e) = run(cli).await {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
