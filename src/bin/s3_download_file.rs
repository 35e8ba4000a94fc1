use std::process;

use clap::Parser;
use prom2csv::{cli::DownloadCli, logging, s3::ObjectStore, Result};
use tracing::error;

async fn run(cli: DownloadCli) -> Result<()> {
    let store = ObjectStore::new(&cli.store.config());
    store.download(&cli.bucket_name, &cli.key_name, &cli.file_name).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = DownloadCli::parse();

    if let Err(e) = logging::init_logger(env!("CARGO_CRATE_NAME")) {
        eprintln!("{}", e);
    }

    if let Err(e) = run(cli).await {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
