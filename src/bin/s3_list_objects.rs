use std::process;

use clap::Parser;
use prom2csv::{cli::ListObjectsCli, logging, s3::ObjectStore, Result};
use tracing::{error, warn};

async fn run(cli: ListObjectsCli) -> Result<()> {
    let store = ObjectStore::new(&cli.store.config());
    let keys = store.list_keys(&cli.bucket_name).await?;
    if keys.is_empty() {
        warn!("Bucket {} is empty", cli.bucket_name);
    }
    for key in keys {
        println!("{}", key);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = ListObjectsCli::parse();

    if let Err(e) = logging::init_logger(env!("CARGO_CRATE_NAME")) {
        eprintln!("{}", e);
    }

    if let Err(e) = run(cli).await {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
