use std::process;

use clap::Parser;
use prom2csv::{cli::RebuildCli, logging, rebuild};
use tracing::error;

fn main() {
    let cli = RebuildCli::parse();

    if let Err(e) = logging::init_logger(env!("CARGO_CRATE_NAME")) {
        eprintln!("{}", e);
    }

    let path = rebuild::manifest_path(&cli.dir, &cli.name);
    if let Err(e) = rebuild::edit_manifest(&path) {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
