use tracing::info;

use crate::catalog::Catalog;
use crate::config::ExportConfig;
use crate::fetcher::fetch_table;
use crate::prom::PromApi;
use crate::table::ResultTable;
use crate::writer::write_csv_file;
use crate::Result;

/// Fetches every series in `catalog` over the configured window and writes
/// the CSV. Nothing is written if any step fails. `now` is epoch seconds.
pub async fn run_export<A: PromApi + ?Sized>(
    api: &A,
    config: &ExportConfig,
    catalog: &Catalog,
    now: i64,
) -> Result<ResultTable> {
    info!("Querying metric names succeeded, metric number: {}", catalog.len());

    let window = config.window.resolve(now)?;
    info!(
        "Querying {} from {} to {} every {}",
        config.host, window.start, window.end, config.step
    );

    let table = fetch_table(
        api,
        catalog,
        &window,
        &config.step,
        config.policy,
        config.concurrency,
    )
    .await?;

    write_csv_file(&config.outfile, &table)?;
    Ok(table)
}
