use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::catalog::{Catalog, CatalogEntry};
use crate::config::{FailurePolicy, ResolvedWindow};
use crate::models::RangeResponse;
use crate::prom::PromApi;
use crate::table::ResultTable;
use crate::{ExportError, Result};

/// Runs one range query per catalog entry and aligns the results by
/// timestamp.
///
/// Requests go out through a pipeline at most `concurrency` deep, but
/// responses are consumed in catalog order, so the table does not depend on
/// the concurrency level. The first entry must return data under either
/// policy because it decides the rows.
pub async fn fetch_table<A: PromApi + ?Sized>(
    api: &A,
    catalog: &Catalog,
    window: &ResolvedWindow,
    step: &str,
    policy: FailurePolicy,
    concurrency: usize,
) -> Result<ResultTable> {
    let entries = catalog.entries();
    if entries.is_empty() {
        return Err(ExportError::Config("nothing to query, the catalog is empty".to_string()));
    }

    let mut responses = stream::iter(entries.iter())
        .map(|entry| async move { (entry, api.query_range(&entry.query, window, step).await) })
        .buffered(concurrency.max(1));

    let mut table: Option<ResultTable> = None;
    let mut dropped = 0usize;

    while let Some((entry, response)) = responses.next().await {
        let response = response?;
        match table.as_mut() {
            None => table = Some(seed(entry, response)?),
            Some(table) => {
                if !append(table, entry, response, policy)? {
                    dropped += 1;
                }
            }
        }
    }

    let table = table.ok_or_else(|| ExportError::Internal("no responses received".to_string()))?;
    if dropped > 0 {
        warn!("Dropped {} of {} columns that returned no data", dropped, entries.len());
    }
    info!("Querying metric values succeeded, rows of data: {}", table.len());
    Ok(table)
}

fn seed(entry: &CatalogEntry, response: RangeResponse) -> Result<ResultTable> {
    if response.is_error() {
        error!("{}", response.raw);
        return Err(ExportError::Upstream {
            query: entry.query.clone(),
            body: response.raw,
        });
    }
    match response.first_series() {
        Some(samples) => Ok(ResultTable::seed(entry.label.clone(), samples)),
        None => {
            error!("{}", response.raw);
            Err(ExportError::EmptyResult {
                query: entry.query.clone(),
                body: response.raw,
            })
        }
    }
}

/// Returns `false` when the entry's column was dropped.
fn append(
    table: &mut ResultTable,
    entry: &CatalogEntry,
    response: RangeResponse,
    policy: FailurePolicy,
) -> Result<bool> {
    let failure = if response.is_error() {
        Some(ExportError::Upstream {
            query: entry.query.clone(),
            body: response.raw.clone(),
        })
    } else if response.first_series().is_none() {
        Some(ExportError::EmptyResult {
            query: entry.query.clone(),
            body: response.raw.clone(),
        })
    } else {
        None
    };

    match (failure, policy) {
        (None, _) => {
            let samples = response.first_series().unwrap_or_default();
            table.append(entry.label.clone(), samples, policy)?;
            Ok(true)
        }
        (Some(err), FailurePolicy::Strict) => {
            error!("{}", response.raw);
            Err(err)
        }
        (Some(err), FailurePolicy::Lenient) => {
            warn!("Dropping column `{}`: {}", entry.label, err);
            Ok(false)
        }
    }
}
