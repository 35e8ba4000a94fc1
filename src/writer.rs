use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{Local, TimeZone};
use tracing::info;

use crate::table::ResultTable;
use crate::Result;

pub const TIMESTAMP_HEADER: &str = "timestamp";

/// Renders a millisecond epoch timestamp in the local timezone, e.g.
/// `2024-03-01 14:05:10`, or `2024-03-01 14:05:10.500000` for sub-second
/// samples.
pub fn format_local(timestamp_ms: i64) -> String {
    let fmt = if timestamp_ms.rem_euclid(1000) == 0 {
        "%Y-%m-%d %H:%M:%S"
    } else {
        "%Y-%m-%d %H:%M:%S%.6f"
    };
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(dt) => dt.format(fmt).to_string(),
        None => timestamp_ms.to_string(),
    }
}

/// Writes the header and every row, newest first.
pub fn write_table<W: Write>(out: W, table: &ResultTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = Vec::with_capacity(table.labels().len() + 1);
    header.push(TIMESTAMP_HEADER);
    header.extend(table.labels().iter().map(String::as_str));
    writer.write_record(&header)?;

    for (timestamp_ms, values) in table.rows_descending() {
        let stamp = format_local(timestamp_ms);
        writer.write_record(std::iter::once(stamp.as_str()).chain(values.iter().map(String::as_str)))?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, table: &ResultTable) -> Result<()> {
    let file = File::create(path)?;
    write_table(file, table)?;
    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}
