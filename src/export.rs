use anyhow::{Context, Result};
use chrono::SecondsFormat;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::models::ExpenditureRecord;

#[derive(Serialize)]
struct ExportRow<'a> {
    id: i64,
    date: String,
    userid: i64,
    category: &'a str,
    description: &'a str,
    sum: Decimal,
}

impl<'a> From<&'a ExpenditureRecord> for ExportRow<'a> {
    fn from(record: &'a ExpenditureRecord) -> Self {
        Self {
            id: record.id,
            date: record.occurred_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            userid: record.owner_id,
            category: &record.category,
            description: &record.description,
            sum: record.amount,
        }
    }
}

/// Write `records` as CSV to `path`, in the order given. Returns the row count.
pub(crate) fn export_to_csv(path: &Path, records: &[ExpenditureRecord]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let count = write_csv(file, records)?;
    tracing::info!(count, path = %path.display(), "records exported");
    Ok(count)
}

pub(crate) fn write_csv<W: Write>(writer: W, records: &[ExpenditureRecord]) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    // Header is written by hand so an empty export still has one.
    wtr.write_record(["id", "date", "userid", "category", "description", "sum"])
        .context("Failed to write CSV header")?;
    for record in records {
        wtr.serialize(ExportRow::from(record))
            .with_context(|| format!("Failed to write record {}", record.id))?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(records.len())
}

/// `~/costbook-export-<suffix>.csv`
pub(crate) fn default_export_path(suffix: &str) -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    format!("{home}/costbook-export-{suffix}.csv")
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
