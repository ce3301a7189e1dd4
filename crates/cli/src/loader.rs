//! CSV loading for quote datasets.
//!
//! Parsing the file format is presentation-layer work; the core consumes the
//! raw records this module produces. Headers may be the canonical snake_case
//! set or the legacy camelCase export set (serde aliases on
//! [`RawQuoteRecord`] cover both).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use lanewise_core::config::AppConfig;
use lanewise_core::{ingest, IngestReport, RawQuoteRecord};
use tracing::info;

pub fn read_raw<R: Read>(reader: R) -> Result<Vec<RawQuoteRecord>> {
    let mut csv_reader =
        csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

    let mut records = Vec::new();
    for (index, result) in csv_reader.deserialize().enumerate() {
        let record: RawQuoteRecord =
            result.with_context(|| format!("CSV parse error at line {}", index + 2))?;
        records.push(record);
    }

    Ok(records)
}

/// Load and ingest a quote CSV under the configured invalid-record policy.
pub fn load_quotes(config: &AppConfig, path: &Path) -> Result<IngestReport> {
    let file =
        File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    let raw = read_raw(file)?;
    let report = ingest(&raw, config.ingest.on_invalid)
        .with_context(|| format!("failed to ingest `{}`", path.display()))?;

    info!(
        path = %path.display(),
        loaded = report.quotes.len(),
        rejected = report.rejected.len(),
        "quote dataset loaded"
    );

    Ok(report)
}
