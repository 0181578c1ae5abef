//! CSV persistence for article crawls.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── csv/
//!     ├── crawled_data_2025-05-06_09-15-02.csv
//!     └── crawled_data_2025-05-07_18-40-55.csv
//! ```
//!
//! Each file has the header `Title,Link,Source URL` and one row per record.
//! The report generator reads these files back and only looks at the first
//! column.

use crate::error::ReportError;
use crate::models::ArticleRecord;
use crate::utils::file_timestamp;
use chrono::Local;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

pub const CSV_HEADER: [&str; 3] = ["Title", "Link", "Source URL"];

/// Directory holding article CSV files.
pub fn csv_dir(output_dir: &Path) -> PathBuf {
    output_dir.join("csv")
}

/// Render records as CSV text, header included.
pub fn records_to_csv(records: &[ArticleRecord], source_url: &str) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record([record.title.as_str(), record.link.as_str(), source_url])?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Write a crawl to `<output_dir>/csv/crawled_data_<timestamp>.csv`.
///
/// Sentinel records are skipped; they describe the crawl, not the page.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip(records, output_dir), fields(count = records.len(), output_dir = %output_dir.display()))]
pub async fn write_articles_csv(
    records: &[ArticleRecord],
    source_url: &str,
    output_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let rows: Vec<ArticleRecord> = records
        .iter()
        .filter(|r| !r.is_sentinel())
        .cloned()
        .collect();

    let dir = csv_dir(output_dir);
    fs::create_dir_all(&dir).await?;
    let path = dir.join(format!("crawled_data_{}.csv", file_timestamp(Local::now())));

    let bytes = records_to_csv(&rows, source_url)?;
    fs::write(&path, bytes).await?;
    info!(path = %path.display(), rows = rows.len(), "Wrote article CSV");
    Ok(path)
}

/// Most recently modified `*.csv` file in `dir`, if any.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn find_latest_csv(dir: &Path) -> Option<PathBuf> {
    let mut entries = fs::read_dir(dir).await.ok()?;
    let mut latest: Option<(std::time::SystemTime, PathBuf)> = None;

    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Ok(modified) = entry.metadata().await.and_then(|m| m.modified()) else {
            continue;
        };
        if latest.as_ref().is_none_or(|(best, _)| modified > *best) {
            latest = Some((modified, path));
        }
    }

    let found = latest.map(|(_, path)| path);
    debug!(?found, "Latest CSV lookup");
    found
}

/// First-column values of every non-empty data row in the CSV at `path`.
///
/// # Errors
///
/// [`ReportError::NoData`] when the file is empty, has only a header, or
/// has no non-empty titles.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_titles(path: &Path) -> Result<Vec<String>, ReportError> {
    let bytes = fs::read(path).await?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes.as_slice());

    if reader.headers()?.is_empty() {
        return Err(ReportError::NoData(format!(
            "{} is empty",
            path.display()
        )));
    }

    let mut titles = Vec::new();
    let mut rows = 0usize;
    for record in reader.records() {
        let record = record?;
        rows += 1;
        if let Some(title) = record.get(0).filter(|t| !t.trim().is_empty()) {
            titles.push(title.to_string());
        }
    }

    if rows == 0 {
        return Err(ReportError::NoData(format!(
            "{} has a header but no rows",
            path.display()
        )));
    }
    if titles.is_empty() {
        return Err(ReportError::NoData(format!(
            "{} contains no titles",
            path.display()
        )));
    }
    info!(count = titles.len(), "Read titles");
    Ok(titles)
}
