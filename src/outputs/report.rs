//! Analysis report generation from a saved article crawl.
//!
//! Titles from the first column of a crawl CSV are handed to the model with
//! fixed instructions asking for a Markdown report with four sections. The
//! answer is saved under `<output_dir>/reports/ai_report_<timestamp>.md`.

use crate::api::{GeminiClient, ask_with_backoff};
use crate::error::ReportError;
use crate::outputs::table::read_titles;
use crate::utils::file_timestamp;
use chrono::Local;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const ANALYST_INSTRUCTIONS: &str = "You are a senior software engineering and market analysis consultant.
Your task is to produce a professional \"data insight report\" from the list of crawled article titles below.

## Output format (strict Markdown):
1.  **### Executive Summary**: summarize the most significant findings in three sentences.
2.  **## Trend Analysis**:
    * **Hot topics:** identify the top three trending keywords in the data.
    * **Growth trends:** if date information is present, analyze whether discussion volume changed noticeably.
3.  **## Product Action Recommendation**: based on the analysis, propose one product or engineering action that can be executed immediately.
4.  **## Data Source Note**: state that the data comes from a web crawler and that the analysis is based on title text only.
";

/// Build the full prompt for `titles`.
pub fn build_prompt(titles: &[String]) -> String {
    let mut prompt = String::from(ANALYST_INSTRUCTIONS);
    prompt.push_str("\n**Article Titles:**\n");
    for title in titles {
        let _ = writeln!(prompt, "- {title}");
    }
    prompt.push_str("\n---\n**Analysis Report:**\n");
    prompt
}

/// Directory holding generated reports.
pub fn reports_dir(output_dir: &Path) -> PathBuf {
    output_dir.join("reports")
}

/// Save `markdown` as a new timestamped report file.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_report(markdown: &str, output_dir: &Path) -> Result<PathBuf, ReportError> {
    let dir = reports_dir(output_dir);
    fs::create_dir_all(&dir).await?;
    let path = dir.join(format!("ai_report_{}.md", file_timestamp(Local::now())));
    fs::write(&path, markdown).await?;
    info!(path = %path.display(), "Saved report");
    Ok(path)
}

/// Read titles from `csv_path`, ask the model for a report and save it.
///
/// # Returns
///
/// The report text and the path it was saved to.
#[instrument(level = "info", skip(client, output_dir), fields(csv = %csv_path.display()))]
pub async fn generate_report(
    client: GeminiClient,
    csv_path: &Path,
    output_dir: &Path,
) -> Result<(String, PathBuf), ReportError> {
    let titles = read_titles(csv_path).await?;
    let prompt = build_prompt(&titles);
    info!(titles = titles.len(), "Requesting analysis report");

    let markdown = ask_with_backoff(client, &prompt).await?;
    let path = write_report(&markdown, output_dir).await?;
    Ok((markdown, path))
}
