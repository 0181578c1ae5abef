//! # Page Harvest
//!
//! Pulls structured content out of arbitrary web pages without any
//! site-specific configuration, and summarizes saved crawls with an LLM.
//!
//! ## Features
//!
//! - Article title/link extraction with a two-tier heuristic
//!   (`<article>` containers first, prominent links as a fallback)
//! - Image discovery with URL normalization and deduplication
//! - Parallel image download where one failure never stops the batch
//! - CSV persistence and Gemini-generated Markdown reports
//!
//! ## Usage
//!
//! ```sh
//! page_harvest articles https://blog.example.com --save
//! page_harvest images https://example.com/gallery
//! page_harvest analyze
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Fetching**: one GET with a browser-like header profile
//! 2. **Extracting**: heuristics over the parsed document
//! 3. **Downloading**: images fetched by a small worker pool
//! 4. **Output**: console listing, CSV files, image folders and reports

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod dom;
mod downloader;
mod encoding;
mod error;
mod extractors;
mod fetcher;
mod models;
mod outputs;
mod utils;

use api::GeminiClient;
use cli::{Cli, Command};
use config::AppConfig;
use error::ReportError;
use extractors::{articles, images};
use fetcher::PageFetcher;
use models::{ArticleCrawl, ArticleRecord, ImageCrawl, tally};
use outputs::{report, table};
use utils::{ensure_writable_dir, image_dir_for, validate_target_url};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("page_harvest starting up");

    let args = Cli::parse();
    debug!(output_dir = %args.output_dir.display(), config = ?args.config, "Parsed CLI arguments");

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(concurrency) = args.concurrency {
        config.download_concurrency = concurrency;
    }

    let result = match args.command {
        Command::Articles { url, save } => run_articles(&config, &url, save, &args.output_dir).await,
        Command::Images { url, no_download } => {
            run_images(&config, &url, no_download, &args.output_dir).await
        }
        Command::Analyze {
            csv,
            api_key,
            model,
            api_base,
        } => {
            run_analyze(csv.as_deref(), api_key, &model, &api_base, &args.output_dir).await
        }
    };

    let elapsed = start_time.elapsed();
    match &result {
        Ok(()) => info!(?elapsed, "Execution complete"),
        Err(e) => error!(?elapsed, error = %e, "Execution failed"),
    }
    result
}

#[instrument(level = "info", skip(config, output_dir))]
async fn run_articles(
    config: &AppConfig,
    url: &str,
    save: bool,
    output_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let target = validate_target_url(url)?;
    let fetcher = PageFetcher::from_config(config)?;

    println!("Loading {target} ...");
    let crawl = articles::crawl_articles(&fetcher, target.as_str()).await;
    if let ArticleCrawl::NetworkFailure { kind, message } = &crawl {
        warn!(?kind, %message, "Article crawl could not fetch the page");
    }
    let found = matches!(crawl, ArticleCrawl::Success(_));
    let records = crawl.into_records(target.as_str());
    print_records(&records);

    if !found {
        println!("\nNo text content could be extracted from this page.");
        return Ok(());
    }

    if save {
        ensure_writable_dir(output_dir).await?;
        let path = table::write_articles_csv(&records, target.as_str(), output_dir).await?;
        println!("\nResults saved to {}", path.display());
    }
    Ok(())
}

fn print_records(records: &[ArticleRecord]) {
    println!("\n--- Crawl results ---");
    for record in records {
        if record.is_sentinel() {
            println!("{}", record.title);
        } else {
            println!("Title: {}\nLink: {}\n", record.title, record.link);
        }
    }
}

#[instrument(level = "info", skip(config, output_dir))]
async fn run_images(
    config: &AppConfig,
    url: &str,
    no_download: bool,
    output_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let target = validate_target_url(url)?;
    let fetcher = PageFetcher::from_config(config)?;

    println!("Loading {target} ...");
    let image_urls = match images::crawl_images(&fetcher, target.as_str()).await {
        ImageCrawl::Success(urls) => urls,
        ImageCrawl::NetworkFailure { kind, message } => {
            warn!(?kind, %message, "Image crawl could not fetch the page");
            println!("\nError while reading {target}: {message}");
            return Ok(());
        }
    };

    if image_urls.is_empty() {
        println!("\nNo downloadable images were found on this page.");
        return Ok(());
    }
    println!("\nFound {} images.", image_urls.len());

    if no_download {
        for image_url in &image_urls {
            println!("{image_url}");
        }
        return Ok(());
    }

    let destination = image_dir_for(output_dir, target.as_str(), Local::now());
    println!("Saving images to '{}'", destination.display());
    let outcomes = downloader::download_all(
        &fetcher,
        &image_urls,
        &destination,
        config.concurrency(),
    )
    .await?;

    for outcome in &outcomes {
        if outcome.succeeded {
            println!("  saved {}", outcome.local_name);
        } else {
            println!(
                "  - download failed {}: {}",
                outcome.source_url,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    let (saved, total) = tally(&outcomes);
    println!(
        "\nSaved {saved} of {total} images in '{}'.",
        destination.display()
    );
    Ok(())
}

#[instrument(level = "info", skip(api_key, output_dir))]
async fn run_analyze(
    csv: Option<&Path>,
    api_key: Option<String>,
    model: &str,
    api_base: &str,
    output_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let csv_path = match csv {
        Some(path) => path.to_path_buf(),
        None => match table::find_latest_csv(&table::csv_dir(output_dir)).await {
            Some(path) => path,
            None => {
                warn!("No crawl CSV available");
                println!("No crawled data found to analyze.");
                println!("Run `page_harvest articles <URL> --save` first to produce a CSV file.");
                return Ok(());
            }
        },
    };
    println!("Using data file: {}", csv_path.display());

    let api_key = api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or(ReportError::MissingApiKey)?;
    let client = GeminiClient::new(api_base, model, api_key)?;

    println!("\nGenerating AI analysis report... (this may take a while)");
    let (markdown, path) = match report::generate_report(client, &csv_path, output_dir).await {
        Ok(done) => done,
        Err(ReportError::NoData(reason)) => {
            println!("Nothing to analyze: {reason}");
            return Ok(());
        }
        Err(e) => {
            println!("Please check that your API key is valid and has access to the model.");
            return Err(e.into());
        }
    };

    println!("\n{}", "=".repeat(30));
    println!("      AI analysis report");
    println!("{}", "=".repeat(30));
    println!("{markdown}");
    println!("\n--- End of report ---");
    println!("\nReport saved to {}", path.display());
    Ok(())
}
