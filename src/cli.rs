//! Command-line interface definitions for Page Harvest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Secrets can be provided via environment variables instead of flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Page Harvest application.
///
/// # Examples
///
/// ```sh
/// # Article titles and links, saved to dist/csv
/// page_harvest articles https://blog.example.com --save
///
/// # Download every image on a page
/// page_harvest images https://example.com/gallery
///
/// # Summarize the latest saved crawl
/// GEMINI_API_KEY=... page_harvest analyze
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Root directory for CSV files, images and reports
    #[arg(short, long, global = true, default_value = "dist")]
    pub output_dir: PathBuf,

    /// Optional path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of images downloaded in parallel (1-8); overrides the config file
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract article titles and links from a page
    Articles {
        /// Page to crawl (http:// or https://)
        url: String,

        /// Save the records to a CSV file
        #[arg(short, long)]
        save: bool,
    },

    /// Find images on a page and download them
    Images {
        /// Page to crawl (http:// or https://)
        url: String,

        /// Only list the image URLs
        #[arg(long)]
        no_download: bool,
    },

    /// Generate an AI analysis report from a saved article crawl
    Analyze {
        /// CSV to analyze; defaults to the newest file in <output-dir>/csv
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Google AI API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model name
        #[arg(long, default_value = "gemini-2.5-flash")]
        model: String,

        /// API base URL
        #[arg(long, env = "GEMINI_BASE_URL", default_value = crate::api::GEMINI_BASE_URL)]
        api_base: String,
    },
}
