//! Persistence for crawl results and generated reports.
//!
//! # Submodules
//!
//! - [`table`]: writes article crawls to CSV and reads titles back
//! - [`report`]: turns a saved crawl into a Markdown analysis report
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── csv/
//! │   └── crawled_data_2025-05-06_09-15-02.csv
//! ├── image/
//! │   └── images_blog_ex_com_20250506_091502/
//! └── reports/
//!     └── ai_report_2025-05-06_09-20-11.md
//! ```

pub mod report;
pub mod table;
