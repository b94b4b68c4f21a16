//! JSON report output.
//!
//! Reports are grouped by run date, one file per company:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── tesla.json
//!     └── acme-corp.json
//! ```
//!
//! A second run for the same company on the same day overwrites the earlier file.

use crate::report::Report;
use crate::utils::slugify;
use chrono::{Local, NaiveDate};
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Path of the report file for `company` on `date`.
pub fn report_path(json_output_dir: &str, date: NaiveDate, company: &str) -> String {
    let slug = slugify(company);
    let stem = if slug.is_empty() { "report" } else { slug.as_str() };
    format!(
        "{}/{}/{}.json",
        json_output_dir.trim_end_matches('/'),
        date,
        stem
    )
}

/// Write a [`Report`] as pretty JSON under today's date directory.
///
/// Creates the date directory when missing and overwrites any earlier
/// report for the same company on the same day.
///
/// # Arguments
///
/// * `report` - The finished report to serialize
/// * `json_output_dir` - Base directory for JSON output
///
/// # Returns
///
/// The path of the written file.
///
/// # Errors
///
/// Returns an error if serialization, directory creation, or the write fails.
///
/// # Output Path
///
/// `{json_output_dir}/{YYYY-MM-DD}/{company-slug}.json`
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(report: &Report, json_output_dir: &str) -> Result<String, Box<dyn Error>> {
    write_report_dated(report, json_output_dir, Local::now().date_naive()).await
}

/// Like [`write_report`], with an explicit date directory.
pub async fn write_report_dated(
    report: &Report,
    json_output_dir: &str,
    date: NaiveDate,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;
    let path = report_path(json_output_dir, date, &report.company);

    let full_json_dir = format!("{}/{}", json_output_dir.trim_end_matches('/'), date);
    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    fs::write(&path, json).await?;
    info!(%path, "Wrote JSON report");

    Ok(path)
}
