use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json` holding the CSV export URLs
/// derived from the two sheet URLs, along with default settings.
///
/// # Arguments
/// - `fundboard_home` - The directory that will be the root of the data directory, e.g.
///   `$HOME/fundboard`
/// - `sheet_url` - The URL of the published donations Google Sheet.
/// - `expenses_sheet_url` - The URL of the published expenses Google Sheet.
/// - `target_amount` - The fundraising target in whole rupees.
///
/// # Errors
/// - Returns an error if either URL has no spreadsheet ID or if any file operations fail.
pub async fn init(
    fundboard_home: &Path,
    sheet_url: &str,
    expenses_sheet_url: &str,
    target_amount: i64,
) -> Result<Out<()>> {
    let _config = Config::create(fundboard_home, sheet_url, expenses_sheet_url, target_amount)
        .await
        .context("Unable to create the data directory and config")?;
    Ok("Successfully created the fundboard directory and config".into())
}
