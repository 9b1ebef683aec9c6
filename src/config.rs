//! Configuration file handling.
//!
//! The configuration file is stored at `$FUNDBOARD_HOME/config.json` and contains the
//! published Google Sheet URLs for the two datasets, the fundraising target, the server
//! port and the optional photo store credentials.

use crate::api::Dataset;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "fundboard";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const TEST_DATA: &str = "test_data";
const DEFAULT_TARGET_AMOUNT: i64 = 600_000;
const DEFAULT_PORT: u16 = 4000;

/// The `Config` object represents the configuration of the app. You instantiate it by
/// providing the path to `$FUNDBOARD_HOME` and from there it loads
/// `$FUNDBOARD_HOME/config.json`. The CSV export URLs are derived from the configured
/// sheet URLs once, at load time.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    donations_csv_url: String,
    expenses_csv_url: String,
}

impl Config {
    /// Creates the data directory and an initial `config.json` with default settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the data directory,
    ///   e.g. `$HOME/fundboard`
    /// - `sheet_url` - The URL of the published donations Google Sheet
    /// - `expenses_sheet_url` - The URL of the published expenses Google Sheet
    /// - `target_amount` - The fundraising target in whole rupees
    pub async fn create(
        dir: impl Into<PathBuf>,
        sheet_url: &str,
        expenses_sheet_url: &str,
        target_amount: i64,
    ) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the fundboard home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        // A place for test-mode CSV fixtures to live.
        utils::make_dir(root.join(TEST_DATA)).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: sheet_url.to_string(),
            expenses_sheet_url: expenses_sheet_url.to_string(),
            target_amount,
            port: DEFAULT_PORT,
            photo_store_url: None,
            photo_store_key: None,
            web_root: None,
        };
        config_file.save(&config_path).await?;

        Self::from_parts(root, config_path, config_file)
    }

    /// Validates that the home directory and config file exist, loads the config file and
    /// returns the loaded configuration object.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Fundboard home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Self::from_parts(root, config_path, config_file)
    }

    fn from_parts(root: PathBuf, config_path: PathBuf, config_file: ConfigFile) -> Result<Self> {
        anyhow::ensure!(
            config_file.target_amount > 0,
            "target_amount must be positive, got {}",
            config_file.target_amount
        );
        let donations_csv_url = export_csv_url(&config_file.sheet_url)
            .context("Failed to build the donations CSV export URL")?;
        let expenses_csv_url = export_csv_url(&config_file.expenses_sheet_url)
            .context("Failed to build the expenses CSV export URL")?;
        Ok(Self {
            root,
            config_path,
            config_file,
            donations_csv_url,
            expenses_csv_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The CSV export URL for a dataset.
    pub fn csv_url(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Donations => &self.donations_csv_url,
            Dataset::Expenses => &self.expenses_csv_url,
        }
    }

    /// Where test mode reads a dataset's CSV fixture from.
    pub fn test_data_path(&self, dataset: Dataset) -> PathBuf {
        self.root.join(TEST_DATA).join(format!("{dataset}.csv"))
    }

    pub fn target_amount(&self) -> i64 {
        self.config_file.target_amount
    }

    pub fn port(&self) -> u16 {
        self.config_file.port
    }

    /// The photo store endpoint and key, when configured.
    pub fn photo_store(&self) -> Option<(&str, &str)> {
        match (
            self.config_file.photo_store_url.as_deref(),
            self.config_file.photo_store_key.as_deref(),
        ) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }

    /// The directory holding the static dashboard files, when configured. A relative path
    /// is resolved against the home directory.
    pub fn web_root(&self) -> Option<PathBuf> {
        self.config_file.web_root.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                self.root.join(p)
            }
        })
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "fundboard",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/15wWPAOJL5COh5flsyubX4AM_beoFoMc4",
///   "expenses_sheet_url": "https://docs.google.com/spreadsheets/d/1VU3ajNLA8EpTUMwp1Z4qTpuXlX5",
///   "target_amount": 600000,
///   "port": 4000
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "fundboard"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL to the published donations Google Sheet
    sheet_url: String,

    /// URL to the published expenses Google Sheet
    expenses_sheet_url: String,

    /// The fundraising target in whole rupees
    #[serde(default = "default_target_amount")]
    target_amount: i64,

    /// The port the HTTP server listens on
    #[serde(default = "default_port")]
    port: u16,

    /// Base URL of the photo metadata store (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_store_url: Option<String>,

    /// API key for the photo metadata store (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_store_key: Option<String>,

    /// Directory of static dashboard files to serve (optional, relative to the home
    /// directory or absolute)
    #[serde(skip_serializing_if = "Option::is_none")]
    web_root: Option<PathBuf>,
}

fn default_target_amount() -> i64 {
    DEFAULT_TARGET_AMOUNT
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path.as_ref(), data)
            .await
            .context("Unable to write config file")
    }
}

/// Builds the CSV export URL for a Google Sheets share URL.
///
/// The share URL looks like `https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/edit`;
/// the export endpoint is `.../d/SPREADSHEET_ID/export?format=csv`. The `gid` parameter is
/// deliberately omitted because the export endpoint rejects it for published sheets.
fn export_csv_url(sheet_url: &str) -> Result<String> {
    let id = extract_spreadsheet_id(sheet_url)?;
    Ok(format!(
        "https://docs.google.com/spreadsheets/d/{id}/export?format=csv"
    ))
}

/// Extracts the spreadsheet ID from a Google Sheets URL.
fn extract_spreadsheet_id(url: &str) -> Result<&str> {
    // URL format: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...
    // or: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID?foo=bar
    let parts: Vec<&str> = url.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "d" && i + 1 < parts.len() {
            let id_part = parts[i + 1];
            let id = id_part
                .split('?')
                .next()
                .unwrap_or(id_part)
                .split('#')
                .next()
                .unwrap_or(id_part);
            return Ok(id);
        }
    }
    Err(anyhow::anyhow!(
        "Invalid Google Sheets URL format. Expected: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
    ))
}
