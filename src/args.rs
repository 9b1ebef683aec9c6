//! These structs provide the CLI interface for the fundboard binary.

use crate::api::Dataset;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// fundboard: serves live fundraising numbers from published Google Sheets.
///
/// The donations and expenses sheets are published to the web as CSV. This program fetches
/// them, normalizes the messy spreadsheet data into typed records, computes the aggregate
/// totals, and serves the result as a JSON API alongside the static dashboard pages.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run. You need the share URLs of the two
    /// published Google Sheets (File -> Share -> Publish to web, as CSV).
    Init(InitArgs),
    /// Fetch and process one dataset once, printing the aggregate JSON to stdout.
    Fetch(FetchArgs),
    /// Run the HTTP server that backs the dashboard.
    Serve(ServeArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where fundboard configuration is held. Defaults to ~/fundboard
    #[arg(long, env = "FUNDBOARD_HOME", default_value_t = default_fundboard_home())]
    fundboard_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, fundboard_home: PathBuf) -> Self {
        Self {
            log_level,
            fundboard_home: fundboard_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn fundboard_home(&self) -> &DisplayPath {
        &self.fundboard_home
    }
}

/// Args for the `fundboard init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL to the published donations Google Sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/15wWPAOJL5COh5flsyubX4AM_beoFoMc4
    #[arg(long)]
    sheet_url: String,

    /// The URL to the published expenses Google Sheet.
    #[arg(long)]
    expenses_sheet_url: String,

    /// The fundraising target in whole rupees.
    #[arg(long, default_value_t = 600_000)]
    target_amount: i64,
}

impl InitArgs {
    pub fn new(
        sheet_url: impl Into<String>,
        expenses_sheet_url: impl Into<String>,
        target_amount: i64,
    ) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            expenses_sheet_url: expenses_sheet_url.into(),
            target_amount,
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn expenses_sheet_url(&self) -> &str {
        &self.expenses_sheet_url
    }

    pub fn target_amount(&self) -> i64 {
        self.target_amount
    }
}

/// Args for the `fundboard fetch` command.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// The dataset to fetch: "donations" or "expenses"
    dataset: Dataset,
}

impl FetchArgs {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }
}

/// Args for the `fundboard serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// The port to listen on, overriding the configured port.
    #[arg(long)]
    port: Option<u16>,
}

impl ServeArgs {
    pub fn new(port: Option<u16>) -> Self {
        Self { port }
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

fn default_fundboard_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("fundboard"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --fundboard-home or FUNDBOARD_HOME instead of relying on the \
                default fundboard home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("fundboard")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
