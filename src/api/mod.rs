//! External collaborators: the published CSV endpoints and the photo metadata store.
//!
//! Nothing in this module parses or interprets sheet data; it only moves bytes. The core
//! pipeline in `model` stays free of I/O so that one fetch cycle is a pure, deterministic
//! transformation of the text these sources produce.

mod photos;
mod published;
mod test_source;

pub use photos::{Photo, PhotoStore};

use crate::{Config, Result};
use serde::{Deserialize, Serialize};

/// Which published dataset to fetch.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Donations,
    Expenses,
}

serde_plain::derive_display_from_serialize!(Dataset);
serde_plain::derive_fromstr_from_deserialize!(Dataset);

/// Whether to hit the real published endpoints or read local fixture files.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Live,
    Test,
}

impl Mode {
    /// This allows for testing the program without hitting Google. When
    /// FUNDBOARD_IN_TEST_MODE is set and non-zero in length, then the mode will be
    /// Mode::Test, otherwise it will be Mode::Live.
    pub fn from_env() -> Self {
        match std::env::var("FUNDBOARD_IN_TEST_MODE") {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Live,
        }
    }
}

/// A source of raw CSV text for one dataset.
#[async_trait::async_trait]
pub trait CsvSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

/// Creates the CSV source for `dataset` according to `mode`.
pub fn source(config: &Config, dataset: Dataset, mode: Mode) -> Box<dyn CsvSource> {
    match mode {
        Mode::Live => Box::new(published::PublishedCsv::new(config.csv_url(dataset))),
        Mode::Test => Box::new(test_source::FileCsv::new(config.test_data_path(dataset))),
    }
}
