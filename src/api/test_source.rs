use crate::api::CsvSource;
use crate::{utils, Result};
use std::path::PathBuf;
use tracing::debug;

/// Reads CSV text from a local file instead of the network. Used in test mode.
pub(crate) struct FileCsv {
    path: PathBuf,
}

impl FileCsv {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait::async_trait]
impl CsvSource for FileCsv {
    async fn fetch(&self) -> Result<String> {
        debug!("reading test data from {}", self.path.display());
        utils::read(&self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("donations.csv");
        tokio::fs::write(&path, "a,b\n1,2\n").await.unwrap();
        let source = FileCsv::new(path);
        assert_eq!(source.fetch().await.unwrap(), "a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_file_csv_missing() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileCsv::new(dir.path().join("nope.csv"));
        assert!(source.fetch().await.is_err());
    }
}
