use crate::api::CsvSource;
use crate::Result;
use anyhow::{bail, Context};
use tracing::debug;
use url::Url;

/// Google serves stale or interstitial responses to clients it does not recognize, so we
/// present ourselves as a browser.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

/// Fetches the CSV export of a sheet that has been published to the web.
pub(crate) struct PublishedCsv {
    url: String,
    client: reqwest::Client,
}

impl PublishedCsv {
    pub(crate) fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// The export URL with a cache-busting query parameter appended. Google's CDN caches
    /// published CSVs aggressively and ignores Cache-Control request headers.
    fn busted_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.url)
            .with_context(|| format!("Invalid CSV export URL '{}'", self.url))?;
        let now = chrono::Utc::now().timestamp_millis();
        url.query_pairs_mut().append_pair("t", &now.to_string());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl CsvSource for PublishedCsv {
    async fn fetch(&self) -> Result<String> {
        let url = self.busted_url()?;
        debug!("fetching {}", url);
        let response = self
            .client
            .get(url.clone())
            .header("User-Agent", USER_AGENT)
            .header("Accept", "text/csv")
            .send()
            .await
            .with_context(|| format!("Unable to reach {}", url))?;
        let status = response.status();
        if !status.is_success() {
            bail!(
                "Got {} from {}, make sure the sheet is published to the web as CSV",
                status,
                url
            );
        }
        let text = response
            .text()
            .await
            .with_context(|| format!("Unable to read the response body from {}", url))?;
        if text.trim().is_empty() {
            bail!("Got an empty response from {}", url);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busted_url() {
        let source = PublishedCsv::new(
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv",
        );
        let url = source.busted_url().unwrap();
        assert!(url.query().unwrap().contains("format=csv"));
        assert!(url.query().unwrap().contains("t="));
    }

    #[test]
    fn test_busted_url_invalid() {
        let source = PublishedCsv::new("not a url");
        assert!(source.busted_url().is_err());
    }
}
