//! A thin proxy over the photo metadata store's REST interface.
//!
//! The dashboard's gallery photos live in a hosted Postgres exposed through a PostgREST
//! endpoint. The browser never talks to it directly. We hold the API key server-side and
//! forward a small, fixed set of operations.

use crate::Result;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

const TABLE_PATH: &str = "/rest/v1/gallery_photos";

/// One gallery photo record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub display_order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

pub struct PhotoStore {
    base_url: String,
    key: String,
    client: reqwest::Client,
}

impl PhotoStore {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            key: key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", &self.key))
    }

    /// All photos, ordered the way the gallery displays them.
    pub async fn list(&self) -> Result<Vec<Photo>> {
        let url = format!(
            "{}{}?select=*&order=display_order.asc,created_at.desc",
            self.base_url, TABLE_PATH
        );
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .context("Unable to reach the photo store")?;
        let status = response.status();
        if !status.is_success() {
            bail!("Got {} from the photo store while listing photos", status);
        }
        response
            .json()
            .await
            .context("Unable to parse the photo list response")
    }

    /// Inserts a photo and returns the stored record, id and all.
    pub async fn add(&self, photo: &Photo) -> Result<Photo> {
        let url = format!("{}{}", self.base_url, TABLE_PATH);
        let response = self
            .request(reqwest::Method::POST, url)
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(photo)
            .send()
            .await
            .context("Unable to reach the photo store")?;
        let status = response.status();
        if !status.is_success() {
            bail!("Got {} from the photo store while adding a photo", status);
        }
        let mut inserted: Vec<Photo> = response
            .json()
            .await
            .context("Unable to parse the photo insert response")?;
        if inserted.is_empty() {
            bail!("The photo store did not return the inserted photo");
        }
        Ok(inserted.remove(0))
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let url = format!("{}{}?id=eq.{}", self.base_url, TABLE_PATH, id);
        let response = self
            .request(reqwest::Method::DELETE, url)
            .send()
            .await
            .context("Unable to reach the photo store")?;
        let status = response.status();
        if !status.is_success() {
            bail!("Got {} from the photo store while deleting photo {}", status, id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_serialization_skips_absent_fields() {
        let photo = Photo {
            id: None,
            url: "https://example.com/p.jpg".to_string(),
            caption: None,
            display_order: 3,
            created_at: None,
        };
        let json = serde_json::to_value(&photo).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("id"));
        assert!(!obj.contains_key("caption"));
        assert_eq!(obj.get("display_order").unwrap().as_i64().unwrap(), 3);
    }

    #[test]
    fn test_photo_deserialization_defaults_display_order() {
        let photo: Photo =
            serde_json::from_str(r#"{"id":1,"url":"https://example.com/p.jpg"}"#).unwrap();
        assert_eq!(photo.display_order, 0);
        assert_eq!(photo.id, Some(1));
    }
}
