use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{ImageProvider, ImageSearchError};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    #[serde(default)]
    large: Option<String>,
    #[serde(default)]
    medium: Option<String>,
}

pub struct PexelsProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl PexelsProvider {
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl ImageProvider for PexelsProvider {
    fn name(&self) -> &'static str {
        "pexels"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str) -> Result<Option<String>, ImageSearchError> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(None);
        };
        let response = self
            .client
            .get(format!("{}/v1/search", self.base_url.trim_end_matches('/')))
            .header("Authorization", key)
            .query(&[("query", query), ("per_page", "1"), ("orientation", "landscape")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ImageSearchError::Status(response.status()));
        }
        let body: SearchResponse = response.json().await?;
        Ok(body
            .photos
            .into_iter()
            .next()
            .and_then(|photo| photo.src.large.or(photo.src.medium))
            .filter(|url| !url.is_empty()))
    }
}
