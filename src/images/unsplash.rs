use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{ImageProvider, ImageSearchError};

/// Results requested per search; the first hit is often a generic stock shot.
pub const UNSPLASH_RESULT_COUNT: u32 = 3;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    #[serde(default)]
    regular: Option<String>,
}

pub struct UnsplashProvider {
    client: Client,
    base_url: String,
    access_key: Option<String>,
}

impl UnsplashProvider {
    pub fn new(client: Client, base_url: String, access_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            access_key,
        }
    }
}

/// Second usable result when there is one, else the first.
fn pick(results: &[Photo]) -> Option<String> {
    let usable: Vec<&String> = results
        .iter()
        .filter_map(|photo| photo.urls.regular.as_ref())
        .filter(|url| !url.is_empty())
        .collect();
    usable.get(1).or_else(|| usable.first()).map(|url| url.to_string())
}

#[async_trait]
impl ImageProvider for UnsplashProvider {
    fn name(&self) -> &'static str {
        "unsplash"
    }

    fn is_configured(&self) -> bool {
        self.access_key.is_some()
    }

    async fn search(&self, query: &str) -> Result<Option<String>, ImageSearchError> {
        let Some(key) = self.access_key.as_deref() else {
            return Ok(None);
        };
        let per_page = UNSPLASH_RESULT_COUNT.to_string();
        let response = self
            .client
            .get(format!("{}/search/photos", self.base_url.trim_end_matches('/')))
            .header("Authorization", format!("Client-ID {key}"))
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", "landscape"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ImageSearchError::Status(response.status()));
        }
        let body: SearchResponse = response.json().await?;
        Ok(pick(&body.results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(url: &str) -> Photo {
        Photo {
            urls: PhotoUrls {
                regular: Some(url.to_string()),
            },
        }
    }

    #[test]
    fn test_prefers_second_result() {
        assert_eq!(pick(&[photo("a"), photo("b"), photo("c")]).as_deref(), Some("b"));
        assert_eq!(pick(&[photo("a")]).as_deref(), Some("a"));
        assert_eq!(pick(&[]), None);
    }

    #[test]
    fn test_skips_results_without_url() {
        let missing = Photo {
            urls: PhotoUrls { regular: None },
        };
        let empty = photo("");
        assert_eq!(pick(&[photo("a"), missing]).as_deref(), Some("a"));
        assert_eq!(pick(&[empty, photo("a"), photo("b")]).as_deref(), Some("b"));
    }
}
