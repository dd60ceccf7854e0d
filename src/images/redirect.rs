use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Url};

use super::{ImageProvider, ImageSearchError};

/// Unauthenticated last resort: probe a query-based redirect endpoint with HEAD
/// and keep the URL it lands on when that is a photo.
pub struct RedirectProbeProvider {
    client: Client,
    base_url: String,
    enabled: bool,
}

impl RedirectProbeProvider {
    pub fn new(client: Client, base_url: String, enabled: bool) -> Self {
        Self {
            client,
            base_url,
            enabled,
        }
    }

    fn probe_url(&self, query: &str) -> Result<Url, ImageSearchError> {
        let mut url = Url::parse(&format!("{}/featured/", self.base_url.trim_end_matches('/')))
            .map_err(|e| ImageSearchError::InvalidUrl(e.to_string()))?;
        url.set_query(Some(&query.split_whitespace().collect::<Vec<_>>().join(",")));
        Ok(url)
    }
}

/// The probe must have been redirected, and land on an image or a photo path.
fn is_photo(requested: &Url, landed: &Url, content_type: Option<&str>) -> bool {
    if landed == requested {
        return false;
    }
    content_type.is_some_and(|ct| ct.starts_with("image/")) || landed.path().contains("photo")
}

#[async_trait]
impl ImageProvider for RedirectProbeProvider {
    fn name(&self) -> &'static str {
        "redirect-probe"
    }

    fn is_configured(&self) -> bool {
        self.enabled
    }

    async fn search(&self, query: &str) -> Result<Option<String>, ImageSearchError> {
        let url = self.probe_url(query)?;
        let response = self.client.head(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ImageSearchError::Status(response.status()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let landed = response.url();
        Ok(is_photo(&url, landed, content_type).then(|| landed.to_string()))
    }
}
