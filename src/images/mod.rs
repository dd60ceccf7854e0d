//! Image Resolution Chain.
//!
//! Providers are tried in a fixed order; a provider is skipped when it has no
//! credential, and any failure (timeout, bad status, empty result) falls through
//! to the next one. A missing image is a normal outcome, never an error.

pub mod batch;
pub mod pexels;
pub mod redirect;
pub mod unsplash;

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ImageSettings;

pub use batch::{enrich_all, EnrichmentSummary, CHUNK_SIZE};
pub use pexels::PexelsProvider;
pub use redirect::RedirectProbeProvider;
pub use unsplash::UnsplashProvider;

/// Appended to every search so results lean towards plated food.
pub const QUERY_QUALIFIER: &str = "food dish";

#[derive(Debug, Error)]
pub enum ImageSearchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid search url: {0}")]
    InvalidUrl(String),
}

/// One image-search strategy in the chain.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_configured(&self) -> bool;

    /// `Ok(None)` when the provider answered but had nothing usable.
    async fn search(&self, query: &str) -> Result<Option<String>, ImageSearchError>;
}

/// Drops emoji and punctuation from a title and adds the food qualifier.
pub fn search_query(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.is_empty() {
        QUERY_QUALIFIER.to_string()
    } else {
        format!("{} {}", words.join(" "), QUERY_QUALIFIER)
    }
}

#[derive(Clone)]
pub struct ImageResolver {
    providers: Vec<Arc<dyn ImageProvider>>,
    timeout: Duration,
}

impl ImageResolver {
    pub fn new(providers: Vec<Arc<dyn ImageProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Unsplash, then Pexels, then the optional redirect probe.
    pub fn from_settings(settings: &ImageSettings) -> Self {
        let client = Client::new();
        let providers: Vec<Arc<dyn ImageProvider>> = vec![
            Arc::new(UnsplashProvider::new(
                client.clone(),
                settings.unsplash_url.clone(),
                settings.unsplash_key.clone(),
            )),
            Arc::new(PexelsProvider::new(
                client.clone(),
                settings.pexels_url.clone(),
                settings.pexels_key.clone(),
            )),
            Arc::new(RedirectProbeProvider::new(
                client,
                settings.redirect_url.clone(),
                settings.redirect_fallback,
            )),
        ];
        Self::new(providers, settings.timeout)
    }

    /// A chain with no providers; every lookup yields `None`.
    pub fn disabled() -> Self {
        Self::new(Vec::new(), Duration::from_secs(0))
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Same providers, starting `by` positions later and wrapping around.
    pub fn rotated(&self, by: usize) -> Self {
        let mut providers = self.providers.clone();
        if !providers.is_empty() {
            let by = by % providers.len();
            providers.rotate_left(by);
        }
        Self::new(providers, self.timeout)
    }

    pub async fn resolve(&self, title: &str) -> Option<String> {
        let query = search_query(title);
        for provider in &self.providers {
            if !provider.is_configured() {
                continue;
            }
            match tokio::time::timeout(self.timeout, provider.search(&query)).await {
                Ok(Ok(Some(url))) => {
                    debug!(provider = provider.name(), %query, %url, "image resolved");
                    return Some(url);
                }
                Ok(Ok(None)) => {
                    debug!(provider = provider.name(), %query, "no usable image");
                }
                Ok(Err(e)) => {
                    warn!(provider = provider.name(), %query, error = %e, "image search failed");
                }
                Err(_) => {
                    warn!(provider = provider.name(), %query, "image search timed out");
                }
            }
        }
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) struct StaticProvider {
        pub name: &'static str,
        pub configured: bool,
        pub answer: Option<&'static str>,
        pub fail: bool,
        pub delay: Duration,
        pub calls: AtomicUsize,
    }

    impl StaticProvider {
        pub fn answering(name: &'static str, answer: Option<&'static str>) -> Self {
            Self {
                name,
                configured: true,
                answer,
                fail: false,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ImageProvider for StaticProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn search(&self, _query: &str) -> Result<Option<String>, ImageSearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(ImageSearchError::Status(reqwest::StatusCode::TOO_MANY_REQUESTS));
            }
            Ok(self.answer.map(str::to_string))
        }
    }

    #[test]
    fn test_search_query_strips_emoji_and_punctuation() {
        assert_eq!(search_query("🍝 Pasta, alla Norma!"), "Pasta alla Norma food dish");
        assert_eq!(search_query("Crème brûlée"), "Crème brûlée food dish");
        assert_eq!(search_query("🍲🍲"), "food dish");
    }

    #[tokio::test]
    async fn test_unconfigured_providers_are_skipped() {
        let mut first = StaticProvider::answering("first", Some("http://first"));
        first.configured = false;
        let first = Arc::new(first);
        let second = Arc::new(StaticProvider::answering("second", Some("http://second")));
        let providers: Vec<Arc<dyn ImageProvider>> = vec![first.clone(), second.clone()];
        let resolver = ImageResolver::new(providers, Duration::from_secs(1));

        assert_eq!(resolver.resolve("soup").await.as_deref(), Some("http://second"));
        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_fall_through() {
        let mut failing = StaticProvider::answering("failing", None);
        failing.fail = true;
        let mut slow = StaticProvider::answering("slow", Some("http://slow"));
        slow.delay = Duration::from_millis(500);
        let empty = StaticProvider::answering("empty", None);
        let last = StaticProvider::answering("last", Some("http://last"));

        let providers: Vec<Arc<dyn ImageProvider>> =
            vec![Arc::new(failing), Arc::new(slow), Arc::new(empty), Arc::new(last)];
        let resolver = ImageResolver::new(providers, Duration::from_millis(50));
        assert_eq!(resolver.resolve("soup").await.as_deref(), Some("http://last"));
    }

    #[tokio::test]
    async fn test_exhausted_chain_yields_none() {
        let providers: Vec<Arc<dyn ImageProvider>> =
            vec![Arc::new(StaticProvider::answering("empty", None))];
        let resolver = ImageResolver::new(providers, Duration::from_secs(1));
        assert!(resolver.resolve("soup").await.is_none());
        assert!(ImageResolver::disabled().resolve("soup").await.is_none());
    }

    #[test]
    fn test_rotation_wraps() {
        let providers: Vec<Arc<dyn ImageProvider>> = vec![
            Arc::new(StaticProvider::answering("a", None)),
            Arc::new(StaticProvider::answering("b", None)),
            Arc::new(StaticProvider::answering("c", None)),
        ];
        let resolver = ImageResolver::new(providers, Duration::from_secs(1));
        assert_eq!(resolver.rotated(1).provider_names(), vec!["b", "c", "a"]);
        assert_eq!(resolver.rotated(4).provider_names(), vec!["b", "c", "a"]);
        assert!(ImageResolver::disabled().rotated(1).provider_names().is_empty());
    }
}
