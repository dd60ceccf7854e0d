//! Configuration from environment variables (a `.env` file is honoured).
//!
//! Provider credentials are optional here: a missing completion key surfaces as
//! `MissingApiKey` when a call needs it, and an image provider without a key is
//! skipped by the resolution chain.

use dotenv::dotenv;
use std::env;
use std::time::Duration;

use crate::api_connection::endpoints::{
    DEFAULT_TEXT_COMPLETION_URL, DEFAULT_TEXT_MODEL, DEFAULT_VISION_COMPLETION_URL,
    DEFAULT_VISION_MODEL,
};
use crate::api_connection::GenerationOptions;

pub const TEXT_API_KEY_ENV_VAR: &str = "GROQ_API_KEY";
pub const VISION_API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

pub const DEFAULT_UNSPLASH_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_PEXELS_URL: &str = "https://api.pexels.com";
pub const DEFAULT_REDIRECT_URL: &str = "https://source.unsplash.com";

pub const DEFAULT_IMAGE_TIMEOUT_MS: u64 = 5000;
const MIN_IMAGE_TIMEOUT_MS: u64 = 4000;
const MAX_IMAGE_TIMEOUT_MS: u64 = 6000;

/// Endpoint, credential and default model for one completion backend.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key_var: &'static str,
    pub api_key: Option<String>,
    pub url: String,
    pub model: String,
}

impl ProviderSettings {
    pub fn new(
        api_key_var: &'static str,
        api_key: Option<String>,
        url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key_var,
            api_key,
            url: url.into(),
            model: model.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageSettings {
    pub unsplash_key: Option<String>,
    pub unsplash_url: String,
    pub pexels_key: Option<String>,
    pub pexels_url: String,
    pub redirect_fallback: bool,
    pub redirect_url: String,
    pub timeout: Duration,
    /// A refresh request starts the chain from the second provider.
    pub refresh_rotates: bool,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            unsplash_key: None,
            unsplash_url: DEFAULT_UNSPLASH_URL.to_string(),
            pexels_key: None,
            pexels_url: DEFAULT_PEXELS_URL.to_string(),
            redirect_fallback: false,
            redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_IMAGE_TIMEOUT_MS),
            refresh_rotates: true,
        }
    }
}

/// Token budget, temperature and deadline for each generation task.
#[derive(Debug, Clone)]
pub struct TaskProfiles {
    pub recipe: GenerationOptions,
    pub recipe_list: GenerationOptions,
    pub vision_extract: GenerationOptions,
    pub vision_recipes: GenerationOptions,
    pub nutrition: GenerationOptions,
    pub substitution: GenerationOptions,
    pub meal_plan: GenerationOptions,
    pub chat: GenerationOptions,
}

impl Default for TaskProfiles {
    fn default() -> Self {
        Self {
            recipe: GenerationOptions::new(2048, 0.8, 30),
            recipe_list: GenerationOptions::new(6000, 0.8, 45),
            vision_extract: GenerationOptions::new(200, 0.1, 20),
            vision_recipes: GenerationOptions::new(6000, 0.8, 35),
            nutrition: GenerationOptions::new(1500, 0.2, 25),
            substitution: GenerationOptions::new(1500, 0.5, 25),
            meal_plan: GenerationOptions::new(6000, 0.7, 45),
            chat: GenerationOptions::new(2048, 0.8, 30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub text: ProviderSettings,
    pub vision: ProviderSettings,
    pub images: ImageSettings,
    pub tasks: TaskProfiles,
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn flag(name: &str, default: bool) -> bool {
    var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

/// Per-provider deadline, kept inside the 4-6s window.
pub fn image_timeout(ms: Option<u64>) -> Duration {
    let ms = ms
        .unwrap_or(DEFAULT_IMAGE_TIMEOUT_MS)
        .clamp(MIN_IMAGE_TIMEOUT_MS, MAX_IMAGE_TIMEOUT_MS);
    Duration::from_millis(ms)
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv().ok();

        let text = ProviderSettings::new(
            TEXT_API_KEY_ENV_VAR,
            var(TEXT_API_KEY_ENV_VAR),
            var("TEXT_COMPLETION_URL").unwrap_or_else(|| DEFAULT_TEXT_COMPLETION_URL.to_string()),
            var("TEXT_COMPLETION_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
        );
        let vision = ProviderSettings::new(
            VISION_API_KEY_ENV_VAR,
            var(VISION_API_KEY_ENV_VAR),
            var("VISION_COMPLETION_URL")
                .unwrap_or_else(|| DEFAULT_VISION_COMPLETION_URL.to_string()),
            var("VISION_COMPLETION_MODEL").unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
        );

        let images = ImageSettings {
            unsplash_key: var("UNSPLASH_ACCESS_KEY"),
            unsplash_url: var("UNSPLASH_API_URL").unwrap_or_else(|| DEFAULT_UNSPLASH_URL.to_string()),
            pexels_key: var("PEXELS_API_KEY"),
            pexels_url: var("PEXELS_API_URL").unwrap_or_else(|| DEFAULT_PEXELS_URL.to_string()),
            redirect_fallback: flag("IMAGE_REDIRECT_FALLBACK", false),
            redirect_url: var("IMAGE_REDIRECT_URL").unwrap_or_else(|| DEFAULT_REDIRECT_URL.to_string()),
            timeout: image_timeout(var("IMAGE_TIMEOUT_MS").and_then(|v| v.parse().ok())),
            refresh_rotates: flag("IMAGE_REFRESH_ROTATE", true),
        };

        Self {
            text,
            vision,
            images,
            tasks: TaskProfiles::default(),
        }
    }
}
