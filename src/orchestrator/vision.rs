//! Photo -> ingredients -> recipes.
//!
//! Stage one asks the vision model for a comma-separated ingredient list.
//! When nothing edible is recognised the run ends there with an empty success;
//! otherwise the list seeds a five-recipe text generation.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::recipe::ListJob;
use super::{prompts, servings_or, Generator, Run, Stage, Task};
use crate::api_connection::{CompletionRequest, InlineMedia, Turn};
use crate::error::GenerationError;
use crate::models::recipe::DEFAULT_SERVINGS;
use crate::models::{IngredientSet, VisionRecipe};

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";
pub const NOTHING_DETECTED_MESSAGE: &str = "No food ingredients detected in this image.";

fn default_mime_type() -> String {
    DEFAULT_MIME_TYPE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionRequest {
    /// Base64 image bytes, optionally as a `data:` URL.
    pub image: String,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    #[serde(default)]
    pub servings: Option<u32>,
}

impl VisionRequest {
    pub fn new(image: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            mime_type: mime_type.into(),
            servings: None,
        }
    }

    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = Some(servings);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionResponse {
    pub ingredients: Vec<String>,
    pub recipes: Vec<VisionRecipe>,
    pub message: String,
}

impl VisionResponse {
    fn nothing_detected() -> Self {
        Self {
            ingredients: Vec::new(),
            recipes: Vec::new(),
            message: NOTHING_DETECTED_MESSAGE.to_string(),
        }
    }
}

/// Checks the payload is base64 and returns it as inline media.
///
/// A `data:<mime>;base64,` prefix is stripped and its mime type wins over the
/// declared one.
pub fn inline_image(image: &str, mime_type: &str) -> Result<InlineMedia, GenerationError> {
    let image = image.trim();
    if image.is_empty() {
        return Err(GenerationError::invalid("image is required"));
    }

    let (mime_type, data) = match image.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((header, data)) => {
            let mime = header.trim_end_matches(";base64");
            let mime = if mime.is_empty() { mime_type } else { mime };
            (mime.to_string(), data)
        }
        None => (mime_type.to_string(), image),
    };

    let data: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(&data)
        .map_err(|e| GenerationError::invalid(format!("image is not valid base64: {e}")))?;

    let mime_type = if mime_type.trim().is_empty() {
        default_mime_type()
    } else {
        mime_type
    };
    Ok(InlineMedia { mime_type, data })
}

impl Generator {
    pub async fn analyze_photo(&self, input: &VisionRequest) -> Result<VisionResponse, GenerationError> {
        let media = inline_image(&input.image, &input.mime_type)?;
        let servings = servings_or(input.servings, DEFAULT_SERVINGS);

        let mut run = Run::start(Task::VisionRecipes);
        let extract = &self.profiles.vision_extract;
        let request = CompletionRequest::vision(
            Turn::user_with_media(prompts::VISION_EXTRACT_INSTRUCTION, media),
            extract,
        );
        let detected = self.complete(&mut run, request, extract).await?;

        let ingredients = IngredientSet::from_text(detected.trim());
        if prompts::reports_no_ingredients(&detected) || ingredients.is_empty() {
            info!("no ingredients detected, skipping recipe generation");
            run.finish();
            return Ok(VisionResponse::nothing_detected());
        }

        run.enter(Stage::Chaining);
        let job = ListJob {
            system: prompts::vision_recipes_system(servings),
            user: prompts::vision_recipes_user(&ingredients.joined()),
            options: &self.profiles.vision_recipes,
            servings,
            expected: prompts::VISION_RECIPE_COUNT,
            id_prefix: "vision",
        };
        let recipes = self.generate_list::<VisionRecipe>(&mut run, job).await?;

        let message = format!(
            "{} ingredients detected, {} recipes generated",
            ingredients.len(),
            recipes.len()
        );
        run.finish();
        Ok(VisionResponse {
            ingredients: ingredients.as_slice().to_vec(),
            recipes,
            message,
        })
    }
}
