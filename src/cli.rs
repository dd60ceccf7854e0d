use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::orchestrator::{
    ChatRequest, ChatTurn, Generator, MealPlanRequest, NutritionRequest, RecipeQuery, SubstitutionRequest,
    VisionRequest,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate recipes, nutrition reports and meal plans", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate one recipe from a free-text request
    Recipe {
        query: String,
        #[arg(short, long)]
        servings: Option<u32>,
    },
    /// Generate ten varied recipes
    Recipes {
        query: String,
        #[arg(short, long)]
        servings: Option<u32>,
    },
    /// Detect ingredients in a photo and suggest recipes using them
    Vision {
        /// Path to a JPEG, PNG or WebP image
        image: PathBuf,
        #[arg(short, long)]
        mime_type: Option<String>,
        #[arg(short, long)]
        servings: Option<u32>,
    },
    /// Nutritional analysis of a recipe
    Nutrition {
        #[arg(short, long, default_value = "")]
        title: String,
        /// Comma-separated ingredient list
        #[arg(short, long, value_delimiter = ',', required = true)]
        ingredients: Vec<String>,
        #[arg(short, long)]
        servings: Option<u32>,
    },
    /// Suggest substitutes for an ingredient
    Substitute {
        ingredient: String,
        #[arg(short, long)]
        context: Option<String>,
        #[arg(short, long)]
        diet: Option<String>,
    },
    /// Seven-day meal plan
    MealPlan {
        #[arg(short, long)]
        servings: Option<u32>,
        #[arg(short, long)]
        diet: Option<String>,
        #[arg(short, long)]
        budget: Option<String>,
        #[arg(short, long)]
        preferences: Option<String>,
    },
    /// Talk to the cooking assistant; messages alternate user/assistant, starting with the user
    Chat {
        #[arg(required = true)]
        messages: Vec<String>,
        #[arg(long)]
        system: Option<String>,
    },
    /// Find a photo for a dish title through the image provider chain
    Image { title: String },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Reads an image file into a base64 vision request.
pub async fn read_image(path: &Path, mime_type: Option<String>) -> Result<VisionRequest> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Failed to read image file '{}'", path.display()))?;
    let mime_type = mime_type.unwrap_or_else(|| mime_type_for(path).to_string());
    Ok(VisionRequest::new(STANDARD.encode(bytes), mime_type))
}

fn chat_request(messages: Vec<String>, system: Option<String>) -> ChatRequest {
    ChatRequest {
        system_prompt: system,
        messages: messages
            .into_iter()
            .enumerate()
            .map(|(i, content)| ChatTurn {
                content,
                is_user: i % 2 == 0,
            })
            .collect(),
    }
}

/// Runs one command and returns the JSON payload it produced.
///
/// Generation failures come back as `GenerationError` inside the `anyhow` chain.
pub async fn execute(generator: &Generator, command: Command) -> Result<Value> {
    let payload = match command {
        Command::Recipe { query, servings } => {
            serde_json::to_value(generator.generate_recipe(&RecipeQuery { query, servings }).await?)?
        }
        Command::Recipes { query, servings } => {
            serde_json::to_value(generator.generate_recipes(&RecipeQuery { query, servings }).await?)?
        }
        Command::Vision {
            image,
            mime_type,
            servings,
        } => {
            let mut request = read_image(&image, mime_type).await?;
            request.servings = servings;
            serde_json::to_value(generator.analyze_photo(&request).await?)?
        }
        Command::Nutrition {
            title,
            ingredients,
            servings,
        } => {
            let request = NutritionRequest {
                title,
                ingredients,
                servings,
            };
            serde_json::to_value(generator.analyze_nutrition(&request).await?)?
        }
        Command::Substitute {
            ingredient,
            context,
            diet,
        } => {
            let request = SubstitutionRequest {
                ingredient,
                context,
                diet,
            };
            serde_json::to_value(generator.suggest_substitutes(&request).await?)?
        }
        Command::MealPlan {
            servings,
            diet,
            budget,
            preferences,
        } => {
            let request = MealPlanRequest {
                preferences,
                servings,
                budget,
                diet,
            };
            serde_json::to_value(generator.plan_meals(&request).await?)?
        }
        Command::Chat { messages, system } => {
            serde_json::to_value(generator.chat(&chat_request(messages, system)).await?)?
        }
        Command::Image { title } => {
            let image_url = generator.images().resolve(&title).await;
            json!({ "title": title, "imageUrl": image_url })
        }
    };
    Ok(payload)
}
