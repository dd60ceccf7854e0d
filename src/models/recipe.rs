use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response_parser::{Coerce, Fields};

pub const DEFAULT_TITLE: &str = "untitled";
pub const DEFAULT_CATEGORY: &str = "🍽️ Recipe";
pub const DEFAULT_DURATION_MINUTES: u32 = 30;
pub const DEFAULT_SERVINGS: u32 = 4;

/// Request-scoped defaults for recipe coercion.
#[derive(Debug, Clone, Copy)]
pub struct RecipeContext {
    pub servings: u32,
}

impl Default for RecipeContext {
    fn default() -> Self {
        Self {
            servings: DEFAULT_SERVINGS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub id: String,
    pub title: String,
    pub category: String,
    pub image_url: Option<String>,
    pub duration_minutes: u32,
    pub servings: u32,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

impl Coerce for RecipeDraft {
    type Context = RecipeContext;

    /// `id` and `imageUrl` are never taken from generated text.
    fn coerce(value: &Value, ctx: &RecipeContext) -> Self {
        let fields = Fields::new("recipe", value);
        Self {
            id: String::new(),
            title: fields.string("title", DEFAULT_TITLE),
            category: fields.string("category", DEFAULT_CATEGORY),
            image_url: None,
            duration_minutes: fields.positive_int("durationMinutes", DEFAULT_DURATION_MINUTES),
            servings: fields.positive_int("servings", ctx.servings),
            description: fields.string("description", ""),
            ingredients: fields.strings("ingredients"),
            steps: fields.strings("steps"),
        }
    }
}

/// A recipe proposed from a photo, with the detected ingredients it uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionRecipe {
    #[serde(flatten)]
    pub recipe: RecipeDraft,
    pub used_ingredients: Vec<String>,
}

impl Coerce for VisionRecipe {
    type Context = RecipeContext;

    fn coerce(value: &Value, ctx: &RecipeContext) -> Self {
        Self {
            recipe: RecipeDraft::coerce(value, ctx),
            used_ingredients: Fields::new("recipe", value).strings("usedIngredients"),
        }
    }
}

/// Something the image chain can illustrate.
pub trait Illustrated {
    fn image_subject(&self) -> &str;
    fn set_image_url(&mut self, url: Option<String>);
}

impl Illustrated for RecipeDraft {
    fn image_subject(&self) -> &str {
        &self.title
    }

    fn set_image_url(&mut self, url: Option<String>) {
        self.image_url = url;
    }
}

impl Illustrated for VisionRecipe {
    fn image_subject(&self) -> &str {
        self.recipe.image_subject()
    }

    fn set_image_url(&mut self, url: Option<String>) {
        self.recipe.set_image_url(url);
    }
}

/// Ingredient names split from comma-separated text: trimmed, non-empty, first occurrence kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientSet(Vec<String>);

impl IngredientSet {
    pub fn from_text(text: &str) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }
        Self(names)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn joined(&self) -> String {
        self.0.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response_parser::{parse_array, parse_object};
    use serde_json::json;

    #[test]
    fn test_empty_object_is_fully_defaulted() {
        let recipe: RecipeDraft = parse_object("{}", &RecipeContext { servings: 6 }).unwrap();
        assert_eq!(recipe.title, DEFAULT_TITLE);
        assert_eq!(recipe.duration_minutes, 30);
        assert_eq!(recipe.servings, 6);
        assert_eq!(recipe.description, "");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.steps.is_empty());
        assert!(recipe.image_url.is_none());
    }

    #[test]
    fn test_generated_id_and_image_are_ignored() {
        let raw = r#"{"id": "evil", "imageUrl": "http://x/y.jpg", "title": "Tart", "durationMinutes": "45"}"#;
        let recipe: RecipeDraft = parse_object(raw, &RecipeContext::default()).unwrap();
        assert_eq!(recipe.id, "");
        assert!(recipe.image_url.is_none());
        assert_eq!(recipe.duration_minutes, 45);
    }

    #[test]
    fn test_negative_duration_falls_back() {
        let recipe = RecipeDraft::coerce(&json!({"durationMinutes": -5, "servings": 0}), &RecipeContext { servings: 2 });
        assert_eq!(recipe.duration_minutes, 30);
        assert_eq!(recipe.servings, 2);
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let raw = "```json\n[{\"title\":\"A\",\"ingredients\":[\"1 egg\"]},{\"steps\":[\"stir\"]}]\n```";
        let ctx = RecipeContext::default();
        let first: Vec<VisionRecipe> = parse_array(raw, &ctx).unwrap();
        let second: Vec<VisionRecipe> = parse_array(raw, &ctx).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_vision_recipe_serializes_flat() {
        let recipe = VisionRecipe::coerce(&json!({"title": "Omelette", "usedIngredients": ["eggs", 1]}), &RecipeContext::default());
        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["title"], "Omelette");
        assert_eq!(json["usedIngredients"], json!(["eggs"]));
        assert_eq!(json["imageUrl"], Value::Null);
    }

    #[test]
    fn test_ingredient_set_dedupes_exact_matches() {
        let set = IngredientSet::from_text(" chicken, tomatoes ,, garlic, chicken, Chicken ");
        assert_eq!(set.as_slice(), &["chicken", "tomatoes", "garlic", "Chicken"]);
        assert_eq!(set.len(), 4);
        assert!(IngredientSet::from_text(" , ").is_empty());
    }
}
