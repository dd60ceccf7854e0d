use async_trait::async_trait;
use recipe_genai::api_connection::{FakeCompletionClient, ProviderKind, Role};
use recipe_genai::error::{GenerationError, PipelineFailure};
use recipe_genai::images::{ImageProvider, ImageResolver, ImageSearchError};
use recipe_genai::models::ScoreColor;
use recipe_genai::orchestrator::{
    ChatRequest, ChatTurn, Generator, MealPlanRequest, NutritionRequest, RecipeQuery, Stage,
    SubstitutionRequest, VisionRequest,
};
use recipe_genai::response_parser::ParseError;
use recipe_genai::store::{MemoryRecipeStore, RecipeStore, StoredRecipe};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Answers every query with a URL derived from the provider name and query.
struct NamedProvider {
    name: &'static str,
    answers: bool,
}

#[async_trait]
impl ImageProvider for NamedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn search(&self, query: &str) -> Result<Option<String>, ImageSearchError> {
        Ok(self
            .answers
            .then(|| format!("https://{}.test/{}", self.name, query.replace(' ', "-"))))
    }
}

fn images(answers: bool) -> ImageResolver {
    let providers: Vec<Arc<dyn ImageProvider>> = vec![
        Arc::new(NamedProvider { name: "primary", answers }),
        Arc::new(NamedProvider { name: "secondary", answers }),
    ];
    ImageResolver::new(providers, Duration::from_secs(1))
}

fn generator(fake: &Arc<FakeCompletionClient>) -> Generator {
    Generator::new(fake.clone(), images(true))
}

fn recipe_json(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "category": "🍝 Pasta",
        "durationMinutes": 20,
        "description": "Quick and good.",
        "ingredients": ["200g spaghetti", "2 eggs", "50g pecorino", "100g guanciale", "pepper"],
        "steps": ["Boil", "Fry", "Whisk", "Toss", "Serve"]
    })
}

fn recipe_array(count: usize) -> String {
    let items: Vec<_> = (0..count).map(|i| recipe_json(&format!("Dish {i}"))).collect();
    format!("Here you go:\n```json\n{}\n```", serde_json::to_string(&items).unwrap())
}

#[tokio::test]
async fn test_single_recipe_for_pasta() {
    let raw = r#"```json
{"title": "Pasta Carbonara", "durationMinutes": "25", "ingredients": ["200g spaghetti", 3, "2 eggs"], "steps": ["Boil", "Mix"]}
```"#;
    let fake = Arc::new(FakeCompletionClient::new().respond(ProviderKind::Text, "generate one recipe", raw));
    let generator = generator(&fake);

    let response = generator
        .generate_recipe(&RecipeQuery {
            query: "pasta".to_string(),
            servings: Some(2),
        })
        .await
        .unwrap();

    let recipe = response.recipe;
    assert_eq!(recipe.servings, 2);
    assert_eq!(recipe.duration_minutes, 25);
    assert_eq!(recipe.ingredients, vec!["200g spaghetti", "2 eggs"]);
    assert!(recipe.id.starts_with("gen_"));
    assert_eq!(
        recipe.image_url.as_deref(),
        Some("https://primary.test/Pasta-Carbonara-food-dish")
    );

    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].system_instruction.contains("for 2 servings"));
    assert_eq!(calls[0].turns[0].content.text(), "pasta");
    assert_eq!(calls[0].max_output_tokens, 2048);
}

#[tokio::test]
async fn test_empty_object_is_fully_defaulted() {
    let fake = Arc::new(FakeCompletionClient::new().respond(ProviderKind::Text, "generate one recipe", "{}"));
    let generator = Generator::new(fake.clone(), ImageResolver::disabled());

    let recipe = generator
        .generate_recipe(&RecipeQuery {
            query: "anything".to_string(),
            servings: None,
        })
        .await
        .unwrap()
        .recipe;
    assert_eq!(recipe.title, "untitled");
    assert_eq!(recipe.duration_minutes, 30);
    assert_eq!(recipe.servings, 4);
    assert!(recipe.ingredients.is_empty());
    assert!(recipe.steps.is_empty());
    assert_eq!(recipe.image_url, None);
}

#[tokio::test]
async fn test_blank_query_is_rejected_without_calls() {
    let fake = Arc::new(FakeCompletionClient::new());
    let generator = generator(&fake);

    let err = generator
        .generate_recipe(&RecipeQuery {
            query: "   ".to_string(),
            servings: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_recipe_list_has_ten_distinct_ids() {
    let fake = Arc::new(FakeCompletionClient::new().respond(
        ProviderKind::Text,
        "exactly 10 varied recipes",
        &recipe_array(12),
    ));
    let generator = generator(&fake);

    let recipes = generator
        .generate_recipes(&RecipeQuery {
            query: "italian".to_string(),
            servings: None,
        })
        .await
        .unwrap()
        .recipes;

    assert_eq!(recipes.len(), 10);
    let ids: HashSet<_> = recipes.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), 10);
    assert!(recipes.iter().all(|r| r.id.starts_with("gen_")));
    assert_eq!(recipes[9].title, "Dish 9");
    assert!(recipes.iter().all(|r| r.image_url.is_some()));
}

#[tokio::test]
async fn test_short_recipe_list_is_returned_as_is() {
    let fake = Arc::new(FakeCompletionClient::new().respond(
        ProviderKind::Text,
        "exactly 10 varied recipes",
        &recipe_array(3),
    ));
    let generator = Generator::new(fake.clone(), images(false));

    let recipes = generator
        .generate_recipes(&RecipeQuery {
            query: "soups".to_string(),
            servings: Some(6),
        })
        .await
        .unwrap()
        .recipes;
    assert_eq!(recipes.len(), 3);
    assert!(recipes.iter().all(|r| r.servings == 6));
    assert!(recipes.iter().all(|r| r.image_url.is_none()));
}

#[tokio::test]
async fn test_vision_short_circuits_without_text_call() {
    let fake = Arc::new(FakeCompletionClient::new().respond(
        ProviderKind::Vision,
        "analyse this photo",
        "No ingredients detected.",
    ));
    let generator = generator(&fake);

    let response = generator
        .analyze_photo(&VisionRequest::new("aGVsbG8=", "image/jpeg"))
        .await
        .unwrap();

    assert!(response.ingredients.is_empty());
    assert!(response.recipes.is_empty());
    assert_eq!(response.message, "No food ingredients detected in this image.");
    assert_eq!(fake.call_count(ProviderKind::Vision), 1);
    assert_eq!(fake.call_count(ProviderKind::Text), 0);
}

#[tokio::test]
async fn test_vision_chains_into_recipes() {
    let recipes = json!([
        {"title": "Spinach omelette", "ingredients": ["3 eggs", "spinach"], "usedIngredients": ["eggs", "spinach"]},
        {"title": "Feta salad", "usedIngredients": ["feta", 42]}
    ]);
    let fake = Arc::new(
        FakeCompletionClient::new()
            .respond(ProviderKind::Vision, "analyse this photo", "eggs, spinach, feta, eggs\n")
            .respond(ProviderKind::Text, "available ingredients", &recipes.to_string()),
    );
    let generator = generator(&fake);

    let response = generator
        .analyze_photo(&VisionRequest::new("data:image/png;base64,aGVsbG8=", "image/jpeg").with_servings(2))
        .await
        .unwrap();

    assert_eq!(response.ingredients, vec!["eggs", "spinach", "feta"]);
    assert_eq!(response.recipes.len(), 2);
    assert_eq!(response.message, "3 ingredients detected, 2 recipes generated");
    assert_eq!(response.recipes[1].used_ingredients, vec!["feta"]);
    assert!(response.recipes.iter().all(|r| r.recipe.id.starts_with("vision_")));
    assert!(response.recipes.iter().all(|r| r.recipe.servings == 2));

    let calls = fake.calls();
    assert_eq!(calls[0].provider_kind, ProviderKind::Vision);
    assert_eq!(calls[0].max_output_tokens, 200);
    assert_eq!(calls[1].provider_kind, ProviderKind::Text);
    assert!(calls[1].turns[0].content.text().contains("eggs, spinach, feta"));
}

#[tokio::test]
async fn test_vision_rejects_invalid_image() {
    let fake = Arc::new(FakeCompletionClient::new());
    let generator = generator(&fake);

    let err = generator
        .analyze_photo(&VisionRequest::new("%%%not-base64%%%", "image/jpeg"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::InvalidInput(_)));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_nutrition_score_is_clamped() {
    let raw = r#"Sure! {"perPortion": {"calories": "420", "proteins": 18}, "score": 12, "scoreColor": "purple", "glycemicIndex": "Low"}"#;
    let fake = Arc::new(FakeCompletionClient::new().respond(ProviderKind::Text, "expert nutritionist", raw));
    let generator = generator(&fake);

    let nutrition = generator
        .analyze_nutrition(&NutritionRequest {
            title: "Omelette".to_string(),
            ingredients: vec!["3 eggs".to_string(), "butter".to_string()],
            servings: None,
        })
        .await
        .unwrap()
        .nutrition;

    assert_eq!(nutrition.score, 10);
    assert_eq!(nutrition.score_color, ScoreColor::Green);
    assert_eq!(nutrition.per_portion.calories, 420.0);
    assert_eq!(nutrition.per_recipe.calories, 0.0);
    assert!(fake.calls()[0].turns[0].content.text().contains("3 eggs, butter"));
}

#[tokio::test]
async fn test_nutrition_requires_ingredients() {
    let fake = Arc::new(FakeCompletionClient::new());
    let generator = generator(&fake);

    let err = generator
        .analyze_nutrition(&NutritionRequest {
            title: "Air".to_string(),
            ingredients: vec![" ".to_string()],
            servings: Some(1),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_substitution_keeps_five_named_substitutes() {
    let substitutes: Vec<_> = (0..7)
        .map(|i| {
            if i == 0 {
                json!({"ratio": "1:1"})
            } else {
                json!({"name": format!("Option {i}")})
            }
        })
        .collect();
    let raw = json!({"reason": "dairy", "substitutes": substitutes}).to_string();
    let fake = Arc::new(FakeCompletionClient::new().respond(ProviderKind::Text, "ingredient substitutions", &raw));
    let generator = generator(&fake);

    let result = generator
        .suggest_substitutes(&SubstitutionRequest {
            ingredient: "butter".to_string(),
            context: Some("shortbread".to_string()),
            diet: None,
        })
        .await
        .unwrap()
        .result;

    assert_eq!(result.ingredient, "butter");
    assert_eq!(result.substitutes.len(), 5);
    assert_eq!(result.substitutes[0].name, "Option 1");
    assert_eq!(result.substitutes[0].ratio, "same quantity");
    assert!(fake.calls()[0].turns[0].content.text().contains("Context: shortbread"));
}

#[tokio::test]
async fn test_substitution_requires_ingredient() {
    let fake = Arc::new(FakeCompletionClient::new());
    let err = generator(&fake)
        .suggest_substitutes(&SubstitutionRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_meal_plan_defaults() {
    let raw = json!({
        "days": [
            {"meals": {"breakfast": {"name": "Oats", "calories": 300}, "dinner": {"name": "Curry", "calories": 700}}},
            {"day": "Tuesday", "totalCalories": 2000}
        ]
    })
    .to_string();
    let fake = Arc::new(FakeCompletionClient::new().respond(ProviderKind::Text, "7-day meal plan", &raw));
    let generator = generator(&fake);

    let plan = generator.plan_meals(&MealPlanRequest::default()).await.unwrap().plan;

    assert_eq!(plan.days[0].day, "Monday");
    assert_eq!(plan.days[0].total_calories, 1000);
    assert_eq!(plan.days[1].total_calories, 2000);
    assert_eq!(plan.week_summary.avg_calories, 1500);
    assert!(fake.calls()[0].turns[0].content.text().contains("People: 2"));
}

#[tokio::test]
async fn test_chat_maps_roles_and_returns_raw_reply() {
    let fake = Arc::new(FakeCompletionClient::new().respond(
        ProviderKind::Text,
        "pastry chef",
        "Use cold butter {not json}",
    ));
    let generator = generator(&fake);

    let reply = generator
        .chat(&ChatRequest {
            system_prompt: Some("You are a pastry chef.".to_string()),
            messages: vec![
                ChatTurn {
                    content: "How do I make pie crust?".to_string(),
                    is_user: true,
                },
                ChatTurn {
                    content: "Flour, butter, water.".to_string(),
                    is_user: false,
                },
                ChatTurn {
                    content: "Any tips?".to_string(),
                    is_user: true,
                },
            ],
        })
        .await
        .unwrap();
    assert_eq!(reply.reply, "Use cold butter {not json}");

    let roles: Vec<Role> = fake.calls()[0].turns.iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
}

#[tokio::test]
async fn test_chat_requires_messages() {
    let fake = Arc::new(FakeCompletionClient::new());
    let err = generator(&fake).chat(&ChatRequest::default()).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_provider_failure_is_a_server_error() {
    let fake = Arc::new(FakeCompletionClient::new().fail(ProviderKind::Text, "exactly 10", 503));
    let generator = generator(&fake);

    let err = generator
        .generate_recipes(&RecipeQuery {
            query: "stew".to_string(),
            servings: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 502);
    match &err {
        GenerationError::Failed { stage, .. } => assert_eq!(*stage, Stage::AwaitingCompletion),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.user_message().starts_with("recipe list generation failed"));
}

#[tokio::test]
async fn test_prose_without_json_fails_while_parsing() {
    let fake = Arc::new(FakeCompletionClient::new().respond(
        ProviderKind::Text,
        "expert nutritionist",
        "I'm sorry, I can't help with that.",
    ));
    let generator = generator(&fake);

    let err = generator
        .analyze_nutrition(&NutritionRequest {
            title: String::new(),
            ingredients: vec!["rice".to_string()],
            servings: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 502);
    match err {
        GenerationError::Failed { stage, source, .. } => {
            assert_eq!(stage, Stage::Parsing);
            assert!(matches!(
                source,
                PipelineFailure::Parse(ParseError::NoStructuredPayload { .. })
            ));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

fn stored(title: &str) -> StoredRecipe {
    StoredRecipe {
        id: "r1".to_string(),
        user_id: "u1".to_string(),
        title: title.to_string(),
        image_url: None,
        is_ai_generated: true,
    }
}

#[tokio::test]
async fn test_refresh_image_uses_rotated_order() {
    let store = MemoryRecipeStore::new();
    store.insert(stored("Beef Stew")).unwrap();
    let fake = Arc::new(FakeCompletionClient::new());
    let generator = generator(&fake);

    let refresh = generator.refresh_image(&store, "u1", "r1").await.unwrap();
    assert_eq!(
        refresh.image_url.as_deref(),
        Some("https://secondary.test/Beef-Stew-food-dish")
    );
    assert!(refresh.ai_generated);

    let record = store.find("u1", "r1").await.unwrap().unwrap();
    assert_eq!(record.image_url, refresh.image_url);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_refresh_image_without_rotation() {
    let store = MemoryRecipeStore::new();
    store.insert(stored("Beef Stew")).unwrap();
    let fake = Arc::new(FakeCompletionClient::new());
    let generator = generator(&fake).with_refresh_rotation(false);

    let refresh = generator.refresh_image(&store, "u1", "r1").await.unwrap();
    assert_eq!(
        refresh.image_url.as_deref(),
        Some("https://primary.test/Beef-Stew-food-dish")
    );
}

#[tokio::test]
async fn test_refresh_image_keeps_record_when_nothing_found() {
    let store = MemoryRecipeStore::new();
    let mut record = stored("Mystery");
    record.image_url = Some("https://old.test/img.jpg".to_string());
    record.is_ai_generated = false;
    store.insert(record).unwrap();
    let fake = Arc::new(FakeCompletionClient::new());
    let generator = Generator::new(fake.clone(), images(false));

    let refresh = generator.refresh_image(&store, "u1", "r1").await.unwrap();
    assert_eq!(refresh.image_url, None);
    assert!(!refresh.ai_generated);
    let record = store.find("u1", "r1").await.unwrap().unwrap();
    assert_eq!(record.image_url.as_deref(), Some("https://old.test/img.jpg"));
}

#[tokio::test]
async fn test_refresh_image_for_unknown_recipe_is_not_found() {
    let store = MemoryRecipeStore::new();
    let fake = Arc::new(FakeCompletionClient::new());

    let err = generator(&fake)
        .refresh_image(&store, "u1", "missing")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}
