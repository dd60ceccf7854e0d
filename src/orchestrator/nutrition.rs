use serde::{Deserialize, Serialize};

use super::{prompts, servings_or, Generator, Run, Task};
use crate::api_connection::{CompletionRequest, Turn};
use crate::error::GenerationError;
use crate::models::recipe::DEFAULT_SERVINGS;
use crate::models::NutritionReport;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub servings: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionResponse {
    pub nutrition: NutritionReport,
}

impl Generator {
    pub async fn analyze_nutrition(&self, input: &NutritionRequest) -> Result<NutritionResponse, GenerationError> {
        let ingredients: Vec<String> = input
            .ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        if ingredients.is_empty() {
            return Err(GenerationError::invalid("ingredients are required"));
        }
        let servings = servings_or(input.servings, DEFAULT_SERVINGS);

        let mut run = Run::start(Task::Nutrition);
        let options = &self.profiles.nutrition;
        let request = CompletionRequest::text(
            prompts::nutrition_system(),
            vec![Turn::user(prompts::nutrition_user(input.title.trim(), servings, &ingredients))],
            options,
        );
        let raw = self.complete(&mut run, request, options).await?;
        let nutrition: NutritionReport = self.parse_object(&mut run, &raw, &())?;

        run.finish();
        Ok(NutritionResponse { nutrition })
    }
}
