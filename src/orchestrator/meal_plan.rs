use serde::{Deserialize, Serialize};

use super::{non_blank, prompts, servings_or, Generator, Run, Task};
use crate::api_connection::{CompletionRequest, Turn};
use crate::error::GenerationError;
use crate::models::MealPlan;

pub const DEFAULT_MEAL_PLAN_SERVINGS: u32 = 2;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanRequest {
    #[serde(default)]
    pub preferences: Option<String>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanResponse {
    pub plan: MealPlan,
}

impl Generator {
    /// A seven-day plan. Every field of the request is optional.
    pub async fn plan_meals(&self, input: &MealPlanRequest) -> Result<MealPlanResponse, GenerationError> {
        let servings = servings_or(input.servings, DEFAULT_MEAL_PLAN_SERVINGS);

        let mut run = Run::start(Task::MealPlan);
        let options = &self.profiles.meal_plan;
        let user = prompts::meal_plan_user(
            servings,
            non_blank(input.diet.as_deref()),
            non_blank(input.budget.as_deref()),
            non_blank(input.preferences.as_deref()),
        );
        let request = CompletionRequest::text(prompts::meal_plan_system(), vec![Turn::user(user)], options);
        let raw = self.complete(&mut run, request, options).await?;
        let plan: MealPlan = self.parse_object(&mut run, &raw, &())?;

        run.finish();
        Ok(MealPlanResponse { plan })
    }
}
