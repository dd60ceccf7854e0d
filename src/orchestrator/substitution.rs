use serde::{Deserialize, Serialize};

use super::{non_blank, prompts, Generator, Run, Task};
use crate::api_connection::{CompletionRequest, Turn};
use crate::error::GenerationError;
use crate::models::{SubstitutionContext, SubstitutionResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionRequest {
    #[serde(default)]
    pub ingredient: String,
    /// The dish or use the ingredient is meant for.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionResponse {
    pub result: SubstitutionResult,
}

impl Generator {
    pub async fn suggest_substitutes(
        &self,
        input: &SubstitutionRequest,
    ) -> Result<SubstitutionResponse, GenerationError> {
        let ingredient = non_blank(Some(input.ingredient.as_str()))
            .ok_or_else(|| GenerationError::invalid("ingredient is required"))?;

        let mut run = Run::start(Task::Substitution);
        let options = &self.profiles.substitution;
        let user = prompts::substitution_user(
            ingredient,
            non_blank(input.context.as_deref()),
            non_blank(input.diet.as_deref()),
        );
        let request = CompletionRequest::text(prompts::substitution_system(), vec![Turn::user(user)], options);
        let raw = self.complete(&mut run, request, options).await?;
        let ctx = SubstitutionContext {
            ingredient: ingredient.to_string(),
        };
        let result: SubstitutionResult = self.parse_object(&mut run, &raw, &ctx)?;

        run.finish();
        Ok(SubstitutionResponse { result })
    }
}
