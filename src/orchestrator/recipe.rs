use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{non_blank, prompts, servings_or, Generator, Run, Stage, Task};
use crate::api_connection::{CompletionRequest, GenerationOptions, Turn};
use crate::error::GenerationError;
use crate::images::enrich_all;
use crate::models::recipe::DEFAULT_SERVINGS;
use crate::models::{Illustrated, RecipeContext, RecipeDraft, VisionRecipe};
use crate::response_parser::Coerce;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeQuery {
    pub query: String,
    #[serde(default)]
    pub servings: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub recipe: RecipeDraft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeListResponse {
    pub recipes: Vec<RecipeDraft>,
}

/// Anything wrapping a `RecipeDraft` that a list flow can stamp with an id.
pub(crate) trait GeneratedRecipe: Coerce<Context = RecipeContext> + Illustrated {
    fn draft_mut(&mut self) -> &mut RecipeDraft;
}

impl GeneratedRecipe for RecipeDraft {
    fn draft_mut(&mut self) -> &mut RecipeDraft {
        self
    }
}

impl GeneratedRecipe for VisionRecipe {
    fn draft_mut(&mut self) -> &mut RecipeDraft {
        &mut self.recipe
    }
}

/// One timestamp per response, so ids stay unique within it.
pub(crate) fn assign_ids<T: GeneratedRecipe>(prefix: &str, items: &mut [T]) {
    let millis = Utc::now().timestamp_millis();
    for (index, item) in items.iter_mut().enumerate() {
        item.draft_mut().id = format!("{prefix}_{millis}_{index}");
    }
}

pub(crate) struct ListJob<'a> {
    pub system: String,
    pub user: String,
    pub options: &'a GenerationOptions,
    pub servings: u32,
    pub expected: usize,
    pub id_prefix: &'static str,
}

impl Generator {
    /// `{recipe}`: one recipe, id `gen_{millis}`, one image lookup.
    pub async fn generate_recipe(&self, input: &RecipeQuery) -> Result<RecipeResponse, GenerationError> {
        let query = non_blank(Some(input.query.as_str())).ok_or_else(|| GenerationError::invalid("query is required"))?;
        let servings = servings_or(input.servings, DEFAULT_SERVINGS);

        let mut run = Run::start(Task::SingleRecipe);
        let options = &self.profiles.recipe;
        let request = CompletionRequest::text(
            prompts::single_recipe_system(servings),
            vec![Turn::user(query)],
            options,
        );
        let raw = self.complete(&mut run, request, options).await?;
        let mut recipe: RecipeDraft = self.parse_object(&mut run, &raw, &RecipeContext { servings })?;
        recipe.id = format!("gen_{}", Utc::now().timestamp_millis());

        run.enter(Stage::Enriching);
        let image_url = self.images.resolve(&recipe.title).await;
        recipe.set_image_url(image_url);

        run.finish();
        Ok(RecipeResponse { recipe })
    }

    /// `{recipes}`: ten varied recipes with distinct ids, images filled in chunks.
    pub async fn generate_recipes(&self, input: &RecipeQuery) -> Result<RecipeListResponse, GenerationError> {
        let query = non_blank(Some(input.query.as_str())).ok_or_else(|| GenerationError::invalid("query is required"))?;
        let servings = servings_or(input.servings, DEFAULT_SERVINGS);

        let mut run = Run::start(Task::RecipeList);
        let job = ListJob {
            system: prompts::recipe_list_system(servings),
            user: query.to_string(),
            options: &self.profiles.recipe_list,
            servings,
            expected: prompts::RECIPE_LIST_COUNT,
            id_prefix: "gen",
        };
        let recipes = self.generate_list::<RecipeDraft>(&mut run, job).await?;

        run.finish();
        Ok(RecipeListResponse { recipes })
    }

    /// Complete, parse an array, trim to size, stamp ids and enrich images.
    pub(crate) async fn generate_list<T: GeneratedRecipe>(
        &self,
        run: &mut Run,
        job: ListJob<'_>,
    ) -> Result<Vec<T>, GenerationError> {
        let request = CompletionRequest::text(job.system, vec![Turn::user(job.user)], job.options);
        let raw = self.complete(run, request, job.options).await?;
        let mut items: Vec<T> = self.parse_array(run, &raw, &RecipeContext { servings: job.servings })?;

        if items.len() > job.expected {
            items.truncate(job.expected);
        } else if items.len() < job.expected {
            warn!(
                expected = job.expected,
                got = items.len(),
                "generator returned fewer recipes than requested"
            );
        }
        assign_ids(job.id_prefix, &mut items);

        run.enter(Stage::Enriching);
        enrich_all(&self.images, &mut items).await;
        Ok(items)
    }
}
