//! Generation orchestrators.
//!
//! One `Generator` drives every task. Each task is the same pipeline
//! (`Building -> AwaitingCompletion -> Parsing -> [Chaining] -> [Enriching] -> Done`)
//! configured by a `GenerationOptions` profile; any stage can end the run with
//! `GenerationError::Failed`. Nothing is retried.

pub mod chat;
pub mod meal_plan;
pub mod nutrition;
pub mod prompts;
pub mod recipe;
pub mod refresh;
pub mod substitution;
pub mod vision;

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api_connection::{CompletionClient, CompletionRequest, GenerationOptions, HttpCompletionClient};
use crate::config::{AppConfig, TaskProfiles};
use crate::error::{GenerationError, PipelineFailure};
use crate::images::ImageResolver;
use crate::response_parser::{self, Coerce};

pub use chat::{ChatReply, ChatRequest, ChatTurn};
pub use meal_plan::{MealPlanRequest, MealPlanResponse};
pub use nutrition::{NutritionRequest, NutritionResponse};
pub use recipe::{RecipeListResponse, RecipeQuery, RecipeResponse};
pub use refresh::ImageRefresh;
pub use substitution::{SubstitutionRequest, SubstitutionResponse};
pub use vision::{VisionRequest, VisionResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    SingleRecipe,
    RecipeList,
    VisionRecipes,
    Nutrition,
    Substitution,
    MealPlan,
    Chat,
    ImageRefresh,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Task::SingleRecipe => "recipe generation",
            Task::RecipeList => "recipe list generation",
            Task::VisionRecipes => "photo analysis",
            Task::Nutrition => "nutrition analysis",
            Task::Substitution => "ingredient substitution",
            Task::MealPlan => "meal planning",
            Task::Chat => "chat",
            Task::ImageRefresh => "image refresh",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Building,
    AwaitingCompletion,
    Parsing,
    Chaining,
    Enriching,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Building => "building",
            Stage::AwaitingCompletion => "awaiting completion",
            Stage::Parsing => "parsing",
            Stage::Chaining => "chaining",
            Stage::Enriching => "enriching",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Tracks where one request is in the pipeline.
pub(crate) struct Run {
    task: Task,
    stage: Stage,
}

impl Run {
    pub(crate) fn start(task: Task) -> Self {
        debug!(%task, "generation started");
        Self {
            task,
            stage: Stage::Building,
        }
    }

    pub(crate) fn enter(&mut self, stage: Stage) {
        info!(task = %self.task, from = %self.stage, to = %stage, "stage transition");
        self.stage = stage;
    }

    pub(crate) fn fail(&self, source: impl Into<PipelineFailure>) -> GenerationError {
        let source = source.into();
        warn!(task = %self.task, stage = %self.stage, error = %source, "generation failed");
        GenerationError::Failed {
            task: self.task,
            stage: self.stage,
            source,
        }
    }

    pub(crate) fn finish(mut self) {
        self.enter(Stage::Done);
        info!(task = %self.task, "generation finished");
    }
}

/// Composes completion, parsing and image enrichment for every task.
pub struct Generator {
    client: Arc<dyn CompletionClient>,
    images: ImageResolver,
    profiles: TaskProfiles,
    refresh_rotates: bool,
}

impl Generator {
    pub fn new(client: Arc<dyn CompletionClient>, images: ImageResolver) -> Self {
        Self {
            client,
            images,
            profiles: TaskProfiles::default(),
            refresh_rotates: true,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(HttpCompletionClient::from_config(config)),
            ImageResolver::from_settings(&config.images),
        )
        .with_profiles(config.tasks.clone())
        .with_refresh_rotation(config.images.refresh_rotates)
    }

    pub fn with_profiles(mut self, profiles: TaskProfiles) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_refresh_rotation(mut self, rotate: bool) -> Self {
        self.refresh_rotates = rotate;
        self
    }

    pub fn profiles(&self) -> &TaskProfiles {
        &self.profiles
    }

    pub fn images(&self) -> &ImageResolver {
        &self.images
    }

    pub(crate) async fn complete(
        &self,
        run: &mut Run,
        request: CompletionRequest,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        run.enter(Stage::AwaitingCompletion);
        let raw = self
            .client
            .complete(request, options.timeout)
            .await
            .map_err(|e| run.fail(e))?;
        debug!(task = %run.task, %raw, "raw completion");
        Ok(raw)
    }

    pub(crate) fn parse_object<T: Coerce>(
        &self,
        run: &mut Run,
        raw: &str,
        ctx: &T::Context,
    ) -> Result<T, GenerationError> {
        run.enter(Stage::Parsing);
        response_parser::parse_object(raw, ctx).map_err(|e| run.fail(e))
    }

    pub(crate) fn parse_array<T: Coerce>(
        &self,
        run: &mut Run,
        raw: &str,
        ctx: &T::Context,
    ) -> Result<Vec<T>, GenerationError> {
        run.enter(Stage::Parsing);
        response_parser::parse_array(raw, ctx).map_err(|e| run.fail(e))
    }
}

/// Trimmed, non-blank text from an optional field.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Zero or missing servings fall back to `default`.
pub(crate) fn servings_or(value: Option<u32>, default: u32) -> u32 {
    value.filter(|&n| n > 0).unwrap_or(default)
}
