use serde::{Deserialize, Serialize};
use tracing::info;

use super::{non_blank, Generator, Run, Stage, Task};
use crate::error::GenerationError;
use crate::store::{RecipeStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRefresh {
    pub recipe_id: String,
    /// `None` when no provider found a photo; the stored record is left untouched.
    pub image_url: Option<String>,
    /// Copied from the stored record's `is_ai_generated` flag.
    pub ai_generated: bool,
}

impl Generator {
    /// Looks a new photo up for a stored recipe and writes it back.
    pub async fn refresh_image(
        &self,
        store: &dyn RecipeStore,
        user_id: &str,
        recipe_id: &str,
    ) -> Result<ImageRefresh, GenerationError> {
        let user_id = non_blank(Some(user_id)).ok_or_else(|| GenerationError::invalid("user id is required"))?;
        let recipe_id =
            non_blank(Some(recipe_id)).ok_or_else(|| GenerationError::invalid("recipe id is required"))?;

        let mut run = Run::start(Task::ImageRefresh);
        let record = store
            .find(user_id, recipe_id)
            .await
            .map_err(|e| run.fail(e))?
            .ok_or_else(|| run.fail(StoreError::NotFound(recipe_id.to_string())))?;

        run.enter(Stage::Enriching);
        let resolver = if self.refresh_rotates {
            self.images.rotated(1)
        } else {
            self.images.clone()
        };
        let image_url = resolver.resolve(&record.title).await;

        if let Some(url) = &image_url {
            store
                .update_image_url(user_id, recipe_id, url)
                .await
                .map_err(|e| run.fail(e))?;
            info!(recipe_id, %url, ai_generated = record.is_ai_generated, "recipe image refreshed");
        }

        run.finish();
        Ok(ImageRefresh {
            recipe_id: recipe_id.to_string(),
            image_url,
            ai_generated: record.is_ai_generated,
        })
    }
}
