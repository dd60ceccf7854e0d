//! The persistence collaborator, seen from the generation pipeline.
//!
//! Record CRUD lives outside this crate; the pipeline only reads a stored
//! recipe and writes its `image_url` back after a refresh.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("recipe {0} not found")]
    NotFound(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecipe {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub is_ai_generated: bool,
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn find(&self, user_id: &str, recipe_id: &str) -> Result<Option<StoredRecipe>, StoreError>;

    async fn update_image_url(&self, user_id: &str, recipe_id: &str, url: &str) -> Result<(), StoreError>;
}

/// Keyed by (user id, recipe id).
#[derive(Debug, Default)]
pub struct MemoryRecipeStore {
    records: RwLock<HashMap<(String, String), StoredRecipe>>,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: StoredRecipe) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        records.insert((record.user_id.clone(), record.id.clone()), record);
        Ok(())
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn find(&self, user_id: &str, recipe_id: &str) -> Result<Option<StoredRecipe>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(records
            .get(&(user_id.to_string(), recipe_id.to_string()))
            .cloned())
    }

    async fn update_image_url(&self, user_id: &str, recipe_id: &str, url: &str) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let record = records
            .get_mut(&(user_id.to_string(), recipe_id.to_string()))
            .ok_or_else(|| StoreError::NotFound(recipe_id.to_string()))?;
        record.image_url = Some(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StoredRecipe {
        StoredRecipe {
            id: "r1".into(),
            user_id: "u1".into(),
            title: "Ratatouille".into(),
            image_url: None,
            is_ai_generated: true,
        }
    }

    #[tokio::test]
    async fn test_records_are_scoped_by_user() {
        let store = MemoryRecipeStore::new();
        store.insert(record()).unwrap();

        assert!(store.find("u1", "r1").await.unwrap().is_some());
        assert!(store.find("u2", "r1").await.unwrap().is_none());
        assert!(matches!(
            store.update_image_url("u2", "r1", "http://x").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_image_url() {
        let store = MemoryRecipeStore::new();
        store.insert(record()).unwrap();
        store.update_image_url("u1", "r1", "http://img").await.unwrap();
        let stored = store.find("u1", "r1").await.unwrap().unwrap();
        assert_eq!(stored.image_url.as_deref(), Some("http://img"));
    }
}
