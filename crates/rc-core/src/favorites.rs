//! # Saved recipes
//!
//! The saved list is a JSON array of recipe ids stored under a single
//! local key. Toggles are read-modify-write, so they are funnelled through
//! one async lock; two toggles in the same process never lose an update.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::traits::KeyValueStore;

/// Storage key holding the saved-recipe id list.
pub const SAVED_RECIPES_KEY: &str = "savedRecipes";

pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
}

impl Favorites {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, SAVED_RECIPES_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Saved ids in the order they were saved. A missing key is an empty list.
    pub async fn list(&self) -> Result<Vec<String>> {
        match self.store.get_item(&self.key).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::LocalStorage(format!("'{}' is not a JSON id list: {e}", self.key))
            }),
            None => Ok(Vec::new()),
        }
    }

    pub async fn is_saved(&self, id: &str) -> Result<bool> {
        Ok(self.list().await?.iter().any(|saved| saved == id))
    }

    /// Flips the saved state of `id` and returns the new state.
    pub async fn toggle(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut ids = self.list().await?;
        let now_saved = match ids.iter().position(|saved| saved == id) {
            Some(_) => {
                ids.retain(|saved| saved != id);
                false
            }
            None => {
                ids.push(id.to_string());
                true
            }
        };

        let raw = serde_json::to_string(&ids)
            .map_err(|e| AppError::LocalStorage(e.to_string()))?;
        self.store.set_item(&self.key, &raw).await?;

        info!(recipe_id = %id, saved = now_saved, "toggled saved recipe");
        Ok(now_saved)
    }

    /// Drops the whole saved list.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        debug!(key = %self.key, "clearing saved recipes");
        self.store.remove_item(&self.key).await
    }
}
