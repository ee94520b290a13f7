//! # RecipeCatalog
//!
//! Coordinates the recipe gateway, the saved list and the list pipeline for
//! the browsing screens.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::favorites::Favorites;
use crate::models::Recipe;
use crate::query::{select, ListQuery};
use crate::traits::CollectionGateway;

pub struct RecipeCatalog {
    recipes: Arc<dyn CollectionGateway<Recipe>>,
    favorites: Favorites,
}

impl RecipeCatalog {
    pub fn new(recipes: Arc<dyn CollectionGateway<Recipe>>, favorites: Favorites) -> Self {
        Self { recipes, favorites }
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    /// Fetches every recipe and returns the ones matching `query`, in
    /// display order, with `is_favorited` filled in.
    pub async fn browse(&self, query: &ListQuery) -> Result<Vec<Recipe>> {
        let mut all = self.recipes.get_all().await?;
        let saved: HashSet<String> = self.favorites.list().await?.into_iter().collect();
        for recipe in &mut all {
            recipe.is_favorited = saved.contains(&recipe.id);
        }

        let shown: Vec<Recipe> = select(&all, query).into_iter().cloned().collect();
        debug!(total = all.len(), shown = shown.len(), sort = %query.sort, "browsed recipes");
        Ok(shown)
    }

    /// Saved recipes in the order they were saved. Ids that no longer
    /// exist remotely are skipped.
    pub async fn saved(&self) -> Result<Vec<Recipe>> {
        let ids = self.favorites.list().await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut all = self.recipes.get_all().await?;
        let mut saved = Vec::with_capacity(ids.len());
        for id in &ids {
            match all.iter().position(|r| &r.id == id) {
                Some(idx) => {
                    let mut recipe = all.swap_remove(idx);
                    recipe.is_favorited = true;
                    saved.push(recipe);
                }
                None => debug!(recipe_id = %id, "saved recipe no longer exists"),
            }
        }
        Ok(saved)
    }

    pub async fn detail(&self, id: &str) -> Result<Recipe> {
        let mut recipe = self.recipes.get_by_id(id).await?;
        recipe.is_favorited = self.favorites.is_saved(id).await?;
        Ok(recipe)
    }

    pub async fn toggle_saved(&self, id: &str) -> Result<bool> {
        self.favorites.toggle(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::query::SortKey;
    use crate::traits::{MockCollectionGateway, MockKeyValueStore};

    fn recipe(id: &str, title: &str, rating: f64) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: title.to_string(),
            image_url: format!("https://foodish-api.com/images/{id}.jpg"),
            duration: "30 mins".to_string(),
            difficulty: None,
            rating: Some(rating),
            category: "Main Course".to_string(),
            is_favorited: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn saved_store(raw: &'static str) -> Favorites {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get_item()
            .returning(move |_| Ok(Some(raw.to_string())));
        Favorites::new(Arc::new(store))
    }

    #[tokio::test]
    async fn browse_marks_favorites_and_sorts() {
        let mut gateway = MockCollectionGateway::<Recipe>::new();
        gateway.expect_get_all().times(1).returning(|| {
            Ok(vec![
                recipe("1", "Garlic Pasta", 4.8),
                recipe("2", "Margherita Pizza", 4.9),
                recipe("3", "Pasta Salad", 4.5),
            ])
        });

        let catalog = RecipeCatalog::new(Arc::new(gateway), saved_store(r#"["3"]"#));
        let shown = catalog
            .browse(&ListQuery::new("pasta", "All", SortKey::Rating))
            .await
            .unwrap();

        let ids: Vec<&str> = shown.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(!shown[0].is_favorited);
        assert!(shown[1].is_favorited);
    }

    #[tokio::test]
    async fn browse_propagates_gateway_failure() {
        let mut gateway = MockCollectionGateway::<Recipe>::new();
        gateway
            .expect_get_all()
            .returning(|| Err(AppError::query("recipes", "permission denied")));

        let catalog = RecipeCatalog::new(Arc::new(gateway), saved_store("[]"));
        let err = catalog.browse(&ListQuery::default()).await.unwrap_err();
        assert!(matches!(err, AppError::RemoteQuery { .. }));
    }

    #[tokio::test]
    async fn saved_follows_saved_order_and_skips_missing() {
        let mut gateway = MockCollectionGateway::<Recipe>::new();
        gateway.expect_get_all().returning(|| {
            Ok(vec![
                recipe("1", "Pasta", 4.8),
                recipe("2", "Pizza", 4.9),
                recipe("3", "Salad", 4.5),
            ])
        });

        let catalog = RecipeCatalog::new(Arc::new(gateway), saved_store(r#"["3","gone","1"]"#));
        let saved = catalog.saved().await.unwrap();
        let ids: Vec<&str> = saved.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
        assert!(saved.iter().all(|r| r.is_favorited));
    }

    #[tokio::test]
    async fn saved_with_nothing_saved_skips_the_fetch() {
        let mut gateway = MockCollectionGateway::<Recipe>::new();
        gateway.expect_get_all().never();

        let catalog = RecipeCatalog::new(Arc::new(gateway), saved_store("[]"));
        assert!(catalog.saved().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn detail_fills_in_saved_flag() {
        let mut gateway = MockCollectionGateway::<Recipe>::new();
        gateway
            .expect_get_by_id()
            .withf(|id| id == "2")
            .returning(|id| Ok(recipe(id, "Pizza", 4.9)));

        let catalog = RecipeCatalog::new(Arc::new(gateway), saved_store(r#"["2"]"#));
        let detail = catalog.detail("2").await.unwrap();
        assert_eq!(detail.title, "Pizza");
        assert!(detail.is_favorited);
    }

    #[tokio::test]
    async fn detail_not_found_is_distinct() {
        let mut gateway = MockCollectionGateway::<Recipe>::new();
        gateway
            .expect_get_by_id()
            .returning(|id| Err(AppError::query_not_found("recipes", id)));

        let catalog = RecipeCatalog::new(Arc::new(gateway), saved_store("[]"));
        let err = catalog.detail("404").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
