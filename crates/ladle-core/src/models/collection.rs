use serde::{Deserialize, Serialize};

use super::new_id;
use crate::remote::Table;

/// A curated set of recipes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cover_image_url: String,
    /// Official Bocuse d'Or selection
    pub is_bocuse_official: bool,
    /// Display position on the browse page
    pub sort_order: i32,
}

impl Collection {
    pub fn new(title: impl Into<String>, sort_order: i32) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: String::new(),
            cover_image_url: String::new(),
            is_bocuse_official: false,
            sort_order,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn official(mut self) -> Self {
        self.is_bocuse_official = true;
        self
    }
}

impl Table for Collection {
    const NAME: &'static str = "collections";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Membership of a recipe in a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionRecipe {
    pub id: String,
    pub collection_id: String,
    pub recipe_id: String,
    /// Display position within the collection
    pub sort_order: i32,
}

impl CollectionRecipe {
    pub fn new(
        collection_id: impl Into<String>,
        recipe_id: impl Into<String>,
        sort_order: i32,
    ) -> Self {
        Self {
            id: new_id(),
            collection_id: collection_id.into(),
            recipe_id: recipe_id.into(),
            sort_order,
        }
    }
}

impl Table for CollectionRecipe {
    const NAME: &'static str = "collection_recipes";

    fn id(&self) -> &str {
        &self.id
    }
}
