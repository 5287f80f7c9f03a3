//! Data models for Ladle
//!
//! Every record carries a unique `String` id and maps 1:1 to a named
//! remote table (see [`crate::remote::Table`]). Foreign keys are plain id
//! strings; referential integrity is not enforced locally, so queries
//! tolerate dangling references and filter them out at read time.

mod chef;
mod collection;
mod recipe;
mod social;
mod user;

pub use chef::Chef;
pub use collection::{Collection, CollectionRecipe};
pub use recipe::{CuisineType, Ingredient, Recipe, RecipeComponent, RecipeTier, SeasonTag};
pub use social::{ChefFollow, Comment, UserLike};
pub use user::User;

/// Generate a fresh record id.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
