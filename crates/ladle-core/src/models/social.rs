use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::new_id;
use crate::remote::Table;

/// A user's like on a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserLike {
    pub id: String,
    pub user_id: String,
    pub recipe_id: String,
    pub created_at: DateTime<Utc>,
}

impl UserLike {
    pub fn new(user_id: impl Into<String>, recipe_id: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            recipe_id: recipe_id.into(),
            created_at: Utc::now(),
        }
    }
}

impl Table for UserLike {
    const NAME: &'static str = "user_likes";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A comment on a recipe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub recipe_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        user_id: impl Into<String>,
        recipe_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            recipe_id: recipe_id.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

impl Table for Comment {
    const NAME: &'static str = "comments";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A user following a chef.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChefFollow {
    pub id: String,
    pub user_id: String,
    pub chef_id: String,
    pub created_at: DateTime<Utc>,
}

impl ChefFollow {
    pub fn new(user_id: impl Into<String>, chef_id: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            chef_id: chef_id.into(),
            created_at: Utc::now(),
        }
    }
}

impl Table for ChefFollow {
    const NAME: &'static str = "chef_follows";

    fn id(&self) -> &str {
        &self.id
    }
}
