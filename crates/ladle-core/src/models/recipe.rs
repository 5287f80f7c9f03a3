use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::new_id;
use crate::access::AccessLevel;
use crate::remote::Table;

/// Editorial tier of a recipe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecipeTier {
    Base,
    Featured,
    Top,
    BocuseCollection,
    Legendary,
}

impl RecipeTier {
    pub fn label(self) -> &'static str {
        match self {
            RecipeTier::Base => "Base",
            RecipeTier::Featured => "Featured",
            RecipeTier::Top => "Top",
            RecipeTier::BocuseCollection => "Bocuse d'Or",
            RecipeTier::Legendary => "Legendary",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CuisineType {
    French,
    Japanese,
    Italian,
    Spanish,
    Nordic,
    American,
    Indian,
    Chinese,
    Other,
}

impl CuisineType {
    pub fn label(self) -> &'static str {
        match self {
            CuisineType::French => "French",
            CuisineType::Japanese => "Japanese",
            CuisineType::Italian => "Italian",
            CuisineType::Spanish => "Spanish",
            CuisineType::Nordic => "Nordic",
            CuisineType::American => "American",
            CuisineType::Indian => "Indian",
            CuisineType::Chinese => "Chinese",
            CuisineType::Other => "Other",
        }
    }
}

impl FromStr for CuisineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "french" => Ok(CuisineType::French),
            "japanese" => Ok(CuisineType::Japanese),
            "italian" => Ok(CuisineType::Italian),
            "spanish" => Ok(CuisineType::Spanish),
            "nordic" => Ok(CuisineType::Nordic),
            "american" => Ok(CuisineType::American),
            "indian" => Ok(CuisineType::Indian),
            "chinese" => Ok(CuisineType::Chinese),
            "other" => Ok(CuisineType::Other),
            other => Err(format!("Unknown cuisine type: '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeasonTag {
    Spring,
    Summer,
    Autumn,
    Winter,
    AllSeason,
}

impl SeasonTag {
    pub fn label(self) -> &'static str {
        match self {
            SeasonTag::Spring => "Spring",
            SeasonTag::Summer => "Summer",
            SeasonTag::Autumn => "Autumn",
            SeasonTag::Winter => "Winter",
            SeasonTag::AllSeason => "All Season",
        }
    }
}

impl FromStr for SeasonTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spring" => Ok(SeasonTag::Spring),
            "summer" => Ok(SeasonTag::Summer),
            "autumn" => Ok(SeasonTag::Autumn),
            "winter" => Ok(SeasonTag::Winter),
            "all_season" => Ok(SeasonTag::AllSeason),
            other => Err(format!("Unknown season tag: '{}'", other)),
        }
    }
}

/// A published (or draft) recipe belonging to a chef.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    /// Unique identifier
    pub id: String,
    /// Chef who authored this recipe
    pub chef_id: String,
    pub title: String,
    pub description: String,
    pub hero_image_url: String,
    pub cuisine_type: CuisineType,
    pub season_tags: Vec<SeasonTag>,
    pub tier: RecipeTier,
    /// Membership tier required to view the full detail
    pub access_level: AccessLevel,
    pub prep_time_minutes: i32,
    pub total_time_minutes: i32,
    pub servings: i32,
    /// Denormalized counter maintained by the backend
    pub likes_count: i64,
    /// Denormalized counter maintained by the backend
    pub comments_count: i64,
    pub is_published: bool,
}

impl Recipe {
    /// Create a new free-tier draft recipe.
    pub fn new(chef_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            chef_id: chef_id.into(),
            title: title.into(),
            description: String::new(),
            hero_image_url: String::new(),
            cuisine_type: CuisineType::Other,
            season_tags: Vec::new(),
            tier: RecipeTier::Base,
            access_level: AccessLevel::Free,
            prep_time_minutes: 0,
            total_time_minutes: 0,
            servings: 0,
            likes_count: 0,
            comments_count: 0,
            is_published: false,
        }
    }

    pub fn with_access_level(mut self, level: AccessLevel) -> Self {
        self.access_level = level;
        self
    }

    pub fn with_cuisine(mut self, cuisine: CuisineType) -> Self {
        self.cuisine_type = cuisine;
        self
    }

    pub fn with_seasons(mut self, seasons: Vec<SeasonTag>) -> Self {
        self.season_tags = seasons;
        self
    }

    pub fn with_tier(mut self, tier: RecipeTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    /// Whether this recipe matches a season filter.
    pub fn in_season(&self, season: SeasonTag) -> bool {
        self.season_tags.contains(&season) || self.season_tags.contains(&SeasonTag::AllSeason)
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.cuisine_type.label())?;
        let badge = self.access_level.plan_label();
        if !badge.is_empty() {
            write!(f, " [{}]", badge)?;
        }
        Ok(())
    }
}

impl Table for Recipe {
    const NAME: &'static str = "recipes";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One build step of a recipe (a sauce, a garnish, the protein).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeComponent {
    pub id: String,
    pub recipe_id: String,
    pub name: String,
    pub image_url: String,
    pub video_url: String,
    pub instructions: String,
    /// Display position within the recipe
    pub sort_order: i32,
}

impl RecipeComponent {
    pub fn new(recipe_id: impl Into<String>, name: impl Into<String>, sort_order: i32) -> Self {
        Self {
            id: new_id(),
            recipe_id: recipe_id.into(),
            name: name.into(),
            image_url: String::new(),
            video_url: String::new(),
            instructions: String::new(),
            sort_order,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }
}

impl Table for RecipeComponent {
    const NAME: &'static str = "recipe_components";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A measured ingredient within a component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub id: String,
    pub component_id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub sort_order: i32,
}

impl Ingredient {
    pub fn new(
        component_id: impl Into<String>,
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        sort_order: i32,
    ) -> Self {
        Self {
            id: new_id(),
            component_id: component_id.into(),
            name: name.into(),
            quantity,
            unit: unit.into(),
            sort_order,
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{} {}", self.quantity, self.name)
        } else {
            write!(f, "{} {} {}", self.quantity, self.unit, self.name)
        }
    }
}

impl Table for Ingredient {
    const NAME: &'static str = "ingredients";

    fn id(&self) -> &str {
        &self.id
    }
}
