//! Default dataset
//!
//! Every synced collection is constructed with these rows so the app is
//! usable before (or without) a remote fetch. Ids are stable strings so
//! the cross-table references survive restarts and reseeds; social
//! tables (likes, comments, follows) start empty.

use crate::access::{AccessLevel, MembershipPlan};
use crate::models::{
    Chef, Collection, CollectionRecipe, CuisineType, Ingredient, Recipe, RecipeComponent,
    RecipeTier, SeasonTag,
};

pub fn seed_chefs() -> Vec<Chef> {
    let mut chefs = vec![
        Chef::new("anna@lecormoran.fr", "Anna Sorel")
            .with_restaurant("Le Cormoran", "France")
            .with_bio("Saucier turned chef-patron. Two stars on the Breton coast.")
            .verified(),
        Chef::new("kenji@hatsu.jp", "Kenji Watanabe")
            .with_restaurant("Hatsu", "Japan")
            .with_bio("Kaiseki with a charcoal obsession.")
            .verified(),
        Chef::new("marta@brasa.es", "Marta Iglesias")
            .with_restaurant("Brasa", "Spain")
            .with_bio("Open-fire cooking from Asturias."),
    ];
    chefs[0].id = "chef-1".to_string();
    chefs[0].membership_plan = MembershipPlan::Elite;
    chefs[0].follower_count = 1240;
    chefs[1].id = "chef-2".to_string();
    chefs[1].membership_plan = MembershipPlan::Pro;
    chefs[1].follower_count = 860;
    chefs[2].id = "chef-3".to_string();
    chefs[2].follower_count = 95;
    chefs
}

pub fn seed_recipes() -> Vec<Recipe> {
    let mut recipes = vec![
        Recipe::new("chef-1", "Consommé de Volaille")
            .with_cuisine(CuisineType::French)
            .with_seasons(vec![SeasonTag::AllSeason])
            .published(),
        Recipe::new("chef-1", "Turbot au Champagne")
            .with_cuisine(CuisineType::French)
            .with_seasons(vec![SeasonTag::Winter])
            .with_tier(RecipeTier::Featured)
            .with_access_level(AccessLevel::Pro)
            .published(),
        Recipe::new("chef-2", "Chawanmushi with Snow Crab")
            .with_cuisine(CuisineType::Japanese)
            .with_seasons(vec![SeasonTag::Winter])
            .with_access_level(AccessLevel::Pro)
            .published(),
        Recipe::new("chef-2", "Binchotan Duck Breast")
            .with_cuisine(CuisineType::Japanese)
            .with_seasons(vec![SeasonTag::Autumn])
            .with_tier(RecipeTier::Top)
            .with_access_level(AccessLevel::Elite)
            .published(),
        Recipe::new("chef-1", "Lièvre à la Royale")
            .with_cuisine(CuisineType::French)
            .with_seasons(vec![SeasonTag::Autumn, SeasonTag::Winter])
            .with_tier(RecipeTier::BocuseCollection)
            .with_access_level(AccessLevel::Bocuse)
            .published(),
        Recipe::new("chef-3", "Grilled Leeks, Romesco")
            .with_cuisine(CuisineType::Spanish)
            .with_seasons(vec![SeasonTag::Spring])
            .published(),
    ];
    for (index, recipe) in recipes.iter_mut().enumerate() {
        recipe.id = format!("rec-{}", index + 1);
    }
    recipes[0].description = "The clearest broth you will ever make.".to_string();
    recipes[0].prep_time_minutes = 30;
    recipes[0].total_time_minutes = 240;
    recipes[0].servings = 4;
    recipes[1].description = "Poached turbot, champagne beurre blanc.".to_string();
    recipes[1].prep_time_minutes = 40;
    recipes[1].total_time_minutes = 75;
    recipes[1].servings = 2;
    recipes[4].description = "The grand old dish, unabridged.".to_string();
    recipes[4].prep_time_minutes = 120;
    recipes[4].total_time_minutes = 480;
    recipes[4].servings = 6;
    recipes
}

pub fn seed_components() -> Vec<RecipeComponent> {
    let mut components = vec![
        RecipeComponent::new("rec-1", "Raft", 0)
            .with_instructions("Whisk egg whites into the mirepoix and minced chicken."),
        RecipeComponent::new("rec-1", "Clarification", 1)
            .with_instructions("Simmer gently under the raft. Never boil."),
        RecipeComponent::new("rec-2", "Court-bouillon", 0),
        RecipeComponent::new("rec-2", "Beurre blanc", 1)
            .with_instructions("Reduce champagne and shallots, mount with cold butter."),
        RecipeComponent::new("rec-5", "Farce", 0),
        RecipeComponent::new("rec-5", "Sauce royale", 1),
    ];
    for (index, component) in components.iter_mut().enumerate() {
        component.id = format!("comp-{}", index + 1);
    }
    components
}

pub fn seed_ingredients() -> Vec<Ingredient> {
    let mut ingredients = vec![
        Ingredient::new("comp-1", "egg whites", 4.0, "", 0),
        Ingredient::new("comp-1", "minced chicken leg", 300.0, "g", 1),
        Ingredient::new("comp-2", "brown chicken stock", 2.0, "l", 0),
        Ingredient::new("comp-4", "champagne", 200.0, "ml", 0),
        Ingredient::new("comp-4", "cold butter", 250.0, "g", 1),
        Ingredient::new("comp-4", "shallots", 2.0, "", 2),
    ];
    for (index, ingredient) in ingredients.iter_mut().enumerate() {
        ingredient.id = format!("ing-{}", index + 1);
    }
    ingredients
}

pub fn seed_collections() -> Vec<Collection> {
    let mut collections = vec![
        Collection::new("Winter Classics", 0)
            .with_description("Deep flavors for the cold months."),
        Collection::new("Bocuse d'Or Selection", 1)
            .with_description("Competition dishes from the podium.")
            .official(),
    ];
    collections[0].id = "col-1".to_string();
    collections[1].id = "col-2".to_string();
    collections
}

pub fn seed_collection_recipes() -> Vec<CollectionRecipe> {
    let mut entries = vec![
        CollectionRecipe::new("col-1", "rec-2", 0),
        CollectionRecipe::new("col-1", "rec-3", 1),
        CollectionRecipe::new("col-1", "rec-5", 2),
        CollectionRecipe::new("col-2", "rec-5", 0),
    ];
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.id = format!("colrec-{}", index + 1);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_references_resolve() {
        let chef_ids: HashSet<_> = seed_chefs().iter().map(|c| c.id.clone()).collect();
        let recipe_ids: HashSet<_> = seed_recipes().iter().map(|r| r.id.clone()).collect();
        let component_ids: HashSet<_> = seed_components().iter().map(|c| c.id.clone()).collect();
        let collection_ids: HashSet<_> = seed_collections().iter().map(|c| c.id.clone()).collect();

        for recipe in seed_recipes() {
            assert!(chef_ids.contains(&recipe.chef_id), "{}", recipe.chef_id);
        }
        for component in seed_components() {
            assert!(recipe_ids.contains(&component.recipe_id));
        }
        for ingredient in seed_ingredients() {
            assert!(component_ids.contains(&ingredient.component_id));
        }
        for entry in seed_collection_recipes() {
            assert!(collection_ids.contains(&entry.collection_id));
            assert!(recipe_ids.contains(&entry.recipe_id));
        }
    }

    #[test]
    fn test_seed_ids_are_stable_and_unique() {
        // Stable across calls, unlike freshly generated uuids
        assert_eq!(seed_chefs()[0].id, "chef-1");
        assert_eq!(seed_recipes()[0].id, "rec-1");

        let recipes = seed_recipes();
        let ids: HashSet<_> = recipes.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids.len(), recipes.len());
    }

    #[test]
    fn test_seed_covers_every_access_level() {
        let recipes = seed_recipes();
        for level in crate::access::AccessLevel::ALL {
            assert!(
                recipes.iter().any(|r| r.access_level == level),
                "no seed recipe at {:?}",
                level
            );
        }
    }
}
