//! Recipe command handlers

use anyhow::{anyhow, Result};

use ladle_core::{CuisineType, SeasonTag, Session};

use crate::output::Output;

/// List published recipes, optionally filtered by cuisine and season.
///
/// Gated items are listed with a lock marker; listing never requires an
/// entitlement.
pub fn list(
    session: &Session,
    cuisine: Option<CuisineType>,
    season: Option<SeasonTag>,
    output: &Output,
) -> Result<()> {
    let rows: Vec<_> = session
        .published_recipes()
        .into_iter()
        .filter(|recipe| cuisine.map_or(true, |c| recipe.cuisine_type == c))
        .filter(|recipe| season.map_or(true, |s| recipe.in_season(s)))
        .map(|recipe| (recipe, session.can_view(recipe)))
        .collect();

    output.print_recipes(&rows);
    Ok(())
}

/// Show one recipe's full detail, or the paywall prompt when the viewer's
/// plan does not cover its access level.
pub fn show(session: &Session, id: String, output: &Output) -> Result<()> {
    let recipe = session
        .recipes
        .get(&id)
        .ok_or_else(|| anyhow!("Recipe not found: {}", id))?;

    if !session.can_view(recipe) {
        output.print_locked_recipe(recipe);
        return Ok(());
    }

    let chef = session.chefs.get(&recipe.chef_id);
    output.print_recipe(recipe, chef);

    let components: Vec<_> = session
        .components_of(&recipe.id)
        .into_iter()
        .map(|component| (component, session.ingredients_of(&component.id)))
        .collect();
    if !components.is_empty() {
        output.print_components(&components);
    }

    if !output.is_json() {
        output.message(&format!(
            "\n♥ {}  💬 {}",
            session.like_count(&recipe.id),
            session.comment_count(&recipe.id)
        ));
    }
    Ok(())
}
