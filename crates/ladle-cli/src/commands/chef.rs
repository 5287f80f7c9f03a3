//! Chef command handlers

use anyhow::{anyhow, Result};

use ladle_core::Session;

use crate::output::{Output, OutputFormat};

/// List all chefs
pub fn list(session: &Session, output: &Output) -> Result<()> {
    let chefs: Vec<_> = session.chefs.items().iter().collect();
    output.print_chefs(&chefs);
    Ok(())
}

/// Show one chef with their published recipes and follow state
pub fn show(session: &Session, id: String, output: &Output) -> Result<()> {
    let chef = session
        .chefs
        .get(&id)
        .ok_or_else(|| anyhow!("Chef not found: {}", id))?;

    let recipes: Vec<_> = session
        .recipes_by_chef(&chef.id)
        .into_iter()
        .map(|recipe| (recipe, session.can_view(recipe)))
        .collect();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "chef": chef,
                    "recipe_count": recipes.len(),
                    "following": session.is_following(&chef.id)
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", chef.id);
        }
        OutputFormat::Human => {
            println!("{}", chef);
            if !chef.bio.is_empty() {
                println!("{}", chef.bio);
            }
            println!("Followers: {}", chef.follower_count);
            if session.is_following(&chef.id) {
                println!("You follow this chef.");
            }
            if !recipes.is_empty() {
                println!();
                println!("── Recipes ({}) ──", recipes.len());
                output.print_recipes(&recipes);
            }
        }
    }
    Ok(())
}
