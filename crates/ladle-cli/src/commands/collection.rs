//! Collection command handlers

use anyhow::{anyhow, Result};

use ladle_core::Session;

use crate::output::{Output, OutputFormat};

/// List all collections in display order
pub fn list(session: &Session, output: &Output) -> Result<()> {
    let mut collections: Vec<_> = session.collections.items().iter().collect();
    collections.sort_by_key(|collection| collection.sort_order);
    output.print_collections(&collections);
    Ok(())
}

/// Show one collection and its recipes in display order
pub fn show(session: &Session, id: String, output: &Output) -> Result<()> {
    let collection = session
        .collections
        .get(&id)
        .ok_or_else(|| anyhow!("Collection not found: {}", id))?;

    let recipes: Vec<_> = session
        .recipes_in_collection(&collection.id)
        .into_iter()
        .map(|recipe| (recipe, session.can_view(recipe)))
        .collect();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "collection": collection,
                    "recipes": recipes
                        .iter()
                        .map(|(recipe, viewable)| serde_json::json!({
                            "id": recipe.id,
                            "title": recipe.title,
                            "viewable": viewable
                        }))
                        .collect::<Vec<_>>()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", collection.id);
        }
        OutputFormat::Human => {
            println!("{}", collection.title);
            if !collection.description.is_empty() {
                println!("{}", collection.description);
            }
            if collection.is_bocuse_official {
                println!("Official Bocuse d'Or selection");
            }
            println!();
            output.print_recipes(&recipes);
        }
    }
    Ok(())
}
