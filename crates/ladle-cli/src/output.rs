//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use ladle_core::{Chef, Collection, Comment, Ingredient, Recipe, RecipeComponent};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print one recipe's full detail (the viewer is entitled to see it)
    pub fn print_recipe(&self, recipe: &Recipe, chef: Option<&Chef>) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", recipe.id);
                println!("Title:    {}", recipe.title);
                if let Some(chef) = chef {
                    println!("Chef:     {}", chef);
                }
                println!("Cuisine:  {}", recipe.cuisine_type.label());
                if !recipe.season_tags.is_empty() {
                    let seasons: Vec<&str> =
                        recipe.season_tags.iter().map(|s| s.label()).collect();
                    println!("Seasons:  {}", seasons.join(", "));
                }
                println!("Tier:     {}", recipe.tier.label());
                if !recipe.description.is_empty() {
                    println!("About:    {}", recipe.description);
                }
                if recipe.servings > 0 {
                    println!("Servings: {}", recipe.servings);
                }
                if recipe.total_time_minutes > 0 {
                    println!(
                        "Time:     {} min (prep {} min)",
                        recipe.total_time_minutes, recipe.prep_time_minutes
                    );
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(recipe).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", recipe.id);
            }
        }
    }

    /// Print a recipe's build steps with their ingredients
    pub fn print_components(&self, components: &[(&RecipeComponent, Vec<&Ingredient>)]) {
        match self.format {
            OutputFormat::Human => {
                for (component, ingredients) in components {
                    println!();
                    println!("── {} ──", component.name);
                    for ingredient in ingredients {
                        println!("  {}", ingredient);
                    }
                    if !component.instructions.is_empty() {
                        println!("  {}", component.instructions);
                    }
                }
            }
            OutputFormat::Json => {
                let rows: Vec<_> = components
                    .iter()
                    .map(|(component, ingredients)| {
                        serde_json::json!({
                            "component": component,
                            "ingredients": ingredients
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows).unwrap());
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print the paywall prompt for a recipe the viewer is not entitled
    /// to see
    pub fn print_locked_recipe(&self, recipe: &Recipe) {
        let plan = recipe.access_level.plan_label();
        match self.format {
            OutputFormat::Human => {
                println!("{} 🔒", recipe.title);
                println!();
                println!("This recipe is part of the {} plan.", plan);
                println!("Upgrade to unlock the full method and ingredients.");
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "id": recipe.id,
                        "title": recipe.title,
                        "locked": true,
                        "required_plan": plan
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}", recipe.id);
            }
        }
    }

    /// Print a recipe list row; gated items carry a lock marker
    pub fn print_recipes(&self, recipes: &[(&Recipe, bool)]) {
        match self.format {
            OutputFormat::Human => {
                if recipes.is_empty() {
                    println!("No recipes found.");
                    return;
                }
                for (recipe, viewable) in recipes {
                    let marker = if *viewable { " " } else { "🔒" };
                    println!(
                        "{} {} | {} | {}",
                        marker,
                        &recipe.id,
                        truncate(&recipe.title, 35),
                        recipe.cuisine_type.label()
                    );
                }
                println!("\n{} recipe(s)", recipes.len());
            }
            OutputFormat::Json => {
                let rows: Vec<_> = recipes
                    .iter()
                    .map(|(recipe, viewable)| {
                        serde_json::json!({
                            "id": recipe.id,
                            "title": recipe.title,
                            "cuisine": recipe.cuisine_type.label(),
                            "access_level": recipe.access_level,
                            "viewable": viewable
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows).unwrap());
            }
            OutputFormat::Quiet => {
                for (recipe, _) in recipes {
                    println!("{}", recipe.id);
                }
            }
        }
    }

    /// Print a list of chefs
    pub fn print_chefs(&self, chefs: &[&Chef]) {
        match self.format {
            OutputFormat::Human => {
                if chefs.is_empty() {
                    println!("No chefs found.");
                    return;
                }
                for chef in chefs {
                    let badge = if chef.is_verified { " ✓" } else { "" };
                    println!("{} | {}{}", chef.id, chef, badge);
                }
                println!("\n{} chef(s)", chefs.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(chefs).unwrap());
            }
            OutputFormat::Quiet => {
                for chef in chefs {
                    println!("{}", chef.id);
                }
            }
        }
    }

    /// Print a list of collections
    pub fn print_collections(&self, collections: &[&Collection]) {
        match self.format {
            OutputFormat::Human => {
                if collections.is_empty() {
                    println!("No collections found.");
                    return;
                }
                for collection in collections {
                    let badge = if collection.is_bocuse_official {
                        " [official]"
                    } else {
                        ""
                    };
                    println!("{} | {}{}", collection.id, collection.title, badge);
                }
                println!("\n{} collection(s)", collections.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(collections).unwrap());
            }
            OutputFormat::Quiet => {
                for collection in collections {
                    println!("{}", collection.id);
                }
            }
        }
    }

    /// Print comments on a recipe
    pub fn print_comments(&self, comments: &[&Comment]) {
        match self.format {
            OutputFormat::Human => {
                if comments.is_empty() {
                    println!("No comments yet.");
                    return;
                }
                for comment in comments {
                    println!(
                        "[{}] {}",
                        comment.created_at.format("%Y-%m-%d %H:%M"),
                        comment.content
                    );
                }
                println!("\n{} comment(s)", comments.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(comments).unwrap());
            }
            OutputFormat::Quiet => {
                for comment in comments {
                    println!("{}", comment.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Truncate a string to max length in bytes, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    // Back off to a char boundary so multibyte text never splits
    let mut end = max_len.saturating_sub(3);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
