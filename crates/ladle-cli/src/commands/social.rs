//! Social command handlers (likes, comments, follows)
//!
//! All of these require a signed-in user; the core returns a descriptive
//! error otherwise.

use anyhow::{anyhow, Context, Result};

use ladle_core::Session;

use crate::output::Output;

/// Like a recipe
pub async fn like(session: &mut Session, recipe_id: String, output: &Output) -> Result<()> {
    ensure_recipe(session, &recipe_id)?;
    session
        .like(&recipe_id)
        .await
        .context("Failed to like recipe")?;
    output.success(&format!("Liked {}", recipe_id));
    Ok(())
}

/// Remove a like from a recipe
pub async fn unlike(session: &mut Session, recipe_id: String, output: &Output) -> Result<()> {
    session
        .unlike(&recipe_id)
        .await
        .context("Failed to unlike recipe")?;
    output.success(&format!("Unliked {}", recipe_id));
    Ok(())
}

/// Comment on a recipe
pub async fn comment_add(
    session: &mut Session,
    recipe_id: String,
    content: String,
    output: &Output,
) -> Result<()> {
    ensure_recipe(session, &recipe_id)?;
    let comment = session
        .add_comment(&recipe_id, &content)
        .await
        .context("Failed to add comment")?;
    output.success(&format!("Commented on {} ({})", recipe_id, comment.id));
    Ok(())
}

/// List comments on a recipe
pub fn comment_list(session: &Session, recipe_id: String, output: &Output) -> Result<()> {
    ensure_recipe(session, &recipe_id)?;
    output.print_comments(&session.comments_for(&recipe_id));
    Ok(())
}

/// Follow a chef
pub async fn follow(session: &mut Session, chef_id: String, output: &Output) -> Result<()> {
    if session.chefs.get(&chef_id).is_none() {
        return Err(anyhow!("Chef not found: {}", chef_id));
    }
    session
        .follow(&chef_id)
        .await
        .context("Failed to follow chef")?;
    output.success(&format!("Following {}", chef_id));
    Ok(())
}

/// Stop following a chef
pub async fn unfollow(session: &mut Session, chef_id: String, output: &Output) -> Result<()> {
    session
        .unfollow(&chef_id)
        .await
        .context("Failed to unfollow chef")?;
    output.success(&format!("Unfollowed {}", chef_id));
    Ok(())
}

fn ensure_recipe(session: &Session, recipe_id: &str) -> Result<()> {
    if session.recipes.get(recipe_id).is_none() {
        return Err(anyhow!("Recipe not found: {}", recipe_id));
    }
    Ok(())
}
