//! Refresh command handler

use anyhow::Result;

use ladle_core::Session;

use crate::output::Output;

/// Re-fetch every table from the remote, reconciling local mutations.
///
/// Per-table failures are logged by the core; the command succeeds as
/// long as the session stays usable.
pub async fn refresh(session: &mut Session, output: &Output) -> Result<()> {
    output.message("Refreshing tables...");
    session.refresh_all().await;
    output.success(&format!(
        "Refreshed. {} recipes, {} chefs, {} collections",
        session.recipes.len(),
        session.chefs.len(),
        session.collections.len()
    ));
    Ok(())
}
