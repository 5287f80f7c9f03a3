//! Auth command handlers

use anyhow::{Context, Result};

use ladle_core::Session;

use crate::output::{Output, OutputFormat};

/// Register a new account and sign in
pub async fn signup(
    session: &Session,
    email: String,
    password: String,
    display_name: String,
    output: &Output,
) -> Result<()> {
    let user = session
        .sign_up(&email, &password, &display_name)
        .await
        .context("Sign-up failed")?;
    output.success(&format!("Signed up as {}", user.display_name));
    Ok(())
}

/// Sign in with email and password
pub async fn signin(
    session: &Session,
    email: String,
    password: String,
    output: &Output,
) -> Result<()> {
    let user = session
        .sign_in(&email, &password)
        .await
        .context("Sign-in failed")?;
    output.success(&format!("Signed in as {}", user.display_name));
    Ok(())
}

/// Sign out the current user
pub async fn signout(session: &Session, output: &Output) -> Result<()> {
    session.sign_out().await.context("Sign-out failed")?;
    output.success("Signed out");
    Ok(())
}

/// Show the signed-in identity, refreshing the profile so plan changes
/// made by the payment webhook show up
pub async fn whoami(session: &Session, output: &Output) -> Result<()> {
    if session.current_user().is_some() {
        // Best effort; the cached identity is fine when the refresh fails
        let _ = session.refresh_profile().await;
    }

    match session.current_user() {
        None => output.message("Not signed in."),
        Some(user) => match output.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&user).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", user.id);
            }
            OutputFormat::Human => {
                println!("{} <{}>", user.display_name, user.email);
                println!("Plan: {}", user.membership_plan.label());
            }
        },
    }
    Ok(())
}
