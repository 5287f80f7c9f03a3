//! Ladle CLI
//!
//! Command-line interface for Ladle - recipe browsing and membership.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ladle_core::{Config, CuisineType, SeasonTag, Session};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "ladle")]
#[command(about = "Ladle - recipe browsing with tiered membership")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and show recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Browse and show chefs
    Chef {
        #[command(subcommand)]
        command: ChefCommands,
    },
    /// Browse curated collections
    Collection {
        #[command(subcommand)]
        command: CollectionCommands,
    },
    /// Like a recipe
    Like {
        /// Recipe ID
        recipe_id: String,
    },
    /// Remove a like from a recipe
    Unlike {
        /// Recipe ID
        recipe_id: String,
    },
    /// Comments on recipes
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// Follow a chef
    Follow {
        /// Chef ID
        chef_id: String,
    },
    /// Stop following a chef
    Unfollow {
        /// Chef ID
        chef_id: String,
    },
    /// Sign up, sign in, sign out
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Re-fetch all tables from the remote
    Refresh,
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// List published recipes
    #[command(alias = "ls")]
    List {
        /// Filter by cuisine (french, japanese, ...)
        #[arg(short, long)]
        cuisine: Option<CuisineType>,
        /// Filter by season (spring, summer, autumn, winter)
        #[arg(short, long)]
        season: Option<SeasonTag>,
    },
    /// Show recipe detail (entitlement checked)
    Show {
        /// Recipe ID
        id: String,
    },
}

#[derive(Subcommand)]
enum ChefCommands {
    /// List all chefs
    #[command(alias = "ls")]
    List,
    /// Show a chef and their recipes
    Show {
        /// Chef ID
        id: String,
    },
}

#[derive(Subcommand)]
enum CollectionCommands {
    /// List collections
    #[command(alias = "ls")]
    List,
    /// Show a collection and its recipes
    Show {
        /// Collection ID
        id: String,
    },
}

#[derive(Subcommand)]
enum CommentCommands {
    /// Comment on a recipe
    Add {
        /// Recipe ID
        recipe_id: String,
        /// Comment text
        content: String,
    },
    /// List comments on a recipe
    #[command(alias = "ls")]
    List {
        /// Recipe ID
        recipe_id: String,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Register a new account
    Signup {
        /// Email address
        email: String,
        /// Password
        password: String,
        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Sign in
    Signin {
        /// Email address
        email: String,
        /// Password
        password: String,
    },
    /// Sign out
    Signout,
    /// Show the signed-in identity
    Whoami,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, remote_url, remote_anon_key,
        /// remote_enabled)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    init_logging();

    // Config commands don't need a session
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(&output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, &output)
            }
        };
    }

    let config = Config::load().context("Failed to load configuration")?;
    let mut session = Session::new(config).context("Failed to open session")?;

    // The explicit refresh command does its own (forced) fetch
    if !matches!(cli.command, Commands::Refresh) {
        session.ensure_fetched_all().await;
        tracing::debug!("initial fetch complete");
    }

    match cli.command {
        Commands::Recipe { command } => match command {
            RecipeCommands::List { cuisine, season } => {
                commands::recipe::list(&session, cuisine, season, &output)
            }
            RecipeCommands::Show { id } => commands::recipe::show(&session, id, &output),
        },
        Commands::Chef { command } => match command {
            ChefCommands::List => commands::chef::list(&session, &output),
            ChefCommands::Show { id } => commands::chef::show(&session, id, &output),
        },
        Commands::Collection { command } => match command {
            CollectionCommands::List => commands::collection::list(&session, &output),
            CollectionCommands::Show { id } => commands::collection::show(&session, id, &output),
        },
        Commands::Like { recipe_id } => commands::social::like(&mut session, recipe_id, &output).await,
        Commands::Unlike { recipe_id } => {
            commands::social::unlike(&mut session, recipe_id, &output).await
        }
        Commands::Comment { command } => match command {
            CommentCommands::Add { recipe_id, content } => {
                commands::social::comment_add(&mut session, recipe_id, content, &output).await
            }
            CommentCommands::List { recipe_id } => {
                commands::social::comment_list(&session, recipe_id, &output)
            }
        },
        Commands::Follow { chef_id } => {
            commands::social::follow(&mut session, chef_id, &output).await
        }
        Commands::Unfollow { chef_id } => {
            commands::social::unfollow(&mut session, chef_id, &output).await
        }
        Commands::Auth { command } => match command {
            AuthCommands::Signup {
                email,
                password,
                name,
            } => {
                let display_name = name.unwrap_or_else(|| email.clone());
                commands::auth::signup(&session, email, password, display_name, &output).await
            }
            AuthCommands::Signin { email, password } => {
                commands::auth::signin(&session, email, password, &output).await
            }
            AuthCommands::Signout => commands::auth::signout(&session, &output).await,
            AuthCommands::Whoami => commands::auth::whoami(&session, &output).await,
        },
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Refresh => commands::refresh::refresh(&mut session, &output).await,
    }
}

/// Initialize logging to stderr when LADLE_LOG is set
fn init_logging() {
    let Ok(level) = std::env::var("LADLE_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!("ladle_core={},ladle_cli={}", level, level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
