//! Ladle Core Library
//!
//! This crate provides the core functionality for Ladle, a recipe-browsing
//! and membership client: typed collections of recipes, chefs, and social
//! records, cached locally and synchronized with a hosted table service,
//! gated by a tiered-membership entitlement model.
//!
//! # Architecture
//!
//! - **Seed-then-fetch**: every collection starts from a built-in dataset
//!   and is replaced by the remote table on the first successful fetch
//! - **Optimistic mutations**: local apply first, remote persist second,
//!   rollback on failure
//!
//! All queries are served directly from the in-memory snapshot.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut session = Session::new(config)?;
//! session.ensure_fetched_all().await;
//!
//! // Browse
//! for recipe in session.published_recipes() {
//!     println!("{}", recipe);
//! }
//!
//! // Entitlement
//! let recipe = session.recipes.get("rec-2").unwrap();
//! if session.can_view(recipe) { /* show detail */ }
//! ```
//!
//! # Modules
//!
//! - `session`: One running app instance (main entry point)
//! - `store`: Generic synced collection over one remote table
//! - `remote`: Table client (hosted REST, local files, or in-memory)
//! - `access`: Entitlement engine
//! - `auth`: Sign-up/sign-in with local or hosted providers
//! - `models`: Data structures for chefs, recipes, and social records
//! - `seed`: Default dataset
//! - `config`: Application configuration

pub mod access;
pub mod auth;
pub mod config;
pub mod models;
pub mod remote;
pub mod seed;
pub mod session;
pub mod store;

pub use access::{can_access, AccessLevel, MembershipPlan};
pub use auth::{Auth, AuthError};
pub use config::Config;
pub use models::{
    Chef, ChefFollow, Collection, CollectionRecipe, Comment, CuisineType, Ingredient, Recipe,
    RecipeComponent, RecipeTier, SeasonTag, User, UserLike,
};
pub use remote::{RemoteError, Table, TableClient};
pub use session::{Session, SessionError};
pub use store::{StoreError, SyncedCollection};
