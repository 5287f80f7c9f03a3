//! Application session
//!
//! A [`Session`] owns everything the app needs at runtime: configuration,
//! the auth provider, the shared table client, and one synced collection
//! per entity. It is constructed once at startup with the default dataset
//! and passed by reference; there are no global singletons.
//!
//! Typed convenience queries live here so callers never sort or join by
//! hand: components and ingredients come back in `sort_order`, social
//! queries drop records whose author row is missing, and
//! [`Session::can_view`] combines the signed-in identity's plan with the
//! entitlement engine.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::access;
use crate::auth::{Auth, AuthError};
use crate::config::Config;
use crate::models::{
    Chef, ChefFollow, Collection, CollectionRecipe, Comment, Ingredient, Recipe, RecipeComponent,
    User, UserLike,
};
use crate::remote::{RemoteError, Table, TableClient};
use crate::seed;
use crate::store::{StoreError, SyncedCollection};

/// Errors from session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Sign in to do that")]
    SignInRequired,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// One running instance of the app: identity, remote client, and the
/// synced collection for every table.
pub struct Session {
    config: Config,
    auth: Auth,
    tables: Arc<TableClient>,
    pub chefs: SyncedCollection<Chef>,
    pub recipes: SyncedCollection<Recipe>,
    pub components: SyncedCollection<RecipeComponent>,
    pub ingredients: SyncedCollection<Ingredient>,
    pub collections: SyncedCollection<Collection>,
    pub collection_recipes: SyncedCollection<CollectionRecipe>,
    pub likes: SyncedCollection<UserLike>,
    pub comments: SyncedCollection<Comment>,
    pub follows: SyncedCollection<ChefFollow>,
    pub users: SyncedCollection<User>,
}

impl Session {
    /// Build a session from configuration, restoring any persisted
    /// sign-in and seeding every collection with the default dataset.
    pub fn new(config: Config) -> Result<Self, SessionError> {
        let auth = Auth::from_config(&config)?;
        let tables = Arc::new(TableClient::from_config(&config)?);
        tables.set_bearer(auth.access_token());
        Ok(Self::assemble(config, auth, tables))
    }

    fn assemble(config: Config, auth: Auth, tables: Arc<TableClient>) -> Self {
        Self {
            chefs: SyncedCollection::with_seed(tables.clone(), seed::seed_chefs()),
            recipes: SyncedCollection::with_seed(tables.clone(), seed::seed_recipes()),
            components: SyncedCollection::with_seed(tables.clone(), seed::seed_components()),
            ingredients: SyncedCollection::with_seed(tables.clone(), seed::seed_ingredients()),
            collections: SyncedCollection::with_seed(tables.clone(), seed::seed_collections()),
            collection_recipes: SyncedCollection::with_seed(
                tables.clone(),
                seed::seed_collection_recipes(),
            ),
            likes: SyncedCollection::new(tables.clone()),
            comments: SyncedCollection::new(tables.clone()),
            follows: SyncedCollection::new(tables.clone()),
            users: SyncedCollection::new(tables.clone()),
            config,
            auth,
            tables,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tables(&self) -> &Arc<TableClient> {
        &self.tables
    }

    // ==================== Identity ====================

    /// The signed-in identity, if any.
    pub fn current_user(&self) -> Option<User> {
        self.auth.current_user()
    }

    /// Subscribe to identity transitions.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.auth.subscribe()
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, SessionError> {
        let user = self.auth.sign_up(email, password, display_name).await?;
        self.tables.set_bearer(self.auth.access_token());
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let user = self.auth.sign_in(email, password).await?;
        self.tables.set_bearer(self.auth.access_token());
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.auth.sign_out().await?;
        self.tables.set_bearer(None);
        Ok(())
    }

    /// Re-read the signed-in user's row to pick up out-of-band changes
    /// (the payment webhook updates `membership_plan` after checkout).
    pub async fn refresh_profile(&self) -> Result<Option<User>, SessionError> {
        let Some(current) = self.auth.current_user() else {
            return Ok(None);
        };
        let fresh = self.tables.select_by_id::<User>(&current.id).await?;
        if let Some(user) = &fresh {
            if user.membership_plan != current.membership_plan {
                info!(
                    plan = %user.membership_plan,
                    "membership plan changed out of band"
                );
            }
            self.auth.replace_identity(user.clone());
        }
        Ok(fresh)
    }

    fn require_user(&self) -> Result<User, SessionError> {
        self.auth.current_user().ok_or(SessionError::SignInRequired)
    }

    // ==================== Fetch ====================

    /// Run the one-time initial fetch for every collection.
    ///
    /// Per-table failures are logged, not propagated: the seed keeps the
    /// app usable when the remote is down.
    pub async fn ensure_fetched_all(&mut self) {
        log_fetch(Chef::NAME, self.chefs.ensure_fetched().await);
        log_fetch(Recipe::NAME, self.recipes.ensure_fetched().await);
        log_fetch(RecipeComponent::NAME, self.components.ensure_fetched().await);
        log_fetch(Ingredient::NAME, self.ingredients.ensure_fetched().await);
        log_fetch(Collection::NAME, self.collections.ensure_fetched().await);
        log_fetch(
            CollectionRecipe::NAME,
            self.collection_recipes.ensure_fetched().await,
        );
        log_fetch(UserLike::NAME, self.likes.ensure_fetched().await);
        log_fetch(Comment::NAME, self.comments.ensure_fetched().await);
        log_fetch(ChefFollow::NAME, self.follows.ensure_fetched().await);
        log_fetch(User::NAME, self.users.ensure_fetched().await);
    }

    /// Re-fetch every table, reconciling local mutations by id.
    pub async fn refresh_all(&mut self) {
        log_fetch(Chef::NAME, self.chefs.refresh().await);
        log_fetch(Recipe::NAME, self.recipes.refresh().await);
        log_fetch(RecipeComponent::NAME, self.components.refresh().await);
        log_fetch(Ingredient::NAME, self.ingredients.refresh().await);
        log_fetch(Collection::NAME, self.collections.refresh().await);
        log_fetch(CollectionRecipe::NAME, self.collection_recipes.refresh().await);
        log_fetch(UserLike::NAME, self.likes.refresh().await);
        log_fetch(Comment::NAME, self.comments.refresh().await);
        log_fetch(ChefFollow::NAME, self.follows.refresh().await);
        log_fetch(User::NAME, self.users.refresh().await);
    }

    // ==================== Entitlement ====================

    /// Whether the current viewer (anonymous when signed out) may see the
    /// recipe's full detail.
    pub fn can_view(&self, recipe: &Recipe) -> bool {
        let plan = self.auth.current_user().map(|user| user.membership_plan);
        access::can_access(plan, recipe.access_level)
    }

    // ==================== Catalog queries ====================

    /// Published recipes only, insertion order preserved.
    pub fn published_recipes(&self) -> Vec<&Recipe> {
        self.recipes.filter(|recipe| recipe.is_published)
    }

    pub fn recipes_by_chef(&self, chef_id: &str) -> Vec<&Recipe> {
        self.recipes
            .filter(|recipe| recipe.chef_id == chef_id && recipe.is_published)
    }

    /// Build steps of a recipe in display order.
    pub fn components_of(&self, recipe_id: &str) -> Vec<&RecipeComponent> {
        let mut components = self.components.filter(|c| c.recipe_id == recipe_id);
        components.sort_by_key(|c| c.sort_order);
        components
    }

    /// Ingredients of one component in display order.
    pub fn ingredients_of(&self, component_id: &str) -> Vec<&Ingredient> {
        let mut ingredients = self.ingredients.filter(|i| i.component_id == component_id);
        ingredients.sort_by_key(|i| i.sort_order);
        ingredients
    }

    /// Recipes of a collection in the collection's display order.
    pub fn recipes_in_collection(&self, collection_id: &str) -> Vec<&Recipe> {
        let mut entries = self
            .collection_recipes
            .filter(|entry| entry.collection_id == collection_id);
        entries.sort_by_key(|entry| entry.sort_order);
        entries
            .into_iter()
            .filter_map(|entry| self.recipes.get(&entry.recipe_id))
            .collect()
    }

    // ==================== Social queries ====================

    /// Referential integrity is not enforced on write, so social records
    /// may point at users that no longer exist; those are dropped here.
    fn user_known(&self, user_id: &str) -> bool {
        if self.users.get(user_id).is_some() {
            return true;
        }
        self.auth
            .current_user()
            .is_some_and(|user| user.id == user_id)
    }

    pub fn likes_for(&self, recipe_id: &str) -> Vec<&UserLike> {
        self.likes
            .filter(|like| like.recipe_id == recipe_id && self.user_known(&like.user_id))
    }

    pub fn comments_for(&self, recipe_id: &str) -> Vec<&Comment> {
        self.comments
            .filter(|comment| comment.recipe_id == recipe_id && self.user_known(&comment.user_id))
    }

    pub fn followers_of(&self, chef_id: &str) -> Vec<&ChefFollow> {
        self.follows
            .filter(|follow| follow.chef_id == chef_id && self.user_known(&follow.user_id))
    }

    pub fn like_count(&self, recipe_id: &str) -> usize {
        self.likes_for(recipe_id).len()
    }

    pub fn comment_count(&self, recipe_id: &str) -> usize {
        self.comments_for(recipe_id).len()
    }

    /// Whether the signed-in user has liked the recipe. False when
    /// signed out.
    pub fn is_liked(&self, recipe_id: &str) -> bool {
        self.current_like(recipe_id).is_some()
    }

    /// Whether the signed-in user follows the chef. False when signed out.
    pub fn is_following(&self, chef_id: &str) -> bool {
        self.current_follow(chef_id).is_some()
    }

    fn current_like(&self, recipe_id: &str) -> Option<&UserLike> {
        let user = self.auth.current_user()?;
        self.likes
            .filter(|like| like.recipe_id == recipe_id && like.user_id == user.id)
            .into_iter()
            .next()
    }

    fn current_follow(&self, chef_id: &str) -> Option<&ChefFollow> {
        let user = self.auth.current_user()?;
        self.follows
            .filter(|follow| follow.chef_id == chef_id && follow.user_id == user.id)
            .into_iter()
            .next()
    }

    // ==================== Social mutations ====================

    /// Like a recipe as the signed-in user. Liking twice is a no-op.
    pub async fn like(&mut self, recipe_id: &str) -> Result<(), SessionError> {
        let user = self.require_user()?;
        if self.is_liked(recipe_id) {
            return Ok(());
        }
        self.likes.add(UserLike::new(user.id, recipe_id)).await?;
        Ok(())
    }

    /// Remove the signed-in user's like. Unliking something never liked
    /// is a no-op.
    pub async fn unlike(&mut self, recipe_id: &str) -> Result<(), SessionError> {
        self.require_user()?;
        let Some(id) = self.current_like(recipe_id).map(|like| like.id.clone()) else {
            return Ok(());
        };
        self.likes.remove(&id).await?;
        Ok(())
    }

    /// Comment on a recipe as the signed-in user.
    pub async fn add_comment(
        &mut self,
        recipe_id: &str,
        content: &str,
    ) -> Result<Comment, SessionError> {
        let user = self.require_user()?;
        let comment = Comment::new(user.id, recipe_id, content);
        self.comments.add(comment.clone()).await?;
        Ok(comment)
    }

    /// Follow a chef as the signed-in user. Following twice is a no-op.
    pub async fn follow(&mut self, chef_id: &str) -> Result<(), SessionError> {
        let user = self.require_user()?;
        if self.is_following(chef_id) {
            return Ok(());
        }
        self.follows.add(ChefFollow::new(user.id, chef_id)).await?;
        Ok(())
    }

    /// Remove the signed-in user's follow.
    pub async fn unfollow(&mut self, chef_id: &str) -> Result<(), SessionError> {
        self.require_user()?;
        let Some(id) = self.current_follow(chef_id).map(|follow| follow.id.clone()) else {
            return Ok(());
        };
        self.follows.remove(&id).await?;
        Ok(())
    }
}

fn log_fetch(table: &'static str, result: Result<bool, StoreError>) {
    if let Err(e) = result {
        warn!(table, "fetch failed, keeping local data: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::MembershipPlan;
    use tempfile::TempDir;

    fn test_session(temp_dir: &TempDir) -> Session {
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            remote_url: None,
            remote_anon_key: None,
            remote_enabled: false,
        };
        Session::new(config).unwrap()
    }

    async fn signed_in_session(temp_dir: &TempDir) -> Session {
        let session = test_session(temp_dir);
        session
            .sign_up("kim@example.com", "hunter2", "Kim Aoki")
            .await
            .unwrap();
        session
    }

    #[test]
    fn test_new_session_is_seeded() {
        let temp_dir = TempDir::new().unwrap();
        let session = test_session(&temp_dir);

        assert!(!session.chefs.is_empty());
        assert!(!session.published_recipes().is_empty());
        assert!(session.likes.is_empty());
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_components_and_ingredients_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let session = test_session(&temp_dir);

        let components = session.components_of("rec-1");
        assert!(!components.is_empty());
        let orders: Vec<i32> = components.iter().map(|c| c.sort_order).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);

        let ingredients = session.ingredients_of(&components[0].id);
        let orders: Vec<i32> = ingredients.iter().map(|i| i.sort_order).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);
    }

    #[test]
    fn test_collection_recipes_in_display_order() {
        let temp_dir = TempDir::new().unwrap();
        let session = test_session(&temp_dir);

        let recipes = session.recipes_in_collection("col-1");
        assert_eq!(recipes.len(), 3);
        assert_eq!(recipes[0].id, "rec-2");
    }

    #[tokio::test]
    async fn test_social_requires_sign_in() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = test_session(&temp_dir);

        let err = session.like("rec-1").await.unwrap_err();
        assert!(matches!(err, SessionError::SignInRequired));
        let err = session.follow("chef-1").await.unwrap_err();
        assert!(matches!(err, SessionError::SignInRequired));
        let err = session.add_comment("rec-1", "hi").await.unwrap_err();
        assert!(matches!(err, SessionError::SignInRequired));
    }

    #[tokio::test]
    async fn test_like_unlike_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = signed_in_session(&temp_dir).await;

        assert!(!session.is_liked("rec-1"));
        session.like("rec-1").await.unwrap();
        assert!(session.is_liked("rec-1"));
        assert_eq!(session.like_count("rec-1"), 1);

        // Liking again does not duplicate
        session.like("rec-1").await.unwrap();
        assert_eq!(session.like_count("rec-1"), 1);

        session.unlike("rec-1").await.unwrap();
        assert!(!session.is_liked("rec-1"));
        assert_eq!(session.like_count("rec-1"), 0);
    }

    #[tokio::test]
    async fn test_follow_unfollow() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = signed_in_session(&temp_dir).await;

        session.follow("chef-2").await.unwrap();
        assert!(session.is_following("chef-2"));
        assert!(!session.is_following("chef-1"));

        session.unfollow("chef-2").await.unwrap();
        assert!(!session.is_following("chef-2"));
    }

    #[tokio::test]
    async fn test_comments_listed_for_recipe() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = signed_in_session(&temp_dir).await;

        session.add_comment("rec-1", "Perfect glaze.").await.unwrap();
        session.add_comment("rec-2", "Elsewhere.").await.unwrap();

        let comments = session.comments_for("rec-1");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "Perfect glaze.");
    }

    #[tokio::test]
    async fn test_dangling_social_records_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = signed_in_session(&temp_dir).await;

        session.add_comment("rec-1", "Mine.").await.unwrap();
        // A record from a user nobody knows about
        session
            .comments
            .add(Comment::new("ghost-user", "rec-1", "Orphaned."))
            .await
            .unwrap();

        let comments = session.comments_for("rec-1");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "Mine.");
        assert_eq!(session.comment_count("rec-1"), 1);
    }

    #[tokio::test]
    async fn test_can_view_anonymous_and_signed_in() {
        let temp_dir = TempDir::new().unwrap();
        let session = test_session(&temp_dir);

        let free = session.recipes.get("rec-1").unwrap().clone();
        let pro = session.recipes.get("rec-2").unwrap().clone();
        assert!(session.can_view(&free));
        assert!(!session.can_view(&pro));

        // A free sign-up still cannot see pro content
        session
            .sign_up("kim@example.com", "hunter2", "Kim")
            .await
            .unwrap();
        assert!(session.can_view(&free));
        assert!(!session.can_view(&pro));
    }

    #[tokio::test]
    async fn test_refresh_profile_picks_up_plan_change() {
        let temp_dir = TempDir::new().unwrap();
        let session = signed_in_session(&temp_dir).await;
        let mut user = session.current_user().unwrap();
        assert_eq!(user.membership_plan, MembershipPlan::Free);

        // The payment webhook writes the row behind our back
        user.membership_plan = MembershipPlan::Pro;
        session.tables().insert(&user).await.unwrap();

        session.refresh_profile().await.unwrap();
        assert_eq!(
            session.current_user().unwrap().membership_plan,
            MembershipPlan::Pro
        );

        let pro = session.recipes.get("rec-2").unwrap().clone();
        assert!(session.can_view(&pro));
    }

    #[tokio::test]
    async fn test_sign_out_drops_entitlements() {
        let temp_dir = TempDir::new().unwrap();
        let session = signed_in_session(&temp_dir).await;

        session.sign_out().await.unwrap();
        assert!(session.current_user().is_none());
        let pro = session.recipes.get("rec-2").unwrap().clone();
        assert!(!session.can_view(&pro));
    }

    #[tokio::test]
    async fn test_refresh_all_replaces_seed_with_remote_rows() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = test_session(&temp_dir);

        // The local table backend plays the role of the remote here
        let remote_chef = Chef::new("nina@fjord.no", "Nina Berg").verified();
        session.tables().insert(&remote_chef).await.unwrap();

        session.ensure_fetched_all().await;
        assert_eq!(session.chefs.len(), 1);
        assert_eq!(session.chefs.items()[0].display_name, "Nina Berg");
        // Tables with no remote rows keep their seed
        assert!(!session.recipes.is_empty());
    }
}
