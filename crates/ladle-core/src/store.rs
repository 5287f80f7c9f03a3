//! Synced collection store
//!
//! A [`SyncedCollection`] is the in-memory mirror of one remote table:
//! queries are served synchronously from the local snapshot, mutations are
//! applied locally first (optimistic) and then persisted through the
//! [`TableClient`]. A mutation whose remote call fails is rolled back, so
//! the local snapshot always equals seed-or-fetched state plus the
//! mutations the remote has acknowledged.
//!
//! ## Initialization
//!
//! A collection starts from seed rows so callers always have something to
//! display, then [`SyncedCollection::refresh`] fetches the authoritative
//! table once. A failed or empty fetch keeps the seed and is not retried.
//!
//! ## Reconciliation
//!
//! Mutations bump a monotonic version counter and append to a small
//! change log. When a fetch resolves, any mutations applied while it was
//! in flight are re-applied by id on top of the remote snapshot instead
//! of being clobbered by a wholesale replacement.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::remote::{RemoteError, Table, TableClient};

/// Errors from store mutations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No local record with the requested id
    #[error("No record with id '{id}' in '{table}'")]
    NotFound { table: &'static str, id: String },

    /// Patch could not be applied to the record
    #[error("Failed to apply patch in '{table}': {source}")]
    Patch {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Remote persistence failed; the local change was rolled back
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Change recorded for reconciliation with an in-flight fetch.
#[derive(Debug, Clone)]
enum Change {
    Upsert(String),
    Remove(String),
}

/// Local cache of one remote table with optimistic, rolled-back mutations.
pub struct SyncedCollection<T: Table> {
    items: Vec<T>,
    remote: Arc<TableClient>,
    /// Bumped on every local mutation
    version: u64,
    /// Mutations since the last reconciled fetch, tagged with the version
    /// they produced
    log: Vec<(u64, Change)>,
    /// Whether the one-time initial fetch has been attempted
    fetched: bool,
}

impl<T: Table> SyncedCollection<T> {
    /// Create an empty collection backed by the given client.
    pub fn new(remote: Arc<TableClient>) -> Self {
        Self::with_seed(remote, Vec::new())
    }

    /// Create a collection pre-populated with seed rows.
    ///
    /// Seed rows are display defaults only; they are not persisted.
    pub fn with_seed(remote: Arc<TableClient>, seed: Vec<T>) -> Self {
        Self {
            items: seed,
            remote,
            version: 0,
            log: Vec::new(),
            fetched: false,
        }
    }

    // ==================== Queries ====================

    /// Current snapshot, insertion order preserved.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// All records matching a predicate, relative order preserved.
    ///
    /// Field-equality filters are expressed as typed closures, e.g.
    /// `likes.filter(|l| l.recipe_id == recipe_id)`.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<&T> {
        self.items.iter().filter(|item| pred(item)).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ==================== Mutations ====================

    /// Append a record locally, then persist it remotely.
    ///
    /// On remote failure the record is removed again and the error
    /// returned; the snapshot is unchanged.
    pub async fn add(&mut self, item: T) -> Result<(), StoreError> {
        let id = item.id().to_string();
        self.apply_upsert(item.clone());

        if let Err(e) = self.remote.insert(&item).await {
            warn!(table = T::NAME, id = %id, "remote insert failed, rolling back: {}", e);
            self.apply_remove(&id);
            return Err(e.into());
        }
        Ok(())
    }

    /// Merge a JSON object of changed fields into the record locally, then
    /// persist the partial update remotely.
    ///
    /// On remote failure the previous record is restored in place.
    pub async fn update(&mut self, id: &str, patch: Value) -> Result<(), StoreError> {
        let previous = self
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                table: T::NAME,
                id: id.to_string(),
            })?;
        let merged = merge_record(&previous, &patch)?;
        self.apply_upsert(merged);

        if let Err(e) = self.remote.update::<T>(id, &patch).await {
            warn!(table = T::NAME, id = %id, "remote update failed, rolling back: {}", e);
            self.apply_upsert(previous);
            return Err(e.into());
        }
        Ok(())
    }

    /// Remove a record locally, then delete it remotely.
    ///
    /// On remote failure the record is re-inserted at its old position.
    /// Removing an id that is not present is a no-op.
    pub async fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let Some(position) = self.items.iter().position(|item| item.id() == id) else {
            return Ok(());
        };
        let removed = self.items.remove(position);
        self.record_change(Change::Remove(id.to_string()));

        if let Err(e) = self.remote.delete::<T>(id).await {
            warn!(table = T::NAME, id = %id, "remote delete failed, rolling back: {}", e);
            self.items.insert(position, removed);
            self.record_change(Change::Upsert(id.to_string()));
            return Err(e.into());
        }
        Ok(())
    }

    // ==================== Fetch & reconcile ====================

    /// Whether the initial fetch has been attempted.
    pub fn fetched(&self) -> bool {
        self.fetched
    }

    /// One-time initial fetch; subsequent calls are no-ops.
    ///
    /// Returns `true` when the snapshot was replaced by remote rows.
    pub async fn ensure_fetched(&mut self) -> Result<bool, StoreError> {
        if self.fetched {
            return Ok(false);
        }
        self.refresh().await
    }

    /// Fetch the authoritative table and reconcile it into the snapshot.
    ///
    /// An empty result keeps the current (seed) rows. Mutations applied
    /// while the fetch was in flight win over the fetched rows for their
    /// ids.
    pub async fn refresh(&mut self) -> Result<bool, StoreError> {
        let fetch_version = self.version;
        let result = self.remote.select_all::<T>().await;
        self.fetched = true;

        let rows = result?;
        if rows.is_empty() {
            debug!(table = T::NAME, "fetch returned no rows, keeping local data");
            return Ok(false);
        }

        self.reconcile(rows, fetch_version);
        Ok(true)
    }

    /// Replace the snapshot with fetched rows, re-applying every mutation
    /// recorded after `fetch_version`.
    fn reconcile(&mut self, rows: Vec<T>, fetch_version: u64) {
        let racing: Vec<Change> = self
            .log
            .iter()
            .filter(|(version, _)| *version > fetch_version)
            .map(|(_, change)| change.clone())
            .collect();
        if !racing.is_empty() {
            debug!(
                table = T::NAME,
                count = racing.len(),
                "re-applying mutations that raced the fetch"
            );
        }

        let local = std::mem::replace(&mut self.items, rows);
        for change in racing {
            match change {
                Change::Upsert(id) => {
                    if let Some(item) = local.iter().find(|item| item.id() == id) {
                        match self.items.iter().position(|existing| existing.id() == id) {
                            Some(pos) => self.items[pos] = item.clone(),
                            None => self.items.push(item.clone()),
                        }
                    }
                }
                Change::Remove(id) => {
                    self.items.retain(|item| item.id() != id);
                }
            }
        }
        self.log.clear();
    }

    fn apply_upsert(&mut self, item: T) {
        let id = item.id().to_string();
        match self.items.iter().position(|existing| existing.id() == id) {
            Some(pos) => self.items[pos] = item,
            None => self.items.push(item),
        }
        self.record_change(Change::Upsert(id));
    }

    fn apply_remove(&mut self, id: &str) {
        self.items.retain(|item| item.id() != id);
        self.record_change(Change::Remove(id.to_string()));
    }

    fn record_change(&mut self, change: Change) {
        self.version += 1;
        self.log.push((self.version, change));
    }
}

/// Merge a JSON object patch into a typed record.
fn merge_record<T: Table>(record: &T, patch: &Value) -> Result<T, StoreError> {
    let mut value = serde_json::to_value(record).map_err(|source| StoreError::Patch {
        table: T::NAME,
        source,
    })?;
    if let (Some(target), Some(fields)) = (value.as_object_mut(), patch.as_object()) {
        for (key, field) in fields {
            target.insert(key.clone(), field.clone());
        }
    }
    serde_json::from_value(value).map_err(|source| StoreError::Patch {
        table: T::NAME,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessLevel;
    use crate::models::{Recipe, UserLike};
    use serde_json::json;

    fn memory_client() -> Arc<TableClient> {
        Arc::new(TableClient::memory())
    }

    #[tokio::test]
    async fn test_add_then_get_is_immediate() {
        let mut likes = SyncedCollection::<UserLike>::new(memory_client());
        let like = UserLike::new("user-1", "rec-1");
        let id = like.id.clone();

        likes.add(like.clone()).await.unwrap();

        assert_eq!(likes.get(&id), Some(&like));
        assert_eq!(likes.len(), 1);
    }

    #[tokio::test]
    async fn test_add_rolls_back_on_remote_failure() {
        let client = memory_client();
        let mut likes = SyncedCollection::<UserLike>::new(client.clone());
        client.set_fail_writes(true);

        let like = UserLike::new("user-1", "rec-1");
        let id = like.id.clone();

        let err = likes.add(like).await.unwrap_err();
        assert!(matches!(err, StoreError::Remote(_)));
        assert!(likes.get(&id).is_none());
        assert!(likes.is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_partial_fields() {
        let mut recipes = SyncedCollection::<Recipe>::new(memory_client());
        let recipe = Recipe::new("chef-1", "Consommé");
        let id = recipe.id.clone();
        recipes.add(recipe).await.unwrap();

        recipes
            .update(&id, json!({"title": "Double Consommé", "servings": 4}))
            .await
            .unwrap();

        let updated = recipes.get(&id).unwrap();
        assert_eq!(updated.title, "Double Consommé");
        assert_eq!(updated.servings, 4);
        assert_eq!(updated.chef_id, "chef-1");
    }

    #[tokio::test]
    async fn test_update_rolls_back_on_remote_failure() {
        let client = memory_client();
        let mut recipes = SyncedCollection::<Recipe>::new(client.clone());
        let recipe = Recipe::new("chef-1", "Consommé");
        let id = recipe.id.clone();
        recipes.add(recipe).await.unwrap();

        client.set_fail_writes(true);
        let err = recipes.update(&id, json!({"title": "Changed"})).await;
        assert!(err.is_err());
        assert_eq!(recipes.get(&id).unwrap().title, "Consommé");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_error() {
        let mut recipes = SyncedCollection::<Recipe>::new(memory_client());
        let err = recipes.update("missing", json!({"title": "x"})).await;
        assert!(matches!(err, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_remove_rolls_back_at_original_position() {
        let client = memory_client();
        let mut recipes = SyncedCollection::<Recipe>::new(client.clone());
        for title in ["First", "Second", "Third"] {
            recipes.add(Recipe::new("chef-1", title)).await.unwrap();
        }
        let middle_id = recipes.items()[1].id.clone();

        client.set_fail_writes(true);
        assert!(recipes.remove(&middle_id).await.is_err());

        let titles: Vec<&str> = recipes.items().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_noop() {
        let mut recipes = SyncedCollection::<Recipe>::new(memory_client());
        recipes.remove("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_filter_preserves_relative_order() {
        let mut likes = SyncedCollection::<UserLike>::new(memory_client());
        let a = UserLike::new("user-1", "rec-1");
        let b = UserLike::new("user-2", "rec-2");
        let c = UserLike::new("user-3", "rec-1");
        for like in [&a, &b, &c] {
            likes.add(like.clone()).await.unwrap();
        }

        let for_rec1 = likes.filter(|l| l.recipe_id == "rec-1");
        assert_eq!(for_rec1.len(), 2);
        assert_eq!(for_rec1[0].id, a.id);
        assert_eq!(for_rec1[1].id, c.id);
        assert_eq!(likes.filter(|l| l.recipe_id == "rec-2"), vec![&b]);
    }

    #[tokio::test]
    async fn test_seed_kept_when_fetch_is_empty() {
        let seed = vec![Recipe::new("chef-1", "Seed Recipe")];
        let mut recipes = SyncedCollection::with_seed(memory_client(), seed);

        let replaced = recipes.ensure_fetched().await.unwrap();
        assert!(!replaced);
        assert_eq!(recipes.items()[0].title, "Seed Recipe");
        assert!(recipes.fetched());
    }

    #[tokio::test]
    async fn test_fetch_replaces_seed_with_remote_rows() {
        let client = memory_client();
        let remote_recipe = Recipe::new("chef-1", "Remote Turbot")
            .with_access_level(AccessLevel::Pro)
            .published();
        client.insert(&remote_recipe).await.unwrap();

        let seed = vec![Recipe::new("chef-1", "Seed Recipe")];
        let mut recipes = SyncedCollection::with_seed(client, seed);

        let replaced = recipes.ensure_fetched().await.unwrap();
        assert!(replaced);
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes.items()[0].title, "Remote Turbot");
    }

    #[tokio::test]
    async fn test_ensure_fetched_runs_once() {
        let client = memory_client();
        let mut recipes = SyncedCollection::<Recipe>::new(client.clone());
        recipes.ensure_fetched().await.unwrap();

        // Rows arriving later are not picked up by ensure_fetched
        client
            .insert(&Recipe::new("chef-1", "Late Arrival"))
            .await
            .unwrap();
        let replaced = recipes.ensure_fetched().await.unwrap();
        assert!(!replaced);
        assert!(recipes.is_empty());

        // An explicit refresh picks them up
        let replaced = recipes.refresh().await.unwrap();
        assert!(replaced);
        assert_eq!(recipes.len(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_keeps_mutation_that_raced_fetch() {
        // Simulate the race by reconciling a stale snapshot directly:
        // the fetch started at version 0, then a local add happened.
        let client = memory_client();
        let mut likes = SyncedCollection::<UserLike>::new(client);

        let stale_snapshot = vec![UserLike::new("user-9", "rec-9")];
        let racing = UserLike::new("user-1", "rec-1");
        likes.add(racing.clone()).await.unwrap();

        likes.reconcile(stale_snapshot, 0);

        assert_eq!(likes.len(), 2);
        assert!(likes.get(&racing.id).is_some());
    }

    #[tokio::test]
    async fn test_reconcile_keeps_removal_that_raced_fetch() {
        let client = memory_client();
        let mut likes = SyncedCollection::<UserLike>::new(client);

        let like = UserLike::new("user-1", "rec-1");
        likes.add(like.clone()).await.unwrap();
        let fetch_version = likes.version;
        likes.remove(&like.id).await.unwrap();

        // Fetch snapshot still contains the row deleted locally
        likes.reconcile(vec![like.clone()], fetch_version);

        assert!(likes.get(&like.id).is_none());
    }

    #[tokio::test]
    async fn test_reconcile_without_race_replaces_wholesale() {
        let client = memory_client();
        let mut likes = SyncedCollection::<UserLike>::new(client);
        let old = UserLike::new("user-1", "rec-1");
        likes.add(old.clone()).await.unwrap();

        let fresh = vec![UserLike::new("user-2", "rec-2")];
        let current_version = likes.version;
        likes.reconcile(fresh, current_version);

        assert_eq!(likes.len(), 1);
        assert!(likes.get(&old.id).is_none());
    }
}
