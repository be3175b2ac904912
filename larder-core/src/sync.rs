//! Reconciliation between the local collection and the remote folder.
//!
//! The remote side holds one JSON file, `recipes.json`, containing the
//! whole collection. `pull` merges it into the local store by identity;
//! `push` overwrites it wholesale. Sync never deletes anything locally.

use crate::error::SyncError;
use crate::remote::RemoteStore;
use crate::store::RecipeStore;
use crate::types::{Recipe, SyncOutcome};

/// Exact name of the remote recipe file.
pub const RECIPES_FILE: &str = "recipes.json";

/// Merge-by-identity reconciler over a remote file store and the local
/// recipe store.
pub struct SyncReconciler<R, S> {
    remote: R,
    store: S,
}

impl<R: RemoteStore, S: RecipeStore> SyncReconciler<R, S> {
    pub fn new(remote: R, store: S) -> Self {
        Self { remote, store }
    }

    /// The remote collaborator.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// The local store collaborator.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Download the remote collection and insert every recipe that has no
    /// local counterpart with the same `(title, category)` identity.
    /// Existing local recipes are never touched: local wins on conflict.
    ///
    /// A failure partway through leaves already-inserted recipes in place;
    /// there is no rollback.
    pub async fn pull(&self, token: Option<&str>) -> Result<SyncOutcome, SyncError> {
        let token = token.ok_or(SyncError::NotAuthorized)?;

        let files = self.remote.list(token).await?;
        let file = match files.into_iter().find(|f| f.name == RECIPES_FILE) {
            Some(file) => file,
            None => {
                tracing::debug!(file = RECIPES_FILE, "remote file absent, nothing to sync");
                return Ok(SyncOutcome::NothingToSync);
            }
        };

        let body = self.remote.download(token, &file.id).await?;
        let recipes: Vec<Recipe> = serde_json::from_str(&body)?;
        let considered = recipes.len();

        for recipe in recipes {
            if self.store.find(&recipe.title, recipe.category)?.is_some() {
                tracing::debug!(title = %recipe.title, "local copy exists, keeping local");
                continue;
            }
            tracing::debug!(title = %recipe.title, "inserting recipe from remote");
            self.store.insert(&recipe)?;
        }

        Ok(SyncOutcome::Pulled { considered })
    }

    /// Serialize the entire local collection and replace the remote file
    /// with it, creating the file if this is the first push. No diffing,
    /// no per-recipe granularity.
    pub async fn push(&self, token: Option<&str>) -> Result<SyncOutcome, SyncError> {
        let token = token.ok_or(SyncError::NotAuthorized)?;

        let recipes = self.store.all()?;
        let count = recipes.len();
        let body = serde_json::to_string(&recipes)?;

        let files = self.remote.list(token).await?;
        match files.into_iter().find(|f| f.name == RECIPES_FILE) {
            Some(file) => {
                tracing::debug!(file_id = %file.id, count, "overwriting remote collection");
                self.remote.update(token, &file.id, &body).await?;
            }
            None => {
                tracing::debug!(count, "creating remote collection");
                self.remote.create(token, RECIPES_FILE, &body).await?;
            }
        }

        Ok(SyncOutcome::Pushed { count })
    }
}
