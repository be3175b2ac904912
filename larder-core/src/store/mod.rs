//! Local recipe storage.
//!
//! [`RecipeStore`] is the query contract the rest of the crate programs
//! against; it is the sole serialization point shared by concurrent
//! imports and sync runs. [`SqliteStore`] is the durable implementation,
//! [`MemoryStore`] the in-memory double for tests.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::types::{Category, Recipe};

/// Keyed record store for recipes.
///
/// Deduplication identity is `(title, category)` throughout: insert
/// replaces on that pair, delete and lookup address rows by it. The
/// surrogate `id` is assigned by the store and only identifies a row
/// locally.
pub trait RecipeStore: Send + Sync {
    /// Insert-or-replace by identity. Returns the assigned surrogate id.
    /// The recipe's own `id` field is ignored.
    fn insert(&self, recipe: &Recipe) -> Result<i64, StoreError>;

    /// Delete by identity. Returns whether a row was removed.
    fn delete(&self, title: &str, category: Category) -> Result<bool, StoreError>;

    /// One-shot snapshot of the full collection.
    fn all(&self) -> Result<Vec<Recipe>, StoreError>;

    fn by_category(&self, category: Category) -> Result<Vec<Recipe>, StoreError>;

    /// Recipes whose tag list contains `tag` as a substring.
    fn by_tag(&self, tag: &str) -> Result<Vec<Recipe>, StoreError>;

    /// Exact identity lookup.
    fn find(&self, title: &str, category: Category) -> Result<Option<Recipe>, StoreError>;
}
