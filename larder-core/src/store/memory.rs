//! In-memory recipe store, mainly for exercising sync logic in tests.

use std::sync::Mutex;

use crate::error::StoreError;
use crate::store::RecipeStore;
use crate::types::{Category, Recipe};

#[derive(Default)]
struct MemoryState {
    rows: Vec<Recipe>,
    next_id: i64,
}

/// Store over a mutex-guarded Vec with the same identity semantics as the
/// SQLite implementation.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut MemoryState) -> T,
    ) -> Result<T, StoreError> {
        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&mut state))
    }
}

impl RecipeStore for MemoryStore {
    fn insert(&self, recipe: &Recipe) -> Result<i64, StoreError> {
        self.with_state(|state| {
            state
                .rows
                .retain(|row| row.identity() != (recipe.title.as_str(), recipe.category));
            state.next_id += 1;
            let mut row = recipe.clone();
            row.id = state.next_id;
            state.rows.push(row);
            state.next_id
        })
    }

    fn delete(&self, title: &str, category: Category) -> Result<bool, StoreError> {
        self.with_state(|state| {
            let before = state.rows.len();
            state.rows.retain(|row| row.identity() != (title, category));
            state.rows.len() < before
        })
    }

    fn all(&self) -> Result<Vec<Recipe>, StoreError> {
        self.with_state(|state| state.rows.clone())
    }

    fn by_category(&self, category: Category) -> Result<Vec<Recipe>, StoreError> {
        self.with_state(|state| {
            state
                .rows
                .iter()
                .filter(|row| row.category == category)
                .cloned()
                .collect()
        })
    }

    fn by_tag(&self, tag: &str) -> Result<Vec<Recipe>, StoreError> {
        self.with_state(|state| {
            state
                .rows
                .iter()
                .filter(|row| row.tags.iter().any(|t| t.contains(tag)))
                .cloned()
                .collect()
        })
    }

    fn find(&self, title: &str, category: Category) -> Result<Option<Recipe>, StoreError> {
        self.with_state(|state| {
            state
                .rows
                .iter()
                .find(|row| row.identity() == (title, category))
                .cloned()
        })
    }
}
