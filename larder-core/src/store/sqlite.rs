//! SQLite-backed recipe store.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;
use crate::store::RecipeStore;
use crate::types::{Category, Recipe};

/// The UNIQUE clause makes `(title, category)` the conflict target: a
/// second insert with the same identity replaces the first row.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS recipes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    image TEXT,
    ingredients TEXT,
    steps TEXT,
    url TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL,
    sub_category TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '[]',
    UNIQUE (title, category) ON CONFLICT REPLACE
);
";

const COLUMNS: &str = "id, title, image, ingredients, steps, url, category, sub_category, tags";

/// Durable store over a single SQLite database file.
///
/// The list-shaped fields (`ingredients`, `steps`, `tags`) are stored as
/// JSON text; NULL in the nullable columns preserves the absent-vs-empty
/// distinction.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database. Useful for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }
}

/// Raw column values, decoded into a `Recipe` outside the rusqlite closure
/// so JSON errors surface as `StoreError` rather than panics.
struct RawRow {
    id: i64,
    title: String,
    image: Option<String>,
    ingredients: Option<String>,
    steps: Option<String>,
    url: String,
    category: String,
    sub_category: String,
    tags: String,
}

fn raw_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        title: row.get(1)?,
        image: row.get(2)?,
        ingredients: row.get(3)?,
        steps: row.get(4)?,
        url: row.get(5)?,
        category: row.get(6)?,
        sub_category: row.get(7)?,
        tags: row.get(8)?,
    })
}

fn decode(raw: RawRow) -> Result<Recipe, StoreError> {
    let category = raw
        .category
        .parse::<Category>()
        .map_err(|_| StoreError::CorruptRow {
            id: raw.id,
            reason: format!("unknown category {:?}", raw.category),
        })?;

    Ok(Recipe {
        id: raw.id,
        title: raw.title,
        image: raw.image,
        ingredients: decode_list(raw.ingredients.as_deref(), raw.id, "ingredients")?,
        steps: decode_list(raw.steps.as_deref(), raw.id, "steps")?,
        url: raw.url,
        category,
        sub_category: raw.sub_category,
        tags: decode_list(Some(raw.tags.as_str()), raw.id, "tags")?.unwrap_or_default(),
    })
}

fn decode_list(
    json: Option<&str>,
    id: i64,
    field: &str,
) -> Result<Option<Vec<String>>, StoreError> {
    json.map(|text| {
        serde_json::from_str(text).map_err(|e| StoreError::CorruptRow {
            id,
            reason: format!("{field}: {e}"),
        })
    })
    .transpose()
}

fn encode_list(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

fn collect(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Recipe>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, raw_from_row)?;
    let mut recipes = Vec::new();
    for raw in rows {
        recipes.push(decode(raw?)?);
    }
    Ok(recipes)
}

impl RecipeStore for SqliteStore {
    fn insert(&self, recipe: &Recipe) -> Result<i64, StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO recipes (title, image, ingredients, steps, url, category, sub_category, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    recipe.title,
                    recipe.image,
                    recipe.ingredients.as_deref().map(encode_list),
                    recipe.steps.as_deref().map(encode_list),
                    recipe.url,
                    recipe.category.as_str(),
                    recipe.sub_category,
                    encode_list(&recipe.tags),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn delete(&self, title: &str, category: Category) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "DELETE FROM recipes WHERE title = ?1 AND category = ?2",
                params![title, category.as_str()],
            )?;
            Ok(affected > 0)
        })
    }

    fn all(&self) -> Result<Vec<Recipe>, StoreError> {
        self.with_conn(|conn| {
            collect(
                conn,
                &format!("SELECT {COLUMNS} FROM recipes ORDER BY id"),
                [],
            )
        })
    }

    fn by_category(&self, category: Category) -> Result<Vec<Recipe>, StoreError> {
        self.with_conn(|conn| {
            collect(
                conn,
                &format!("SELECT {COLUMNS} FROM recipes WHERE category = ?1 ORDER BY id"),
                params![category.as_str()],
            )
        })
    }

    fn by_tag(&self, tag: &str) -> Result<Vec<Recipe>, StoreError> {
        self.with_conn(|conn| {
            collect(
                conn,
                &format!(
                    "SELECT {COLUMNS} FROM recipes WHERE tags LIKE '%' || ?1 || '%' ORDER BY id"
                ),
                params![tag],
            )
        })
    }

    fn find(&self, title: &str, category: Category) -> Result<Option<Recipe>, StoreError> {
        self.with_conn(|conn| {
            let raw = conn
                .query_row(
                    &format!(
                        "SELECT {COLUMNS} FROM recipes WHERE title = ?1 AND category = ?2 LIMIT 1"
                    ),
                    params![title, category.as_str()],
                    raw_from_row,
                )
                .optional()?;
            raw.map(decode).transpose()
        })
    }
}
