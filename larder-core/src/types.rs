use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary recipe classification. Closed set: identity matching and
/// persistence both depend on exactly these two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Sweet,
    Savory,
}

impl Category {
    pub const ALL: &'static [Category] = &[Category::Sweet, Category::Savory];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sweet => "Sweet",
            Category::Savory => "Savory",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sweet" => Ok(Category::Sweet),
            "savory" => Ok(Category::Savory),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// The central entity. Field names in the serialized form match the sync
/// wire format: a JSON array of these objects, `category` as its literal
/// variant name, `subCategory` in camelCase.
///
/// `ingredients`/`steps` being `None` (no extraction evidence) is distinct
/// from `Some(vec![])` (found, but empty); both serialization and storage
/// preserve the difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Surrogate id assigned by the local store on insert; 0 while transient.
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub steps: Option<Vec<String>>,
    /// Source URL the recipe was extracted from; empty for manual entries.
    #[serde(default)]
    pub url: String,
    pub category: Category,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Recipe {
    /// The deduplication key used by both local insert-or-replace and
    /// remote-sync matching. Two recipes with the same identity are the
    /// same recipe, regardless of `id`.
    pub fn identity(&self) -> (&str, Category) {
        (&self.title, self.category)
    }
}

/// Metadata for one file in the remote folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub id: String,
    pub name: String,
}

/// What a completed sync operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Remote file decoded; `considered` recipes were checked against the
    /// local collection (existing ones were kept as-is).
    Pulled { considered: usize },
    /// No remote recipe file exists yet; nothing to merge.
    NothingToSync,
    /// The full local collection of `count` recipes now overwrites the
    /// remote file.
    Pushed { count: usize },
}

impl SyncOutcome {
    /// Human-readable status line for display.
    pub fn status_line(&self) -> String {
        match self {
            SyncOutcome::Pulled { considered } => {
                format!("Sync completed: {considered} recipes")
            }
            SyncOutcome::NothingToSync => "No recipes.json found on remote".to_string(),
            SyncOutcome::Pushed { .. } => "Recipes uploaded successfully".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(*category));
        }
        assert!("Spicy".parse::<Category>().is_err());
    }

    #[test]
    fn recipe_serializes_with_wire_field_names() {
        let recipe = Recipe {
            id: 3,
            title: "Cake".to_string(),
            image: None,
            ingredients: Some(vec!["flour".to_string()]),
            steps: None,
            url: String::new(),
            category: Category::Sweet,
            sub_category: "Baking".to_string(),
            tags: vec!["dessert".to_string()],
        };

        let json: serde_json::Value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["category"], "Sweet");
        assert_eq!(json["subCategory"], "Baking");
        // Absent steps serialize as an explicit null, not a missing key.
        assert!(json["steps"].is_null());
        assert_eq!(json["ingredients"][0], "flour");
    }

    #[test]
    fn recipe_deserializes_with_defaults() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"title":"Soup","category":"Savory"}"#).unwrap();
        assert_eq!(recipe.id, 0);
        assert_eq!(recipe.ingredients, None);
        assert_eq!(recipe.tags, Vec::<String>::new());
    }
}
