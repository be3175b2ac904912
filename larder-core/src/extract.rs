//! Recipe extraction from web pages.
//!
//! Two tiers: [`StructuredDataExtractor`] reads embedded JSON-LD `Recipe`
//! objects; [`HeuristicExtractor`] is the best-effort page scrape used when
//! no structured data parses. Tiers share the [`Extractor`] capability so
//! the pipeline can try them as an ordered chain.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::types::{Category, Recipe};

/// Regex to find JSON-LD script tags (case-insensitive for type attribute)
static JSONLD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("Invalid JSON-LD regex")
});

/// One extraction tier. Returning `None` means "this page gave me nothing",
/// which sends the pipeline on to the next tier.
pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> Option<Recipe>;
}

/// Extracts a recipe from embedded JSON-LD structured data.
///
/// Script blocks are scanned in document order; within a block the search
/// order is the object itself, then its `@graph` members, then (for an
/// array root) the array elements. The first `Recipe`-typed object wins —
/// no merging across candidates. A block that fails to parse is skipped,
/// never fatal.
pub struct StructuredDataExtractor;

impl StructuredDataExtractor {
    /// Fast path: pull script bodies out with a regex, avoiding DOM parsing.
    fn extract_fast(&self, html: &str) -> Option<Recipe> {
        for cap in JSONLD_REGEX.captures_iter(html) {
            let block = match cap.get(1) {
                Some(m) => m.as_str(),
                None => continue,
            };
            if let Some(recipe) = recipe_from_block(block) {
                return Some(recipe);
            }
        }
        None
    }

    /// Slow path: full DOM parse, for markup the regex misses.
    fn extract_dom(&self, document: &Html) -> Option<Recipe> {
        let selector =
            Selector::parse("script[type='application/ld+json']").expect("Invalid selector");
        for element in document.select(&selector) {
            if let Some(recipe) = recipe_from_block(&element.inner_html()) {
                return Some(recipe);
            }
        }
        None
    }
}

impl Extractor for StructuredDataExtractor {
    fn extract(&self, html: &str) -> Option<Recipe> {
        if let Some(recipe) = self.extract_fast(html) {
            return Some(recipe);
        }
        let document = Html::parse_document(html);
        self.extract_dom(&document)
    }
}

/// Parse one script block and map its Recipe object, if it has one.
fn recipe_from_block(text: &str) -> Option<Recipe> {
    let sanitized = sanitize_json(text);
    // Parse failure for one block is not fatal; the caller moves on.
    let json: Value = serde_json::from_str(sanitized.trim()).ok()?;
    find_recipe(&json).map(recipe_from_jsonld)
}

/// Sanitize JSON-LD content to handle common malformed patterns.
/// Some sites include literal newlines/tabs inside JSON strings instead of
/// escaped versions.
fn sanitize_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut prev = '\0';

    for c in json.chars() {
        if c == '"' && prev != '\\' {
            in_string = !in_string;
            out.push(c);
        } else if in_string && c.is_control() {
            match c {
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                // Drop any other control character
                _ => {}
            }
        } else {
            out.push(c);
        }
        prev = c;
    }

    out
}

/// Locate the Recipe object in a parsed JSON-LD root.
fn find_recipe(root: &Value) -> Option<&Value> {
    match root {
        Value::Object(_) => {
            if is_recipe(root) {
                return Some(root);
            }
            // Sometimes under @graph
            if let Some(Value::Array(graph)) = root.get("@graph") {
                return graph.iter().find(|member| is_recipe(member));
            }
            None
        }
        Value::Array(items) => items.iter().find(|item| is_recipe(item)),
        _ => None,
    }
}

fn is_recipe(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(s)) => s == "Recipe",
        Some(Value::Array(types)) => types.iter().any(|t| t == "Recipe"),
        _ => false,
    }
}

/// Build a Recipe from a JSON-LD Recipe object.
///
/// `url`, `category`, and `sub_category` are never derived from the page;
/// they keep their defaults until the user confirms them.
fn recipe_from_jsonld(obj: &Value) -> Recipe {
    let title = obj
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // image may be a single string or an array of strings
    let image = match obj.get("image") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => items.first().and_then(Value::as_str).map(str::to_string),
        _ => None,
    };

    // Absent field stays None; a present-but-empty array stays Some(vec![]).
    let ingredients = obj
        .get("recipeIngredient")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(jsonld_text).collect());

    let steps = obj.get("recipeInstructions").and_then(instruction_lines);

    Recipe {
        id: 0,
        title,
        image,
        ingredients,
        steps,
        url: String::new(),
        category: Category::Sweet,
        sub_category: String::new(),
        tags: Vec::new(),
    }
}

/// Coerce a JSON-LD array element to a display string.
fn jsonld_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalize the polymorphic `recipeInstructions` shapes: an array of step
/// objects (each contributing its `text`, entries without one dropped), a
/// single step object, or a plain string. Anything else yields nothing.
fn instruction_lines(instructions: &Value) -> Option<Vec<String>> {
    match instructions {
        Value::Array(items) => Some(
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| item.get("text").and_then(Value::as_str))
                .map(str::to_string)
                .collect(),
        ),
        Value::Object(_) => instructions
            .get("text")
            .and_then(Value::as_str)
            .map(|text| vec![text.to_string()]),
        Value::String(s) => Some(vec![s.clone()]),
        _ => None,
    }
}

/// Ingredient containers emitted by common recipe plugins. Site-specific
/// and low-precision; checked in order, first non-empty match wins.
const INGREDIENT_SELECTORS: &[&str] = &[
    ".jetpack-recipe-ingredient",
    ".wprm-recipe-ingredient",
    ".tasty-recipes-ingredients li",
    ".recipe-ingredients li",
    ".ingredients li",
];

const INSTRUCTION_SELECTORS: &[&str] = &[
    ".jetpack-recipe-directions",
    ".wprm-recipe-instruction",
    ".tasty-recipes-instructions li",
    ".recipe-instructions li",
    ".instructions li",
];

/// Best-effort page scrape for documents without usable structured data.
///
/// Exists purely as a non-empty-result guarantee: [`HeuristicExtractor::scrape`]
/// always produces a record, however thin.
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    /// Scrape a page. Never fails; missing evidence maps to an empty title
    /// and absent fields.
    pub fn scrape(&self, html: &str) -> Recipe {
        let document = Html::parse_document(html);

        let title_selector = Selector::parse("title").expect("Invalid selector");
        let title = document
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        Recipe {
            id: 0,
            title,
            image: og_image(&document),
            ingredients: select_lines(&document, INGREDIENT_SELECTORS),
            steps: select_lines(&document, INSTRUCTION_SELECTORS),
            url: String::new(),
            category: Category::Sweet,
            sub_category: String::new(),
            tags: Vec::new(),
        }
    }
}

impl Extractor for HeuristicExtractor {
    fn extract(&self, html: &str) -> Option<Recipe> {
        Some(self.scrape(html))
    }
}

/// Extract image URL from the og:image meta tag.
fn og_image(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[property="og:image"]"#).expect("Invalid selector");
    document
        .select(&selector)
        .next()?
        .value()
        .attr("content")
        .map(|s| s.to_string())
}

/// Collect trimmed text of every element matching the first selector with
/// any matches. Empty match set yields None, distinguishing "nothing found"
/// from "found empty".
fn select_lines(document: &Html, selectors: &[&str]) -> Option<Vec<String>> {
    for selector_str in selectors {
        let selector = match Selector::parse(selector_str) {
            Ok(s) => s,
            Err(_) => continue,
        };

        let lines: Vec<String> = document
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if !lines.is_empty() {
            return Some(lines);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_escapes_raw_newlines_inside_strings() {
        let raw = "{\"name\": \"Line one\nLine two\"}";
        let sanitized = sanitize_json(raw);
        let value: Value = serde_json::from_str(&sanitized).unwrap();
        assert_eq!(value["name"], "Line one\nLine two");
    }

    #[test]
    fn sanitize_leaves_structural_whitespace_alone() {
        let raw = "{\n  \"name\": \"Cake\"\n}";
        let value: Value = serde_json::from_str(&sanitize_json(raw)).unwrap();
        assert_eq!(value["name"], "Cake");
    }

    #[test]
    fn og_image_read_from_meta_tag() {
        let html = r#"
            <html><head>
                <meta property="og:image" content="https://example.com/pic.jpg">
            </head><body></body></html>
        "#;
        let document = Html::parse_document(html);
        assert_eq!(
            og_image(&document),
            Some("https://example.com/pic.jpg".to_string())
        );
    }

    #[test]
    fn type_array_counts_as_recipe() {
        let value: Value =
            serde_json::from_str(r#"{"@type": ["Recipe", "NewsArticle"], "name": "Pie"}"#).unwrap();
        assert!(is_recipe(&value));
    }

    #[test]
    fn graph_search_does_not_recurse_into_nested_objects() {
        // A Recipe buried outside @graph is intentionally not found; the
        // search order is root, then @graph members only.
        let value: Value = serde_json::from_str(
            r#"{"@type": "WebPage", "mainEntity": {"@type": "Recipe", "name": "Hidden"}}"#,
        )
        .unwrap();
        assert!(find_recipe(&value).is_none());
    }
}
