//! The import pipeline: fetch a page, then run the extraction tiers in
//! order until one produces a recipe.

use crate::error::FetchError;
use crate::extract::{Extractor, HeuristicExtractor, StructuredDataExtractor};
use crate::http::HttpClient;
use crate::types::Recipe;

/// Fetch-then-extract orchestrator.
///
/// Tiers run strictly in sequence; the heuristic scrape sits after them as
/// a fixed floor, so a successful fetch always yields a recipe. A fetch
/// failure is the only error a caller sees, which keeps "network down"
/// distinguishable from "page had no structured recipe".
pub struct RecipePipeline<C: HttpClient> {
    client: C,
    tiers: Vec<Box<dyn Extractor>>,
    fallback: HeuristicExtractor,
}

impl<C: HttpClient> RecipePipeline<C> {
    /// Pipeline with the default single structured-data tier.
    pub fn new(client: C) -> Self {
        Self {
            client,
            tiers: vec![Box::new(StructuredDataExtractor)],
            fallback: HeuristicExtractor,
        }
    }

    /// Replace the tiers tried before the heuristic floor. Useful for
    /// adding site-specific adapters ahead of the generic JSON-LD tier.
    pub fn with_tiers(mut self, tiers: Vec<Box<dyn Extractor>>) -> Self {
        self.tiers = tiers;
        self
    }

    /// Fetch `url` and extract a recipe from it. The returned recipe's
    /// `url` field carries the input URL; extractors leave it blank on
    /// purpose.
    pub async fn import(&self, url: &str) -> Result<Recipe, FetchError> {
        let html = self.client.fetch_html(url).await?;

        for tier in &self.tiers {
            if let Some(mut recipe) = tier.extract(&html) {
                tracing::debug!(url, title = %recipe.title, "structured extraction succeeded");
                recipe.url = url.to_string();
                return Ok(recipe);
            }
        }

        tracing::debug!(url, "no structured data, falling back to page scrape");
        let mut recipe = self.fallback.scrape(&html);
        recipe.url = url.to_string();
        Ok(recipe)
    }
}
