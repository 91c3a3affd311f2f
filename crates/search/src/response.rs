//! Search response types.

use crate::collaborators::Suggestions;
use crate::filters::AppliedFilter;
use crate::model::Recipe;
use crate::scoring::ScoreBreakdown;
use serde::{Deserialize, Serialize};

/// How a recipe entered the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultMatchType {
    /// Name or category matched the query text
    Text,
    /// Recommended from available ingredients
    Ingredient,
    /// Contains an ingredient the fuzzy matcher linked to the query
    FuzzyIngredient,
    /// Recommended for the query context
    Contextual,
    /// More than one of the above
    Combined,
}

impl ResultMatchType {
    /// Combine the sources of two candidate entries for the same recipe.
    pub fn combine(self, other: ResultMatchType) -> ResultMatchType {
        if self == other { self } else { ResultMatchType::Combined }
    }
}

/// One ranked recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The recipe
    pub recipe: Recipe,
    /// Text relevance in `0.0..=1.0`
    pub relevance_score: f64,
    /// Terms of the fused score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
    /// Candidate source
    pub match_type: ResultMatchType,
    /// Fused score in `0.0..=1.0`
    pub final_score: f64,
}

/// Counts through the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Recipes supplied
    pub original_recipe_count: usize,
    /// Candidates generated
    pub search_result_count: usize,
    /// Candidates left after filtering
    pub filtered_result_count: usize,
    /// Results returned
    pub final_result_count: usize,
    /// Whether the response came from the cache
    pub cache_hit: bool,
}

/// Outcome of a search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// False when intent resolution failed
    pub success: bool,
    /// Query as received
    pub query: String,
    /// Ranked results
    pub results: Vec<SearchResult>,
    /// `results.len()`
    pub total_results: usize,
    /// Wall-clock time of the request
    pub processing_time_ms: f64,
    /// Filter audit records
    pub applied_filters: Vec<AppliedFilter>,
    /// Query suggestions, when requested and available
    pub suggestions: Option<Suggestions>,
    /// Spelling alternatives, at most three
    pub did_you_mean: Vec<String>,
    /// Pipeline counts
    pub stats: SearchStats,
    /// Served from the cache
    pub from_cache: bool,
    /// Failure reason when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    /// Failed response: no results, input count kept, other counts zeroed.
    pub fn failure(query: &str, original_recipe_count: usize, error: impl Into<String>) -> Self {
        Self {
            success: false,
            query: query.to_string(),
            results: Vec::new(),
            total_results: 0,
            processing_time_ms: 0.0,
            applied_filters: Vec::new(),
            suggestions: None,
            did_you_mean: Vec::new(),
            stats: SearchStats {
                original_recipe_count,
                ..SearchStats::default()
            },
            from_cache: false,
            error: Some(error.into()),
        }
    }

    /// Recipe ids in rank order.
    pub fn result_ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.recipe.id.as_str()).collect()
    }

    /// Copy with cache, timing and suggestion fields reset, for comparing a
    /// cached response against a freshly computed one.
    ///
    /// Suggestions are computed before the request is recorded in history,
    /// so a recomputation on the same engine sees one more history entry.
    /// They are cleared here; everything else must match exactly.
    pub fn without_volatile_fields(&self) -> Self {
        let mut normalized = self.clone();
        normalized.suggestions = None;
        normalized.from_cache = false;
        normalized.stats.cache_hit = false;
        normalized.processing_time_ms = 0.0;
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_shape() {
        let response = SearchResponse::failure("???", 12, "intent resolver failed");
        assert!(!response.success);
        assert_eq!(response.stats.original_recipe_count, 12);
        assert_eq!(response.stats.final_result_count, 0);
        assert!(response.results.is_empty());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["stats"]["originalRecipeCount"], 12);
        assert_eq!(json["error"], "intent resolver failed");
        assert!(json["suggestions"].is_null());
    }

    #[test]
    fn test_combine_match_types() {
        assert_eq!(ResultMatchType::Text.combine(ResultMatchType::Text), ResultMatchType::Text);
        assert_eq!(
            ResultMatchType::Text.combine(ResultMatchType::Contextual),
            ResultMatchType::Combined
        );
    }
}
