//! Collaborator seams of the search orchestrator.
//!
//! Intent classification, contextual recommendation, availability-based
//! recommendation and query suggestions are pluggable. Each concern is a
//! `Send + Sync` trait so an engine can be shared across threads; the
//! implementations shipped here are small, deterministic and table-driven.
//!
//! | Trait | Default |
//! |-------|---------|
//! | [`IntentResolver`] | [`KeywordIntentResolver`] |
//! | [`ContextualRecommender`] | [`DescriptorRecommender`] |
//! | [`IngredientRecommender`] | [`AvailabilityRecommender`] |
//! | [`SuggestionProvider`] | [`HistorySuggestions`] |

mod availability;
mod contextual;
mod history;
mod intent;

pub use availability::AvailabilityRecommender;
pub use contextual::DescriptorRecommender;
pub use history::HistorySuggestions;
pub use intent::KeywordIntentResolver;

use crate::error::Result;
use crate::model::Recipe;
use crate::response::SearchResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form request context (strength, flavor, occasion, season, ...).
///
/// A `BTreeMap` keeps serialization order stable, which the response cache
/// relies on.
pub type Context = BTreeMap<String, serde_json::Value>;

/// Classified purpose of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// The query names ingredients
    IngredientBased,
    /// The query names a strength or flavor
    StyleBased,
    /// The query names an occasion
    OccasionBased,
    /// The query names a season
    SeasonalBased,
    /// Nothing recognised
    #[default]
    Default,
}

/// Descriptors extracted from a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptors {
    /// "strong" or "light"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
    /// Flavor tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flavor: Vec<String>,
    /// Occasion keyword
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<String>,
    /// Season keyword
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

impl Descriptors {
    /// True when no descriptor was found.
    pub fn is_empty(&self) -> bool {
        self.strength.is_none() && self.flavor.is_empty() && self.occasion.is_none() && self.season.is_none()
    }

    /// Merge descriptors over `context`; request context wins on conflicts.
    pub fn merged_into(&self, context: &Context) -> Context {
        let mut derived = Context::new();
        if let Some(strength) = &self.strength {
            derived.insert("strength".into(), strength.clone().into());
        }
        if !self.flavor.is_empty() {
            derived.insert("flavor".into(), self.flavor.clone().into());
        }
        if let Some(occasion) = &self.occasion {
            derived.insert("occasion".into(), occasion.clone().into());
        }
        if let Some(season) = &self.season {
            derived.insert("season".into(), season.clone().into());
        }
        derived.extend(context.iter().map(|(k, v)| (k.clone(), v.clone())));
        derived
    }
}

/// Resolved intent of a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// Primary intent
    pub kind: IntentKind,
    /// Confidence in `0.0..=1.0`
    pub confidence: f64,
    /// Ingredient tokens found in the query
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Style, occasion and season descriptors
    #[serde(default)]
    pub descriptors: Descriptors,
}

/// A recipe scored by a recommender, addressed by its index in the input
/// slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Index into the recipe slice passed to the recommender
    pub index: usize,
    /// Score in `0.0..=1.0`
    pub score: f64,
    /// Per-signal contributions
    #[serde(default)]
    pub breakdown: BTreeMap<String, f64>,
}

/// Suggestions for a partial query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestions {
    /// Completions of the partial query
    pub autocomplete: Vec<String>,
    /// Most frequent recent queries
    pub trending: Vec<String>,
    /// Recipes this caller has been shown most
    pub personalized: Vec<String>,
}

/// Limits for [`SuggestionProvider::suggest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestOptions {
    /// Maximum autocomplete entries
    pub max_autocomplete: usize,
    /// Maximum trending entries
    pub max_trending: usize,
    /// Maximum personalized entries
    pub max_personalized: usize,
    /// Session whose history personalizes results
    pub session_id: String,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            max_autocomplete: 5,
            max_trending: 5,
            max_personalized: 5,
            session_id: "default".to_string(),
        }
    }
}

/// Classifies a query. Fails closed: an error aborts the search.
pub trait IntentResolver: Send + Sync {
    /// Resolve the intent of a non-empty query.
    fn resolve(&self, query: &str) -> Result<Intent>;
}

/// Scores recipes against a context object.
pub trait ContextualRecommender: Send + Sync {
    /// Up to `limit` recommendations, best first.
    fn recommend(&self, recipes: &[Recipe], context: &Context, limit: usize) -> Result<Vec<Recommendation>>;
}

/// Scores recipes by how well the available ingredients cover them.
pub trait IngredientRecommender: Send + Sync {
    /// Recommendations for recipes using at least one available ingredient.
    fn recommend(&self, available: &[String], recipes: &[Recipe]) -> Result<Vec<Recommendation>>;
}

/// Query suggestions and search history.
pub trait SuggestionProvider: Send + Sync {
    /// Suggestions for a partial query.
    fn suggest(&self, partial: &str, context: &Context, options: &SuggestOptions) -> Result<Suggestions>;

    /// Record a completed search. Best-effort: failures are logged and ignored.
    fn record_history(&self, query: &str, results: &[SearchResult], context: &Context) -> Result<()>;
}

/// Lower-cased string values of a context key, accepting a string or an
/// array of strings.
pub(crate) fn context_strings(context: &Context, key: &str) -> Vec<String> {
    match context.get(key) {
        Some(serde_json::Value::String(s)) => vec![s.trim().to_lowercase()],
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(serde_json::Value::as_str)
            .map(|s| s.trim().to_lowercase())
            .collect(),
        _ => Vec::new(),
    }
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptors_merge_request_context_wins() {
        let descriptors = Descriptors {
            strength: Some("strong".into()),
            season: Some("winter".into()),
            ..Descriptors::default()
        };
        let mut context = Context::new();
        context.insert("season".into(), json!("summer"));

        let merged = descriptors.merged_into(&context);
        assert_eq!(merged["strength"], json!("strong"));
        assert_eq!(merged["season"], json!("summer"));
    }

    #[test]
    fn test_context_strings_accepts_string_or_array() {
        let mut context = Context::new();
        context.insert("flavor".into(), json!(["Sweet", " sour ", 3]));
        context.insert("season".into(), json!("Winter"));
        assert_eq!(context_strings(&context, "flavor"), vec!["sweet", "sour"]);
        assert_eq!(context_strings(&context, "season"), vec!["winter"]);
        assert!(context_strings(&context, "occasion").is_empty());
    }

    #[test]
    fn test_intent_kind_wire_names() {
        assert_eq!(serde_json::to_value(IntentKind::IngredientBased).unwrap(), json!("ingredient_based"));
    }
}
