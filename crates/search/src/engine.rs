//! Search orchestrator.
//!
//! A request flows through:
//!
//! 1. cache lookup (hit returns the stored response marked `fromCache`)
//! 2. intent resolution (failure aborts with `success = false`)
//! 3. candidate generation: a text pass over names and categories, then the
//!    strategy for the intent kind
//! 4. filtering, fusion scoring, ranking and truncation
//! 5. suggestions, history recording and cache store

use crate::collaborators::{
    AvailabilityRecommender, Context, ContextualRecommender, DescriptorRecommender,
    HistorySuggestions, IngredientRecommender, Intent, IntentKind, IntentResolver,
    KeywordIntentResolver, SuggestOptions, SuggestionProvider, Suggestions,
};
use crate::error::{Result, SearchError};
use crate::filters::{apply_filters, AppliedFilter, FilterSpec};
use crate::fuzzy::{FuzzyMatcher, MatchKind};
use crate::model::Recipe;
use crate::relevance::recipe_text_relevance;
use crate::response::{ResultMatchType, SearchResponse, SearchResult, SearchStats};
use crate::scoring::{fuse_scores, Signals};
use crate::timing::Stopwatch;
use birch_core::cache::{CacheConfig, CacheStats, TtlCache};
use birch_core::config::{ConfigSchema, SearchConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

/// Weight of contextual recommendations when the query has no clear intent.
pub const DEFAULT_CONTEXTUAL_WEIGHT: f64 = 0.7;

/// Hard upper bound on `didYouMean` entries.
pub const MAX_DID_YOU_MEAN: usize = 3;

/// Per-request options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    /// Filter specification
    pub filters: Option<FilterSpec>,
    /// Free-form context
    pub context: Context,
    /// Maximum results returned
    pub max_results: usize,
    /// Apply `filters`
    pub include_filters: bool,
    /// Attach suggestions
    pub include_suggestions: bool,
    /// Read and write the response cache
    pub use_cache: bool,
    /// Session identifier for history and personalization
    pub session_id: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            filters: None,
            context: Context::new(),
            max_results: 20,
            include_filters: true,
            include_suggestions: true,
            use_cache: true,
            session_id: "default".to_string(),
        }
    }
}

impl SearchOptions {
    /// Defaults taken from the `[search]` config section.
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            max_results: config.max_results,
            include_filters: config.include_filters,
            include_suggestions: config.include_suggestions,
            use_cache: config.use_cache,
            ..Self::default()
        }
    }

    /// Sets the filter specification.
    #[must_use]
    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Adds a context entry.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets the result limit.
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Enables or disables the response cache.
    #[must_use]
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Enables or disables suggestions.
    #[must_use]
    pub fn with_suggestions(mut self, include_suggestions: bool) -> Self {
        self.include_suggestions = include_suggestions;
        self
    }

    /// Sets the session identifier.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Canonical JSON of every field that affects the response.
    fn cache_key(&self, query: &str) -> Result<String> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Key<'a> {
            query: &'a str,
            filters: &'a Option<FilterSpec>,
            context: &'a Context,
            max_results: usize,
            include_filters: bool,
            include_suggestions: bool,
            session_id: &'a str,
        }

        Ok(serde_json::to_string(&Key {
            query,
            filters: &self.filters,
            context: &self.context,
            max_results: self.max_results,
            include_filters: self.include_filters,
            include_suggestions: self.include_suggestions,
            session_id: &self.session_id,
        })?)
    }
}

/// A recipe under consideration, keyed by input index.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    signals: Signals,
    match_type: ResultMatchType,
}

/// Candidates ordered by input index so ties rank in input order.
#[derive(Debug, Default)]
struct Candidates(BTreeMap<usize, Candidate>);

impl Candidates {
    fn offer(&mut self, index: usize, signals: Signals, match_type: ResultMatchType) {
        self.0
            .entry(index)
            .and_modify(|c| {
                c.signals.merge(signals);
                c.match_type = c.match_type.combine(match_type);
            })
            .or_insert(Candidate { signals, match_type });
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Distinct ingredient names in first-seen order, case-insensitive.
fn ingredient_vocabulary(recipes: &[Recipe]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    recipes
        .iter()
        .flat_map(Recipe::ingredient_names)
        .filter(|name| !name.trim().is_empty() && seen.insert(name.trim().to_lowercase()))
        .map(|name| name.trim().to_string())
        .collect()
}

/// Text relevance of every recipe with a non-zero score.
fn text_scores(query: &str, recipes: &[Recipe]) -> Vec<(usize, f64)> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        recipes
            .par_iter()
            .enumerate()
            .map(|(index, recipe)| (index, recipe_text_relevance(recipe, query)))
            .filter(|(_, score)| *score > 0.0)
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        recipes
            .iter()
            .enumerate()
            .map(|(index, recipe)| (index, recipe_text_relevance(recipe, query)))
            .filter(|(_, score)| *score > 0.0)
            .collect()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        list.push(value.to_string());
    }
}

/// Recipe search engine.
///
/// Owns its response cache and collaborators; independent engines share no
/// state. `SearchEngine` is `Send + Sync`.
///
/// # Example
/// ```
/// use birch_search::{Recipe, SearchEngine, SearchOptions};
///
/// let engine = SearchEngine::new();
/// let recipes = vec![
///     Recipe::new("1", "Gin & Tonic").with_ingredients(["gin", "tonic"]),
///     Recipe::new("2", "Daiquiri").with_ingredients(["rum", "lime juice", "sugar"]),
/// ];
/// let response = engine.search("gin", &recipes, &SearchOptions::default()).unwrap();
/// assert!(response.success);
/// assert_eq!(response.results[0].recipe.id, "1");
/// ```
pub struct SearchEngine {
    matcher: FuzzyMatcher,
    cache: TtlCache<SearchResponse>,
    max_did_you_mean: usize,
    intent: Arc<dyn IntentResolver>,
    contextual: Arc<dyn ContextualRecommender>,
    ingredients: Arc<dyn IngredientRecommender>,
    suggestions: Arc<dyn SuggestionProvider>,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// Engine with default collaborators and settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start building an engine.
    pub fn builder() -> SearchEngineBuilder {
        SearchEngineBuilder::default()
    }

    /// Engine configured from a loaded configuration.
    pub fn from_config(schema: &ConfigSchema) -> Self {
        Self::builder()
            .matcher(FuzzyMatcher::from_config(&schema.fuzzy))
            .cache_config(CacheConfig::from(&schema.cache))
            .max_did_you_mean(schema.search.max_did_you_mean)
            .build()
    }

    /// Fuzzy matcher used for ingredient fan-out and corrections.
    pub fn matcher(&self) -> &FuzzyMatcher {
        &self.matcher
    }

    /// Search `recipes` for `query`.
    ///
    /// Returns `Err` only for usage errors. A failed intent resolution yields
    /// `Ok` with `success = false`; failing recommenders or suggestion
    /// providers only reduce what the response contains.
    pub fn search(&self, query: &str, recipes: &[Recipe], options: &SearchOptions) -> Result<SearchResponse> {
        let timer = Stopwatch::start();

        let cache_key = if options.use_cache {
            Some(options.cache_key(query)?)
        } else {
            None
        };

        if let Some(key) = &cache_key {
            if let Some(mut cached) = self.cache.get(key) {
                tracing::debug!(query, "Search cache hit");
                cached.from_cache = true;
                cached.stats.cache_hit = true;
                cached.processing_time_ms = timer.elapsed_ms();
                return Ok(cached);
            }
            tracing::debug!(query, "Search cache miss");
        }

        let trimmed = query.trim();
        let intent = if trimmed.is_empty() {
            Intent::default()
        } else {
            match self.intent.resolve(trimmed) {
                Ok(intent) => intent,
                Err(err) => {
                    tracing::warn!(query, error = %err, "Intent resolution failed");
                    let mut response = SearchResponse::failure(query, recipes.len(), err.to_string());
                    response.processing_time_ms = timer.elapsed_ms();
                    return Ok(response);
                }
            }
        };

        let mut candidates = Candidates::default();
        let mut did_you_mean = Vec::new();

        let mut text_hits = 0;
        if !trimmed.is_empty() {
            for (index, relevance) in text_scores(trimmed, recipes) {
                text_hits += 1;
                candidates.offer(index, Signals { relevance, ..Signals::default() }, ResultMatchType::Text);
            }
        }

        match intent.kind {
            IntentKind::IngredientBased => {
                self.ingredient_candidates(&intent.ingredients, recipes, &mut candidates, &mut did_you_mean);
            }
            IntentKind::StyleBased | IntentKind::OccasionBased | IntentKind::SeasonalBased => {
                let context = intent.descriptors.merged_into(&options.context);
                self.contextual_candidates(recipes, &context, 1.0, &mut candidates);
            }
            IntentKind::Default => {
                let context = intent.descriptors.merged_into(&options.context);
                self.contextual_candidates(recipes, &context, DEFAULT_CONTEXTUAL_WEIGHT, &mut candidates);
                if !intent.ingredients.is_empty() {
                    self.ingredient_candidates(&intent.ingredients, recipes, &mut candidates, &mut did_you_mean);
                }
            }
        }

        if intent.kind == IntentKind::Default && text_hits == 0 && !trimmed.is_empty() {
            self.query_corrections(trimmed, recipes, &mut did_you_mean);
        }

        let search_result_count = candidates.len();
        let (survivors, applied_filters) = self.filter_candidates(recipes, candidates, options);
        let filtered_result_count = survivors.len();

        let mut results: Vec<SearchResult> = survivors
            .into_iter()
            .map(|(index, candidate)| {
                let recipe = &recipes[index];
                let breakdown = fuse_scores(recipe, candidate.signals);
                SearchResult {
                    recipe: recipe.clone(),
                    relevance_score: breakdown.signals.relevance,
                    final_score: breakdown.final_score(),
                    score_breakdown: Some(breakdown),
                    match_type: candidate.match_type,
                }
            })
            .collect();

        // Stable sort keeps input order among equal scores
        results.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        results.truncate(options.max_results);

        did_you_mean.truncate(self.max_did_you_mean.min(MAX_DID_YOU_MEAN));

        let suggestions = if options.include_suggestions {
            let suggest_options = SuggestOptions {
                session_id: options.session_id.clone(),
                ..SuggestOptions::default()
            };
            match self.suggestions.suggest(trimmed, &options.context, &suggest_options) {
                Ok(suggestions) => Some(suggestions),
                Err(err) => {
                    tracing::warn!(error = %err, "Suggestions unavailable");
                    None
                }
            }
        } else {
            None
        };

        let mut history_context = options.context.clone();
        history_context
            .entry("sessionId".to_string())
            .or_insert_with(|| options.session_id.clone().into());
        if let Err(err) = self.suggestions.record_history(trimmed, &results, &history_context) {
            tracing::warn!(error = %err, "Failed to record search history");
        }

        let final_result_count = results.len();
        let response = SearchResponse {
            success: true,
            query: query.to_string(),
            total_results: final_result_count,
            results,
            processing_time_ms: timer.elapsed_ms(),
            applied_filters,
            suggestions,
            did_you_mean,
            stats: SearchStats {
                original_recipe_count: recipes.len(),
                search_result_count,
                filtered_result_count,
                final_result_count,
                cache_hit: false,
            },
            from_cache: false,
            error: None,
        };

        tracing::debug!(
            query,
            intent = ?intent.kind,
            candidates = search_result_count,
            filtered = filtered_result_count,
            returned = final_result_count,
            elapsed_ms = response.processing_time_ms,
            "Search completed"
        );

        if let Some(key) = &cache_key {
            self.cache.insert(key, response.clone());
        }

        Ok(response)
    }

    /// Search a JSON value that must be an array of recipes.
    ///
    /// Any other JSON kind is a usage error.
    pub fn search_json(
        &self,
        query: &str,
        recipes: &serde_json::Value,
        options: &SearchOptions,
    ) -> Result<SearchResponse> {
        if !recipes.is_array() {
            return Err(SearchError::InvalidRecipes(json_kind(recipes).to_string()));
        }
        let recipes = Vec::<Recipe>::deserialize(recipes)?;
        self.search(query, &recipes, options)
    }

    /// Suggestions for a partial query. Provider failures yield empty
    /// suggestions.
    pub fn suggest(&self, partial: &str, context: &Context, options: &SuggestOptions) -> Suggestions {
        self.suggestions.suggest(partial, context, options).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Suggestions unavailable");
            Suggestions::default()
        })
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Search cache cleared");
    }

    /// Cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Availability recommendations plus fuzzy fan-out of each ingredient
    /// over the working set's ingredient vocabulary.
    ///
    /// The fan-out only runs for ingredients with no exact match in the
    /// vocabulary. Its matches feed `did_you_mean`; recipes join the
    /// candidates only through matches at or above the correction threshold.
    fn ingredient_candidates(
        &self,
        ingredients: &[String],
        recipes: &[Recipe],
        candidates: &mut Candidates,
        did_you_mean: &mut Vec<String>,
    ) {
        match self.ingredients.recommend(ingredients, recipes) {
            Ok(recommendations) => {
                for rec in recommendations.into_iter().filter(|r| r.index < recipes.len()) {
                    candidates.offer(
                        rec.index,
                        Signals { ingredient: rec.score, ..Signals::default() },
                        ResultMatchType::Ingredient,
                    );
                }
            }
            Err(err) => tracing::warn!(error = %err, "Ingredient recommender degraded"),
        }

        let vocabulary = ingredient_vocabulary(recipes);
        let threshold = self.matcher.correction_similarity();
        for ingredient in ingredients {
            let matches = self.matcher.match_terms(ingredient, &vocabulary);
            if matches.iter().any(|m| m.match_type == MatchKind::Exact) {
                continue;
            }

            for candidate in &matches {
                push_unique(did_you_mean, &candidate.ingredient);
                if candidate.score < threshold {
                    continue;
                }
                for (index, recipe) in recipes.iter().enumerate() {
                    if recipe.has_ingredient(&candidate.ingredient) {
                        candidates.offer(
                            index,
                            Signals { ingredient: candidate.confidence, ..Signals::default() },
                            ResultMatchType::FuzzyIngredient,
                        );
                    }
                }
            }
        }
    }

    fn contextual_candidates(&self, recipes: &[Recipe], context: &Context, weight: f64, candidates: &mut Candidates) {
        match self.contextual.recommend(recipes, context, recipes.len()) {
            Ok(recommendations) => {
                for rec in recommendations.into_iter().filter(|r| r.index < recipes.len()) {
                    candidates.offer(
                        rec.index,
                        Signals { contextual: rec.score * weight, ..Signals::default() },
                        ResultMatchType::Contextual,
                    );
                }
            }
            Err(err) => tracing::warn!(error = %err, "Contextual recommender degraded"),
        }
    }

    /// Spelling alternatives for an unrecognised query that matched no
    /// recipe text.
    fn query_corrections(&self, query: &str, recipes: &[Recipe], did_you_mean: &mut Vec<String>) {
        let mut vocabulary: Vec<String> = recipes.iter().map(|r| r.name.clone()).collect();
        vocabulary.extend(ingredient_vocabulary(recipes));

        let words: Vec<&str> = query.unicode_words().collect();
        let mut terms = vec![query];
        if words.len() > 1 {
            terms.extend(words.into_iter().filter(|w| w.chars().count() >= 3));
        }

        for term in terms {
            for correction in self.matcher.suggest_corrections(term, &vocabulary) {
                push_unique(did_you_mean, &correction.suggestion);
            }
        }
    }

    /// Apply the request's filter spec to the candidates, keeping index order.
    fn filter_candidates(
        &self,
        recipes: &[Recipe],
        candidates: Candidates,
        options: &SearchOptions,
    ) -> (Vec<(usize, Candidate)>, Vec<AppliedFilter>) {
        let spec = match &options.filters {
            Some(spec) if options.include_filters && !spec.is_empty() => spec,
            _ => return (candidates.0.into_iter().collect(), Vec::new()),
        };

        let result = apply_filters(candidates.0.keys().map(|&i| &recipes[i]), spec);

        let mut kept = result.recipes.iter().peekable();
        let survivors = candidates
            .0
            .into_iter()
            .filter(|(index, _)| match kept.peek() {
                Some(next) if std::ptr::eq(**next, &recipes[*index]) => {
                    kept.next();
                    true
                }
                _ => false,
            })
            .collect();

        (survivors, result.applied_filters)
    }
}

/// Builder for [`SearchEngine`].
#[derive(Default)]
pub struct SearchEngineBuilder {
    matcher: Option<FuzzyMatcher>,
    cache_config: Option<CacheConfig>,
    max_did_you_mean: Option<usize>,
    intent: Option<Arc<dyn IntentResolver>>,
    contextual: Option<Arc<dyn ContextualRecommender>>,
    ingredients: Option<Arc<dyn IngredientRecommender>>,
    suggestions: Option<Arc<dyn SuggestionProvider>>,
}

impl SearchEngineBuilder {
    /// Use a configured fuzzy matcher.
    #[must_use]
    pub fn matcher(mut self, matcher: FuzzyMatcher) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Use a cache TTL and size cap.
    #[must_use]
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = Some(config);
        self
    }

    /// Cap on `didYouMean` entries (never above three).
    #[must_use]
    pub fn max_did_you_mean(mut self, max: usize) -> Self {
        self.max_did_you_mean = Some(max);
        self
    }

    /// Replace the intent resolver.
    #[must_use]
    pub fn intent_resolver(mut self, resolver: impl IntentResolver + 'static) -> Self {
        self.intent = Some(Arc::new(resolver));
        self
    }

    /// Replace the contextual recommender.
    #[must_use]
    pub fn contextual_recommender(mut self, recommender: impl ContextualRecommender + 'static) -> Self {
        self.contextual = Some(Arc::new(recommender));
        self
    }

    /// Replace the ingredient recommender.
    #[must_use]
    pub fn ingredient_recommender(mut self, recommender: impl IngredientRecommender + 'static) -> Self {
        self.ingredients = Some(Arc::new(recommender));
        self
    }

    /// Replace the suggestion provider. Shared so the caller can keep a
    /// handle on its history.
    #[must_use]
    pub fn suggestion_provider(mut self, provider: Arc<dyn SuggestionProvider>) -> Self {
        self.suggestions = Some(provider);
        self
    }

    /// Build the engine, filling unset parts with defaults.
    pub fn build(self) -> SearchEngine {
        SearchEngine {
            matcher: self.matcher.unwrap_or_default(),
            cache: TtlCache::new(self.cache_config.unwrap_or_default()),
            max_did_you_mean: self.max_did_you_mean.unwrap_or(MAX_DID_YOU_MEAN),
            intent: self.intent.unwrap_or_else(|| Arc::new(KeywordIntentResolver::new())),
            contextual: self.contextual.unwrap_or_else(|| Arc::new(DescriptorRecommender::new())),
            ingredients: self.ingredients.unwrap_or_else(|| Arc::new(AvailabilityRecommender::new())),
            suggestions: self.suggestions.unwrap_or_else(|| Arc::new(HistorySuggestions::new())),
        }
    }
}
