//! Recipe search for Birch.
//!
//! This crate provides:
//! - Fuzzy ingredient matching (edit distance, Soundex, synonym table)
//! - Multi-level relevance scoring of recipe text
//! - Multi-dimensional recipe filtering with an audit trail
//! - Table-driven difficulty classification
//! - A search orchestrator with score fusion and a TTL response cache
//! - Pluggable collaborators for intent, recommendations and suggestions
//!
//! # Example
//!
//! ```rust
//! use birch_search::{FilterSpec, Recipe, SearchEngine, SearchOptions};
//!
//! let recipes = vec![
//!     Recipe::new("1", "Gin & Tonic").with_abv(15.0).with_ingredients(["gin", "tonic"]).favorite(true),
//!     Recipe::new("2", "Old Fashioned").with_abv(35.0).with_ingredients(["bourbon", "sugar", "bitters"]),
//! ];
//!
//! let engine = SearchEngine::new();
//! let options = SearchOptions::default().with_filters(FilterSpec::default().with_abv(None, Some(20.0)));
//! let response = engine.search("gin cocktails", &recipes, &options).unwrap();
//!
//! assert_eq!(response.results[0].recipe.name, "Gin & Tonic");
//! ```

pub mod collaborators;
mod difficulty;
mod engine;
mod equipment;
mod error;
mod filters;
mod fuzzy;
mod model;
mod phonetic;
mod relevance;
mod response;
mod scoring;
mod synonyms;
mod timing;

#[cfg(feature = "wasm")]
mod wasm;

pub use collaborators::{Context, Intent, IntentKind, SuggestOptions, Suggestions};
pub use difficulty::{classify_difficulty, meets_difficulty, DifficultyLevel, LevelRequirements, TechniqueAllowList};
pub use engine::{SearchEngine, SearchEngineBuilder, SearchOptions, DEFAULT_CONTEXTUAL_WEIGHT, MAX_DID_YOU_MEAN};
pub use equipment::{techniques_for, uses_equipment, EQUIPMENT_TECHNIQUES};
pub use error::{Result, SearchError, SearchErrorCode};
pub use filters::{
    apply_filters, filter_by_abv, filter_by_category, filter_by_difficulty, filter_by_equipment,
    filter_by_flavor_profile, filter_by_glassware, filter_by_ingredient_count, filter_by_prep_time,
    AppliedFilter, CountRange, EquipmentFilter, FilterResult, FilterSpec, FilterStats, FilterType,
    FlavorFilter, FlavorMatchMode, NumericRange, PrepTimeBucket, PrepTimeFilter,
};
pub use fuzzy::{
    contains_in_order, levenshtein_distance, similarity, Correction, CorrectionKind, FuzzyMatcher,
    MatchCandidate, MatchKind, MatchOptions,
};
pub use model::{Ingredient, Recipe};
pub use phonetic::{soundex, sounds_alike};
pub use relevance::{calculate_relevance, recipe_text_relevance, RelevanceScore};
pub use response::{ResultMatchType, SearchResponse, SearchResult, SearchStats};
pub use scoring::{fuse_scores, ScoreBreakdown, Signals};
pub use synonyms::{canonical_term, expand_synonyms, SYNONYM_TABLE};
