//! WASM bindings for recipe search.
//!
//! Every function takes and returns JSON strings. Errors are reported as
//! `{"success": false, "error": "..."}` rather than thrown.

use crate::{classify_difficulty, FuzzyMatcher, Recipe, SearchEngine, SearchOptions};
use wasm_bindgen::prelude::*;

fn error_json(message: impl std::fmt::Display) -> String {
    serde_json::json!({ "success": false, "error": message.to_string() }).to_string()
}

/// Search recipes and return a `SearchResponse` as JSON.
///
/// # Arguments
/// * `query` - Search query
/// * `recipes_json` - JSON array of recipes
/// * `options_json` - JSON search options; empty string for defaults
///
/// The response cache is always disabled here; each call builds a fresh
/// engine.
#[wasm_bindgen]
pub fn search_recipes(query: &str, recipes_json: &str, options_json: &str) -> String {
    let recipes: serde_json::Value = match serde_json::from_str(recipes_json) {
        Ok(value) => value,
        Err(e) => return error_json(e),
    };

    let mut options: SearchOptions = if options_json.trim().is_empty() {
        SearchOptions::default()
    } else {
        match serde_json::from_str(options_json) {
            Ok(options) => options,
            Err(e) => return error_json(e),
        }
    };
    options.use_cache = false;

    match SearchEngine::new().search_json(query, &recipes, &options) {
        Ok(response) => serde_json::to_string(&response).unwrap_or_else(|e| error_json(e)),
        Err(e) => error_json(e),
    }
}

/// Match an ingredient against a JSON array of vocabulary strings.
///
/// Returns a JSON array of match candidates, best first.
#[wasm_bindgen]
pub fn match_ingredient(query: &str, vocabulary_json: &str) -> String {
    let vocabulary: Vec<String> = match serde_json::from_str(vocabulary_json) {
        Ok(vocabulary) => vocabulary,
        Err(_) => return "[]".to_string(),
    };
    let matches = FuzzyMatcher::new().match_terms(query, &vocabulary);
    serde_json::to_string(&matches).unwrap_or_else(|_| "[]".to_string())
}

/// Calculate Levenshtein edit distance between two strings.
#[wasm_bindgen]
pub fn edit_distance(a: &str, b: &str) -> usize {
    crate::levenshtein_distance(a, b)
}

/// Classify a recipe given as JSON; returns the level name or an error
/// object.
#[wasm_bindgen]
pub fn classify_recipe_difficulty(recipe_json: &str) -> String {
    match serde_json::from_str::<Recipe>(recipe_json) {
        Ok(recipe) => classify_difficulty(&recipe).to_string(),
        Err(e) => error_json(e),
    }
}
