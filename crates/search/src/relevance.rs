//! Relevance scoring of recipe text against query terms.

use crate::fuzzy::contains_in_order;
use crate::model::Recipe;
use unicode_segmentation::UnicodeSegmentation;

/// Relevance score levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelevanceScore {
    /// No match
    None = 0,
    /// Query characters appear in order
    Fuzzy = 10,
    /// Contains substring
    Contains = 20,
    /// Word boundary match
    WordBoundary = 30,
    /// Starts with query
    StartsWith = 40,
    /// Exact match
    Exact = 50,
}

impl RelevanceScore {
    /// Score normalised to `0.0..=1.0`.
    pub fn fraction(self) -> f64 {
        f64::from(self as u32) / f64::from(RelevanceScore::Exact as u32)
    }
}

/// Calculate relevance level for a text against a query.
///
/// # Arguments
/// * `text` - The text to score
/// * `query` - The search query
///
/// # Returns
/// Relevance level (higher is better)
pub fn calculate_relevance(text: &str, query: &str) -> RelevanceScore {
    let text_lower = text.to_lowercase();
    let query_lower = query.trim().to_lowercase();

    if query_lower.is_empty() || text_lower.is_empty() {
        return RelevanceScore::None;
    }

    if text_lower == query_lower {
        return RelevanceScore::Exact;
    }

    if text_lower.starts_with(&query_lower) {
        return RelevanceScore::StartsWith;
    }

    if text_lower
        .unicode_words()
        .any(|word| word.starts_with(&query_lower))
    {
        return RelevanceScore::WordBoundary;
    }

    if text_lower.contains(&query_lower) {
        return RelevanceScore::Contains;
    }

    // Subsequence matches are only meaningful for short, dense queries
    if query_lower.chars().count() >= 3 && contains_in_order(&text_lower, &query_lower) {
        return RelevanceScore::Fuzzy;
    }

    RelevanceScore::None
}

/// Text relevance of a recipe for a free-text query, in `0.0..=1.0`.
///
/// The full query is scored against the recipe name first; failing that,
/// each query word is scored against the name and category and the mean of
/// the per-word bests is returned, so multi-word queries degrade smoothly.
pub fn recipe_text_relevance(recipe: &Recipe, query: &str) -> f64 {
    let whole = calculate_relevance(&recipe.name, query);
    if whole >= RelevanceScore::WordBoundary {
        return whole.fraction();
    }

    let words: Vec<&str> = query.unicode_words().collect();
    if words.is_empty() {
        return 0.0;
    }

    let total: f64 = words
        .iter()
        .map(|word| {
            calculate_relevance(&recipe.name, word)
                .max(calculate_relevance(&recipe.category, word))
                .fraction()
        })
        .sum();

    (total / words.len() as f64).max(whole.fraction())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert_eq!(calculate_relevance("Negroni", "negroni"), RelevanceScore::Exact);
    }

    #[test]
    fn test_starts_with() {
        assert_eq!(calculate_relevance("Gin Fizz", "gin"), RelevanceScore::StartsWith);
    }

    #[test]
    fn test_word_boundary() {
        assert_eq!(calculate_relevance("Ramos Gin Fizz", "gin"), RelevanceScore::WordBoundary);
    }

    #[test]
    fn test_contains() {
        assert_eq!(calculate_relevance("Caipirinha", "pir"), RelevanceScore::Contains);
    }

    #[test]
    fn test_subsequence() {
        assert_eq!(calculate_relevance("Manhattan", "mhtn"), RelevanceScore::Fuzzy);
        assert_eq!(calculate_relevance("Manhattan", "zz"), RelevanceScore::None);
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(calculate_relevance("Mojito", "  "), RelevanceScore::None);
    }

    #[test]
    fn test_recipe_text_relevance_multi_word() {
        let recipe = Recipe::new("1", "Gin & Tonic").with_category("Highball");
        let score = recipe_text_relevance(&recipe, "gin cocktails");
        assert!(score > 0.0 && score < 1.0);

        let exact = recipe_text_relevance(&Recipe::new("2", "Negroni"), "negroni");
        assert_eq!(exact, 1.0);
    }

    #[test]
    fn test_recipe_text_relevance_category() {
        let recipe = Recipe::new("1", "Paloma").with_category("Highball");
        assert!(recipe_text_relevance(&recipe, "highball") > 0.0);
        assert_eq!(recipe_text_relevance(&recipe, "sour"), 0.0);
    }
}
