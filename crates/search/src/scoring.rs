//! Score fusion.
//!
//! ```text
//! final = relevance × 0.4
//!       + ingredient × 0.9 × 0.3
//!       + contextual × 0.7 × 0.2
//!       + popularity/100 × 0.2
//!       + 0.3 if favorite
//!       + quality/100 × 0.1
//! ```
//!
//! clamped to `0.0..=1.0`. Every term is kept in a [`ScoreBreakdown`].

use crate::model::Recipe;
use serde::{Deserialize, Serialize};

/// Weight of text relevance.
pub const RELEVANCE_WEIGHT: f64 = 0.4;
/// Discount applied to ingredient-match scores.
pub const INGREDIENT_DISCOUNT: f64 = 0.9;
/// Weight of the discounted ingredient-match score.
pub const INGREDIENT_WEIGHT: f64 = 0.3;
/// Discount applied to contextual scores.
pub const CONTEXTUAL_DISCOUNT: f64 = 0.7;
/// Weight of the discounted contextual score.
pub const CONTEXTUAL_WEIGHT: f64 = 0.2;
/// Weight of normalised popularity.
pub const POPULARITY_WEIGHT: f64 = 0.2;
/// Flat boost for favorites.
pub const FAVORITE_BOOST: f64 = 0.3;
/// Weight of normalised quality.
pub const QUALITY_WEIGHT: f64 = 0.1;

/// Raw match signals for one recipe, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signals {
    /// Text relevance of name/category
    pub relevance: f64,
    /// Ingredient match (availability or fuzzy)
    pub ingredient: f64,
    /// Contextual recommendation
    pub contextual: f64,
}

impl Signals {
    /// Keep the strongest value of each signal.
    pub fn merge(&mut self, other: Signals) {
        self.relevance = self.relevance.max(other.relevance);
        self.ingredient = self.ingredient.max(other.ingredient);
        self.contextual = self.contextual.max(other.contextual);
    }
}

/// Every term of a fused score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Input signals
    pub signals: Signals,
    /// `relevance × 0.4`
    pub relevance: f64,
    /// `ingredient × 0.9 × 0.3`
    pub ingredient_match: f64,
    /// `contextual × 0.7 × 0.2`
    pub contextual: f64,
    /// `popularity/100 × 0.2`
    pub popularity_boost: f64,
    /// `0.3` for favorites
    pub favorite_boost: f64,
    /// `quality/100 × 0.1`
    pub quality_boost: f64,
    /// Sum before clamping
    pub raw_total: f64,
}

impl ScoreBreakdown {
    /// Clamped final score.
    pub fn final_score(&self) -> f64 {
        unit(self.raw_total)
    }
}

/// Map to `0.0..=1.0`, sending NaN to zero.
fn unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Fuse signals and recipe boosts into a breakdown.
///
/// # Example
/// ```
/// use birch_search::{fuse_scores, Recipe, Signals};
///
/// let recipe = Recipe::new("1", "Gimlet").favorite(true);
/// let breakdown = fuse_scores(&recipe, Signals { relevance: 1.0, ..Signals::default() });
/// assert!((breakdown.final_score() - 0.7).abs() < 1e-9);
/// ```
pub fn fuse_scores(recipe: &Recipe, signals: Signals) -> ScoreBreakdown {
    let signals = Signals {
        relevance: unit(signals.relevance),
        ingredient: unit(signals.ingredient),
        contextual: unit(signals.contextual),
    };

    let relevance = signals.relevance * RELEVANCE_WEIGHT;
    let ingredient_match = signals.ingredient * INGREDIENT_DISCOUNT * INGREDIENT_WEIGHT;
    let contextual = signals.contextual * CONTEXTUAL_DISCOUNT * CONTEXTUAL_WEIGHT;
    let popularity_boost = unit(recipe.popularity_fraction()) * POPULARITY_WEIGHT;
    let favorite_boost = if recipe.is_favorite { FAVORITE_BOOST } else { 0.0 };
    let quality_boost = unit(recipe.quality_fraction()) * QUALITY_WEIGHT;

    ScoreBreakdown {
        signals,
        relevance,
        ingredient_match,
        contextual,
        popularity_boost,
        favorite_boost,
        quality_boost,
        raw_total: relevance + ingredient_match + contextual + popularity_boost + favorite_boost + quality_boost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_weights() {
        let recipe = Recipe::new("1", "Daiquiri").with_popularity(50.0).with_quality(80.0);
        let b = fuse_scores(&recipe, Signals { relevance: 0.5, ingredient: 1.0, contextual: 1.0 });
        assert!((b.relevance - 0.2).abs() < 1e-9);
        assert!((b.ingredient_match - 0.27).abs() < 1e-9);
        assert!((b.contextual - 0.14).abs() < 1e-9);
        assert!((b.popularity_boost - 0.1).abs() < 1e-9);
        assert!((b.quality_boost - 0.08).abs() < 1e-9);
        assert_eq!(b.favorite_boost, 0.0);
        assert!((b.final_score() - 0.79).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_to_one() {
        let recipe = Recipe::new("1", "Everything").favorite(true).with_popularity(100.0).with_quality(100.0);
        let b = fuse_scores(&recipe, Signals { relevance: 1.0, ingredient: 1.0, contextual: 1.0 });
        assert!(b.raw_total > 1.0);
        assert_eq!(b.final_score(), 1.0);
    }

    #[test]
    fn test_favorite_breaks_tie() {
        let signals = Signals { relevance: 0.4, ..Signals::default() };
        let fav = fuse_scores(&Recipe::new("1", "A").favorite(true), signals);
        let plain = fuse_scores(&Recipe::new("2", "B"), signals);
        assert!(fav.final_score() > plain.final_score());
    }

    proptest! {
        #[test]
        fn prop_final_score_in_unit_interval(
            relevance in -2.0f64..3.0,
            ingredient in -2.0f64..3.0,
            contextual in proptest::num::f64::ANY,
            popularity in proptest::option::of(-500.0f64..500.0),
            quality in proptest::option::of(proptest::num::f64::ANY),
            favorite in any::<bool>(),
        ) {
            let mut recipe = Recipe::new("p", "Prop").favorite(favorite);
            recipe.popularity = popularity;
            recipe.quality_score = quality;
            let score = fuse_scores(&recipe, Signals { relevance, ingredient, contextual }).final_score();
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
