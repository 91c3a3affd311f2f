//! Availability-based ingredient recommendation.

use super::{IngredientRecommender, Recommendation};
use crate::error::Result;
use crate::model::Recipe;
use crate::synonyms::canonical_term;
use std::collections::BTreeMap;

/// True if an available ingredient covers a recipe ingredient: equal,
/// contained in one another ("gin" / "london dry gin") or synonyms.
fn covers(available: &str, needed: &str) -> bool {
    if available.is_empty() || needed.is_empty() {
        return false;
    }
    if available == needed || needed.contains(available) || available.contains(needed) {
        return true;
    }
    matches!(
        (canonical_term(available), canonical_term(needed)),
        (Some(a), Some(b)) if a == b
    )
}

/// Recommends recipes by the share of their ingredients that are available.
///
/// The score is `covered / total` ingredient lines; recipes with no covered
/// ingredient are not returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvailabilityRecommender;

impl AvailabilityRecommender {
    /// Create a recommender.
    pub fn new() -> Self {
        Self
    }
}

impl IngredientRecommender for AvailabilityRecommender {
    fn recommend(&self, available: &[String], recipes: &[Recipe]) -> Result<Vec<Recommendation>> {
        let available: Vec<String> = available
            .iter()
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();
        if available.is_empty() {
            return Ok(Vec::new());
        }

        let mut recommendations = Vec::new();
        for (index, recipe) in recipes.iter().enumerate() {
            let total = recipe.ingredient_count();
            if total == 0 {
                continue;
            }
            let covered = recipe
                .ingredient_names()
                .map(str::to_lowercase)
                .filter(|needed| available.iter().any(|a| covers(a, needed)))
                .count();
            if covered == 0 {
                continue;
            }

            let score = covered as f64 / total as f64;
            let breakdown = BTreeMap::from([
                ("covered".to_string(), covered as f64),
                ("missing".to_string(), (total - covered) as f64),
            ]);
            recommendations.push(Recommendation { index, score, breakdown });
        }

        recommendations.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_score() {
        let recipes = vec![
            Recipe::new("1", "Gin & Tonic").with_ingredients(["London Dry Gin", "tonic water"]),
            Recipe::new("2", "Old Fashioned").with_ingredients(["bourbon", "sugar", "angostura"]),
            Recipe::new("3", "Whiskey Neat").with_ingredients(["whiskey"]),
        ];
        let ranked = AvailabilityRecommender::new()
            .recommend(&["gin".to_string(), "Rye".to_string()], &recipes)
            .unwrap();

        let scores: Vec<(usize, f64)> = ranked.iter().map(|r| (r.index, r.score)).collect();
        assert_eq!(scores[0], (2, 1.0));
        assert_eq!(scores[1], (0, 0.5));
        assert_eq!(scores[2].0, 1);
        assert!((scores[2].1 - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(ranked[1].breakdown["missing"], 1.0);
    }

    #[test]
    fn test_nothing_available() {
        let recipes = vec![Recipe::new("1", "Mojito").with_ingredients(["rum", "mint"])];
        assert!(AvailabilityRecommender::new().recommend(&[], &recipes).unwrap().is_empty());
        assert!(AvailabilityRecommender::new()
            .recommend(&["vodka".to_string()], &recipes)
            .unwrap()
            .is_empty());
    }
}
