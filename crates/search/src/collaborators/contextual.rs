//! Descriptor-matching contextual recommendation.

use super::{context_strings, Context, ContextualRecommender, Recommendation};
use crate::error::Result;
use crate::model::Recipe;
use std::collections::BTreeMap;

/// Score given to every recipe when the context carries no known signal.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Recipe traits typical of an occasion.
const OCCASION_TRAITS: &[(&str, &[&str])] = &[
    ("party", &["punch", "highball", "tiki", "fruity", "sparkling"]),
    ("brunch", &["sparkling", "citrus", "fruity", "coffee"]),
    ("dinner", &["stirred", "stir", "bitter", "dry"]),
    ("date", &["coupe", "stirred", "stir", "floral", "sparkling"]),
    ("celebration", &["sparkling", "champagne", "flute"]),
    ("nightcap", &["digestif", "rich", "stirred", "stir", "bitter"]),
    ("aperitif", &["bitter", "spritz", "sparkling", "dry"]),
    ("holiday", &["spiced", "creamy", "warm", "punch"]),
];

/// Recipe traits typical of a season.
const SEASON_TRAITS: &[(&str, &[&str])] = &[
    ("summer", &["refreshing", "citrus", "fruity", "tiki", "frozen", "highball"]),
    ("winter", &["warm", "hot", "spiced", "rich", "creamy"]),
    ("spring", &["floral", "herbal", "citrus", "sparkling"]),
    ("autumn", &["spiced", "smoky", "apple", "rich"]),
];

/// Lower-cased descriptive tags of a recipe.
fn recipe_traits(recipe: &Recipe) -> Vec<String> {
    std::iter::once(recipe.category.as_str())
        .chain(recipe.flavor_profile.iter().map(String::as_str))
        .chain(recipe.techniques.iter().map(String::as_str))
        .chain(recipe.glassware.as_deref())
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn strength_score(recipe: &Recipe, strength: &str) -> Option<f64> {
    let abv = recipe.abv;
    match strength {
        "strong" => Some(abv.map_or(NEUTRAL_SCORE, |a| if a >= 25.0 { 1.0 } else if a >= 15.0 { 0.5 } else { 0.0 })),
        "light" => Some(abv.map_or(NEUTRAL_SCORE, |a| if a <= 12.0 { 1.0 } else if a <= 20.0 { 0.5 } else { 0.0 })),
        _ => None,
    }
}

fn flavor_score(recipe: &Recipe, wanted: &[String]) -> f64 {
    let own: Vec<String> = recipe.flavor_profile.iter().map(|f| f.to_lowercase()).collect();
    let hits = wanted.iter().filter(|w| own.contains(w)).count();
    hits as f64 / wanted.len() as f64
}

/// 0 for no shared trait, 0.5 for one, +0.25 per additional, capped at 1.
fn trait_score(traits: &[String], table: &[(&str, &[&str])], key: &str) -> Option<f64> {
    let (_, wanted) = table.iter().find(|(name, _)| *name == key)?;
    let hits = wanted.iter().filter(|w| traits.iter().any(|t| t == *w)).count();
    Some(match hits {
        0 => 0.0,
        n => (0.5 + 0.25 * (n - 1) as f64).min(1.0),
    })
}

/// Scores recipes against `strength`, `flavor`, `occasion` and `season`
/// context keys; the score is the mean of the signals present.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorRecommender;

impl DescriptorRecommender {
    /// Create a recommender.
    pub fn new() -> Self {
        Self
    }

    fn score(&self, recipe: &Recipe, context: &Context) -> BTreeMap<String, f64> {
        let traits = recipe_traits(recipe);
        let mut breakdown = BTreeMap::new();

        if let Some(strength) = context_strings(context, "strength").first() {
            if let Some(score) = strength_score(recipe, strength) {
                breakdown.insert("strength".to_string(), score);
            }
        }

        let flavors = context_strings(context, "flavor");
        if !flavors.is_empty() {
            breakdown.insert("flavor".to_string(), flavor_score(recipe, &flavors));
        }

        for (key, table) in [("occasion", OCCASION_TRAITS), ("season", SEASON_TRAITS)] {
            if let Some(value) = context_strings(context, key).first() {
                if let Some(score) = trait_score(&traits, table, value) {
                    breakdown.insert(key.to_string(), score);
                }
            }
        }

        breakdown
    }
}

impl ContextualRecommender for DescriptorRecommender {
    fn recommend(&self, recipes: &[Recipe], context: &Context, limit: usize) -> Result<Vec<Recommendation>> {
        let mut recommendations: Vec<Recommendation> = recipes
            .iter()
            .enumerate()
            .filter_map(|(index, recipe)| {
                let mut breakdown = self.score(recipe, context);
                let score = if breakdown.is_empty() {
                    breakdown.insert("neutral".to_string(), NEUTRAL_SCORE);
                    NEUTRAL_SCORE
                } else {
                    breakdown.values().sum::<f64>() / breakdown.len() as f64
                };
                (score > 0.0).then_some(Recommendation { index, score, breakdown })
            })
            .collect();

        recommendations.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
        recommendations.truncate(limit);
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipes() -> Vec<Recipe> {
        vec![
            Recipe::new("1", "Mai Tai").with_category("Tiki").with_abv(22.0).with_flavors(["fruity", "sweet"]),
            Recipe::new("2", "Hot Toddy").with_abv(10.0).with_flavors(["warm", "spiced"]),
            Recipe::new("3", "Martini").with_abv(32.0).with_techniques(["stir"]).with_flavors(["dry"]),
        ]
    }

    fn context(pairs: &[(&str, serde_json::Value)]) -> Context {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_season_signal() {
        let ranked = DescriptorRecommender::new()
            .recommend(&recipes(), &context(&[("season", json!("summer"))]), 10)
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].index, 0);
        assert_eq!(ranked[0].breakdown["season"], 0.75);
    }

    #[test]
    fn test_strength_and_flavor_average() {
        let ranked = DescriptorRecommender::new()
            .recommend(&recipes(), &context(&[("strength", json!("strong")), ("flavor", json!(["dry"]))]), 10)
            .unwrap();
        assert_eq!(ranked[0].index, 2);
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(ranked[1].index, 0);
        assert_eq!(ranked[1].score, 0.25);
    }

    #[test]
    fn test_empty_context_is_neutral() {
        let ranked = DescriptorRecommender::new().recommend(&recipes(), &Context::new(), 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| r.score == NEUTRAL_SCORE));
        assert_eq!(ranked[0].index, 0);
    }
}
