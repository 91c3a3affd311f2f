//! Recipe records as consumed by the search pipeline.
//!
//! Recipes are read-only here. Optional attributes are genuinely optional:
//! every filter treats a missing value as a pass.

use serde::{Deserialize, Serialize};

/// A single ingredient line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Ingredient name, e.g. "London dry gin"
    pub name: String,
    /// Quantity in `unit`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Unit of measure, e.g. "oz"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Ingredient {
    /// Creates an ingredient without a measured amount.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
            unit: None,
        }
    }

    /// Creates a measured ingredient.
    pub fn measured(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: Some(amount),
            unit: Some(unit.into()),
        }
    }
}

/// A cocktail recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Category, e.g. "Highball" (empty means uncategorised)
    #[serde(default)]
    pub category: String,
    /// Alcohol by volume, percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abv: Option<f64>,
    /// Preparation time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<f64>,
    /// Ingredient lines in build order
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Technique tags, e.g. "shake", "fat_wash"
    #[serde(default)]
    pub techniques: Vec<String>,
    /// Flavor-profile tags, e.g. "citrus", "bitter"
    #[serde(default)]
    pub flavor_profile: Vec<String>,
    /// Glass label, e.g. "coupe"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glassware: Option<String>,
    /// Marked as a favorite by the user
    #[serde(default)]
    pub is_favorite: bool,
    /// Popularity, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    /// Curated quality score, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    /// Precomputed difficulty score, 0-10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_score: Option<f64>,
}

impl Recipe {
    /// Creates a recipe with only an id and a name set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            abv: None,
            prep_time: None,
            ingredients: Vec::new(),
            techniques: Vec::new(),
            flavor_profile: Vec::new(),
            glassware: None,
            is_favorite: false,
            popularity: None,
            quality_score: None,
            difficulty_score: None,
        }
    }

    /// Number of ingredient lines.
    #[inline]
    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    /// Iterates over ingredient names.
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(|i| i.name.as_str())
    }

    /// True if the recipe carries the technique tag (case-insensitive).
    pub fn has_technique(&self, technique: &str) -> bool {
        self.techniques
            .iter()
            .any(|t| t.eq_ignore_ascii_case(technique))
    }

    /// True if any ingredient name equals `name` (case-insensitive).
    pub fn has_ingredient(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.ingredient_names().any(|n| n.to_lowercase() == name)
    }

    /// Popularity normalised to 0.0..=1.0.
    #[inline]
    pub fn popularity_fraction(&self) -> f64 {
        self.popularity.map_or(0.0, |p| (p / 100.0).clamp(0.0, 1.0))
    }

    /// Quality normalised to 0.0..=1.0.
    #[inline]
    pub fn quality_fraction(&self) -> f64 {
        self.quality_score.map_or(0.0, |q| (q / 100.0).clamp(0.0, 1.0))
    }

    // Builder helpers, mostly for tests and fixtures.

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the ABV.
    #[must_use]
    pub fn with_abv(mut self, abv: f64) -> Self {
        self.abv = Some(abv);
        self
    }

    /// Sets the prep time in minutes.
    #[must_use]
    pub fn with_prep_time(mut self, minutes: f64) -> Self {
        self.prep_time = Some(minutes);
        self
    }

    /// Appends unmeasured ingredients.
    #[must_use]
    pub fn with_ingredients<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients
            .extend(names.into_iter().map(Ingredient::named));
        self
    }

    /// Sets technique tags.
    #[must_use]
    pub fn with_techniques<I, S>(mut self, techniques: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.techniques = techniques.into_iter().map(Into::into).collect();
        self
    }

    /// Sets flavor-profile tags.
    #[must_use]
    pub fn with_flavors<I, S>(mut self, flavors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flavor_profile = flavors.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the glassware label.
    #[must_use]
    pub fn with_glassware(mut self, glass: impl Into<String>) -> Self {
        self.glassware = Some(glass.into());
        self
    }

    /// Marks the recipe as a favorite.
    #[must_use]
    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    /// Sets popularity (0-100).
    #[must_use]
    pub fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = Some(popularity);
        self
    }

    /// Sets quality (0-100).
    #[must_use]
    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality_score = Some(quality);
        self
    }

    /// Sets the precomputed difficulty score.
    #[must_use]
    pub fn with_difficulty_score(mut self, score: f64) -> Self {
        self.difficulty_score = Some(score);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_sparse_recipe() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"id": "r1", "name": "Daiquiri", "ingredients": [{"name": "Rum", "amount": 2, "unit": "oz"}]}"#,
        )
        .unwrap();

        assert_eq!(recipe.ingredient_count(), 1);
        assert!(recipe.abv.is_none());
        assert!(recipe.category.is_empty());
        assert!(!recipe.is_favorite);
    }

    #[test]
    fn test_camel_case_fields() {
        let recipe = Recipe::new("r1", "Negroni").with_quality(80.0).favorite(true);
        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["qualityScore"], 80.0);
    }

    #[test]
    fn test_lookups_ignore_case() {
        let recipe = Recipe::new("r1", "Mojito")
            .with_ingredients(["White Rum", "Mint"])
            .with_techniques(["Muddle"]);
        assert!(recipe.has_ingredient("white rum"));
        assert!(recipe.has_technique("muddle"));
        assert!(!recipe.has_technique("shake"));
    }

    #[test]
    fn test_fractions_clamp() {
        let recipe = Recipe::new("r1", "X").with_popularity(150.0);
        assert_eq!(recipe.popularity_fraction(), 1.0);
        assert_eq!(recipe.quality_fraction(), 0.0);
    }
}
