//! Table-driven difficulty classification.
//!
//! Each level bounds ingredient count and prep time, restricts techniques
//! through an allow-list and a deny-list, and accepts a range of precomputed
//! difficulty scores. Missing prep time, missing score and an empty
//! technique list never count against a recipe.

use crate::model::Recipe;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty level, easiest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    /// Build-and-serve drinks
    Easy,
    /// Standard bar techniques
    Medium,
    /// Multi-step preparations
    Hard,
    /// Laboratory techniques
    Expert,
}

/// Techniques a level accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechniqueAllowList {
    /// Any technique not on the deny-list
    All,
    /// At least one technique must be listed
    Only(&'static [&'static str]),
}

/// One row of the difficulty table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelRequirements {
    /// Maximum number of ingredient lines
    pub max_ingredients: usize,
    /// Maximum prep time in minutes
    pub max_prep_minutes: f64,
    /// Accepted techniques
    pub allowed_techniques: TechniqueAllowList,
    /// Techniques that exclude a recipe
    pub denied_techniques: &'static [&'static str],
    /// Inclusive range of accepted difficulty scores
    pub score_range: (f64, f64),
}

const EASY: LevelRequirements = LevelRequirements {
    max_ingredients: 4,
    max_prep_minutes: 5.0,
    allowed_techniques: TechniqueAllowList::Only(&["build", "stir", "shake", "pour", "top"]),
    denied_techniques: &[
        "muddle", "layer", "fat_wash", "sous_vide", "clarify", "centrifuge", "foam",
        "spherification", "smoke", "flame", "infuse",
    ],
    score_range: (0.0, 3.0),
};

const MEDIUM: LevelRequirements = LevelRequirements {
    max_ingredients: 6,
    max_prep_minutes: 10.0,
    allowed_techniques: TechniqueAllowList::Only(&[
        "build", "stir", "shake", "pour", "top", "muddle", "strain", "double_strain",
        "dry_shake", "blend", "layer", "float", "rim",
    ]),
    denied_techniques: &["fat_wash", "sous_vide", "clarify", "centrifuge", "spherification"],
    score_range: (2.0, 6.0),
};

const HARD: LevelRequirements = LevelRequirements {
    max_ingredients: 8,
    max_prep_minutes: 20.0,
    allowed_techniques: TechniqueAllowList::All,
    denied_techniques: &["centrifuge", "spherification"],
    score_range: (5.0, 8.0),
};

const EXPERT: LevelRequirements = LevelRequirements {
    max_ingredients: usize::MAX,
    max_prep_minutes: f64::INFINITY,
    allowed_techniques: TechniqueAllowList::All,
    denied_techniques: &[],
    score_range: (7.0, 10.0),
};

impl DifficultyLevel {
    /// All levels, easiest first.
    pub const ALL: [DifficultyLevel; 4] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
        DifficultyLevel::Expert,
    ];

    /// The table row for this level.
    pub fn requirements(self) -> &'static LevelRequirements {
        match self {
            DifficultyLevel::Easy => &EASY,
            DifficultyLevel::Medium => &MEDIUM,
            DifficultyLevel::Hard => &HARD,
            DifficultyLevel::Expert => &EXPERT,
        }
    }

    /// Lower-case label.
    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
            DifficultyLevel::Expert => "expert",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DifficultyLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty `{s}`, expected easy|medium|hard|expert"))
    }
}

/// True if `recipe` satisfies every condition of `level`.
pub fn meets_difficulty(recipe: &Recipe, level: DifficultyLevel) -> bool {
    let req = level.requirements();

    if recipe.ingredient_count() > req.max_ingredients {
        return false;
    }

    if recipe.prep_time.is_some_and(|t| t > req.max_prep_minutes) {
        return false;
    }

    if req
        .denied_techniques
        .iter()
        .any(|denied| recipe.has_technique(denied))
    {
        return false;
    }

    if let TechniqueAllowList::Only(allowed) = req.allowed_techniques {
        if !recipe.techniques.is_empty() && !allowed.iter().any(|a| recipe.has_technique(a)) {
            return false;
        }
    }

    if let Some(score) = recipe.difficulty_score {
        let (low, high) = req.score_range;
        if score < low || score > high {
            return false;
        }
    }

    true
}

/// Lowest level the recipe satisfies; `Expert` when none does.
///
/// # Example
/// ```
/// use birch_search::{classify_difficulty, DifficultyLevel, Recipe};
///
/// let recipe = Recipe::new("1", "Tom Collins")
///     .with_ingredients(["gin", "lemon juice", "sugar", "soda", "cherry"])
///     .with_prep_time(3.0)
///     .with_techniques(["build", "shake"]);
/// assert_eq!(classify_difficulty(&recipe), DifficultyLevel::Medium);
/// ```
pub fn classify_difficulty(recipe: &Recipe) -> DifficultyLevel {
    DifficultyLevel::ALL
        .into_iter()
        .find(|level| meets_difficulty(recipe, *level))
        .unwrap_or(DifficultyLevel::Expert)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(ingredients: usize, prep: f64, techniques: &[&str]) -> Recipe {
        Recipe::new("r", "R")
            .with_ingredients((0..ingredients).map(|i| format!("ingredient {i}")))
            .with_prep_time(prep)
            .with_techniques(techniques.iter().copied())
    }

    #[test]
    fn test_five_ingredients_is_medium() {
        let r = recipe(5, 3.0, &["build", "shake"]);
        assert!(!meets_difficulty(&r, DifficultyLevel::Easy));
        assert_eq!(classify_difficulty(&r), DifficultyLevel::Medium);
    }

    #[test]
    fn test_simple_build_is_easy() {
        assert_eq!(classify_difficulty(&recipe(3, 2.0, &["build"])), DifficultyLevel::Easy);
    }

    #[test]
    fn test_denied_technique_excludes() {
        let r = recipe(3, 2.0, &["shake", "fat_wash"]);
        assert!(!meets_difficulty(&r, DifficultyLevel::Easy));
        assert!(!meets_difficulty(&r, DifficultyLevel::Medium));
        assert_eq!(classify_difficulty(&r), DifficultyLevel::Hard);
    }

    #[test]
    fn test_allow_list_requires_one_listed_technique() {
        let r = recipe(3, 2.0, &["whip"]);
        assert!(!meets_difficulty(&r, DifficultyLevel::Easy));
        assert!(meets_difficulty(&r, DifficultyLevel::Hard));
    }

    #[test]
    fn test_missing_attributes_are_inclusive() {
        let r = Recipe::new("r", "Bare").with_ingredients(["gin", "tonic"]);
        assert!(meets_difficulty(&r, DifficultyLevel::Easy));
    }

    #[test]
    fn test_score_range_applies() {
        let r = recipe(2, 1.0, &["build"]).with_difficulty_score(9.0);
        assert!(!meets_difficulty(&r, DifficultyLevel::Easy));
        assert_eq!(classify_difficulty(&r), DifficultyLevel::Expert);
    }

    #[test]
    fn test_centrifuge_is_expert() {
        assert_eq!(
            classify_difficulty(&recipe(4, 30.0, &["centrifuge"])),
            DifficultyLevel::Expert
        );
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Medium".parse::<DifficultyLevel>().unwrap(), DifficultyLevel::Medium);
        assert!("impossible".parse::<DifficultyLevel>().is_err());
        assert_eq!(DifficultyLevel::Expert.to_string(), "expert");
    }
}
