//! Keyword-based intent resolution.

use super::{Descriptors, Intent, IntentKind, IntentResolver};
use crate::error::{Result, SearchError};
use crate::synonyms::canonical_term;
use unicode_segmentation::UnicodeSegmentation;

/// Ingredients recognised in addition to the synonym table.
const EXTRA_INGREDIENTS: &[&str] = &[
    "mint", "orange", "grapefruit", "pineapple", "sugar", "honey", "ginger", "coffee",
    "espresso", "tonic", "cola", "champagne", "prosecco", "campari", "aperol", "cognac",
    "brandy", "mezcal", "absinthe", "amaretto", "cucumber", "basil",
];

const STRENGTH_WORDS: &[(&str, &str)] = &[
    ("strong", "strong"),
    ("boozy", "strong"),
    ("stiff", "strong"),
    ("potent", "strong"),
    ("light", "light"),
    ("low", "light"),
    ("sessionable", "light"),
    ("weak", "light"),
];

const FLAVOR_WORDS: &[&str] = &[
    "sweet", "sour", "bitter", "citrus", "fruity", "spicy", "spiced", "smoky", "herbal", "creamy",
    "refreshing", "dry", "floral", "tart",
];

const OCCASION_WORDS: &[&str] = &[
    "party", "brunch", "dinner", "date", "celebration", "nightcap", "aperitif", "holiday",
];

const SEASON_WORDS: &[(&str, &str)] = &[
    ("summer", "summer"),
    ("summery", "summer"),
    ("winter", "winter"),
    ("wintry", "winter"),
    ("spring", "spring"),
    ("autumn", "autumn"),
    ("fall", "autumn"),
];

fn lookup<'a>(table: &[(&str, &'a str)], word: &str) -> Option<&'a str> {
    table.iter().find(|(key, _)| *key == word).map(|(_, value)| *value)
}

fn is_ingredient(term: &str) -> bool {
    canonical_term(term).is_some() || EXTRA_INGREDIENTS.contains(&term)
}

/// Resolves intent from keyword tables.
///
/// Two-word ingredient names ("lime juice") are recognised before single
/// words. Ingredients take precedence, then occasion, season and style.
/// A query with no word characters fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIntentResolver;

impl KeywordIntentResolver {
    /// Create a resolver.
    pub fn new() -> Self {
        Self
    }
}

impl IntentResolver for KeywordIntentResolver {
    fn resolve(&self, query: &str) -> Result<Intent> {
        let lowered = query.to_lowercase();
        let words: Vec<&str> = lowered.unicode_words().collect();
        if words.is_empty() {
            return Err(SearchError::collaborator(
                "intent resolver",
                format!("no recognisable words in `{}`", query.trim()),
            ));
        }

        let mut ingredients: Vec<String> = Vec::new();
        let mut descriptors = Descriptors::default();
        let mut recognised = 0usize;
        let mut i = 0;

        while i < words.len() {
            if let Some(next) = words.get(i + 1) {
                let pair = format!("{} {next}", words[i]);
                if is_ingredient(&pair) {
                    ingredients.push(pair);
                    recognised += 2;
                    i += 2;
                    continue;
                }
            }

            let word = words[i];
            let mut hit = true;
            if is_ingredient(word) {
                ingredients.push(word.to_string());
            } else if let Some(strength) = lookup(STRENGTH_WORDS, word) {
                descriptors.strength.get_or_insert_with(|| strength.to_string());
            } else if FLAVOR_WORDS.contains(&word) {
                if !descriptors.flavor.iter().any(|f| f == word) {
                    descriptors.flavor.push(word.to_string());
                }
            } else if OCCASION_WORDS.contains(&word) {
                descriptors.occasion.get_or_insert_with(|| word.to_string());
            } else if let Some(season) = lookup(SEASON_WORDS, word) {
                descriptors.season.get_or_insert_with(|| season.to_string());
            } else {
                hit = false;
            }
            if hit {
                recognised += 1;
            }
            i += 1;
        }

        let kind = if !ingredients.is_empty() {
            IntentKind::IngredientBased
        } else if descriptors.occasion.is_some() {
            IntentKind::OccasionBased
        } else if descriptors.season.is_some() {
            IntentKind::SeasonalBased
        } else if !descriptors.is_empty() {
            IntentKind::StyleBased
        } else {
            IntentKind::Default
        };

        let confidence = recognised as f64 / words.len() as f64;
        tracing::debug!(?kind, confidence, ingredients = ingredients.len(), "Resolved intent");

        Ok(Intent {
            kind,
            confidence,
            ingredients,
            descriptors,
        })
    }
}
