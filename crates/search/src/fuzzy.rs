//! Fuzzy matching algorithms.
//!
//! Matching a query token against a vocabulary combines five strategies:
//! exact equality, substring containment, edit-distance similarity, phonetic
//! codes and the curated synonym table. All comparisons ignore case; the
//! returned candidates keep the vocabulary's original casing.

use crate::phonetic::sounds_alike;
use crate::synonyms::{group_members, group_of, SYNONYM_TABLE};
use birch_core::config::FuzzyConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Score given to phonetic matches.
pub const PHONETIC_SCORE: f64 = 0.7;

/// Discount applied to synonym matches.
pub const SYNONYM_DISCOUNT: f64 = 0.9;

/// Upper bound of a substring score.
pub const SUBSTRING_CAP: f64 = 0.95;

/// Calculate Levenshtein edit distance between two strings.
///
/// # Arguments
/// * `a` - First string
/// * `b` - Second string
///
/// # Returns
/// Number of single-character edits needed to transform a into b
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 { return n; }
    if n == 0 { return m; }

    // Use two rows for space optimization
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalised edit-distance similarity in `0.0..=1.0`, ignoring case.
///
/// `(maxLen - distance) / maxLen`; two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein_distance(&a, &b);
    (max_len - distance) as f64 / max_len as f64
}

/// Check if text contains all characters of query in order.
///
/// All query characters must appear in the text in the same order, but not
/// necessarily consecutively.
pub fn contains_in_order(text: &str, query: &str) -> bool {
    let mut text_chars = text.chars();
    query
        .chars()
        .all(|query_char| text_chars.any(|c| c == query_char))
}

/// Strategy that produced a match candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Case-insensitive equality
    Exact,
    /// One string contains the other
    Substring,
    /// Edit-distance similarity above threshold
    Fuzzy,
    /// Same phonetic code
    Phonetic,
    /// Related through the synonym table
    Synonym,
}

impl MatchKind {
    /// How far a score of this kind can be trusted.
    pub fn confidence_weight(self) -> f64 {
        match self {
            MatchKind::Exact => 1.0,
            MatchKind::Substring => 0.9,
            MatchKind::Synonym => 0.85,
            MatchKind::Fuzzy => 0.8,
            MatchKind::Phonetic => 0.6,
        }
    }
}

/// A vocabulary entry matched by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    /// Vocabulary entry, original casing
    pub ingredient: String,
    /// Similarity in `0.0..=1.0`
    pub score: f64,
    /// Strategy that produced the best score
    pub match_type: MatchKind,
    /// Score weighted by how reliable the strategy is
    pub confidence: f64,
    /// Synonym-table term the query actually matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_variant: Option<String>,
}

impl MatchCandidate {
    fn new(ingredient: &str, score: f64, match_type: MatchKind) -> Self {
        Self {
            ingredient: ingredient.to_string(),
            score,
            match_type,
            confidence: score * match_type.confidence_weight(),
            matched_variant: None,
        }
    }
}

/// Options for a single match call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOptions {
    /// Minimum similarity for fuzzy and synonym candidates
    pub min_similarity: f64,
    /// Maximum candidates returned
    pub max_results: usize,
    /// Run the phonetic pass
    pub include_phonetic: bool,
    /// Run the synonym pass
    pub include_synonyms: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_similarity: 0.3,
            max_results: 10,
            include_phonetic: true,
            include_synonyms: true,
        }
    }
}

/// Why a correction was proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionKind {
    /// A normalised spelling of the query matched
    SpellingCorrection,
    /// The query sounds like the suggestion
    PhoneticSimilarity,
}

/// A proposed replacement for a query token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correction {
    /// Query as typed
    pub original: String,
    /// Proposed vocabulary entry
    pub suggestion: String,
    /// Confidence in `0.0..=1.0`
    pub confidence: f64,
    /// Reason for the proposal
    pub kind: CorrectionKind,
}

/// Spelling normalisations tried when proposing corrections.
const REWRITES: &[(&str, &str)] = &[("ie", "ei"), ("ei", "ie"), ("ph", "f"), ("ck", "k"), ("ae", "e")];

/// Fuzzy matcher over caller-supplied vocabularies.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatcher {
    options: MatchOptions,
    correction_similarity: f64,
    max_corrections: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            options: MatchOptions::default(),
            correction_similarity: 0.6,
            max_corrections: 5,
        }
    }
}

impl FuzzyMatcher {
    /// Matcher with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matcher configured from the `[fuzzy]` config section.
    pub fn from_config(config: &FuzzyConfig) -> Self {
        Self {
            options: MatchOptions {
                min_similarity: config.min_similarity,
                max_results: config.max_results,
                ..MatchOptions::default()
            },
            correction_similarity: config.correction_similarity,
            max_corrections: config.max_corrections,
        }
    }

    /// Default options used by [`FuzzyMatcher::match_terms`].
    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Minimum score for a rewrite or near miss to count as a correction.
    pub fn correction_similarity(&self) -> f64 {
        self.correction_similarity
    }

    /// Match `query` against `vocabulary` with the matcher's default options.
    ///
    /// # Example
    /// ```
    /// use birch_search::{FuzzyMatcher, MatchKind};
    ///
    /// let matches = FuzzyMatcher::new().match_terms("gin", &["gin", "rum"]);
    /// assert_eq!(matches[0].ingredient, "gin");
    /// assert_eq!(matches[0].match_type, MatchKind::Exact);
    /// ```
    pub fn match_terms<S: AsRef<str>>(&self, query: &str, vocabulary: &[S]) -> Vec<MatchCandidate> {
        self.match_with(query, vocabulary, &self.options)
    }

    /// Match `query` against `vocabulary` with explicit options.
    ///
    /// Returns at most one candidate per vocabulary entry (case-insensitive),
    /// sorted by descending score with vocabulary order breaking ties.
    pub fn match_with<S: AsRef<str>>(
        &self,
        query: &str,
        vocabulary: &[S],
        options: &MatchOptions,
    ) -> Vec<MatchCandidate> {
        let query = query.trim();
        if query.is_empty() || vocabulary.is_empty() || options.max_results == 0 {
            return Vec::new();
        }
        let query_lower = query.to_lowercase();
        let query_len = query_lower.chars().count();

        let mut collector = CandidateCollector::default();

        for term in vocabulary.iter().map(AsRef::as_ref) {
            let term_lower = term.trim().to_lowercase();
            if term_lower.is_empty() {
                continue;
            }

            if term_lower == query_lower {
                collector.offer(MatchCandidate::new(term, 1.0, MatchKind::Exact));
                continue;
            }

            if term_lower.contains(&query_lower) || query_lower.contains(&term_lower) {
                let term_len = term_lower.chars().count();
                let length_ratio = query_len.max(term_len) as f64 / query_len.min(term_len) as f64;
                let score = (length_ratio * 0.8).min(SUBSTRING_CAP);
                collector.offer(MatchCandidate::new(term, score, MatchKind::Substring));
            } else {
                let score = similarity(&query_lower, &term_lower);
                if score >= options.min_similarity {
                    collector.offer(MatchCandidate::new(term, score, MatchKind::Fuzzy));
                }
            }

            if options.include_phonetic && sounds_alike(&query_lower, &term_lower) {
                collector.offer(MatchCandidate::new(term, PHONETIC_SCORE, MatchKind::Phonetic));
            }
        }

        if options.include_synonyms {
            self.synonym_pass(&query_lower, vocabulary, options, &mut collector);
        }

        let mut candidates = collector.into_sorted();
        candidates.truncate(options.max_results);
        candidates
    }

    /// Scan the synonym table: a query close to any member of a group yields
    /// candidates for the group's members present in the vocabulary.
    fn synonym_pass<S: AsRef<str>>(
        &self,
        query_lower: &str,
        vocabulary: &[S],
        options: &MatchOptions,
        collector: &mut CandidateCollector,
    ) {
        for group in 0..SYNONYM_TABLE.len() {
            let best = group_members(group)
                .map(|member| (member, similarity(query_lower, member)))
                .fold(None::<(&str, f64)>, |best, (member, score)| match best {
                    Some((_, best_score)) if best_score >= score => best,
                    _ => Some((member, score)),
                });

            let Some((variant, score)) = best else { continue };
            if score < options.min_similarity {
                continue;
            }

            for term in vocabulary.iter().map(AsRef::as_ref) {
                if term.trim().eq_ignore_ascii_case(query_lower) || group_of(term.trim()) != Some(group) {
                    continue;
                }
                let mut candidate = MatchCandidate::new(term, score * SYNONYM_DISCOUNT, MatchKind::Synonym);
                candidate.matched_variant = Some(variant.to_string());
                collector.offer(candidate);
            }
        }
    }

    /// Best single candidate, if any.
    pub fn best_match<S: AsRef<str>>(&self, query: &str, vocabulary: &[S]) -> Option<MatchCandidate> {
        self.match_terms(query, vocabulary).into_iter().next()
    }

    /// Propose corrections for a possibly misspelled query.
    ///
    /// Normalised spellings of the query that differ from it are matched at
    /// the stricter correction threshold; phonetic matches of the query as
    /// typed are surfaced too. The query itself is never suggested.
    pub fn suggest_corrections<S: AsRef<str>>(&self, query: &str, vocabulary: &[S]) -> Vec<Correction> {
        let query = query.trim();
        if query.is_empty() || vocabulary.is_empty() {
            return Vec::new();
        }
        let query_lower = query.to_lowercase();

        let strict = MatchOptions {
            min_similarity: self.correction_similarity,
            ..self.options
        };

        let mut corrections: Vec<Correction> = Vec::new();

        for rewrite in spelling_rewrites(&query_lower) {
            for candidate in self.match_with(&rewrite, vocabulary, &strict) {
                corrections.push(Correction {
                    original: query.to_string(),
                    suggestion: candidate.ingredient,
                    confidence: candidate.confidence,
                    kind: CorrectionKind::SpellingCorrection,
                });
            }
        }

        if self.options.include_phonetic {
            let confidence = PHONETIC_SCORE * MatchKind::Phonetic.confidence_weight();
            corrections.extend(
                vocabulary
                    .iter()
                    .map(AsRef::as_ref)
                    .filter(|term| sounds_alike(&query_lower, &term.trim().to_lowercase()))
                    .map(|term| Correction {
                        original: query.to_string(),
                        suggestion: term.to_string(),
                        confidence,
                        kind: CorrectionKind::PhoneticSimilarity,
                    }),
            );
        }

        let mut best: Vec<Correction> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        for correction in corrections {
            let key = correction.suggestion.to_lowercase();
            if key == query_lower {
                continue;
            }
            match seen.get(&key) {
                Some(&idx) if best[idx].confidence >= correction.confidence => {}
                Some(&idx) => best[idx] = correction,
                None => {
                    seen.insert(key, best.len());
                    best.push(correction);
                }
            }
        }

        best.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        best.truncate(self.max_corrections);
        best
    }
}

/// Distinct normalised spellings of `query_lower`, excluding the query itself.
fn spelling_rewrites(query_lower: &str) -> Vec<String> {
    let mut collapsed = String::with_capacity(query_lower.len());
    let mut last = None;
    for c in query_lower.chars() {
        if Some(c) != last || !c.is_alphabetic() {
            collapsed.push(c);
        }
        last = Some(c);
    }

    let mut rewrites = vec![collapsed];
    rewrites.extend(
        REWRITES
            .iter()
            .filter(|(from, _)| query_lower.contains(from))
            .map(|(from, to)| query_lower.replace(from, to)),
    );

    let mut distinct: Vec<String> = Vec::new();
    for rewrite in rewrites {
        if rewrite != query_lower && !distinct.contains(&rewrite) {
            distinct.push(rewrite);
        }
    }
    distinct
}

/// Keeps the best candidate per lower-cased vocabulary entry in first-seen order.
#[derive(Default)]
struct CandidateCollector {
    candidates: Vec<MatchCandidate>,
    index: HashMap<String, usize>,
}

impl CandidateCollector {
    fn offer(&mut self, candidate: MatchCandidate) {
        let key = candidate.ingredient.trim().to_lowercase();
        match self.index.get(&key) {
            Some(&idx) if self.candidates[idx].score >= candidate.score => {}
            Some(&idx) => self.candidates[idx] = candidate,
            None => {
                self.index.insert(key, self.candidates.len());
                self.candidates.push(candidate);
            }
        }
    }

    fn into_sorted(mut self) -> Vec<MatchCandidate> {
        // stable: ties keep vocabulary order
        self.candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_levenshtein_same() {
        assert_eq!(levenshtein_distance("hello", "hello"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein_distance("gin", "gun"), 1);
    }

    #[test]
    fn test_levenshtein_insert_delete() {
        assert_eq!(levenshtein_distance("helo", "hello"), 1);
        assert_eq!(levenshtein_distance("hello", "helo"), 1);
        assert_eq!(levenshtein_distance("", "rum"), 3);
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("gin", "gin"), 1.0);
        assert_eq!(similarity("GIN", "gin"), 1.0);
        assert!(similarity("gin", "xyz") < 0.01);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn test_contains_in_order() {
        assert!(contains_in_order("grand marnier", "gmr"));
        assert!(!contains_in_order("gin", "nig"));
        assert!(contains_in_order("rum", ""));
    }

    #[test]
    fn test_exact_match_is_first() {
        let matches = FuzzyMatcher::new().match_terms("gin", &["gin", "rum"]);
        assert_eq!(matches[0].ingredient, "gin");
        assert_eq!(matches[0].score, 1.0);
        assert_eq!(matches[0].match_type, MatchKind::Exact);
    }

    #[test]
    fn test_exact_keeps_original_casing() {
        let matches = FuzzyMatcher::new().match_terms("CAMPARI", &["Campari"]);
        assert_eq!(matches[0].ingredient, "Campari");
        assert_eq!(matches[0].match_type, MatchKind::Exact);
    }

    #[test]
    fn test_substring_score() {
        let matches = FuzzyMatcher::new().match_terms("lime", &["lime juice"]);
        assert_eq!(matches[0].match_type, MatchKind::Substring);
        assert!((matches[0].score - SUBSTRING_CAP).abs() < 1e-9);

        let close = FuzzyMatcher::new().match_terms("rums", &["rum"]);
        assert_eq!(close[0].match_type, MatchKind::Substring);
        assert!(close[0].score <= SUBSTRING_CAP);
        assert!(close[0].score >= 0.8);
    }

    #[test]
    fn test_fuzzy_match_typo() {
        let matches = FuzzyMatcher::new().match_terms("vodak", &["vodka", "cream"]);
        assert_eq!(matches[0].ingredient, "vodka");
        assert!(matches.iter().all(|m| m.ingredient != "cream" || m.score < matches[0].score));
    }

    #[test]
    fn test_phonetic_beats_weak_fuzzy() {
        let matches = FuzzyMatcher::new().match_terms("cointro", &["Cointreau"]);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].score >= PHONETIC_SCORE);
    }

    #[test]
    fn test_synonym_resolution() {
        let matches = FuzzyMatcher::new().match_terms("bourbon", &["whiskey", "vodka"]);
        let whiskey = matches.iter().find(|m| m.ingredient == "whiskey").unwrap();
        assert_eq!(whiskey.match_type, MatchKind::Synonym);
        assert_eq!(whiskey.matched_variant.as_deref(), Some("bourbon"));
        assert!((whiskey.score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_synonym_from_canonical_to_variant() {
        let matches = FuzzyMatcher::new().match_terms("triple sec", &["Cointreau"]);
        assert_eq!(matches[0].ingredient, "Cointreau");
        assert_eq!(matches[0].match_type, MatchKind::Synonym);
    }

    #[test]
    fn test_dedup_keeps_best() {
        let matches = FuzzyMatcher::new().match_terms("gin", &["gin", "Gin", "GIN"]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].match_type, MatchKind::Exact);
    }

    #[test]
    fn test_empty_inputs() {
        let matcher = FuzzyMatcher::new();
        let empty: [&str; 0] = [];
        assert!(matcher.match_terms("", &["gin"]).is_empty());
        assert!(matcher.match_terms("   ", &["gin"]).is_empty());
        assert!(matcher.match_terms("gin", &empty).is_empty());
        assert!(matcher.suggest_corrections("", &["gin"]).is_empty());
    }

    #[test]
    fn test_max_results_truncates() {
        let vocab = ["gin", "gin fizz", "gin sour", "sloe gin", "pink gin"];
        let options = MatchOptions { max_results: 2, ..MatchOptions::default() };
        let matches = FuzzyMatcher::new().match_with("gin", &vocab, &options);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].ingredient, "gin");
    }

    #[test]
    fn test_correction_for_doubled_letters() {
        let corrections = FuzzyMatcher::new().suggest_corrections("tequilla", &["tequila", "vodka"]);
        assert_eq!(corrections[0].suggestion, "tequila");
        assert_eq!(corrections[0].kind, CorrectionKind::SpellingCorrection);
        assert!(corrections.len() <= 5);
    }

    #[test]
    fn test_correction_phonetic() {
        let corrections = FuzzyMatcher::new().suggest_corrections("whisky", &["whiskey"]);
        assert!(corrections.iter().any(|c| c.suggestion == "whiskey"));
    }

    #[test]
    fn test_correction_never_echoes_query() {
        let corrections = FuzzyMatcher::new().suggest_corrections("apple", &["apple", "aple"]);
        assert!(corrections.iter().all(|c| c.suggestion != "apple"));
    }

    #[test]
    fn test_corrections_sorted() {
        let vocab = ["cognac", "cointreau", "campari", "chartreuse"];
        let corrections = FuzzyMatcher::new().suggest_corrections("conyac", &vocab);
        for pair in corrections.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_spelling_rewrites() {
        let rewrites = spelling_rewrites("absinthee");
        assert!(rewrites.contains(&"absinthe".to_string()));
        assert!(spelling_rewrites("rum").is_empty());
    }

    proptest! {
        #[test]
        fn prop_levenshtein_symmetric(a in "[a-z]{0,12}", b in "[a-z]{0,12}") {
            prop_assert_eq!(levenshtein_distance(&a, &b), levenshtein_distance(&b, &a));
        }

        #[test]
        fn prop_similarity_in_unit_range(a in "[a-zA-Z ]{0,12}", b in "[a-zA-Z ]{0,12}") {
            let s = similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
        }

        #[test]
        fn prop_scores_sorted_and_unique(query in "[a-z]{1,8}", vocab in proptest::collection::vec("[a-z]{1,8}", 0..12)) {
            let matches = FuzzyMatcher::new().match_terms(&query, &vocab);
            for pair in matches.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
            let mut names: Vec<String> = matches.iter().map(|m| m.ingredient.to_lowercase()).collect();
            names.sort();
            names.dedup();
            prop_assert_eq!(names.len(), matches.len());
        }
    }
}
