//! Curated ingredient synonym table.
//!
//! Each group maps a canonical ingredient to the variants bartenders and
//! recipe sources use for it. The table is a process-lifetime constant.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical term to variant list.
pub const SYNONYM_TABLE: &[(&str, &[&str])] = &[
    ("whiskey", &["whisky", "bourbon", "rye", "scotch", "irish whiskey"]),
    ("gin", &["london dry gin", "dry gin", "old tom gin", "genever"]),
    ("rum", &["white rum", "light rum", "dark rum", "gold rum", "spiced rum", "aged rum"]),
    ("tequila", &["blanco tequila", "silver tequila", "reposado", "anejo"]),
    ("vodka", &["citrus vodka", "flavored vodka"]),
    ("vermouth", &["sweet vermouth", "dry vermouth", "rosso vermouth", "bianco vermouth"]),
    ("bitters", &["angostura", "aromatic bitters", "orange bitters", "peychaud's"]),
    ("triple sec", &["cointreau", "orange liqueur", "curacao", "grand marnier"]),
    ("simple syrup", &["sugar syrup", "gomme syrup", "rich simple syrup"]),
    ("lime juice", &["lime", "fresh lime juice", "lime cordial"]),
    ("lemon juice", &["lemon", "fresh lemon juice"]),
    ("soda water", &["club soda", "sparkling water", "seltzer"]),
    ("grenadine", &["pomegranate syrup"]),
    ("cream", &["heavy cream", "double cream", "whipping cream"]),
    ("egg white", &["aquafaba", "egg"]),
];

/// Lower-cased term to index of its group in [`SYNONYM_TABLE`].
static TERM_INDEX: Lazy<HashMap<String, usize>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (group, (canonical, variants)) in SYNONYM_TABLE.iter().enumerate() {
        index.insert(canonical.to_lowercase(), group);
        for variant in *variants {
            index.entry(variant.to_lowercase()).or_insert(group);
        }
    }
    index
});

/// Iterates over every member of a group, canonical first.
pub(crate) fn group_members(group: usize) -> impl Iterator<Item = &'static str> {
    SYNONYM_TABLE
        .get(group)
        .into_iter()
        .flat_map(|(canonical, variants)| std::iter::once(*canonical).chain(variants.iter().copied()))
}

/// Index of the group containing `term`, if any.
pub(crate) fn group_of(term: &str) -> Option<usize> {
    TERM_INDEX.get(&term.to_lowercase()).copied()
}

/// Canonical term for `term`, if it belongs to a synonym group.
pub fn canonical_term(term: &str) -> Option<&'static str> {
    group_of(term).map(|group| SYNONYM_TABLE[group].0)
}

/// Expand a term to itself followed by the other members of its group.
///
/// Unknown terms expand to just themselves.
///
/// # Example
/// ```
/// use birch_search::expand_synonyms;
///
/// let expanded = expand_synonyms("Bourbon");
/// assert_eq!(expanded[0], "Bourbon");
/// assert!(expanded.iter().any(|t| t == "whiskey"));
/// assert_eq!(expand_synonyms("orgeat"), vec!["orgeat".to_string()]);
/// ```
pub fn expand_synonyms(term: &str) -> Vec<String> {
    let mut expanded = vec![term.to_string()];
    if let Some(group) = group_of(term) {
        expanded.extend(
            group_members(group)
                .filter(|member| !member.eq_ignore_ascii_case(term))
                .map(str::to_string),
        );
    }
    expanded
}
