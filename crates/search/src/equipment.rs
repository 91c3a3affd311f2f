//! Equipment to technique mapping.
//!
//! Recipes do not list their tools; the techniques they use imply them.

use crate::model::Recipe;

/// Equipment name to the technique tags that require it.
pub const EQUIPMENT_TECHNIQUES: &[(&str, &[&str])] = &[
    ("shaker", &["shake", "dry_shake", "reverse_dry_shake", "whip_shake"]),
    ("mixing_glass", &["stir"]),
    ("bar_spoon", &["stir", "layer", "float"]),
    ("muddler", &["muddle"]),
    ("strainer", &["strain", "double_strain", "fine_strain"]),
    ("blender", &["blend", "frozen"]),
    ("torch", &["smoke", "flame", "torch"]),
    ("centrifuge", &["centrifuge", "clarify"]),
    ("sous_vide", &["sous_vide", "infuse", "fat_wash"]),
    ("siphon", &["foam", "carbonate", "nitro"]),
];

/// Techniques implied by an equipment name, `None` for unknown equipment.
///
/// Names are matched case-insensitively; spaces and hyphens are treated as
/// underscores, so "Mixing Glass" resolves.
pub fn techniques_for(equipment: &str) -> Option<&'static [&'static str]> {
    let normalized = equipment.trim().to_lowercase().replace([' ', '-'], "_");
    EQUIPMENT_TECHNIQUES
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, techniques)| *techniques)
}

/// True if the recipe uses at least one of `techniques`.
pub fn uses_equipment(recipe: &Recipe, techniques: &[&str]) -> bool {
    techniques.iter().any(|t| recipe.has_technique(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_normalizes() {
        assert_eq!(techniques_for("Mixing Glass"), Some(&["stir"][..]));
        assert!(techniques_for("bar-spoon").is_some());
        assert!(techniques_for("spoon of destiny").is_none());
    }

    #[test]
    fn test_uses_equipment() {
        let recipe = Recipe::new("1", "Daiquiri").with_techniques(["shake", "double_strain"]);
        assert!(uses_equipment(&recipe, techniques_for("shaker").unwrap()));
        assert!(uses_equipment(&recipe, techniques_for("strainer").unwrap()));
        assert!(!uses_equipment(&recipe, techniques_for("blender").unwrap()));
    }
}
