//! Multi-dimensional recipe filtering.
//!
//! A [`FilterSpec`] carries one optional field per dimension; only the fields
//! that are set (and well-formed) narrow the working set. [`apply_filters`]
//! runs them in a fixed order and records how many recipes each one removed:
//!
//! ABV → difficulty → prep time → equipment → ingredient count → category →
//! flavor profile → glassware
//!
//! A recipe missing the filtered attribute always passes that filter.

use crate::difficulty::{meets_difficulty, DifficultyLevel};
use crate::equipment::{techniques_for, uses_equipment};
use crate::model::Recipe;
use crate::timing::Stopwatch;
use serde::{Deserialize, Serialize};

/// Inclusive numeric range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumericRange {
    /// Range with both bounds.
    pub fn between(min: f64, max: f64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    /// True when at least one bound is set, no bound is NaN and min ≤ max.
    pub fn is_well_formed(&self) -> bool {
        if self.min.is_none() && self.max.is_none() {
            return false;
        }
        if self.min.is_some_and(f64::is_nan) || self.max.is_some_and(f64::is_nan) {
            return false;
        }
        match (self.min, self.max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }

    /// True if `value` lies within the range.
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Inclusive count range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    /// Lower bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    /// Upper bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl CountRange {
    fn is_well_formed(&self) -> bool {
        match (self.min, self.max) {
            (None, None) => false,
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }

    fn contains(&self, value: usize) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Named prep-time bands in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrepTimeBucket {
    /// Up to 3 minutes
    Quick,
    /// Over 3, up to 7 minutes
    Standard,
    /// Over 7, up to 15 minutes
    Extended,
    /// Over 15 minutes
    Elaborate,
}

impl PrepTimeBucket {
    /// Exclusive lower bound and inclusive upper bound.
    pub fn bounds(self) -> (Option<f64>, Option<f64>) {
        match self {
            PrepTimeBucket::Quick => (None, Some(3.0)),
            PrepTimeBucket::Standard => (Some(3.0), Some(7.0)),
            PrepTimeBucket::Extended => (Some(7.0), Some(15.0)),
            PrepTimeBucket::Elaborate => (Some(15.0), None),
        }
    }

    /// True if `minutes` falls in this bucket.
    pub fn contains(self, minutes: f64) -> bool {
        let (above, up_to) = self.bounds();
        above.is_none_or(|low| minutes > low) && up_to.is_none_or(|high| minutes <= high)
    }
}

/// Prep-time filter: a named bucket or a custom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrepTimeFilter {
    /// Named band
    Bucket(PrepTimeBucket),
    /// Explicit minutes range
    Custom(NumericRange),
}

/// Required and excluded equipment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentFilter {
    /// Every listed tool must be used
    #[serde(default)]
    pub required: Vec<String>,
    /// No listed tool may be used
    #[serde(default)]
    pub excluded: Vec<String>,
}

/// How a flavor set is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlavorMatchMode {
    /// Recipe has at least one of the flavors
    #[default]
    Any,
    /// Recipe has every flavor
    All,
}

/// Flavor-profile filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorFilter {
    /// Flavor tags
    pub profiles: Vec<String>,
    /// Match mode
    #[serde(default)]
    pub mode: FlavorMatchMode,
}

/// Sparse filter specification: unset fields are not applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// ABV range in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abv: Option<NumericRange>,
    /// Difficulty level the recipe must satisfy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<DifficultyLevel>,
    /// Prep-time bucket or range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<PrepTimeFilter>,
    /// Equipment constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<EquipmentFilter>,
    /// Ingredient-count range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient_count: Option<CountRange>,
    /// Accepted categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Flavor constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor_profile: Option<FlavorFilter>,
    /// Accepted glassware
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glassware: Option<Vec<String>>,
}

impl FilterSpec {
    /// True when no dimension is set.
    pub fn is_empty(&self) -> bool {
        *self == FilterSpec::default()
    }

    /// Sets the ABV range.
    #[must_use]
    pub fn with_abv(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.abv = Some(NumericRange { min, max });
        self
    }

    /// Sets the difficulty level.
    #[must_use]
    pub fn with_difficulty(mut self, level: DifficultyLevel) -> Self {
        self.difficulty = Some(level);
        self
    }

    /// Sets a prep-time bucket.
    #[must_use]
    pub fn with_prep_bucket(mut self, bucket: PrepTimeBucket) -> Self {
        self.prep_time = Some(PrepTimeFilter::Bucket(bucket));
        self
    }

    /// Sets required and excluded equipment.
    #[must_use]
    pub fn with_equipment<R, E>(mut self, required: R, excluded: E) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        self.equipment = Some(EquipmentFilter {
            required: required.into_iter().map(Into::into).collect(),
            excluded: excluded.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Sets the ingredient-count range.
    #[must_use]
    pub fn with_ingredient_count(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.ingredient_count = Some(CountRange { min, max });
        self
    }

    /// Sets accepted categories.
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Sets flavor constraints.
    #[must_use]
    pub fn with_flavors<I, S>(mut self, profiles: I, mode: FlavorMatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flavor_profile = Some(FlavorFilter {
            profiles: profiles.into_iter().map(Into::into).collect(),
            mode,
        });
        self
    }

    /// Sets accepted glassware.
    #[must_use]
    pub fn with_glassware<I, S>(mut self, glasses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.glassware = Some(glasses.into_iter().map(Into::into).collect());
        self
    }
}

/// Filter dimension, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    /// ABV range
    Abv,
    /// Difficulty level
    Difficulty,
    /// Prep-time bucket or range
    PrepTime,
    /// Equipment
    Equipment,
    /// Ingredient count
    IngredientCount,
    /// Category set
    Category,
    /// Flavor profile
    FlavorProfile,
    /// Glassware set
    Glassware,
}

/// Audit record of one applied filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilter {
    /// Dimension
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    /// Filter value as given
    pub value: serde_json::Value,
    /// Recipes this step removed
    pub removed_count: usize,
}

/// Summary of a filter run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStats {
    /// Recipes in
    pub original_count: usize,
    /// Recipes out
    pub filtered_count: usize,
    /// Wall-clock time of the run
    pub processing_time_ms: f64,
    /// `filtered_count / original_count`, 1.0 for empty input
    pub filter_efficiency: f64,
}

/// Output of [`apply_filters`].
#[derive(Debug, Clone)]
pub struct FilterResult<'a> {
    /// Surviving recipes, input order preserved
    pub recipes: Vec<&'a Recipe>,
    /// One record per filter that ran
    pub applied_filters: Vec<AppliedFilter>,
    /// Counts and timing
    pub stats: FilterStats,
}

// Predicates

fn lower_set(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn abv_passes(recipe: &Recipe, range: &NumericRange) -> bool {
    recipe.abv.is_none_or(|abv| range.contains(abv))
}

fn prep_time_passes(recipe: &Recipe, filter: &PrepTimeFilter) -> bool {
    recipe.prep_time.is_none_or(|minutes| match filter {
        PrepTimeFilter::Bucket(bucket) => bucket.contains(minutes),
        PrepTimeFilter::Custom(range) => range.contains(minutes),
    })
}

fn membership_passes(value: &str, accepted: &[String]) -> bool {
    let value = value.trim().to_lowercase();
    value.is_empty() || accepted.contains(&value)
}

fn flavor_passes(recipe: &Recipe, profiles: &[String], mode: FlavorMatchMode) -> bool {
    if recipe.flavor_profile.is_empty() {
        return true;
    }
    let own = lower_set(&recipe.flavor_profile);
    match mode {
        FlavorMatchMode::Any => profiles.iter().any(|p| own.contains(p)),
        FlavorMatchMode::All => profiles.iter().all(|p| own.contains(p)),
    }
}

/// Resolve equipment names to technique sets, dropping unknown names.
fn resolve_equipment(names: &[String]) -> Vec<&'static [&'static str]> {
    names
        .iter()
        .filter(|name| !name.trim().is_empty())
        .filter_map(|name| {
            let techniques = techniques_for(name);
            if techniques.is_none() {
                tracing::warn!(equipment = %name, "Unknown equipment ignored");
            }
            techniques
        })
        .collect()
}

fn equipment_passes(
    recipe: &Recipe,
    required: &[&'static [&'static str]],
    excluded: &[&'static [&'static str]],
) -> bool {
    if recipe.techniques.is_empty() {
        return required.is_empty();
    }
    required.iter().all(|set| uses_equipment(recipe, set))
        && !excluded.iter().any(|set| uses_equipment(recipe, set))
}

// Per-dimension filters

/// Keep recipes whose ABV lies in `range`.
pub fn filter_by_abv<'a>(recipes: &[&'a Recipe], range: &NumericRange) -> Vec<&'a Recipe> {
    recipes.iter().copied().filter(|r| abv_passes(r, range)).collect()
}

/// Keep recipes satisfying difficulty `level`.
pub fn filter_by_difficulty<'a>(recipes: &[&'a Recipe], level: DifficultyLevel) -> Vec<&'a Recipe> {
    recipes.iter().copied().filter(|r| meets_difficulty(r, level)).collect()
}

/// Keep recipes whose prep time matches `filter`.
pub fn filter_by_prep_time<'a>(recipes: &[&'a Recipe], filter: &PrepTimeFilter) -> Vec<&'a Recipe> {
    recipes.iter().copied().filter(|r| prep_time_passes(r, filter)).collect()
}

/// Keep recipes using all required and none of the excluded equipment.
pub fn filter_by_equipment<'a>(recipes: &[&'a Recipe], filter: &EquipmentFilter) -> Vec<&'a Recipe> {
    let required = resolve_equipment(&filter.required);
    let excluded = resolve_equipment(&filter.excluded);
    recipes
        .iter()
        .copied()
        .filter(|r| equipment_passes(r, &required, &excluded))
        .collect()
}

/// Keep recipes whose ingredient count lies in `range`.
pub fn filter_by_ingredient_count<'a>(recipes: &[&'a Recipe], range: &CountRange) -> Vec<&'a Recipe> {
    recipes
        .iter()
        .copied()
        .filter(|r| range.contains(r.ingredient_count()))
        .collect()
}

/// Keep recipes in one of `categories`.
pub fn filter_by_category<'a>(recipes: &[&'a Recipe], categories: &[String]) -> Vec<&'a Recipe> {
    let accepted = lower_set(categories);
    recipes
        .iter()
        .copied()
        .filter(|r| membership_passes(&r.category, &accepted))
        .collect()
}

/// Keep recipes matching the flavor set under `filter.mode`.
pub fn filter_by_flavor_profile<'a>(recipes: &[&'a Recipe], filter: &FlavorFilter) -> Vec<&'a Recipe> {
    let profiles = lower_set(&filter.profiles);
    recipes
        .iter()
        .copied()
        .filter(|r| flavor_passes(r, &profiles, filter.mode))
        .collect()
}

/// Keep recipes served in one of `glassware`.
pub fn filter_by_glassware<'a>(recipes: &[&'a Recipe], glassware: &[String]) -> Vec<&'a Recipe> {
    let accepted = lower_set(glassware);
    recipes
        .iter()
        .copied()
        .filter(|r| r.glassware.as_deref().is_none_or(|g| membership_passes(g, &accepted)))
        .collect()
}

/// Runs filters in order, recording each narrowing step.
struct Narrowing<'a> {
    working: Vec<&'a Recipe>,
    applied: Vec<AppliedFilter>,
}

impl<'a> Narrowing<'a> {
    fn step<T: Serialize + ?Sized>(
        &mut self,
        filter_type: FilterType,
        value: &T,
        filter: impl FnOnce(&[&'a Recipe]) -> Vec<&'a Recipe>,
    ) {
        let before = self.working.len();
        self.working = filter(&self.working);
        self.applied.push(AppliedFilter {
            filter_type,
            value: serde_json::to_value(value).unwrap_or_default(),
            removed_count: before - self.working.len(),
        });
    }
}

/// Apply every set, well-formed dimension of `spec` in the fixed order.
///
/// Malformed dimensions (inverted or empty ranges, empty sets, only unknown
/// equipment) are skipped and do not appear in `applied_filters`.
///
/// # Example
/// ```
/// use birch_search::{apply_filters, FilterSpec, Recipe};
///
/// let recipes = vec![
///     Recipe::new("1", "Spritz").with_abv(8.0),
///     Recipe::new("2", "Zombie").with_abv(30.0),
///     Recipe::new("3", "Mystery"),
/// ];
/// let result = apply_filters(&recipes, &FilterSpec::default().with_abv(None, Some(15.0)));
/// assert_eq!(result.stats.filtered_count, 2);
/// assert_eq!(result.applied_filters[0].removed_count, 1);
/// ```
pub fn apply_filters<'a, I>(recipes: I, spec: &FilterSpec) -> FilterResult<'a>
where
    I: IntoIterator<Item = &'a Recipe>,
{
    let timer = Stopwatch::start();
    let mut run = Narrowing {
        working: recipes.into_iter().collect(),
        applied: Vec::new(),
    };
    let original_count = run.working.len();

    if let Some(range) = &spec.abv {
        if range.is_well_formed() {
            run.step(FilterType::Abv, range, |rs| filter_by_abv(rs, range));
        } else {
            tracing::warn!(?range, "Malformed ABV filter ignored");
        }
    }

    if let Some(level) = spec.difficulty {
        run.step(FilterType::Difficulty, &level, |rs| filter_by_difficulty(rs, level));
    }

    if let Some(prep) = &spec.prep_time {
        let well_formed = match prep {
            PrepTimeFilter::Bucket(_) => true,
            PrepTimeFilter::Custom(range) => range.is_well_formed(),
        };
        if well_formed {
            run.step(FilterType::PrepTime, prep, |rs| filter_by_prep_time(rs, prep));
        } else {
            tracing::warn!(?prep, "Malformed prep-time filter ignored");
        }
    }

    if let Some(equipment) = &spec.equipment {
        let known = |names: &[String]| names.iter().any(|n| techniques_for(n).is_some());
        if known(&equipment.required) || known(&equipment.excluded) {
            run.step(FilterType::Equipment, equipment, |rs| filter_by_equipment(rs, equipment));
        } else if !equipment.required.is_empty() || !equipment.excluded.is_empty() {
            tracing::warn!(?equipment, "Equipment filter names no known equipment");
        }
    }

    if let Some(range) = &spec.ingredient_count {
        if range.is_well_formed() {
            run.step(FilterType::IngredientCount, range, |rs| {
                filter_by_ingredient_count(rs, range)
            });
        } else {
            tracing::warn!(?range, "Malformed ingredient-count filter ignored");
        }
    }

    if let Some(categories) = spec.categories.as_deref() {
        if !lower_set(categories).is_empty() {
            run.step(FilterType::Category, categories, |rs| filter_by_category(rs, categories));
        }
    }

    if let Some(flavor) = &spec.flavor_profile {
        if !lower_set(&flavor.profiles).is_empty() {
            run.step(FilterType::FlavorProfile, flavor, |rs| {
                filter_by_flavor_profile(rs, flavor)
            });
        }
    }

    if let Some(glassware) = spec.glassware.as_deref() {
        if !lower_set(glassware).is_empty() {
            run.step(FilterType::Glassware, glassware, |rs| filter_by_glassware(rs, glassware));
        }
    }

    let filtered_count = run.working.len();
    let filter_efficiency = if original_count == 0 {
        1.0
    } else {
        filtered_count as f64 / original_count as f64
    };

    FilterResult {
        recipes: run.working,
        applied_filters: run.applied,
        stats: FilterStats {
            original_count,
            filtered_count,
            processing_time_ms: timer.elapsed_ms(),
            filter_efficiency,
        },
    }
}
