//! Benchmarks for recipe search.

use birch_search::{apply_filters, DifficultyLevel, FilterSpec, FuzzyMatcher, Recipe, SearchEngine, SearchOptions};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const SPIRITS: &[&str] = &["gin", "bourbon", "white rum", "tequila", "vodka", "mezcal", "cognac"];
const MODIFIERS: &[&str] = &["lime juice", "lemon juice", "simple syrup", "sweet vermouth", "campari", "soda water"];
const TECHNIQUES: &[&str] = &["build", "shake", "stir", "muddle", "blend", "clarify"];
const CATEGORIES: &[&str] = &["Sour", "Highball", "Stirred", "Tiki", "Punch"];

fn create_test_recipes(count: usize) -> Vec<Recipe> {
    (0..count)
        .map(|i| {
            let ingredients = (0..(2 + i % 5)).map(|j| {
                if j == 0 {
                    SPIRITS[i % SPIRITS.len()]
                } else {
                    MODIFIERS[(i + j) % MODIFIERS.len()]
                }
            });
            Recipe::new(i.to_string(), format!("{} No. {i}", CATEGORIES[i % CATEGORIES.len()]))
                .with_category(CATEGORIES[i % CATEGORIES.len()])
                .with_abv((i % 40) as f64)
                .with_prep_time((i % 20) as f64)
                .with_ingredients(ingredients)
                .with_techniques([TECHNIQUES[i % TECHNIQUES.len()]])
                .with_popularity((i % 100) as f64)
                .favorite(i % 7 == 0)
        })
        .collect()
}

fn bench_fuzzy_match(c: &mut Criterion) {
    let matcher = FuzzyMatcher::new();
    let vocabulary: Vec<&str> = SPIRITS.iter().chain(MODIFIERS).copied().collect();

    c.bench_function("fuzzy_match_misspelled", |b| {
        b.iter(|| matcher.match_terms(black_box("burbon"), black_box(&vocabulary)))
    });
}

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_filters");
    let spec = FilterSpec::default()
        .with_abv(Some(10.0), Some(30.0))
        .with_difficulty(DifficultyLevel::Medium)
        .with_categories(["Sour", "Highball"]);

    for size in [100, 1000, 5000].iter() {
        let recipes = create_test_recipes(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| apply_filters(black_box(&recipes), black_box(&spec)))
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let engine = SearchEngine::new();
    let options = SearchOptions::default().with_cache(false).with_suggestions(false);

    for size in [100, 1000].iter() {
        let recipes = create_test_recipes(*size);
        group.bench_with_input(BenchmarkId::new("ingredient_query", size), size, |b, _| {
            b.iter(|| engine.search(black_box("gin with lime juice"), black_box(&recipes), &options))
        });
        group.bench_with_input(BenchmarkId::new("unrecognised_query", size), size, |b, _| {
            b.iter(|| engine.search(black_box("ginn sourr"), black_box(&recipes), &options))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_fuzzy_match, bench_filters, bench_search);
criterion_main!(benches);
