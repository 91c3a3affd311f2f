//! birch-search: search, match and classify cocktail recipes from JSON files.

mod output;

use birch_core::config::Config;
use birch_core::error::exit_codes;
use birch_core::Error;
use birch_search::{
    classify_difficulty, Context, DifficultyLevel, FilterSpec, Recipe, SearchEngine, SearchOptions,
    SuggestOptions,
};
use birch_telemetry::{timed_span, Event, SearchSample, TelemetryConfig};
use clap::{Parser, Subcommand};
use output::Status;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "birch-search")]
#[command(about = "Fuzzy recipe search, filtering and ranking")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to .birch-search.toml when present)
    #[arg(long, global = true, env = "BIRCH_SEARCH_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a JSON array of recipes
    Search {
        /// Path to recipes JSON
        file: PathBuf,
        /// Search query
        query: String,
        /// Minimum ABV
        #[arg(long)]
        abv_min: Option<f64>,
        /// Maximum ABV
        #[arg(long)]
        abv_max: Option<f64>,
        /// Difficulty level (easy, medium, hard, expert)
        #[arg(long)]
        difficulty: Option<DifficultyLevel>,
        /// Category to keep (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Glass to keep (repeatable)
        #[arg(long = "glass")]
        glasses: Vec<String>,
        /// Maximum number of results
        #[arg(long)]
        max: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Bypass the response cache
        #[arg(long)]
        no_cache: bool,
        /// Print recorded metrics as JSON to stderr
        #[arg(long)]
        metrics: bool,
    },
    /// Fuzzy-match a term against a vocabulary
    Match {
        /// Term to match
        term: String,
        /// Vocabulary file (JSON array or one term per line) or comma-separated terms
        #[arg(long)]
        vocab: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify the difficulty of every recipe in a file
    Classify {
        /// Path to recipes JSON
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest query completions
    Suggest {
        /// Partial query
        partial: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            return exit(exit_codes::CONFIG_ERROR);
        }
    };

    if let Err(e) = birch_telemetry::init_with_config(TelemetryConfig::with_level(
        config.schema.logging.level.clone(),
    )) {
        Status::warning(&format!("Logging disabled: {e}"));
    }

    match run(cli.command, &config) {
        Ok(code) => exit(code),
        Err(e) => {
            Status::error(&format!("{e:#}"));
            exit(error_code(&e))
        }
    }
}

fn exit(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn error_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<Error>()
        .map_or(exit_codes::FAILURE, |e| e.code.exit_code())
}

fn run(command: Commands, config: &Config) -> anyhow::Result<i32> {
    match command {
        Commands::Search {
            file,
            query,
            abv_min,
            abv_max,
            difficulty,
            categories,
            glasses,
            max,
            json,
            no_cache,
            metrics,
        } => {
            let recipes = {
                timed_span!("load_recipes");
                read_json(&file)?
            };
            let filters = build_filters(abv_min, abv_max, difficulty, categories, glasses);

            let mut options = SearchOptions::from_config(&config.schema.search).with_filters(filters);
            if let Some(max) = max {
                options = options.with_max_results(max);
            }
            if no_cache {
                options = options.with_cache(false);
            }

            let engine = SearchEngine::from_config(&config.schema);
            let response = engine
                .search_json(&query, &recipes, &options)
                .map_err(Error::from)?;

            let sample = SearchSample {
                query: query.clone(),
                success: response.success,
                from_cache: response.from_cache,
                working_set: response.stats.original_recipe_count,
                results: response.total_results,
                elapsed_ms: response.processing_time_ms,
            };
            sample.record();
            Event::search(&sample).log();

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                output::print_response(&response);
            }
            if metrics {
                eprintln!("{}", serde_json::to_string_pretty(&birch_telemetry::metrics().export_json())?);
            }

            Ok(if !response.success {
                exit_codes::FAILURE
            } else if response.total_results == 0 {
                exit_codes::NO_RESULTS
            } else {
                exit_codes::SUCCESS
            })
        }

        Commands::Match { term, vocab, json } => {
            let vocabulary = load_vocabulary(&vocab)?;
            let engine = SearchEngine::from_config(&config.schema);
            let matches = engine.matcher().match_terms(&term, &vocabulary);

            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else if matches.is_empty() {
                Status::warning(&format!("No match for \"{term}\""));
            } else {
                output::print_matches(&term, &matches);
            }

            Ok(if matches.is_empty() {
                exit_codes::NO_RESULTS
            } else {
                exit_codes::SUCCESS
            })
        }

        Commands::Classify { file, json } => {
            let recipes: Vec<Recipe> = serde_json::from_value(read_json(&file)?)
                .map_err(|e| Error::from(e).with_context(format!("{} is not an array of recipes", file.display())))?;

            if json {
                let levels: Vec<_> = recipes
                    .iter()
                    .map(|r| serde_json::json!({ "id": r.id, "name": r.name, "difficulty": classify_difficulty(r) }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&levels)?);
            } else {
                Status::header(&format!("Difficulty of {}", output::format_count(recipes.len(), "recipe", "recipes")));
                for recipe in &recipes {
                    println!("  {:<8} {}", classify_difficulty(recipe).as_str(), recipe.name);
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Suggest { partial, json } => {
            let engine = SearchEngine::from_config(&config.schema);
            let suggestions = engine.suggest(&partial, &Context::new(), &SuggestOptions::default());

            if json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else if suggestions.autocomplete.is_empty() {
                Status::warning(&format!("No completions for \"{partial}\""));
            } else {
                for completion in &suggestions.autocomplete {
                    println!("  {completion}");
                }
            }

            Ok(if suggestions.autocomplete.is_empty() {
                exit_codes::NO_RESULTS
            } else {
                exit_codes::SUCCESS
            })
        }
    }
}

fn read_json(path: &Path) -> birch_core::Result<serde_json::Value> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::from(e).with_context(format!("Reading {}", path.display())))?;
    serde_json::from_str(&contents).map_err(|e| Error::from(e).with_context(format!("Parsing {}", path.display())))
}

fn build_filters(
    abv_min: Option<f64>,
    abv_max: Option<f64>,
    difficulty: Option<DifficultyLevel>,
    categories: Vec<String>,
    glasses: Vec<String>,
) -> FilterSpec {
    let mut filters = FilterSpec::default();
    if abv_min.is_some() || abv_max.is_some() {
        filters = filters.with_abv(abv_min, abv_max);
    }
    if let Some(level) = difficulty {
        filters = filters.with_difficulty(level);
    }
    if !categories.is_empty() {
        filters = filters.with_categories(categories);
    }
    if !glasses.is_empty() {
        filters = filters.with_glassware(glasses);
    }
    filters
}

/// Vocabulary from a file, or from the argument itself split on commas.
fn load_vocabulary(source: &str) -> birch_core::Result<Vec<String>> {
    if !Path::new(source).is_file() {
        return Ok(split_terms(source.split(',')));
    }

    let contents = std::fs::read_to_string(source)
        .map_err(|e| Error::from(e).with_context(format!("Reading {source}")))?;
    if contents.trim_start().starts_with('[') {
        return serde_json::from_str(&contents)
            .map_err(|e| Error::from(e).with_context(format!("{source} is not a JSON array of strings")));
    }
    Ok(split_terms(contents.lines()))
}

fn split_terms<'a>(terms: impl Iterator<Item = &'a str>) -> Vec<String> {
    terms
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_parses_search_flags() {
        let cli = Cli::try_parse_from([
            "birch-search",
            "search",
            "recipes.json",
            "gin",
            "--abv-max",
            "20",
            "--difficulty",
            "medium",
            "--category",
            "Sour",
            "--category",
            "Highball",
            "--no-cache",
        ])
        .unwrap();

        match cli.command {
            Commands::Search {
                abv_max,
                difficulty,
                categories,
                no_cache,
                ..
            } => {
                assert_eq!(abv_max, Some(20.0));
                assert_eq!(difficulty, Some(DifficultyLevel::Medium));
                assert_eq!(categories, vec!["Sour", "Highball"]);
                assert!(no_cache);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_difficulty() {
        let parsed = Cli::try_parse_from(["birch-search", "search", "r.json", "gin", "--difficulty", "legendary"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_build_filters_skips_unset_dimensions() {
        assert!(build_filters(None, None, None, vec![], vec![]).is_empty());

        let filters = build_filters(None, Some(20.0), None, vec![], vec!["coupe".into()]);
        assert!(filters.abv.is_some());
        assert!(filters.glassware.is_some());
        assert!(filters.categories.is_none());
    }

    #[test]
    fn test_vocabulary_from_csv() {
        let vocab = load_vocabulary("gin, rum ,, vodka").unwrap();
        assert_eq!(vocab, vec!["gin", "rum", "vodka"]);
    }

    #[test]
    fn test_vocabulary_from_files() {
        let mut lines = tempfile::NamedTempFile::new().unwrap();
        writeln!(lines, "bourbon\n\nrye").unwrap();
        let path = lines.path().to_str().unwrap().to_string();
        assert_eq!(load_vocabulary(&path).unwrap(), vec!["bourbon", "rye"]);

        let mut array = tempfile::NamedTempFile::new().unwrap();
        write!(array, r#"["campari", "aperol"]"#).unwrap();
        let path = array.path().to_str().unwrap().to_string();
        assert_eq!(load_vocabulary(&path).unwrap(), vec!["campari", "aperol"]);
    }

    #[test]
    fn test_error_code_for_usage_errors() {
        let engine = SearchEngine::new();
        let search_err = engine
            .search_json("gin", &serde_json::json!("recipes"), &SearchOptions::default())
            .unwrap_err();
        let err = anyhow::Error::new(Error::from(search_err));
        assert_eq!(error_code(&err), exit_codes::VALIDATION_ERROR);

        let mut malformed = tempfile::NamedTempFile::new().unwrap();
        write!(malformed, "[{{").unwrap();
        let err = anyhow::Error::new(read_json(malformed.path()).unwrap_err());
        assert_eq!(error_code(&err), exit_codes::VALIDATION_ERROR);

        let err = anyhow::Error::new(read_json(Path::new("/no/such/recipes.json")).unwrap_err());
        assert_eq!(error_code(&err), exit_codes::FAILURE);

        assert_eq!(error_code(&anyhow::anyhow!("disk on fire")), exit_codes::FAILURE);
    }
}
