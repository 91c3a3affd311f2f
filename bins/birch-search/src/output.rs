//! Terminal rendering for search results.

use birch_search::{MatchCandidate, SearchResponse, SearchResult};
use owo_colors::OwoColorize;

const BAR_WIDTH: usize = 10;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Format a processing time given in milliseconds
pub fn format_millis(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.0}µs", ms * 1000.0)
    } else if ms < 1000.0 {
        format!("{ms:.1}ms")
    } else {
        format!("{:.2}s", ms / 1000.0)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Fixed-width bar for a score in `0.0..=1.0`.
pub fn score_bar(score: f64) -> String {
    let clamped = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
    let filled = (clamped * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn result_line(rank: usize, result: &SearchResult) -> String {
    let recipe = &result.recipe;
    let mut line = format!(
        "{rank:>3}. {} {:.3}  {}",
        score_bar(result.final_score),
        result.final_score,
        recipe.name
    );
    if !recipe.category.is_empty() {
        line.push_str(&format!(" ({})", recipe.category));
    }
    if let Some(abv) = recipe.abv {
        line.push_str(&format!(" {abv:.0}%"));
    }
    if recipe.is_favorite {
        line.push_str(" ★");
    }
    line
}

/// Print a response for humans.
pub fn print_response(response: &SearchResponse) {
    if let Some(error) = &response.error {
        Status::error(error);
        return;
    }

    Status::header(&format!("Results for \"{}\"", response.query));
    for (i, result) in response.results.iter().enumerate() {
        println!("{}", result_line(i + 1, result));
    }

    if !response.applied_filters.is_empty() {
        println!();
        for applied in &response.applied_filters {
            println!(
                "  {} {:?} {} {}",
                "filter".dimmed(),
                applied.filter_type,
                applied.value,
                format!("-{}", applied.removed_count).dimmed()
            );
        }
    }

    if !response.did_you_mean.is_empty() {
        Status::info(&format!("Did you mean: {}", response.did_you_mean.join(", ")));
    }

    let summary = format!(
        "{} in {}{}",
        format_count(response.total_results, "result", "results"),
        format_millis(response.processing_time_ms),
        if response.from_cache { " (cached)" } else { "" }
    );
    if response.total_results == 0 {
        Status::warning(&summary);
    } else {
        Status::success(&summary);
    }
}

/// Print fuzzy match candidates for humans.
pub fn print_matches(term: &str, matches: &[MatchCandidate]) {
    Status::header(&format!("Matches for \"{term}\""));
    for candidate in matches {
        println!(
            "  {} {:.3}  {} {}",
            score_bar(candidate.score),
            candidate.score,
            candidate.ingredient,
            format!("{:?}", candidate.match_type).to_lowercase().dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use birch_search::{Recipe, ResultMatchType};

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0.25), "250µs");
        assert_eq!(format_millis(12.34), "12.3ms");
        assert_eq!(format_millis(2500.0), "2.50s");
    }

    #[test]
    fn test_format_count_singular() {
        assert_eq!(format_count(1, "result", "results"), "1 result");
    }

    #[test]
    fn test_format_count_plural() {
        assert_eq!(format_count(0, "result", "results"), "0 results");
    }

    #[test]
    fn test_score_bar_bounds() {
        assert_eq!(score_bar(0.0), "░".repeat(BAR_WIDTH));
        assert_eq!(score_bar(1.0), "█".repeat(BAR_WIDTH));
        assert_eq!(score_bar(7.0), "█".repeat(BAR_WIDTH));
        assert_eq!(score_bar(f64::NAN), "░".repeat(BAR_WIDTH));
        assert_eq!(score_bar(0.5).chars().filter(|c| *c == '█').count(), 5);
    }

    #[test]
    fn test_result_line() {
        let result = SearchResult {
            recipe: Recipe::new("gt", "Gin Tonic")
                .with_category("Highball")
                .with_abv(12.0)
                .favorite(true),
            relevance_score: 1.0,
            score_breakdown: None,
            match_type: ResultMatchType::Text,
            final_score: 0.8,
        };
        let line = result_line(1, &result);
        assert!(line.starts_with("  1. "));
        assert!(line.contains("0.800  Gin Tonic (Highball) 12% ★"));
    }
}
