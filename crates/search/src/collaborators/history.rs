//! In-memory search history and suggestions.

use super::{Context, SuggestOptions, SuggestionProvider, Suggestions};
use crate::error::{Result, SearchError};
use crate::response::SearchResult;
use crate::synonyms::SYNONYM_TABLE;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Number of searches kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 500;

#[derive(Debug, Clone)]
struct HistoryEntry {
    query: String,
    session_id: String,
    result_names: Vec<String>,
}

/// Suggestion provider backed by a bounded in-memory search history.
///
/// Autocomplete draws on past queries, previously returned recipe names and
/// the synonym vocabulary. Trending ranks past queries by frequency.
/// Personalized lists the recipes most often shown to the requesting
/// session; the session comes from [`SuggestOptions::session_id`] and, for
/// recording, from the `sessionId` context key.
#[derive(Debug)]
pub struct HistorySuggestions {
    capacity: usize,
    entries: Mutex<VecDeque<HistoryEntry>>,
}

impl Default for HistorySuggestions {
    fn default() -> Self {
        Self::new()
    }
}

impl HistorySuggestions {
    /// Provider keeping [`DEFAULT_HISTORY_CAPACITY`] searches.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Provider keeping at most `capacity` searches.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Number of recorded searches.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Result<Vec<HistoryEntry>> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .map_err(|_| SearchError::collaborator("suggestion provider", "history lock poisoned"))
    }
}

/// Keys sorted by descending count, then first appearance.
fn by_frequency(items: impl Iterator<Item = String>, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, item) in items.enumerate() {
        counts.entry(item).or_insert((0, position)).0 += 1;
    }
    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|(_, (ca, pa)), (_, (cb, pb))| cb.cmp(ca).then(pa.cmp(pb)));
    ranked.into_iter().take(limit).map(|(item, _)| item).collect()
}

impl SuggestionProvider for HistorySuggestions {
    fn suggest(&self, partial: &str, _context: &Context, options: &SuggestOptions) -> Result<Suggestions> {
        let entries = self.snapshot()?;
        let prefix = partial.trim().to_lowercase();

        // Most recent first so fresh queries win ties in autocomplete
        let recent_queries = entries.iter().rev().map(|e| e.query.clone());
        let recent_names = entries.iter().rev().flat_map(|e| e.result_names.iter().cloned());
        let vocabulary = SYNONYM_TABLE
            .iter()
            .flat_map(|(canonical, variants)| std::iter::once(*canonical).chain(variants.iter().copied()))
            .map(str::to_string);

        let mut autocomplete: Vec<String> = Vec::new();
        if !prefix.is_empty() {
            for candidate in recent_queries.chain(recent_names).chain(vocabulary) {
                if autocomplete.len() >= options.max_autocomplete {
                    break;
                }
                let lowered = candidate.to_lowercase();
                if lowered.starts_with(&prefix)
                    && lowered != prefix
                    && !autocomplete.iter().any(|a| a.eq_ignore_ascii_case(&candidate))
                {
                    autocomplete.push(candidate);
                }
            }
        }

        let trending = by_frequency(entries.iter().map(|e| e.query.clone()), options.max_trending);

        let personalized = by_frequency(
            entries
                .iter()
                .filter(|e| e.session_id == options.session_id)
                .flat_map(|e| e.result_names.iter().cloned()),
            options.max_personalized,
        );

        Ok(Suggestions {
            autocomplete,
            trending,
            personalized,
        })
    }

    fn record_history(&self, query: &str, results: &[SearchResult], context: &Context) -> Result<()> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(());
        }
        let session_id = context
            .get("sessionId")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("default")
            .to_string();

        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SearchError::collaborator("suggestion provider", "history lock poisoned"))?;
        entries.push_back(HistoryEntry {
            query,
            session_id,
            result_names: results.iter().map(|r| r.recipe.name.clone()).collect(),
        });
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        Ok(())
    }
}
