//! Offline autocomplete over the locally stored word list.

use crate::constants::{
    AUTOCOMPLETE_MIN_QUERY_CHARS, AUTOCOMPLETE_SUBSTRING_SCAN_CAP, MAX_AUTOCOMPLETE_LIMIT,
};
use crate::db::dictionary::Candidate;
use crate::{error::AppError, text::fold_turkish, Database};
use std::collections::HashSet;

/// Autocomplete tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutocompleteOptions {
    pub limit: usize,
    /// Fill remaining slots with names that contain the query mid-word.
    pub substring_fallback: bool,
}

impl Default for AutocompleteOptions {
    fn default() -> Self {
        Self {
            limit: crate::constants::DEFAULT_AUTOCOMPLETE_LIMIT,
            substring_fallback: true,
        }
    }
}

/// Shorter keys first, then alphabetical by key, then by display name.
fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|(key_a, name_a), (key_b, name_b)| {
        key_a
            .chars()
            .count()
            .cmp(&key_b.chars().count())
            .then_with(|| key_a.cmp(key_b))
            .then_with(|| name_a.cmp(name_b))
    });
}

/// Suggest word names for `query` from the active local dictionary.
///
/// Queries shorter than two characters return immediately without touching
/// storage. Prefix matches on the Turkish-folded key come first; when
/// enabled, mid-word matches fill any remaining slots.
///
/// # Returns
/// At most `options.limit` (capped at 50) distinct word names.
///
/// # Errors
/// Returns an error when storage access fails.
pub fn autocomplete(
    db: &Database,
    query: &str,
    options: AutocompleteOptions,
) -> Result<Vec<String>, AppError> {
    let folded = fold_turkish(query);
    if folded.chars().count() < AUTOCOMPLETE_MIN_QUERY_CHARS {
        return Ok(Vec::new());
    }
    let limit = options.limit.clamp(1, MAX_AUTOCOMPLETE_LIMIT);

    let prefix = db.dictionary.prefix_candidates(&folded, limit)?;

    let mut names: Vec<String> = prefix.into_iter().map(|(_, name)| name).collect();
    if options.substring_fallback && names.len() < limit {
        let seen: HashSet<String> = names.iter().cloned().collect();
        let mut inner = db.dictionary.substring_candidates(
            &folded,
            &seen,
            limit - names.len(),
            AUTOCOMPLETE_SUBSTRING_SCAN_CAP,
        )?;
        rank(&mut inner);
        names.extend(inner.into_iter().map(|(_, name)| name));
    }
    Ok(names)
}
