//! Prefix candidate search over the sorted word list.

use std::collections::HashSet;

use tracing::{debug, debug_span};

use crate::dict::{KanaDictionary, SortedWordList};
use crate::normalize::normalize_word;
use crate::settings::PrefixSettings;

/// Clamp a requested limit into the configured range.
pub fn resolve_limit(limit: Option<usize>, settings: &PrefixSettings) -> usize {
    match limit {
        Some(n) => n.clamp(settings.min_limit, settings.max_limit),
        None => settings.default_limit,
    }
}

/// Distinct values for the words starting with `raw_prefix`, in word order.
///
/// Scans `limit * overscan` words so that words sharing a value do not
/// starve the result.
pub fn prefix_candidates<'d, D>(
    dict: &'d D,
    words: &SortedWordList,
    raw_prefix: &str,
    limit: Option<usize>,
    settings: &PrefixSettings,
) -> Vec<&'d str>
where
    D: KanaDictionary + ?Sized,
{
    let Some(prefix) = normalize_word(raw_prefix) else {
        return Vec::new();
    };
    let limit = resolve_limit(limit, settings);
    let _span = debug_span!("prefix_candidates", prefix = %prefix, limit).entered();

    let scan = limit.saturating_mul(settings.overscan);
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(limit);
    for word in words.find_words_by_prefix(&prefix, scan) {
        let Some(value) = dict.lookup(word) else {
            continue;
        };
        if seen.insert(value) {
            result.push(value);
            if result.len() >= limit {
                break;
            }
        }
    }

    debug!(candidates = result.len());
    result
}
