//! Word and entry normalization applied before compilation and lookup.

use std::collections::{BTreeMap, BTreeSet};

use crate::dict::DictEntry;

/// Characters folded to the ASCII apostrophe.
const APOSTROPHE_VARIANTS: [char; 4] = ['\u{2018}', '\u{2019}', '\u{02BC}', '\u{FF07}'];

/// Trim, unify apostrophes and lowercase. `None` for blank input.
pub fn normalize_word(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let unified: String = trimmed
        .chars()
        .map(|c| if APOSTROPHE_VARIANTS.contains(&c) { '\'' } else { c })
        .collect();
    Some(unified.to_lowercase())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedEntries {
    /// Sorted by key; keys are unique.
    pub entries: Vec<DictEntry>,
    /// Keys that appeared more than once, sorted.
    pub duplicate_keys: Vec<String>,
    /// Keys that appeared with different values, sorted.
    pub conflicting_keys: Vec<String>,
}

/// Normalize raw `(key, value)` pairs into a compiler-ready entry list.
///
/// Keys are trimmed and lowercased, values trimmed; pairs left empty are
/// dropped. A later pair replaces an earlier one with the same key, and the
/// key is reported as a duplicate (and as a conflict if the values differ).
pub fn normalize_entries<K, V>(raw: impl IntoIterator<Item = (K, V)>) -> NormalizedEntries
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut by_key: BTreeMap<String, String> = BTreeMap::new();
    let mut duplicate_keys = BTreeSet::new();
    let mut conflicting_keys = BTreeSet::new();

    for (key, value) in raw {
        let key = key.as_ref().trim().to_lowercase();
        let value = value.as_ref().trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        if let Some(existing) = by_key.get(&key) {
            duplicate_keys.insert(key.clone());
            if existing != value {
                conflicting_keys.insert(key.clone());
            }
        }
        by_key.insert(key, value.to_string());
    }

    NormalizedEntries {
        entries: by_key
            .into_iter()
            .map(|(key, value)| DictEntry { key, value })
            .collect(),
        duplicate_keys: duplicate_keys.into_iter().collect(),
        conflicting_keys: conflicting_keys.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_none() {
        assert_eq!(normalize_word(""), None);
        assert_eq!(normalize_word("   "), None);
        assert_eq!(normalize_word("\n\t"), None);
    }

    #[test]
    fn test_trims_and_lowercases() {
        assert_eq!(normalize_word("  HELLO  ").as_deref(), Some("hello"));
        assert_eq!(normalize_word("Google").as_deref(), Some("google"));
    }

    #[test]
    fn test_apostrophe_variants() {
        for raw in ["O’Reilly", "O‘Reilly", "OʼReilly", "O＇Reilly", "O'Reilly"] {
            assert_eq!(normalize_word(raw).as_deref(), Some("o'reilly"), "{raw}");
        }
    }

    #[test]
    fn test_entries_sorted_and_deduplicated() {
        let normalized = normalize_entries([
            ("World", "ワールド"),
            (" hello ", " ハロー "),
            ("HELLO", "ハロー"),
        ]);
        assert_eq!(
            normalized.entries,
            vec![
                DictEntry::new("hello", "ハロー"),
                DictEntry::new("world", "ワールド"),
            ]
        );
        assert_eq!(normalized.duplicate_keys, vec!["hello".to_string()]);
        assert!(normalized.conflicting_keys.is_empty());
    }

    #[test]
    fn test_entries_conflict_last_wins() {
        let normalized = normalize_entries([("cat", "キャット"), ("Cat", "カット")]);
        assert_eq!(normalized.entries, vec![DictEntry::new("cat", "カット")]);
        assert_eq!(normalized.conflicting_keys, vec!["cat".to_string()]);
    }

    #[test]
    fn test_entries_drop_blank_pairs() {
        let normalized = normalize_entries([("", "x"), ("word", "  "), ("ok", "オーケー")]);
        assert_eq!(normalized.entries, vec![DictEntry::new("ok", "オーケー")]);
    }
}
