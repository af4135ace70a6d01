use std::path::Path;

use serde::{Deserialize, Serialize};

use super::format;
use super::{DictEntry, DictError, KanaMatcher};

const MAGIC: &[u8; 4] = b"EKWL";
const VERSION: u8 = 1;

/// Every compiled key in ascending order, for prefix search.
///
/// Built from the same entries as the matcher; `check_consistency` verifies
/// the two artifacts agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedWordList {
    source_label: String,
    words: Vec<String>,
}

impl SortedWordList {
    pub fn from_entries(entries: &[DictEntry], source_label: impl Into<String>) -> Self {
        Self::from_words(entries.iter().map(|e| e.key.clone()), source_label)
    }

    pub fn from_words(
        words: impl IntoIterator<Item = String>,
        source_label: impl Into<String>,
    ) -> Self {
        let mut words: Vec<String> = words.into_iter().collect();
        words.sort_unstable();
        words.dedup();
        Self {
            source_label: source_label.into(),
            words,
        }
    }

    /// Up to `limit` words starting with `prefix`, in ascending order.
    pub fn find_words_by_prefix(&self, prefix: &str, limit: usize) -> Vec<&str> {
        if prefix.is_empty() || limit == 0 {
            return Vec::new();
        }
        let start = self.words.partition_point(|w| w.as_str() < prefix);
        self.words[start..]
            .iter()
            .take_while(|w| w.starts_with(prefix))
            .take(limit)
            .map(String::as_str)
            .collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words
            .binary_search_by(|w| w.as_str().cmp(word))
            .is_ok()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    /// Fails unless this list holds exactly the matcher's keys.
    pub fn check_consistency(&self, matcher: &KanaMatcher) -> Result<(), DictError> {
        if matcher.entry_count() != self.words.len() {
            return Err(DictError::Parse(format!(
                "word list has {} words but matcher has {} entries",
                self.words.len(),
                matcher.entry_count()
            )));
        }
        let keys = matcher.keys();
        if let Some((word, key)) = self.words.iter().zip(&keys).find(|(w, k)| w != k) {
            return Err(DictError::Parse(format!(
                "word list and matcher disagree: {word:?} vs {key:?}"
            )));
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        let body = bincode::serialize(self).map_err(DictError::Serialize)?;
        format::frame(MAGIC, VERSION, &body)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        let body = format::unframe(MAGIC, VERSION, data)?;
        let list: Self = bincode::deserialize(body).map_err(DictError::Deserialize)?;
        if list.words.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DictError::Corrupt("word list is not sorted".into()));
        }
        Ok(list)
    }

    pub fn open(path: &Path) -> Result<Self, DictError> {
        let mmap = format::map_file(path)?;
        Self::from_bytes(&mmap)
    }

    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        format::write_atomic(path, &self.to_bytes()?)
    }
}
