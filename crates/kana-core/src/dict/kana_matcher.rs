use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::codec::{Decoder, ValueCodec};
use super::matcher::MatcherProgram;
use super::{DictError, KanaDictionary};

/// Serialized body of a compiled matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct MatcherData {
    pub source_label: String,
    pub entry_count: u32,
    pub program: MatcherProgram,
    pub codec: ValueCodec,
}

/// Compiled word → kana lookup.
///
/// The matcher program and packed values are immutable. Decoded values are
/// memoized in one `OnceLock` slot per distinct value, so a `KanaMatcher` can
/// be shared across threads without further locking.
pub struct KanaMatcher {
    data: MatcherData,
    decoder: Decoder,
    cache: Vec<OnceLock<Option<String>>>,
}

impl KanaMatcher {
    pub(super) fn from_data(data: MatcherData) -> Result<Self, DictError> {
        let decoder = data.codec.validate()?;
        data.program.validate(data.codec.value_count())?;
        if data.program.terminal_count() != data.entry_count as usize {
            return Err(DictError::Corrupt(format!(
                "entry count {} does not match {} terminal nodes",
                data.entry_count,
                data.program.terminal_count()
            )));
        }

        let cache = (0..data.codec.value_count())
            .map(|_| OnceLock::new())
            .collect();
        Ok(Self {
            data,
            decoder,
            cache,
        })
    }

    pub(super) fn data(&self) -> &MatcherData {
        &self.data
    }

    /// Value index for `candidate` after trimming and lowercasing it.
    pub fn value_index(&self, candidate: &str) -> Option<u32> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.data.program.run(&fold_case(trimmed))
    }

    /// Decoded value for `index`, decoding on first access.
    pub fn value(&self, index: u32) -> Option<&str> {
        let slot = self.cache.get(index as usize)?;
        slot.get_or_init(
            || match self.data.codec.decode_with(&self.decoder, index) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(index, "value decode failed: {e}");
                    None
                }
            },
        )
        .as_deref()
    }

    /// Decode every value up front.
    pub fn warm(&self) {
        for index in 0..self.cache.len() {
            let _ = self.value(index as u32);
        }
    }

    /// Number of distinct keys compiled into the matcher.
    pub fn entry_count(&self) -> usize {
        self.data.entry_count as usize
    }

    pub fn value_count(&self) -> usize {
        self.cache.len()
    }

    pub fn source_label(&self) -> &str {
        &self.data.source_label
    }

    pub fn program(&self) -> &MatcherProgram {
        &self.data.program
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.data.codec
    }

    /// All compiled keys in ascending order.
    pub fn keys(&self) -> Vec<String> {
        self.data
            .program
            .keys()
            .into_iter()
            .map(|(key, _)| key)
            .collect()
    }
}

impl KanaDictionary for KanaMatcher {
    fn lookup(&self, word: &str) -> Option<&str> {
        let index = self.value_index(word)?;
        self.value(index)
    }
}

impl fmt::Debug for KanaMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KanaMatcher")
            .field("source_label", &self.data.source_label)
            .field("entry_count", &self.data.entry_count)
            .field("value_count", &self.cache.len())
            .field("nodes", &self.data.program.node_count())
            .finish()
    }
}

fn fold_case(s: &str) -> Cow<'_, str> {
    if s.bytes().any(|b| b.is_ascii_uppercase() || !b.is_ascii()) {
        Cow::Owned(s.to_lowercase())
    } else {
        Cow::Borrowed(s)
    }
}
