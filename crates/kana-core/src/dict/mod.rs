//! Dictionary compilation and lookup.
//!
//! `compile` turns a normalized entry list into a `KanaMatcher`: a radix
//! matcher program over the keys plus a Huffman-packed store of the distinct
//! values. `SortedWordList` is the companion artifact used for prefix search.

mod codec;
mod compiler;
mod entry;
mod format;
mod kana_matcher;
mod kana_matcher_io;
mod matcher;
mod radix;
#[cfg(test)]
mod tests;
mod trie;
mod word_list;

pub use codec::{Code, HuffmanTable, PackedValues, ValueCodec, ValueTable};
pub use compiler::{compile, CompileOptions, CompileStats, Compiled, DEFAULT_CHECKPOINT_SPAN};
pub use entry::DictEntry;
pub use kana_matcher::KanaMatcher;
pub use matcher::MatcherProgram;
pub use radix::{RadixEdge, RadixNode, RadixTree};
pub use trie::Trie;
pub use word_list::SortedWordList;

use std::io;

use crate::normalize::normalize_word;

/// Error type for compilation and for artifact binary I/O.
///
/// Compilation failures are fatal: the compiler is a pure function of its
/// input, so a failure means either the entries or the compiler are wrong.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("cannot compile a matcher from zero entries")]
    EmptyInput,

    #[error("cannot build Huffman codes for an empty value set")]
    EmptyValueSet,

    #[error("empty key")]
    EmptyKey,

    #[error("key is not trimmed and lowercase: {0:?}")]
    UnnormalizedKey(String),

    #[error("empty value for key: {0}")]
    EmptyValue(String),

    #[error("duplicate key with conflicting value: {key} ({existing} vs {incoming})")]
    ConflictingValue {
        key: String,
        existing: String,
        incoming: String,
    },

    #[error("missing value index for value: {0}")]
    MissingValue(String),

    #[error("missing Huffman code for char: {0:?}")]
    MissingCode(char),

    #[error("Huffman code for {0:?} exceeds 64 bits")]
    CodeTooLong(char),

    #[error("invalid compile option: {0}")]
    InvalidOption(String),

    #[error("{0} exceeds u32::MAX")]
    TooLarge(String),

    #[error("non-deterministic output detected during compilation")]
    NonDeterministicOutput,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected EKMX or EKWL)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("checksum mismatch (expected {expected:08x}, got {actual:08x})")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("corrupt artifact: {0}")]
    Corrupt(String),
}

/// Exact-match word → kana lookup.
///
/// Implementations expect already-normalized words; `lookup_raw` applies
/// the full normalization first.
pub trait KanaDictionary: Send + Sync {
    fn lookup(&self, word: &str) -> Option<&str>;

    fn lookup_raw(&self, raw: &str) -> Option<&str> {
        let word = normalize_word(raw)?;
        self.lookup(&word)
    }

    fn contains(&self, word: &str) -> bool {
        self.lookup_raw(word).is_some()
    }
}
