use tracing::{debug_span, info};

use super::codec::{ValueCodec, ValueTable};
use super::kana_matcher::{KanaMatcher, MatcherData};
use super::kana_matcher_io::encode_body;
use super::matcher::MatcherProgram;
use super::radix::RadixTree;
use super::trie::Trie;
use super::{DictEntry, DictError};
use crate::settings::CompileSettings;

pub const DEFAULT_CHECKPOINT_SPAN: u32 = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Provenance recorded in the artifact; not behaviorally significant.
    pub source_label: String,
    pub checkpoint_span: u32,
    /// Compile twice and fail if the two artifacts differ.
    pub self_check: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            source_label: "unknown".to_string(),
            checkpoint_span: DEFAULT_CHECKPOINT_SPAN,
            self_check: true,
        }
    }
}

impl CompileOptions {
    pub fn from_settings(settings: &CompileSettings) -> Self {
        Self {
            checkpoint_span: settings.checkpoint_span,
            self_check: settings.self_check,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = label.into();
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub entry_count: usize,
    pub trie_nodes: usize,
    pub radix_nodes: usize,
    pub radix_edges: usize,
    pub distinct_values: usize,
    pub packed_bytes: usize,
    pub total_bits: u64,
}

#[derive(Debug)]
pub struct Compiled {
    pub matcher: KanaMatcher,
    pub stats: CompileStats,
}

/// Compile normalized entries into a `KanaMatcher`.
///
/// Entries must have non-empty, unique keys; a key repeated with the same
/// value is accepted, with a different value it is a `ConflictingValue`.
pub fn compile(entries: &[DictEntry], options: &CompileOptions) -> Result<Compiled, DictError> {
    let _span = debug_span!("compile", entries = entries.len(), label = %options.source_label)
        .entered();

    let (data, stats) = build(entries, options)?;
    if options.self_check {
        let (again, _) = build(entries, options)?;
        if encode_body(&data)? != encode_body(&again)? {
            return Err(DictError::NonDeterministicOutput);
        }
    }

    info!(
        entry_count = stats.entry_count,
        trie_nodes = stats.trie_nodes,
        radix_nodes = stats.radix_nodes,
        radix_edges = stats.radix_edges,
        distinct_values = stats.distinct_values,
        packed_bytes = stats.packed_bytes,
        total_bits = stats.total_bits,
        "compiled matcher"
    );

    Ok(Compiled {
        matcher: KanaMatcher::from_data(data)?,
        stats,
    })
}

fn build(
    entries: &[DictEntry],
    options: &CompileOptions,
) -> Result<(MatcherData, CompileStats), DictError> {
    if entries.is_empty() {
        return Err(DictError::EmptyInput);
    }

    let trie = Trie::build(entries)?;
    let tree = RadixTree::compact(&trie);
    let values = ValueTable::from_entries(entries);
    let codec = ValueCodec::build(&values, options.checkpoint_span)?;
    let program = MatcherProgram::emit(&tree, &values)?;

    let stats = CompileStats {
        entry_count: trie.key_count(),
        trie_nodes: trie.node_count(),
        radix_nodes: tree.node_count(),
        radix_edges: tree.edge_count(),
        distinct_values: values.len(),
        packed_bytes: codec.packed().bytes().len(),
        total_bits: codec.packed().total_bits(),
    };
    let entry_count = u32::try_from(trie.key_count())
        .map_err(|_| DictError::TooLarge("entry count".to_string()))?;

    let data = MatcherData {
        source_label: options.source_label.clone(),
        entry_count,
        program,
        codec,
    };
    Ok((data, stats))
}
