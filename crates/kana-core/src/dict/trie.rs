use std::collections::BTreeMap;

use tracing::{debug, debug_span};

use super::{DictEntry, DictError};

pub(crate) const ROOT: usize = 0;

/// Build-time trie node. Children are keyed by `char` in a `BTreeMap` so
/// every walk visits them in ascending code-point order.
#[derive(Debug, Default)]
pub struct TrieNode<'a> {
    pub value: Option<&'a str>,
    pub children: BTreeMap<char, usize>,
}

impl TrieNode<'_> {
    /// The only child of a non-terminal node, if the node is a pass-through.
    pub(crate) fn passthrough(&self) -> Option<(char, usize)> {
        if self.value.is_some() || self.children.len() != 1 {
            return None;
        }
        self.children.iter().next().map(|(&c, &id)| (c, id))
    }
}

/// Per-character trie over the entry keys, stored as an arena.
///
/// Values borrow from the entry slice; the trie is discarded once the radix
/// tree has been built from it.
#[derive(Debug)]
pub struct Trie<'a> {
    nodes: Vec<TrieNode<'a>>,
    key_count: usize,
}

impl<'a> Trie<'a> {
    pub fn build(entries: &'a [DictEntry]) -> Result<Self, DictError> {
        let _span = debug_span!("build_trie", entries = entries.len()).entered();

        let mut trie = Self {
            nodes: vec![TrieNode::default()],
            key_count: 0,
        };
        for entry in entries {
            trie.insert(&entry.key, &entry.value)?;
        }

        debug!(trie_nodes = trie.nodes.len(), keys = trie.key_count);
        Ok(trie)
    }

    fn insert(&mut self, key: &str, value: &'a str) -> Result<(), DictError> {
        if key.is_empty() {
            return Err(DictError::EmptyKey);
        }
        // Lookup trims and lowercases its input, so any other key is unreachable.
        if key.trim() != key || key.to_lowercase() != key {
            return Err(DictError::UnnormalizedKey(key.to_string()));
        }
        if value.is_empty() {
            return Err(DictError::EmptyValue(key.to_string()));
        }

        let mut cursor = ROOT;
        for c in key.chars() {
            cursor = match self.nodes[cursor].children.get(&c) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[cursor].children.insert(c, next);
                    next
                }
            };
        }

        let node = &mut self.nodes[cursor];
        match node.value {
            Some(existing) if existing != value => Err(DictError::ConflictingValue {
                key: key.to_string(),
                existing: existing.to_string(),
                incoming: value.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                node.value = Some(value);
                self.key_count += 1;
                Ok(())
            }
        }
    }

    pub fn node(&self, id: usize) -> &TrieNode<'a> {
        &self.nodes[id]
    }

    pub fn root(&self) -> &TrieNode<'a> {
        &self.nodes[ROOT]
    }

    /// Number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct keys inserted.
    pub fn key_count(&self) -> usize {
        self.key_count
    }
}
