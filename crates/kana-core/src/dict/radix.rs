use tracing::{debug, debug_span};

use super::trie::{Trie, ROOT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadixEdge {
    pub label: String,
    pub node: usize,
}

impl RadixEdge {
    pub fn first_char(&self) -> char {
        // Labels are built from at least one trie edge.
        self.label.chars().next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadixNode<'a> {
    pub value: Option<&'a str>,
    pub edges: Vec<RadixEdge>,
}

/// Path-compressed trie. Node 0 is the root; edges of every node are in
/// ascending order of their first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadixTree<'a> {
    nodes: Vec<RadixNode<'a>>,
}

impl<'a> RadixTree<'a> {
    /// Collapse every chain of single-child, non-terminal trie nodes into
    /// one multi-character edge.
    pub fn compact(trie: &Trie<'a>) -> Self {
        let _span = debug_span!("compact_radix", trie_nodes = trie.node_count()).entered();

        let mut nodes = vec![RadixNode {
            value: trie.root().value,
            edges: Vec::new(),
        }];
        let mut pending = vec![(ROOT, 0usize)];

        while let Some((trie_id, radix_id)) = pending.pop() {
            for (&c, &child) in &trie.node(trie_id).children {
                let mut label = String::from(c);
                let mut cursor = child;
                while let Some((next_char, next)) = trie.node(cursor).passthrough() {
                    label.push(next_char);
                    cursor = next;
                }

                let target = nodes.len();
                nodes.push(RadixNode {
                    value: trie.node(cursor).value,
                    edges: Vec::new(),
                });
                nodes[radix_id].edges.push(RadixEdge {
                    label,
                    node: target,
                });
                pending.push((cursor, target));
            }
        }

        let tree = Self { nodes };
        debug!(
            radix_nodes = tree.node_count(),
            radix_edges = tree.edge_count()
        );
        tree
    }

    pub fn root(&self) -> &RadixNode<'a> {
        &self.nodes[0]
    }

    pub fn node(&self, id: usize) -> &RadixNode<'a> {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[RadixNode<'a>] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Whether every node's outgoing edges start with distinct characters.
    pub fn edges_disjoint(&self) -> bool {
        self.nodes.iter().all(|node| {
            node.edges
                .windows(2)
                .all(|w| w[0].first_char() < w[1].first_char())
        })
    }

    /// Exact-match descent used to cross-check the emitted program.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        let mut node = self.root();
        let mut rest = key;
        while !rest.is_empty() {
            let edge = node.edges.iter().find(|e| rest.starts_with(&e.label))?;
            rest = &rest[edge.label.len()..];
            node = self.node(edge.node);
        }
        node.value
    }
}
