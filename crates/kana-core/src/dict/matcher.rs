use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use super::codec::ValueTable;
use super::radix::RadixTree;
use super::DictError;

const NO_VALUE: u32 = u32::MAX;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ProgramNode {
    /// Value index, or `NO_VALUE` for a non-terminal node.
    value: u32,
    first_edge: u32,
    edge_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ProgramEdge {
    first: char,
    /// Byte range of the full label in the label pool.
    label_start: u32,
    label_end: u32,
    target: u32,
}

/// Flattened radix matcher: nodes and edges in arrays, all edge labels
/// concatenated in one string pool. Node 0 is the root. The edges of a node
/// are contiguous and strictly ascending by first character, so at most one
/// edge can match at any offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherProgram {
    nodes: Vec<ProgramNode>,
    edges: Vec<ProgramEdge>,
    labels: String,
}

impl MatcherProgram {
    /// Lay out `tree` with each terminal value replaced by its index in
    /// `values`.
    pub fn emit(tree: &RadixTree<'_>, values: &ValueTable<'_>) -> Result<Self, DictError> {
        let _span = debug_span!("emit_matcher", radix_nodes = tree.node_count()).entered();

        let mut program = Self {
            nodes: Vec::with_capacity(tree.node_count()),
            edges: Vec::with_capacity(tree.edge_count()),
            labels: String::new(),
        };

        for node in tree.nodes() {
            let value = match node.value {
                Some(v) => values
                    .index_of(v)
                    .ok_or_else(|| DictError::MissingValue(v.to_string()))?,
                None => NO_VALUE,
            };
            let first_edge = to_u32(program.edges.len(), "edge count")?;
            for edge in &node.edges {
                let label_start = to_u32(program.labels.len(), "label pool")?;
                program.labels.push_str(&edge.label);
                program.edges.push(ProgramEdge {
                    first: edge.first_char(),
                    label_start,
                    label_end: to_u32(program.labels.len(), "label pool")?,
                    target: to_u32(edge.node, "node count")?,
                });
            }
            program.nodes.push(ProgramNode {
                value,
                first_edge,
                edge_count: to_u32(node.edges.len(), "edge count")?,
            });
        }

        debug!(
            nodes = program.nodes.len(),
            edges = program.edges.len(),
            label_bytes = program.labels.len()
        );
        Ok(program)
    }

    /// Descend from the root; the value index of the node reached when the
    /// key is fully consumed, if that node is terminal.
    pub fn run(&self, key: &str) -> Option<u32> {
        let mut node = self.nodes.first()?;
        let mut rest = key;
        loop {
            let Some(first) = rest.chars().next() else {
                return (node.value != NO_VALUE).then_some(node.value);
            };
            let edges = self.edges_of(node)?;
            let edge = &edges[edges.binary_search_by_key(&first, |e| e.first).ok()?];
            rest = rest.strip_prefix(self.label(edge)?)?;
            node = self.nodes.get(edge.target as usize)?;
        }
    }

    fn edges_of(&self, node: &ProgramNode) -> Option<&[ProgramEdge]> {
        let start = node.first_edge as usize;
        let end = start.checked_add(node.edge_count as usize)?;
        self.edges.get(start..end)
    }

    fn label(&self, edge: &ProgramEdge) -> Option<&str> {
        self.labels
            .get(edge.label_start as usize..edge.label_end as usize)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn label_bytes(&self) -> usize {
        self.labels.len()
    }

    /// Number of terminal nodes, i.e. compiled keys.
    pub fn terminal_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.value != NO_VALUE).count()
    }

    /// All `(key, value_index)` pairs in ascending key order.
    pub fn keys(&self) -> Vec<(String, u32)> {
        let mut out = Vec::new();
        let mut stack = vec![(0usize, String::new())];
        while let Some((id, prefix)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if node.value != NO_VALUE {
                out.push((prefix.clone(), node.value));
            }
            for edge in self.edges_of(node).unwrap_or_default().iter().rev() {
                if let Some(label) = self.label(edge) {
                    stack.push((edge.target as usize, format!("{prefix}{label}")));
                }
            }
        }
        out
    }

    /// Structural checks for a program read from an untrusted artifact.
    pub(crate) fn validate(&self, value_count: usize) -> Result<(), DictError> {
        if self.nodes.is_empty() {
            return Err(DictError::Corrupt("matcher has no root node".into()));
        }
        let mut incoming = vec![0u32; self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            if node.value != NO_VALUE && node.value as usize >= value_count {
                return Err(DictError::Corrupt(format!(
                    "node {id} references value {} of {value_count}",
                    node.value
                )));
            }
            let edges = self
                .edges_of(node)
                .ok_or_else(|| DictError::Corrupt(format!("node {id} edge range out of bounds")))?;
            for edge in edges {
                let label_ok = self.label(edge).is_some_and(|l| l.starts_with(edge.first));
                if !label_ok || edge.target == 0 || edge.target as usize >= self.nodes.len() {
                    return Err(DictError::Corrupt(format!("node {id} has a malformed edge")));
                }
                incoming[edge.target as usize] = incoming[edge.target as usize].saturating_add(1);
            }
            if edges.windows(2).any(|w| w[0].first >= w[1].first) {
                return Err(DictError::Corrupt(format!(
                    "node {id} edges are not disjoint"
                )));
            }
        }
        // Every node but the root has exactly one parent, so the program is a tree.
        if let Some(id) = (1..self.nodes.len()).find(|&id| incoming[id] != 1) {
            return Err(DictError::Corrupt(format!(
                "node {id} has {} parents",
                incoming[id]
            )));
        }
        let mut reached = 0usize;
        let mut stack = vec![0usize];
        while let Some(id) = stack.pop() {
            reached += 1;
            for edge in self.edges_of(&self.nodes[id]).unwrap_or_default() {
                stack.push(edge.target as usize);
            }
        }
        if reached != self.nodes.len() {
            return Err(DictError::Corrupt(format!(
                "{} of {} nodes are unreachable from the root",
                self.nodes.len() - reached,
                self.nodes.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
impl MatcherProgram {
    pub(crate) fn retarget_edge(&mut self, edge: usize, target: u32) {
        self.edges[edge].target = target;
    }
}

fn to_u32(n: usize, what: &str) -> Result<u32, DictError> {
    u32::try_from(n).map_err(|_| DictError::TooLarge(what.to_string()))
}
