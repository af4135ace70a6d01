use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use super::super::DictError;
use super::bits::bit_at;

/// A variable-length bit string of at most 64 bits, stored right-aligned.
/// Bit 0 is the first bit written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Code {
    bits: u64,
    len: u8,
}

impl Code {
    pub const EMPTY: Code = Code { bits: 0, len: 0 };
    pub const MAX_LEN: u8 = 64;

    /// Append one bit, or `None` once the code would exceed 64 bits.
    pub fn push(self, bit: bool) -> Option<Code> {
        if self.len >= Self::MAX_LEN {
            return None;
        }
        Some(Code {
            bits: (self.bits << 1) | u64::from(bit),
            len: self.len + 1,
        })
    }

    pub fn len(&self) -> u8 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bit(&self, i: u8) -> bool {
        (self.bits >> (self.len - 1 - i)) & 1 == 1
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len
            && (self.len == 0 || other.bits >> (other.len - self.len) == self.bits)
    }

    /// Length within bounds and no bits set above it.
    fn is_well_formed(&self) -> bool {
        self.len <= Self::MAX_LEN && (self.len == Self::MAX_LEN || self.bits >> self.len == 0)
    }

    /// Left-aligned bits; sorting by `(aligned, len)` is lexicographic order.
    fn aligned(&self) -> u64 {
        if self.len == 0 {
            0
        } else {
            self.bits << (64 - u32::from(self.len))
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.bit(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Whether no code is a prefix of another (duplicates count as prefixes).
pub(crate) fn is_prefix_free<'c>(codes: impl IntoIterator<Item = &'c Code>) -> bool {
    let mut sorted: Vec<Code> = codes.into_iter().copied().collect();
    sorted.sort_by_key(|c| (c.aligned(), c.len));
    // In lexicographic order a code that prefixes any other prefixes its successor.
    sorted.windows(2).all(|w| !w[0].is_prefix_of(&w[1]))
}

enum MergeNode {
    Leaf(char),
    Branch(usize, usize),
}

/// Character → code table built from the distinct value set.
///
/// Construction is deterministic: leaves enter the queue in ascending `char`
/// order, every node gets a sequence number in creation order, and ties on
/// frequency are broken by the lower sequence number. The first node taken
/// from the queue becomes the `0` child of the merged parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuffmanTable {
    /// Sorted by `char`.
    symbols: Vec<(char, Code)>,
}

impl HuffmanTable {
    pub fn build<'v>(values: impl IntoIterator<Item = &'v str>) -> Result<Self, DictError> {
        let mut freq: BTreeMap<char, u64> = BTreeMap::new();
        for value in values {
            for c in value.chars() {
                *freq.entry(c).or_insert(0) += 1;
            }
        }
        if freq.is_empty() {
            return Err(DictError::EmptyValueSet);
        }

        let mut arena: Vec<MergeNode> = Vec::with_capacity(freq.len() * 2);
        let mut queue: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();
        for (&c, &count) in &freq {
            queue.push(Reverse((count, arena.len())));
            arena.push(MergeNode::Leaf(c));
        }

        while queue.len() > 1 {
            let (Some(Reverse((f0, zero))), Some(Reverse((f1, one)))) = (queue.pop(), queue.pop())
            else {
                break;
            };
            queue.push(Reverse((f0 + f1, arena.len())));
            arena.push(MergeNode::Branch(zero, one));
        }

        let root = arena.len() - 1;
        let mut symbols = Vec::with_capacity(freq.len());
        if let MergeNode::Leaf(c) = arena[root] {
            // A single-symbol alphabet still needs one bit per character.
            symbols.push((c, Code { bits: 0, len: 1 }));
        } else {
            let mut stack = vec![(root, Code::EMPTY)];
            while let Some((id, prefix)) = stack.pop() {
                match arena[id] {
                    MergeNode::Leaf(c) => symbols.push((c, prefix)),
                    MergeNode::Branch(zero, one) => {
                        let too_long = || DictError::CodeTooLong(first_leaf(&arena, id));
                        stack.push((one, prefix.push(true).ok_or_else(too_long)?));
                        stack.push((zero, prefix.push(false).ok_or_else(too_long)?));
                    }
                }
            }
        }

        symbols.sort_by_key(|&(c, _)| c);
        Ok(Self { symbols })
    }

    pub fn code(&self, c: char) -> Option<Code> {
        self.symbols
            .binary_search_by_key(&c, |&(sc, _)| sc)
            .ok()
            .map(|i| self.symbols[i].1)
    }

    pub fn symbols(&self) -> &[(char, Code)] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_prefix_free(&self) -> bool {
        is_prefix_free(self.symbols.iter().map(|(_, code)| code))
    }
}

#[cfg(test)]
impl HuffmanTable {
    pub(crate) fn symbols_mut(&mut self) -> &mut Vec<(char, Code)> {
        &mut self.symbols
    }
}

fn first_leaf(arena: &[MergeNode], mut id: usize) -> char {
    loop {
        match arena[id] {
            MergeNode::Leaf(c) => return c,
            MergeNode::Branch(zero, _) => id = zero,
        }
    }
}

/// Bit-string → character map for decoding.
#[derive(Debug, Clone)]
pub(crate) struct Decoder {
    by_code: HashMap<Code, char>,
    max_len: u8,
}

impl Decoder {
    /// Rejects tables that could not have come from `HuffmanTable::build`.
    pub fn new(table: &HuffmanTable) -> Result<Self, DictError> {
        if table.is_empty() {
            return Err(DictError::Corrupt("empty code table".into()));
        }
        if table.symbols.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err(DictError::Corrupt("code table is not sorted".into()));
        }
        if table.symbols.iter().any(|(_, code)| code.is_empty()) {
            return Err(DictError::Corrupt("zero-length code".into()));
        }
        if table.symbols.iter().any(|(_, code)| !code.is_well_formed()) {
            return Err(DictError::Corrupt("malformed code".into()));
        }
        if !table.is_prefix_free() {
            return Err(DictError::Corrupt("code table is not prefix-free".into()));
        }

        let by_code: HashMap<Code, char> = table.symbols.iter().map(|&(c, code)| (code, c)).collect();
        let max_len = table.symbols.iter().map(|(_, code)| code.len()).max().unwrap_or(0);
        Ok(Self { by_code, max_len })
    }

    /// Decode `len` bits starting at `start`, emitting a character each
    /// time the accumulated bits equal a table entry.
    pub fn decode(&self, bytes: &[u8], start: u64, len: u64) -> Result<String, DictError> {
        let mut out = String::new();
        let mut acc = Code::EMPTY;
        for pos in start..start + len {
            let bit = bit_at(bytes, pos)
                .ok_or_else(|| DictError::Corrupt("bitstream truncated".into()))?;
            acc = match acc.push(bit) {
                Some(next) if next.len() <= self.max_len => next,
                _ => return Err(DictError::Corrupt(format!("no code matches at bit {pos}"))),
            };
            if let Some(&c) = self.by_code.get(&acc) {
                out.push(c);
                acc = Code::EMPTY;
            }
        }
        if !acc.is_empty() {
            return Err(DictError::Corrupt("value ends inside a code".into()));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> Code {
        s.chars()
            .fold(Code::EMPTY, |acc, c| acc.push(c == '1').unwrap())
    }

    #[test]
    fn test_single_symbol_gets_one_bit() {
        let table = HuffmanTable::build(["ーーー", "ー"]).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.code('ー').unwrap().to_string(), "0");
    }

    #[test]
    fn test_frequent_symbols_get_shorter_codes() {
        let table = HuffmanTable::build(["アアアアアアイイウ"]).unwrap();
        let a = table.code('ア').unwrap();
        let u = table.code('ウ').unwrap();
        assert!(a.len() < u.len());
        assert!(table.is_prefix_free());
    }

    #[test]
    fn test_equal_frequencies_are_deterministic() {
        let first = HuffmanTable::build(["アイウエ", "オカキク"]).unwrap();
        let second = HuffmanTable::build(["アイウエ", "オカキク"]).unwrap();
        assert_eq!(first, second);
        // Eight equally frequent symbols form a complete tree of depth 3.
        assert!(first.symbols().iter().all(|(_, c)| c.len() == 3));
    }

    #[test]
    fn test_empty_value_set() {
        let err = HuffmanTable::build(Vec::<&str>::new()).unwrap_err();
        assert!(matches!(err, DictError::EmptyValueSet));
    }

    #[test]
    fn test_is_prefix_free() {
        assert!(is_prefix_free(&[code("0"), code("10"), code("11")]));
        assert!(!is_prefix_free(&[code("0"), code("01"), code("11")]));
        assert!(!is_prefix_free(&[code("10"), code("0"), code("101")]));
        assert!(!is_prefix_free(&[code("1"), code("1")]));
    }

    #[test]
    fn test_code_display_and_bits() {
        let c = code("0110");
        assert_eq!(c.to_string(), "0110");
        assert_eq!(c.len(), 4);
        assert!(!c.bit(0));
        assert!(c.bit(1));
        assert!(code("01").is_prefix_of(&c));
        assert!(!code("1").is_prefix_of(&c));
    }

    #[test]
    fn test_tie_break_prefers_earlier_node() {
        // ア=1, イ=2, ウ=3: the merged (ア,イ) parent ties with ウ and loses
        // to it because ウ was created first.
        let table = HuffmanTable::build(["アイイウウウ"]).unwrap();
        assert_eq!(table.code('ウ').unwrap().to_string(), "0");
        assert_eq!(table.code('ア').unwrap().to_string(), "10");
        assert_eq!(table.code('イ').unwrap().to_string(), "11");
    }

    #[test]
    fn test_decoder_rejects_dangling_bits() {
        let table = HuffmanTable::build(["アイイウウウ"]).unwrap();
        let decoder = Decoder::new(&table).unwrap();
        assert_eq!(decoder.decode(&[0b1001_1000], 0, 5).unwrap(), "アウイ");
        let err = decoder.decode(&[0b1000_0000], 0, 1).unwrap_err();
        assert!(matches!(err, DictError::Corrupt(_)));
    }

    #[test]
    fn test_decoder_rejects_reads_past_stream() {
        let table = HuffmanTable::build(["アイイ"]).unwrap();
        let decoder = Decoder::new(&table).unwrap();
        let err = decoder.decode(&[0b0100_0000], 6, 4).unwrap_err();
        assert!(matches!(err, DictError::Corrupt(_)));
    }

    #[test]
    fn test_decoder_rejects_malformed_codes() {
        let too_long = HuffmanTable {
            symbols: vec![('ア', Code { bits: 0, len: 65 })],
        };
        assert!(Decoder::new(&too_long).is_err());

        let stray_bits = HuffmanTable {
            symbols: vec![('ア', Code { bits: 0b100, len: 1 })],
        };
        assert!(Decoder::new(&stray_bits).is_err());
    }
}
