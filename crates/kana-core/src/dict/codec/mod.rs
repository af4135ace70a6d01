//! Deduplicated, Huffman-packed value storage.
//!
//! Every distinct value is written into one MSB-first bitstream in index
//! order. A bit-length table gives each value's exact size and a checkpoint
//! table records the starting bit of every `checkpoint_span`-th value, so
//! decoding value `i` sums at most `checkpoint_span - 1` lengths.

mod bits;
mod huffman;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

pub use huffman::{Code, HuffmanTable};
pub(crate) use huffman::Decoder;

use super::{DictEntry, DictError};
use bits::BitWriter;

/// Distinct values in first-occurrence order, each with a stable index.
#[derive(Debug, Default)]
pub struct ValueTable<'a> {
    values: Vec<&'a str>,
    index: HashMap<&'a str, u32>,
}

impl<'a> ValueTable<'a> {
    pub fn from_entries(entries: &'a [DictEntry]) -> Self {
        let mut table = Self::default();
        for entry in entries {
            table.insert(&entry.value);
        }
        table
    }

    pub fn insert(&mut self, value: &'a str) -> u32 {
        if let Some(&idx) = self.index.get(value) {
            return idx;
        }
        let idx = self.values.len() as u32;
        self.values.push(value);
        self.index.insert(value, idx);
        idx
    }

    pub fn index_of(&self, value: &str) -> Option<u32> {
        self.index.get(value).copied()
    }

    pub fn get(&self, idx: u32) -> Option<&'a str> {
        self.values.get(idx as usize).copied()
    }

    pub fn values(&self) -> &[&'a str] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedValues {
    bytes: Vec<u8>,
    bit_lengths: Vec<u32>,
    checkpoints: Vec<u64>,
    checkpoint_span: u32,
    total_bits: u64,
}

impl PackedValues {
    pub fn pack(
        values: &ValueTable<'_>,
        table: &HuffmanTable,
        checkpoint_span: u32,
    ) -> Result<Self, DictError> {
        if values.is_empty() {
            return Err(DictError::EmptyValueSet);
        }
        if checkpoint_span == 0 {
            return Err(DictError::InvalidOption("checkpoint span must be positive".into()));
        }

        let span = checkpoint_span as usize;
        let mut writer = BitWriter::new();
        let mut bit_lengths = Vec::with_capacity(values.len());
        let mut checkpoints = Vec::with_capacity(values.len().div_ceil(span));

        for (i, value) in values.values().iter().enumerate() {
            if i % span == 0 {
                checkpoints.push(writer.bit_len());
            }
            let start = writer.bit_len();
            for c in value.chars() {
                let code = table.code(c).ok_or(DictError::MissingCode(c))?;
                writer.push_code(code);
            }
            let len = u32::try_from(writer.bit_len() - start)
                .map_err(|_| DictError::TooLarge(format!("bit length of value {i}")))?;
            bit_lengths.push(len);
        }

        let total_bits = writer.bit_len();
        Ok(Self {
            bytes: writer.finish(),
            bit_lengths,
            checkpoints,
            checkpoint_span,
            total_bits,
        })
    }

    pub fn len(&self) -> usize {
        self.bit_lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bit_lengths.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bit_lengths(&self) -> &[u32] {
        &self.bit_lengths
    }

    pub fn checkpoints(&self) -> &[u64] {
        &self.checkpoints
    }

    pub fn checkpoint_span(&self) -> u32 {
        self.checkpoint_span
    }

    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Starting bit of value `index`, from the nearest checkpoint at or
    /// before it.
    pub fn start_bit(&self, index: u32) -> Option<u64> {
        let index = index as usize;
        if index >= self.bit_lengths.len() {
            return None;
        }
        let span = self.checkpoint_span as usize;
        let checkpoint = index / span;
        let base = *self.checkpoints.get(checkpoint)?;
        let skipped: u64 = self.bit_lengths[checkpoint * span..index]
            .iter()
            .map(|&len| u64::from(len))
            .sum();
        Some(base + skipped)
    }

    /// Starting bit of value `index`, summing every length from bit 0.
    pub fn start_bit_linear(&self, index: u32) -> Option<u64> {
        let index = index as usize;
        if index >= self.bit_lengths.len() {
            return None;
        }
        Some(
            self.bit_lengths[..index]
                .iter()
                .map(|&len| u64::from(len))
                .sum(),
        )
    }

    /// Check the tables against each other.
    pub(crate) fn validate(&self) -> Result<(), DictError> {
        if self.checkpoint_span == 0 {
            return Err(DictError::Corrupt("zero checkpoint span".into()));
        }
        let span = self.checkpoint_span as usize;
        if self.checkpoints.len() != self.bit_lengths.len().div_ceil(span) {
            return Err(DictError::Corrupt(format!(
                "expected {} checkpoints, found {}",
                self.bit_lengths.len().div_ceil(span),
                self.checkpoints.len()
            )));
        }

        let mut offset = 0u64;
        for (i, &len) in self.bit_lengths.iter().enumerate() {
            if i % span == 0 && self.checkpoints[i / span] != offset {
                return Err(DictError::Corrupt(format!("checkpoint {} is wrong", i / span)));
            }
            offset += u64::from(len);
        }
        if offset != self.total_bits {
            return Err(DictError::Corrupt("bit lengths do not sum to total".into()));
        }
        if self.bytes.len() as u64 != self.total_bits.div_ceil(8) {
            return Err(DictError::Corrupt("bitstream length mismatch".into()));
        }
        Ok(())
    }
}

/// Code table plus packed values: everything needed to decode a value index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCodec {
    table: HuffmanTable,
    packed: PackedValues,
}

impl ValueCodec {
    pub fn build(values: &ValueTable<'_>, checkpoint_span: u32) -> Result<Self, DictError> {
        let _span = debug_span!("build_codec", distinct_values = values.len()).entered();

        if values.is_empty() {
            return Err(DictError::EmptyValueSet);
        }
        let table = HuffmanTable::build(values.values().iter().copied())?;
        let packed = PackedValues::pack(values, &table, checkpoint_span)?;

        debug!(
            symbols = table.len(),
            total_bits = packed.total_bits(),
            packed_bytes = packed.bytes().len(),
            checkpoints = packed.checkpoints().len()
        );
        Ok(Self { table, packed })
    }

    pub fn table(&self) -> &HuffmanTable {
        &self.table
    }

    pub fn packed(&self) -> &PackedValues {
        &self.packed
    }

    pub fn value_count(&self) -> usize {
        self.packed.len()
    }

    pub(crate) fn decoder(&self) -> Result<Decoder, DictError> {
        Decoder::new(&self.table)
    }

    pub(crate) fn decode_with(&self, decoder: &Decoder, index: u32) -> Result<String, DictError> {
        let start = self
            .packed
            .start_bit(index)
            .ok_or_else(|| DictError::Corrupt(format!("value index {index} out of range")))?;
        let len = self.packed.bit_lengths[index as usize];
        decoder.decode(&self.packed.bytes, start, u64::from(len))
    }

    /// Decode value `index` via the checkpoint table.
    pub fn decode(&self, index: u32) -> Result<String, DictError> {
        self.decode_with(&self.decoder()?, index)
    }

    /// Decode value `index` with a full scan of the length table.
    pub fn decode_linear(&self, index: u32) -> Result<String, DictError> {
        let start = self
            .packed
            .start_bit_linear(index)
            .ok_or_else(|| DictError::Corrupt(format!("value index {index} out of range")))?;
        let len = self.packed.bit_lengths[index as usize];
        self.decoder()?
            .decode(&self.packed.bytes, start, u64::from(len))
    }

    pub(crate) fn validate(&self) -> Result<Decoder, DictError> {
        self.packed.validate()?;
        self.decoder()
    }
}

#[cfg(test)]
impl ValueCodec {
    pub(crate) fn table_mut(&mut self) -> &mut HuffmanTable {
        &mut self.table
    }

    pub(crate) fn packed_mut(&mut self) -> &mut PackedValues {
        &mut self.packed
    }
}

#[cfg(test)]
impl PackedValues {
    pub(crate) fn checkpoints_mut(&mut self) -> &mut Vec<u64> {
        &mut self.checkpoints
    }

    pub(crate) fn bit_lengths_mut(&mut self) -> &mut Vec<u32> {
        &mut self.bit_lengths
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut Vec<u8> {
        &mut self.bytes
    }
}
