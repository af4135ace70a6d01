use std::path::Path;

use super::format;
use super::kana_matcher::{KanaMatcher, MatcherData};
use super::DictError;

pub(super) const MAGIC: &[u8; 4] = b"EKMX";
pub(super) const VERSION: u8 = 1;

pub(super) fn encode_body(data: &MatcherData) -> Result<Vec<u8>, DictError> {
    bincode::serialize(data).map_err(DictError::Serialize)
}

impl KanaMatcher {
    pub fn to_bytes(&self) -> Result<Vec<u8>, DictError> {
        format::frame(MAGIC, VERSION, &encode_body(self.data())?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DictError> {
        let body = format::unframe(MAGIC, VERSION, data)?;
        let data: MatcherData = bincode::deserialize(body).map_err(DictError::Deserialize)?;
        Self::from_data(data)
    }

    /// Open a matcher file through a read-only mapping.
    pub fn open(path: &Path) -> Result<Self, DictError> {
        let mmap = format::map_file(path)?;
        Self::from_bytes(&mmap)
    }

    pub fn save(&self, path: &Path) -> Result<(), DictError> {
        format::write_atomic(path, &self.to_bytes()?)
    }
}
