//! Shared framing for the binary artifacts.
//!
//! ```text
//! magic[4] | version u8 | reserved[3] | body_len u32 LE | crc32 u32 LE | body
//! ```

use std::fs::{self, File};
use std::path::Path;

use memmap2::Mmap;

use super::DictError;

pub(crate) const HEADER_SIZE: usize = 4 + 1 + 3 + 4 + 4;

pub(crate) fn frame(magic: &[u8; 4], version: u8, body: &[u8]) -> Result<Vec<u8>, DictError> {
    let body_len: u32 = body
        .len()
        .try_into()
        .map_err(|_| DictError::TooLarge("artifact body".to_string()))?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + body.len());
    buf.extend_from_slice(magic);
    buf.push(version);
    buf.extend_from_slice(&[0u8; 3]); // reserved
    buf.extend_from_slice(&body_len.to_le_bytes());
    buf.extend_from_slice(&crc32fast::hash(body).to_le_bytes());
    buf.extend_from_slice(body);
    Ok(buf)
}

/// Validate the header and checksum, returning the body.
pub(crate) fn unframe<'a>(
    magic: &[u8; 4],
    version: u8,
    data: &'a [u8],
) -> Result<&'a [u8], DictError> {
    if data.len() < 5 {
        return Err(DictError::InvalidHeader);
    }
    if &data[..4] != magic {
        return Err(DictError::InvalidMagic);
    }
    if data[4] != version {
        return Err(DictError::UnsupportedVersion(data[4]));
    }
    if data.len() < HEADER_SIZE {
        return Err(DictError::InvalidHeader);
    }

    let body_len = read_u32(&data[8..12]) as usize;
    let expected_crc = read_u32(&data[12..16]);
    let body_end = HEADER_SIZE
        .checked_add(body_len)
        .ok_or(DictError::InvalidHeader)?;
    let body = data
        .get(HEADER_SIZE..body_end)
        .ok_or(DictError::InvalidHeader)?;

    let actual_crc = crc32fast::hash(body);
    if actual_crc != expected_crc {
        return Err(DictError::ChecksumMismatch {
            expected: expected_crc,
            actual: actual_crc,
        });
    }
    Ok(body)
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

/// Map a file read-only for deserialization.
pub(crate) fn map_file(path: &Path) -> Result<Mmap, DictError> {
    let file = File::open(path)?;
    // SAFETY: The file is opened read-only and the mapping is immutable.
    // Callers drop the Mmap once deserialization completes.
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

/// Atomic write: write to .tmp then rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DictError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
