//! GGUF header parsing
//!
//! Reads the fixed-size header that follows the magic number.

use std::io::Read;
use thiserror::Error;

use crate::gguf::magic::GGUF_MAGIC;

/// Errors that can occur while reading a GGUF file
#[derive(Debug, Error)]
pub enum GgufError {
    #[error("Failed to read GGUF data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid GGUF file: magic bytes mismatch (got {0:02X?})")]
    InvalidMagic([u8; 4]),

    #[error("Unsupported GGUF version: {0}")]
    UnsupportedVersion(u32),

    #[error("Unknown GGUF value type: {0}")]
    UnknownValueType(u32),

    #[error("GGUF string too long: {0} bytes")]
    StringTooLong(u64),
}

/// Parsed GGUF file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GgufHeader {
    /// GGUF format version
    pub version: u32,
    /// Number of tensors in the model
    pub tensor_count: u64,
    /// Number of metadata key-value pairs
    pub metadata_kv_count: u64,
}

impl GgufHeader {
    /// Size of the header in bytes, magic included
    pub const SIZE: usize = 24;

    /// Parse a header from the start of `reader`.
    ///
    /// GGUF v2 and v3 are supported; v1 used 32-bit counts and is rejected.
    pub fn parse<R: Read + ?Sized>(reader: &mut R) -> Result<Self, GgufError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != GGUF_MAGIC {
            return Err(GgufError::InvalidMagic(magic));
        }

        let version = read_u32(reader)?;
        if !(2..=3).contains(&version) {
            return Err(GgufError::UnsupportedVersion(version));
        }

        let tensor_count = read_u64(reader)?;
        let metadata_kv_count = read_u64(reader)?;

        Ok(Self {
            version,
            tensor_count,
            metadata_kv_count,
        })
    }
}

pub(crate) fn read_u32<R: Read + ?Sized>(reader: &mut R) -> Result<u32, GgufError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_u64<R: Read + ?Sized>(reader: &mut R) -> Result<u64, GgufError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
