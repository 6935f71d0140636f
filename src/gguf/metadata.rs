//! GGUF metadata extraction
//!
//! Walks the key-value section after the header and keeps the handful of
//! entries a chat client needs. Everything else, including the tokenizer
//! vocabulary arrays, is skipped without being buffered.

use std::io::{self, Read};

use serde::{Deserialize, Serialize};

use crate::gguf::header::{read_u32, read_u64, GgufError, GgufHeader};

/// Longest string value that will be read into memory (16 MiB)
const MAX_STRING_LEN: u64 = 16 * 1024 * 1024;

// GGUF metadata value type tags
const TYPE_UINT8: u32 = 0;
const TYPE_INT8: u32 = 1;
const TYPE_UINT16: u32 = 2;
const TYPE_INT16: u32 = 3;
const TYPE_UINT32: u32 = 4;
const TYPE_INT32: u32 = 5;
const TYPE_FLOAT32: u32 = 6;
const TYPE_BOOL: u32 = 7;
const TYPE_STRING: u32 = 8;
const TYPE_ARRAY: u32 = 9;
const TYPE_UINT64: u32 = 10;
const TYPE_INT64: u32 = 11;
const TYPE_FLOAT64: u32 = 12;

/// Metadata read from a GGUF file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GgufMetadata {
    /// GGUF format version
    pub version: u32,
    /// Number of tensors in the model
    pub tensor_count: u64,
    /// `general.name`
    pub name: Option<String>,
    /// `general.architecture`
    pub architecture: Option<String>,
    /// `<architecture>.context_length`
    pub context_length: Option<u64>,
    /// `tokenizer.chat_template`
    pub chat_template: Option<String>,
}

impl GgufMetadata {
    /// Read the header and metadata section from the start of `reader`
    pub fn read<R: Read + ?Sized>(reader: &mut R) -> Result<Self, GgufError> {
        let header = GgufHeader::parse(reader)?;
        let mut metadata = GgufMetadata {
            version: header.version,
            tensor_count: header.tensor_count,
            ..Default::default()
        };
        let mut context_lengths: Vec<(String, u64)> = Vec::new();

        for _ in 0..header.metadata_kv_count {
            let key = read_string(reader)?;
            let value_type = read_u32(reader)?;

            match key.as_str() {
                "general.name" if value_type == TYPE_STRING => {
                    metadata.name = Some(read_string(reader)?);
                }
                "general.architecture" if value_type == TYPE_STRING => {
                    metadata.architecture = Some(read_string(reader)?);
                }
                "tokenizer.chat_template" if value_type == TYPE_STRING => {
                    metadata.chat_template = Some(read_string(reader)?);
                }
                k if k.ends_with(".context_length") => match read_integer(reader, value_type)? {
                    Some(value) => context_lengths.push((k.to_string(), value)),
                    None => skip_value(reader, value_type)?,
                },
                _ => skip_value(reader, value_type)?,
            }
        }

        // The architecture key usually precedes the context length, but the
        // format does not guarantee it, so resolve after the walk.
        let preferred = metadata
            .architecture
            .as_ref()
            .map(|arch| format!("{}.context_length", arch));
        metadata.context_length = context_lengths
            .iter()
            .find(|(k, _)| Some(k) == preferred.as_ref())
            .or_else(|| context_lengths.first())
            .map(|(_, v)| *v);

        Ok(metadata)
    }
}

fn read_string<R: Read + ?Sized>(reader: &mut R) -> Result<String, GgufError> {
    let len = read_u64(reader)?;
    if len > MAX_STRING_LEN {
        return Err(GgufError::StringTooLong(len));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Read an unsigned integer value, returning `None` without consuming
/// anything when the type is not an integer.
fn read_integer<R: Read + ?Sized>(reader: &mut R, value_type: u32) -> Result<Option<u64>, GgufError> {
    let value = match value_type {
        TYPE_UINT32 => read_u32(reader)? as u64,
        TYPE_INT32 => (read_u32(reader)? as i32).max(0) as u64,
        TYPE_UINT64 => read_u64(reader)?,
        TYPE_INT64 => (read_u64(reader)? as i64).max(0) as u64,
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn scalar_size(value_type: u32) -> Option<u64> {
    match value_type {
        TYPE_UINT8 | TYPE_INT8 | TYPE_BOOL => Some(1),
        TYPE_UINT16 | TYPE_INT16 => Some(2),
        TYPE_UINT32 | TYPE_INT32 | TYPE_FLOAT32 => Some(4),
        TYPE_UINT64 | TYPE_INT64 | TYPE_FLOAT64 => Some(8),
        _ => None,
    }
}

fn skip_bytes<R: Read + ?Sized>(reader: &mut R, count: u64) -> Result<(), GgufError> {
    let skipped = io::copy(&mut reader.take(count), &mut io::sink())?;
    if skipped < count {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    Ok(())
}

fn skip_value<R: Read + ?Sized>(reader: &mut R, value_type: u32) -> Result<(), GgufError> {
    if let Some(size) = scalar_size(value_type) {
        return skip_bytes(reader, size);
    }

    match value_type {
        TYPE_STRING => {
            let len = read_u64(reader)?;
            if len > MAX_STRING_LEN {
                return Err(GgufError::StringTooLong(len));
            }
            skip_bytes(reader, len)
        }
        TYPE_ARRAY => {
            let element_type = read_u32(reader)?;
            let count = read_u64(reader)?;
            if let Some(size) = scalar_size(element_type) {
                skip_bytes(reader, size.saturating_mul(count))
            } else {
                for _ in 0..count {
                    skip_value(reader, element_type)?;
                }
                Ok(())
            }
        }
        other => Err(GgufError::UnknownValueType(other)),
    }
}
