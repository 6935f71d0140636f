//! Magic number check
//!
//! A GGUF file starts with the four ASCII bytes "GGUF". This is the only
//! check performed before a user-selected file is accepted for import.

use std::io::Read;

use crate::types::ModelHandle;

/// GGUF magic bytes: ASCII "GGUF"
pub const GGUF_MAGIC: [u8; 4] = [0x47, 0x47, 0x55, 0x46];

/// Returns true if the next four bytes of `reader` are the GGUF magic.
///
/// A short read or an I/O error counts as a mismatch.
pub fn has_gguf_magic<R: Read + ?Sized>(reader: &mut R) -> bool {
    let mut magic = [0u8; 4];
    match reader.read_exact(&mut magic) {
        Ok(()) => magic == GGUF_MAGIC,
        Err(e) => {
            tracing::debug!("Could not read magic bytes: {}", e);
            false
        }
    }
}

/// Check whether the resource behind `handle` is a GGUF file.
///
/// Opens a fresh stream and reads only the first four bytes. Streams that
/// fail to open are reported as invalid rather than as errors.
pub fn validate(handle: &dyn ModelHandle) -> bool {
    match handle.open_for_read() {
        Ok(mut stream) => has_gguf_magic(&mut stream),
        Err(e) => {
            tracing::warn!("Failed to open {}: {}", handle.display_name(), e);
            false
        }
    }
}
