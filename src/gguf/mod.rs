//! GGUF container handling
//!
//! Signature checks and header/metadata parsing for GGUF model files.
//! See <https://github.com/ggml-org/ggml/blob/master/docs/gguf.md#file-structure>.

pub mod header;
pub mod magic;
pub mod metadata;

// Re-export main types for convenience
pub use header::{GgufError, GgufHeader};
pub use magic::{has_gguf_magic, validate, GGUF_MAGIC};
pub use metadata::GgufMetadata;
