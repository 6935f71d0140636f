//! Shared types
//!
//! Defines the handle abstraction for user-selected model files.

pub mod handle;

pub use handle::{FileHandle, MemoryHandle, ModelHandle};
