//! GGUF Import Library
//!
//! Core library for importing user-selected GGUF model files into app
//! storage.

pub mod app;
pub mod gguf;
pub mod import;
pub mod storage;
pub mod types;
pub mod ui;
