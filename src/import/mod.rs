//! Model import
//!
//! Validates user-selected files and copies them into app storage.

pub mod importer;
pub mod naming;

pub use importer::{ImportError, ImportedModel, ModelImporter};
pub use naming::destination_file_name;
