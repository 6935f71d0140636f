//! Persistent storage
//!
//! App-private storage for imported model files, the model registry and
//! importer settings.

use std::path::PathBuf;
use thiserror::Error;

pub mod models;
pub mod registry;
pub mod settings;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access data directory: {0}")]
    DataDirError(String),
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to serialize/deserialize JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Model not found: {0}")]
    ModelNotFound(String),
}

/// Get the application data directory
///
/// Returns the platform-specific application data directory:
/// - Windows: `C:\Users\{user}\AppData\Roaming\GgufImport\GgufImport\data`
/// - macOS: `/Users/{user}/Library/Application Support/com.GgufImport.GgufImport`
/// - Linux: `/home/{user}/.local/share/ggufimport`
pub fn get_data_dir() -> Result<PathBuf, StorageError> {
    directories::ProjectDirs::from("com", "GgufImport", "GgufImport")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| StorageError::DataDirError("Could not determine data directory".to_string()))
}

/// Default directory that imported models are copied into
pub fn default_models_dir() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("models"))
}

/// Path of the imported model registry
pub fn default_registry_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("models.json"))
}

/// Initialize the storage directory structure
///
/// Creates the following directories:
/// - `{data_dir}/models/` - Imported model files
/// - `{data_dir}/models.json` - Created by the registry on first save
/// - `{data_dir}/settings.json` - Created by settings module
pub fn init_storage() -> Result<PathBuf, StorageError> {
    let data_dir = get_data_dir()?;

    let models_dir = data_dir.join("models");
    std::fs::create_dir_all(&models_dir)?;

    tracing::info!("Initialized storage at: {}", data_dir.display());

    Ok(data_dir)
}
