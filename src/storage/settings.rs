//! Settings storage
//!
//! Manages persistence of importer preferences.

use crate::storage::{get_data_dir, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_COPY_BUFFER_KB: usize = 1024;

/// Importer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Directory imported model files (.gguf) are copied into
    pub models_directory: PathBuf,
    /// Open the chat screen once an import completes
    pub open_chat_screen: bool,
    /// Copy buffer size in KiB (8 - 8192)
    pub copy_buffer_kb: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            models_directory: get_data_dir()
                .ok()
                .map(|d| d.join("models"))
                .unwrap_or_else(|| PathBuf::from("./models")),
            open_chat_screen: true,
            copy_buffer_kb: DEFAULT_COPY_BUFFER_KB,
        }
    }
}

impl ImportSettings {
    /// Validate settings values
    ///
    /// Ensures all parameters are within acceptable ranges
    pub fn validate(&mut self) {
        if self.copy_buffer_kb == 0 {
            self.copy_buffer_kb = DEFAULT_COPY_BUFFER_KB;
        }
        self.copy_buffer_kb = self.copy_buffer_kb.clamp(8, 8192);

        if self.models_directory.as_os_str().is_empty() {
            self.models_directory = ImportSettings::default().models_directory;
        }
    }

    /// Copy buffer size in bytes
    pub fn copy_buffer_bytes(&self) -> usize {
        self.copy_buffer_kb * 1024
    }
}

/// Get the settings file path
fn get_settings_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("settings.json"))
}

/// Load settings from the default location
///
/// Returns default settings if the file doesn't exist or is corrupted
pub fn load_settings() -> ImportSettings {
    match get_settings_path() {
        Ok(path) => load_settings_from(&path),
        Err(e) => {
            tracing::warn!("Failed to locate settings, using defaults: {}", e);
            ImportSettings::default()
        }
    }
}

/// Load settings from `path`, falling back to defaults on any error
pub fn load_settings_from(path: &Path) -> ImportSettings {
    match load_settings_internal(path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            ImportSettings::default()
        }
    }
}

/// Internal settings loading with error propagation
fn load_settings_internal(path: &Path) -> Result<ImportSettings, StorageError> {
    if !path.exists() {
        tracing::info!("Settings file not found, using defaults");
        return Ok(ImportSettings::default());
    }

    let json = fs::read_to_string(path)?;
    let mut settings: ImportSettings = serde_json::from_str(&json)?;

    settings.validate();

    tracing::debug!("Loaded settings from disk");
    Ok(settings)
}

/// Save settings to the default location
pub fn save_settings(settings: &ImportSettings) -> Result<(), StorageError> {
    save_settings_to(&get_settings_path()?, settings)
}

/// Save settings to `path`
pub fn save_settings_to(path: &Path, settings: &ImportSettings) -> Result<(), StorageError> {
    // Ensure the parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;

    tracing::debug!("Saved settings to disk");
    Ok(())
}
