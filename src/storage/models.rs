//! Imported model files
//!
//! Lists the GGUF files that have been copied into the models directory.

use crate::gguf::has_gguf_magic;
use crate::storage::StorageError;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Information about an imported GGUF model file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Full path to the model file
    pub path: PathBuf,
    /// Filename of the model
    pub filename: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Last modification time
    pub last_modified: SystemTime,
}

impl ModelInfo {
    /// Create a ModelInfo from a file path
    pub fn from_path(path: PathBuf) -> Result<Self, std::io::Error> {
        let metadata = fs::metadata(&path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            path,
            filename,
            size_bytes: metadata.len(),
            last_modified: metadata.modified()?,
        })
    }

    /// Get a human-readable size string
    pub fn size_string(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Format a byte count as B, KB, MB or GB
pub fn format_size(size_bytes: u64) -> String {
    let bytes = size_bytes as f64;

    if bytes < 1024.0 {
        format!("{} B", bytes)
    } else if bytes < 1024.0 * 1024.0 {
        format!("{:.2} KB", bytes / 1024.0)
    } else if bytes < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.2} MB", bytes / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Scan a directory for imported GGUF model files
///
/// Only `.gguf` files that start with the GGUF magic are listed; partial
/// copies (`*.gguf.part`) and anything else are ignored.
pub fn scan_models_directory(directory: &Path) -> Result<Vec<ModelInfo>, StorageError> {
    if !directory.exists() {
        tracing::warn!("Models directory does not exist: {}", directory.display());
        return Ok(vec![]);
    }

    if !directory.is_dir() {
        tracing::warn!("Models path is not a directory: {}", directory.display());
        return Ok(vec![]);
    }

    let mut models = vec![];

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();

        let is_gguf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gguf"));
        if !path.is_file() || !is_gguf {
            continue;
        }

        let valid = File::open(&path)
            .map(|mut f| has_gguf_magic(&mut f))
            .unwrap_or(false);
        if !valid {
            tracing::warn!("Skipping file without GGUF header: {}", path.display());
            continue;
        }

        match ModelInfo::from_path(path.clone()) {
            Ok(model_info) => {
                tracing::debug!("Found model: {}", model_info.filename);
                models.push(model_info);
            }
            Err(e) => {
                tracing::warn!("Failed to read model file {:?}: {}", path, e);
            }
        }
    }

    // Sort by filename
    models.sort_by(|a, b| a.filename.cmp(&b.filename));

    tracing::info!("Found {} model(s) in {}", models.len(), directory.display());

    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gguf::GGUF_MAGIC;
    use tempfile::TempDir;

    fn write_model(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut bytes = GGUF_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 4]);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_model_info_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = write_model(temp_dir.path(), "test_model.gguf");

        let model_info = ModelInfo::from_path(model_path.clone()).unwrap();

        assert_eq!(model_info.filename, "test_model.gguf");
        assert_eq!(model_info.path, model_path);
        assert_eq!(model_info.size_bytes, 8);
    }

    #[test]
    fn test_size_string() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert!(format_size(1024 * 1024 * 1024 * 3).contains("GB"));
    }

    #[test]
    fn test_scan_models_directory() {
        let temp_dir = TempDir::new().unwrap();

        write_model(temp_dir.path(), "model1.gguf");
        write_model(temp_dir.path(), "model2.gguf");
        write_model(temp_dir.path(), "model3.gguf.part");
        fs::write(temp_dir.path().join("not_a_model.txt"), b"hello").unwrap();
        fs::write(temp_dir.path().join("fake.gguf"), b"nope").unwrap();

        let models = scan_models_directory(temp_dir.path()).unwrap();

        let names: Vec<_> = models.iter().map(|m| m.filename.as_str()).collect();
        assert_eq!(names, vec!["model1.gguf", "model2.gguf"]);
    }

    #[test]
    fn test_scan_matches_extension_case_insensitively() {
        let temp_dir = TempDir::new().unwrap();

        write_model(temp_dir.path(), "Upper.GGUF");
        write_model(temp_dir.path(), "lower.gguf");

        let models = scan_models_directory(temp_dir.path()).unwrap();

        let names: Vec<_> = models.iter().map(|m| m.filename.as_str()).collect();
        assert_eq!(names, vec!["Upper.GGUF", "lower.gguf"]);
    }

    #[test]
    fn test_scan_nonexistent_directory() {
        let result = scan_models_directory(Path::new("/this/path/does/not/exist"));

        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 0);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let models = scan_models_directory(temp_dir.path()).unwrap();

        assert_eq!(models.len(), 0);
    }
}
