//! Imported model registry
//!
//! Keeps a record of every model that has been imported, persisted as a
//! single JSON file next to the models directory.

use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A model that has been imported into app storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Unique identifier for the record
    pub id: String,
    /// Display name (GGUF `general.name`, or the file name)
    pub name: String,
    /// Location of the copied file
    pub path: PathBuf,
    /// File size in bytes
    pub size_bytes: u64,
    /// Context window size declared by the model, if any
    pub context_length: Option<u64>,
    /// Chat template declared by the model, if any
    pub chat_template: Option<String>,
    /// When the model was imported
    pub imported_at: DateTime<Utc>,
}

impl ModelRecord {
    pub fn new(name: impl Into<String>, path: PathBuf, size_bytes: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            path,
            size_bytes,
            context_length: None,
            chat_template: None,
            imported_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    models: Vec<ModelRecord>,
}

/// JSON-backed list of imported models
#[derive(Debug)]
pub struct ModelRegistry {
    path: PathBuf,
    records: Vec<ModelRecord>,
}

impl ModelRegistry {
    /// Open the registry at `path`
    ///
    /// A missing file yields an empty registry. A corrupted file is an error
    /// so that saving never silently discards existing records.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let records = if path.exists() {
            let json = fs::read_to_string(&path)?;
            serde_json::from_str::<RegistryFile>(&json)?.models
        } else {
            tracing::debug!("Registry file not found, starting empty: {}", path.display());
            vec![]
        };

        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a record and persist it.
    ///
    /// The in-memory list only changes once the file has been written, so a
    /// failed write leaves the registry as it was. Returns the record that
    /// was replaced, if any.
    pub fn commit(&mut self, record: ModelRecord) -> Result<Option<ModelRecord>, StorageError> {
        let previous = self.records.iter().find(|r| r.path == record.path).cloned();

        let mut records: Vec<ModelRecord> = self
            .records
            .iter()
            .filter(|r| r.path != record.path)
            .cloned()
            .collect();
        tracing::debug!("Registering model: {} ({})", record.name, record.id);
        records.push(record);

        write_records(&self.path, &records)?;
        self.records = records;
        Ok(previous)
    }

    /// Undo a [`ModelRegistry::commit`]: drop record `id` and put back the
    /// record it replaced
    pub fn revert(&mut self, id: &str, previous: Option<ModelRecord>) -> Result<(), StorageError> {
        self.records.retain(|r| r.id != id);
        if let Some(previous) = previous {
            self.records.push(previous);
        }
        self.save()
    }

    /// All records, most recently imported first
    pub fn list(&self) -> Vec<ModelRecord> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| b.imported_at.cmp(&a.imported_at));
        records
    }

    pub fn get(&self, id: &str) -> Option<&ModelRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Remove a record by id
    pub fn remove(&mut self, id: &str) -> Result<ModelRecord, StorageError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StorageError::ModelNotFound(id.to_string()))?;
        Ok(self.records.remove(index))
    }

    /// Write the registry to disk
    pub fn save(&self) -> Result<(), StorageError> {
        write_records(&self.path, &self.records)
    }
}

fn write_records(path: &Path, records: &[ModelRecord]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = RegistryFile {
        models: records.to_vec(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    fs::write(path, json)?;

    tracing::debug!("Saved {} registry record(s)", records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let registry = ModelRegistry::open(temp_dir.path().join("models.json")).unwrap();
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_save_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("models.json");

        let mut record = ModelRecord::new("SmolLM2", temp_dir.path().join("smol.gguf"), 42);
        record.context_length = Some(8192);
        let id = record.id.clone();

        let mut registry = ModelRegistry::open(&path).unwrap();
        registry.commit(record).unwrap();

        let reopened = ModelRegistry::open(&path).unwrap();
        let loaded = reopened.get(&id).unwrap();
        assert_eq!(loaded.name, "SmolLM2");
        assert_eq!(loaded.context_length, Some(8192));
    }

    #[test]
    fn test_list_most_recent_first() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = ModelRegistry::open(temp_dir.path().join("models.json")).unwrap();

        let mut older = ModelRecord::new("older", temp_dir.path().join("a.gguf"), 1);
        older.imported_at = Utc::now() - Duration::hours(1);
        registry.commit(ModelRecord::new("newer", temp_dir.path().join("b.gguf"), 1)).unwrap();
        registry.commit(older).unwrap();

        let names: Vec<_> = registry.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["newer", "older"]);
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = ModelRegistry::open(temp_dir.path().join("models.json")).unwrap();
        let record = ModelRecord::new("model", temp_dir.path().join("m.gguf"), 1);
        let id = record.id.clone();
        registry.commit(record).unwrap();

        assert_eq!(registry.remove(&id).unwrap().name, "model");
        assert!(matches!(registry.remove(&id), Err(StorageError::ModelNotFound(_))));
    }

    #[test]
    fn test_commit_persists_and_returns_replaced_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("models.json");
        let model_path = temp_dir.path().join("model.gguf");
        let mut registry = ModelRegistry::open(&path).unwrap();

        let first = ModelRecord::new("first", model_path.clone(), 1);
        assert!(registry.commit(first.clone()).unwrap().is_none());
        let replaced = registry.commit(ModelRecord::new("second", model_path, 2)).unwrap();
        assert_eq!(replaced, Some(first));

        let reopened = ModelRegistry::open(&path).unwrap();
        assert_eq!(reopened.list().len(), 1);
        assert_eq!(reopened.list()[0].name, "second");
    }

    #[test]
    fn test_failed_commit_leaves_registry_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("models.json");
        let mut registry = ModelRegistry::open(&path).unwrap();
        // A directory where the file should be makes every write fail
        fs::create_dir(&path).unwrap();

        let result = registry.commit(ModelRecord::new("model", temp_dir.path().join("m.gguf"), 1));

        assert!(matches!(result, Err(StorageError::ReadError(_))));
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_revert_restores_previous_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("models.json");
        let model_path = temp_dir.path().join("model.gguf");
        let mut registry = ModelRegistry::open(&path).unwrap();

        registry.commit(ModelRecord::new("old", model_path.clone(), 1)).unwrap();
        let new = ModelRecord::new("new", model_path, 2);
        let new_id = new.id.clone();
        let previous = registry.commit(new).unwrap();
        registry.revert(&new_id, previous).unwrap();

        let reopened = ModelRegistry::open(&path).unwrap();
        let names: Vec<_> = reopened.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["old"]);
    }

    #[test]
    fn test_corrupted_registry_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("models.json");
        fs::write(&path, "{ broken").unwrap();

        assert!(matches!(ModelRegistry::open(&path), Err(StorageError::JsonError(_))));
    }
}
