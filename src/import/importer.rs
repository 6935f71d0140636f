//! Model importer
//!
//! Copies a validated GGUF file into the models directory and records it in
//! the registry.
//!
//! # Architecture
//!
//! The magic-number check is cheap and runs inline on the caller's task.
//! Everything after it runs on a spawned task that owns the import lock, so
//! dropping the caller's future never releases the lock while a copy is
//! still writing. The copy itself runs on tokio's blocking pool since
//! handles expose plain `std::io::Read` streams.
//!
//! Data is written to `<name>.part`. The registry is saved next, and only
//! then is the partial file renamed into place. A failure at any step
//! removes the partial file and leaves the registry as it was.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{oneshot, Mutex, OwnedMutexGuard};

use crate::gguf::{self, GgufMetadata};
use crate::import::naming::destination_file_name;
use crate::storage::registry::{ModelRecord, ModelRegistry};
use crate::storage::settings::ImportSettings;
use crate::storage::StorageError;
use crate::types::ModelHandle;

const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Errors that can occur during an import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{name} is not a GGUF model file")]
    InvalidFormat { name: String },

    #[error("Another import is already in progress")]
    Busy,

    #[error("Failed to copy {name}: {source}")]
    Copy {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Import task failed: {0}")]
    Task(String),
}

impl ImportError {
    /// Whether running the same import again might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ImportError::Copy { .. } | ImportError::Storage(_) | ImportError::Task(_)
        )
    }
}

/// A model that was successfully imported
#[derive(Debug, Clone)]
pub struct ImportedModel {
    /// Registry id
    pub id: String,
    /// Display name (GGUF `general.name`, or the stored file name)
    pub name: String,
    /// Location of the copied file
    pub path: PathBuf,
    /// Number of bytes copied
    pub size_bytes: u64,
    /// Header metadata, when it could be parsed
    pub metadata: Option<GgufMetadata>,
}

/// Imports model files into app-private storage
///
/// One importer owns one models directory. Concurrent calls to
/// [`ModelImporter::import_file`] on the same instance are rejected with
/// [`ImportError::Busy`] instead of racing on the destination file.
pub struct ModelImporter {
    models_dir: PathBuf,
    buffer_size: usize,
    registry: Arc<Mutex<ModelRegistry>>,
    import_lock: Arc<Mutex<()>>,
}

/// Everything the background part of an import needs
struct ImportJob {
    handle: Arc<dyn ModelHandle>,
    display_name: String,
    file_name: String,
    destination: PathBuf,
    models_dir: PathBuf,
    buffer_size: usize,
    registry: Arc<Mutex<ModelRegistry>>,
}

impl ModelImporter {
    pub fn new(models_dir: impl Into<PathBuf>, registry: ModelRegistry) -> Self {
        Self {
            models_dir: models_dir.into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            registry: Arc::new(Mutex::new(registry)),
            import_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create an importer using the models directory and buffer size from settings
    pub fn from_settings(settings: &ImportSettings, registry: ModelRegistry) -> Self {
        Self::new(settings.models_directory.clone(), registry)
            .with_buffer_size(settings.copy_buffer_bytes())
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn registry(&self) -> Arc<Mutex<ModelRegistry>> {
        self.registry.clone()
    }

    /// Check the GGUF magic of the file behind `handle`
    pub fn validate(&self, handle: &dyn ModelHandle) -> bool {
        gguf::validate(handle)
    }

    /// Copy the file behind `handle` into the models directory.
    ///
    /// The file is validated again before copying; an invalid file is never
    /// copied. An existing model with the same destination name is replaced.
    /// The returned future resolves once, after the copy has finished or
    /// failed. If the future is dropped early the import still runs to
    /// completion, and the importer stays busy until it does.
    pub async fn import_file(
        &self,
        handle: Arc<dyn ModelHandle>,
    ) -> Result<ImportedModel, ImportError> {
        let guard = self
            .import_lock
            .clone()
            .try_lock_owned()
            .map_err(|_| ImportError::Busy)?;

        let display_name = handle.display_name();
        if !self.validate(handle.as_ref()) {
            return Err(ImportError::InvalidFormat { name: display_name });
        }

        let file_name = destination_file_name(&display_name);
        let destination = self.models_dir.join(&file_name);
        tracing::info!("Importing {} to {}", display_name, destination.display());

        let job = ImportJob {
            handle,
            display_name,
            file_name,
            destination,
            models_dir: self.models_dir.clone(),
            buffer_size: self.buffer_size,
            registry: self.registry.clone(),
        };

        tokio::spawn(run_import(job, guard))
            .await
            .map_err(|e| ImportError::Task(e.to_string()))?
    }

    /// Run [`ModelImporter::import_file`] on a background task.
    ///
    /// The receiver yields the outcome exactly once.
    pub fn spawn_import(
        self: Arc<Self>,
        handle: Arc<dyn ModelHandle>,
    ) -> oneshot::Receiver<Result<ImportedModel, ImportError>> {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = self.import_file(handle).await;
            if tx.send(result).is_err() {
                tracing::debug!("Import finished after the receiver was dropped");
            }
        });
        rx
    }
}

/// Copy, register and move the model into place while holding the import lock
async fn run_import(
    job: ImportJob,
    _guard: OwnedMutexGuard<()>,
) -> Result<ImportedModel, ImportError> {
    let ImportJob {
        handle,
        display_name,
        file_name,
        destination,
        models_dir,
        buffer_size,
        registry,
    } = job;
    let partial = partial_path(&destination);

    let copy_partial = partial.clone();
    let (size_bytes, metadata) = tokio::task::spawn_blocking(move || {
        let size = copy_to_partial(handle.as_ref(), &models_dir, &copy_partial, buffer_size)?;
        Ok::<_, io::Error>((size, read_metadata(&copy_partial)))
    })
    .await
    .map_err(|e| ImportError::Task(e.to_string()))?
    .map_err(|source| ImportError::Copy {
        name: display_name.clone(),
        source,
    })?;

    let name = metadata
        .as_ref()
        .and_then(|m| m.name.clone())
        .unwrap_or_else(|| file_name.clone());
    let mut record = ModelRecord::new(name.clone(), destination.clone(), size_bytes);
    if let Some(metadata) = &metadata {
        record.context_length = metadata.context_length;
        record.chat_template = metadata.chat_template.clone();
    }
    let id = record.id.clone();

    let mut registry = registry.lock().await;
    let previous = match registry.commit(record) {
        Ok(previous) => previous,
        Err(e) => {
            remove_partial(&partial);
            return Err(e.into());
        }
    };

    if let Err(source) = tokio::fs::rename(&partial, &destination).await {
        remove_partial(&partial);
        if let Err(e) = registry.revert(&id, previous) {
            tracing::warn!("Failed to roll back registry entry {}: {}", id, e);
        }
        return Err(ImportError::Copy {
            name: display_name,
            source,
        });
    }

    tracing::info!("Imported {} ({} bytes)", name, size_bytes);

    Ok(ImportedModel {
        id,
        name,
        path: destination,
        size_bytes,
        metadata,
    })
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

fn remove_partial(partial: &Path) {
    if let Err(e) = fs::remove_file(partial) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove partial file {}: {}", partial.display(), e);
        }
    }
}

/// Copy the handle's content to `partial`, returning the byte count
fn copy_to_partial(
    handle: &dyn ModelHandle,
    models_dir: &Path,
    partial: &Path,
    buffer_size: usize,
) -> io::Result<u64> {
    fs::create_dir_all(models_dir)?;

    let result = write_partial(handle, partial, buffer_size);
    if result.is_err() {
        remove_partial(partial);
    }
    result
}

fn write_partial(handle: &dyn ModelHandle, partial: &Path, buffer_size: usize) -> io::Result<u64> {
    let mut reader = BufReader::with_capacity(buffer_size, handle.open_for_read()?);
    let mut writer = BufWriter::with_capacity(buffer_size, File::create(partial)?);

    let size = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    Ok(size)
}

/// Best-effort metadata read; the magic check already passed, so a parse
/// failure here does not fail the import.
fn read_metadata(path: &Path) -> Option<GgufMetadata> {
    let result = File::open(path)
        .map_err(gguf::GgufError::from)
        .and_then(|file| GgufMetadata::read(&mut BufReader::new(file)));

    match result {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            tracing::warn!("Could not read GGUF metadata from {}: {}", path.display(), e);
            None
        }
    }
}
