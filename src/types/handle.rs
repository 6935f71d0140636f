//! Model file handles
//!
//! A handle is an opaque reference to a file the user picked. It may be a
//! plain path on disk or a virtual resource with no path at all, so the
//! importer only ever asks it for a fresh byte stream and a display name.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only access to a user-selected model file
pub trait ModelHandle: Send + Sync {
    /// Open a new stream positioned at the start of the resource.
    ///
    /// Every call returns an independent stream, so reading from one never
    /// moves the position of another.
    fn open_for_read(&self) -> io::Result<Box<dyn Read + Send>>;

    /// User-facing name of the resource
    fn display_name(&self) -> String;
}

/// Handle backed by a filesystem path
#[derive(Debug, Clone)]
pub struct FileHandle {
    path: PathBuf,
}

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelHandle for FileHandle {
    fn open_for_read(&self) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(file))
    }

    fn display_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string()
    }
}

/// Handle backed by an in-memory buffer
///
/// Stands in for content-provider style resources that have no path.
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    name: String,
    bytes: Arc<[u8]>,
}

impl MemoryHandle {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::from(bytes),
        }
    }
}

impl ModelHandle for MemoryHandle {
    fn open_for_read(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(SharedBytes(self.bytes.clone()))))
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

struct SharedBytes(Arc<[u8]>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
