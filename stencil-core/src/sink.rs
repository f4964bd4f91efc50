use std::{
    io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use parking_lot::Mutex;

/// Destination for generated files.
///
/// Implementations must create any missing parent directories and report
/// I/O failures instead of swallowing them.
pub trait OutputSink: Send + Sync {
    /// Persist `content` at `path`.
    fn write_file(&self, path: &Path, content: &str) -> io::Result<()>;
}

/// Writes files to the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystem;

impl OutputSink for FileSystem {
    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        write_file(path, content)
    }
}

fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

/// Collects writes in memory, in the order they were made.
///
/// Used for previews and tests. Writing the same path twice keeps the
/// original position and replaces the content.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<IndexMap<PathBuf, String>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Content written at `path`, if any.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().get(path.as_ref()).cloned()
    }

    /// Snapshot of all written files.
    pub fn files(&self) -> Vec<(PathBuf, String)> {
        self.files
            .lock()
            .iter()
            .map(|(path, content)| (path.clone(), content.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }
}

impl OutputSink for MemorySink {
    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files
            .lock()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }
}
