//! Destinations for generated units.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Persists named text content.
///
/// Paths are relative and `/`-separated, e.g. `models/Pet.ts`.
pub trait Sink {
    /// Stores `content` under `path`, replacing anything already there.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the destination cannot be created or written.
    fn write(&mut self, path: &str, content: &str) -> io::Result<()>;
}

/// Writes units below a root directory, creating intermediate directories.
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Sink for FileSink {
    fn write(&mut self, path: &str, content: &str) -> io::Result<()> {
        let file_path: PathBuf = path
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment));
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(file_path, content)
    }
}

/// Keeps units in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: BTreeMap<String, String>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl Sink for MemorySink {
    fn write(&mut self, path: &str, content: &str) -> io::Result<()> {
        self.files.insert(path.to_string(), content.to_string());
        Ok(())
    }
}
