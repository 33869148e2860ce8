use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

use crate::{Error, File, Result};

/// Where the bytes of a named module come from.
pub trait ModuleSource {
    /// Open the module called `name`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if no module with that name can be read.
    fn open(&self, name: &str) -> Result<File>;
}

/// Modules stored as files below a root directory, memory-mapped on open.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Read modules from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySource { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for DirectorySource {
    fn default() -> Self {
        DirectorySource::new(".")
    }
}

impl ModuleSource for DirectorySource {
    fn open(&self, name: &str) -> Result<File> {
        File::from_file(&self.root.join(name))
    }
}

/// Modules held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    modules: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Add or replace a module.
    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.modules.insert(name.into(), bytes);
    }
}

impl ModuleSource for MemorySource {
    fn open(&self, name: &str) -> Result<File> {
        match self.modules.get(name) {
            Some(bytes) => Ok(File::from_mem(bytes.clone())),
            None => Err(Error::FileError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no module named '{name}'"),
            ))),
        }
    }
}
