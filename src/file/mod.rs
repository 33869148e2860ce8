//! Module file access.
//!
//! A compiled module lives either on disk or in a caller-provided buffer. [`File`] hides the
//! difference behind the [`Backend`] trait so the container parser and the tracker only ever see
//! a byte slice.
//!
//! # Key Components
//!
//! - [`File`] - an owned, immutable view of one module's bytes
//! - [`Backend`] - trait for data sources
//! - [`physical::Physical`] - memory-mapped file on disk
//! - [`memory::Memory`] - owned in-memory buffer
//! - [`parser::Parser`] - sequential cursor used to decode the bytes
//! - [`io`] - little-endian primitive reads and writes
//!
//! # Examples
//!
//! ```rust
//! use asfscope::File;
//!
//! let file = File::from_mem(b"ASF\x07".to_vec());
//! assert_eq!(file.len(), 4);
//! assert_eq!(file.data_slice(0, 3)?, b"ASF");
//! # Ok::<(), asfscope::Error>(())
//! ```

pub mod io;
pub mod memory;
pub mod parser;
pub mod physical;

use std::path::Path;

use crate::Result;
use memory::Memory;
use physical::Physical;

/// A data source that can hand out the bytes of a module.
///
/// Implementations must be immutable once constructed; every call to [`Backend::data`] returns
/// the same slice.
pub trait Backend: Send + Sync {
    /// Borrow `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the data.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Borrow the complete data.
    fn data(&self) -> &[u8];

    /// Total length of the data in bytes.
    fn len(&self) -> usize;
}

/// The raw bytes of one module, independent of where they came from.
pub struct File {
    backend: Box<dyn Backend>,
}

impl File {
    /// Memory-map a module file from disk.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn from_file(path: &Path) -> Result<File> {
        Ok(File {
            backend: Box::new(Physical::new(path)?),
        })
    }

    /// Wrap an owned buffer.
    #[must_use]
    pub fn from_mem(data: Vec<u8>) -> File {
        File {
            backend: Box::new(Memory::new(data)),
        }
    }

    /// Total length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Returns true if the file holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backend.len() == 0
    }

    /// The complete contents.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.backend.data()
    }

    /// Borrow `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the file.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.backend.data_slice(offset, len)
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File").field("len", &self.len()).finish()
    }
}
