//! ASF module container format.
//!
//! An ASF container wraps one precompiled script module together with the names of the modules
//! it depends on. All integers are little-endian.
//!
//! ```text
//! offset 0:  4-byte magic "ASF\x07"
//! offset 4:  u32 code offset
//! offset 8:  u32 code size
//! offset 12: u32 dependency count
//! offset 16: dependency count x 64-byte NUL-terminated name records
//! ...:       code segment of `code size` bytes starting at `code offset`
//! ```
//!
//! Names are stored in fixed 64-byte records. A record without a NUL is read as a 64-byte name;
//! [`ContainerBuilder`] never writes more than 63 name bytes so that every record it emits keeps
//! its terminator. Longer names are cut silently, which is a constraint of the format.
//!
//! # Examples
//!
//! ```rust
//! use asfscope::container::{ContainerBuilder, ContainerHeader};
//!
//! let bytes = ContainerBuilder::new()
//!     .dependency("common.asf")
//!     .code(vec![0xAA; 8])
//!     .build()?;
//!
//! let header = ContainerHeader::parse(&bytes)?;
//! assert_eq!(header.dependencies, ["common.asf"]);
//! assert_eq!(header.code(&bytes)?, &[0xAA; 8]);
//! # Ok::<(), asfscope::Error>(())
//! ```

mod builder;

pub use builder::ContainerBuilder;

use std::ops::Range;

use crate::{file::parser::Parser, Error, Result};

/// Magic marker at the start of every container.
pub const ASF_MAGIC: [u8; 4] = [b'A', b'S', b'F', 0x07];

/// Size of the fixed header in bytes (magic plus three u32 fields).
pub const HEADER_SIZE: usize = 16;

/// Size of one dependency name record in bytes.
pub const DEPENDENCY_RECORD_SIZE: usize = 64;

/// The parsed header of an ASF container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Byte offset of the code segment from the start of the container
    pub code_offset: u32,
    /// Length of the code segment in bytes
    pub code_size: u32,
    /// Dependency names in declaration order; duplicates are kept
    pub dependencies: Vec<String>,
}

impl ContainerHeader {
    /// Parse the header and dependency table of a container.
    ///
    /// # Arguments
    /// * `data` - The complete container, including the code segment
    ///
    /// # Errors
    /// Returns [`crate::Error::MalformedContainer`] if the magic marker does not match, if the
    /// fixed header or the dependency table is truncated, or if the code segment extends past the
    /// end of `data`.
    pub fn parse(data: &[u8]) -> Result<ContainerHeader> {
        let mut parser = Parser::new(data);

        let magic = parser
            .read_bytes(ASF_MAGIC.len())
            .map_err(|_| malformed_container!("Container is shorter than its magic marker"))?;
        if magic != ASF_MAGIC {
            return Err(malformed_container!(
                "Invalid magic marker {:02x?}, expected {:02x?}",
                magic,
                ASF_MAGIC
            ));
        }

        let (code_offset, code_size, dependency_count) = Self::read_fields(&mut parser)
            .map_err(|_| malformed_container!("Truncated container header"))?;

        let table_size = (dependency_count as usize)
            .checked_mul(DEPENDENCY_RECORD_SIZE)
            .ok_or_else(|| malformed_container!("Dependency count {} overflows", dependency_count))?;
        if table_size > parser.remaining() {
            return Err(malformed_container!(
                "Dependency table of {} records exceeds the container ({} bytes)",
                dependency_count,
                data.len()
            ));
        }

        let mut dependencies = Vec::with_capacity(dependency_count as usize);
        for _ in 0..dependency_count {
            dependencies.push(parser.read_fixed_str(DEPENDENCY_RECORD_SIZE)?);
        }

        let header = ContainerHeader {
            code_offset,
            code_size,
            dependencies,
        };
        if !matches!(header.code_end(), Some(end) if end <= data.len()) {
            return Err(malformed_container!(
                "Code segment {}+{} exceeds the container ({} bytes)",
                code_offset,
                code_size,
                data.len()
            ));
        }

        Ok(header)
    }

    fn read_fields(parser: &mut Parser) -> Result<(u32, u32, u32)> {
        Ok((parser.read_le()?, parser.read_le()?, parser.read_le()?))
    }

    fn code_end(&self) -> Option<usize> {
        (self.code_offset as usize).checked_add(self.code_size as usize)
    }

    /// The byte range of the code segment inside the container.
    #[must_use]
    pub fn code_range(&self) -> Range<usize> {
        let start = self.code_offset as usize;
        start..start.saturating_add(self.code_size as usize)
    }

    /// Borrow the code segment out of the container it was parsed from.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is not the buffer this header describes.
    pub fn code<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        data.get(self.code_range()).ok_or(Error::OutOfBounds)
    }

    /// Size of the fixed header plus the dependency table.
    #[must_use]
    pub fn table_end(&self) -> usize {
        HEADER_SIZE + self.dependencies.len() * DEPENDENCY_RECORD_SIZE
    }
}
