use crate::{
    container::{ASF_MAGIC, DEPENDENCY_RECORD_SIZE, HEADER_SIZE},
    file::io::write_le_at,
    Error, Result,
};

/// Serializes an ASF container.
///
/// The code segment is placed directly after the dependency table. Dependency names longer than
/// 63 bytes are cut at the last UTF-8 character boundary that fits, so each record keeps its NUL
/// terminator and parses back to the stored prefix.
///
/// # Examples
///
/// ```rust
/// use asfscope::container::{ContainerBuilder, ContainerHeader, HEADER_SIZE};
///
/// let bytes = ContainerBuilder::new().code(vec![1, 2, 3, 4]).build()?;
/// let header = ContainerHeader::parse(&bytes)?;
///
/// assert_eq!(header.code_offset as usize, HEADER_SIZE);
/// assert_eq!(header.code_size, 4);
/// # Ok::<(), asfscope::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct ContainerBuilder {
    dependencies: Vec<String>,
    code: Vec<u8>,
}

impl ContainerBuilder {
    /// Longest name that fits a record together with its terminator.
    pub const MAX_NAME_LEN: usize = DEPENDENCY_RECORD_SIZE - 1;

    /// Create an empty container without dependencies or code.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a dependency name.
    #[must_use]
    pub fn dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Append several dependency names in order.
    #[must_use]
    pub fn dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the code segment.
    #[must_use]
    pub fn code(mut self, code: Vec<u8>) -> Self {
        self.code = code;
        self
    }

    /// Cut `name` to the longest prefix that fits a dependency record.
    #[must_use]
    pub fn truncate_name(name: &str) -> &str {
        if name.len() <= Self::MAX_NAME_LEN {
            return name;
        }

        let mut end = Self::MAX_NAME_LEN;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        &name[..end]
    }

    /// Produce the container bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Error`] if the dependency table or the code segment does not fit
    /// the format's u32 fields.
    pub fn build(&self) -> Result<Vec<u8>> {
        let table_end = HEADER_SIZE + self.dependencies.len() * DEPENDENCY_RECORD_SIZE;
        let too_large = |what: &str| Error::Error(format!("{what} exceeds the u32 range of the format"));

        let code_offset = u32::try_from(table_end).map_err(|_| too_large("Dependency table"))?;
        let code_size = u32::try_from(self.code.len()).map_err(|_| too_large("Code segment"))?;
        let dependency_count =
            u32::try_from(self.dependencies.len()).map_err(|_| too_large("Dependency count"))?;
        code_offset
            .checked_add(code_size)
            .ok_or_else(|| too_large("Container"))?;

        let mut data = vec![0u8; table_end + self.code.len()];
        data[..ASF_MAGIC.len()].copy_from_slice(&ASF_MAGIC);

        let mut offset = ASF_MAGIC.len();
        for field in [code_offset, code_size, dependency_count] {
            write_le_at(&mut data, &mut offset, field)?;
        }

        for name in &self.dependencies {
            let name = Self::truncate_name(name);
            data[offset..offset + name.len()].copy_from_slice(name.as_bytes());
            offset += DEPENDENCY_RECORD_SIZE;
        }

        data[table_end..].copy_from_slice(&self.code);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerHeader;

    #[test]
    fn layout() {
        let bytes = ContainerBuilder::new()
            .dependency("a")
            .code(vec![0xAB, 0xCD])
            .build()
            .unwrap();

        assert_eq!(bytes.len(), HEADER_SIZE + DEPENDENCY_RECORD_SIZE + 2);
        assert_eq!(&bytes[..4], b"ASF\x07");
        assert_eq!(&bytes[4..8], &80u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &2u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &1u32.to_le_bytes());
        assert_eq!(bytes[16], b'a');
        assert_eq!(bytes[17], 0);
        assert_eq!(&bytes[80..], &[0xAB, 0xCD]);
    }

    #[test]
    fn reparse_keeps_fields() {
        let names = ["core.asf", "ui/menu.asf", "core.asf"];
        let code: Vec<u8> = (0..=255).collect();
        let bytes = ContainerBuilder::new()
            .dependencies(names)
            .code(code.clone())
            .build()
            .unwrap();

        let header = ContainerHeader::parse(&bytes).unwrap();
        assert_eq!(header.dependencies, names);
        assert_eq!(header.code_size, 256);
        assert_eq!(header.code(&bytes).unwrap(), code.as_slice());
    }

    #[test]
    fn long_names_truncated() {
        let long = "x".repeat(100);
        let bytes = ContainerBuilder::new().dependency(long.as_str()).build().unwrap();
        let header = ContainerHeader::parse(&bytes).unwrap();

        assert_eq!(header.dependencies[0], "x".repeat(63));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 31 two-byte characters fill 62 bytes, the 32nd would straddle the limit
        let name = "é".repeat(40);
        let cut = ContainerBuilder::truncate_name(&name);
        assert_eq!(cut.len(), 62);

        let bytes = ContainerBuilder::new().dependency(name.as_str()).build().unwrap();
        let header = ContainerHeader::parse(&bytes).unwrap();
        assert_eq!(header.dependencies[0], "é".repeat(31));
    }
}
