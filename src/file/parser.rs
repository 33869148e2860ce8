//! Sequential binary cursor.
//!
//! [`Parser`] walks a borrowed byte buffer front to back. It is used by the container parser to
//! read the fixed header and the dependency name records, and by the instruction decoder to read
//! operands out of an instruction window. Every read is bounds-checked; a read past the end
//! returns [`crate::Error::OutOfBounds`] and leaves the position unchanged.
//!
//! # Examples
//!
//! ```rust
//! use asfscope::Parser;
//!
//! let data = [b'A', b'S', b'F', 0x07, 0x10, 0x00, 0x00, 0x00];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_bytes(4)?, b"ASF\x07");
//! assert_eq!(parser.read_le::<u32>()?, 0x10);
//! assert!(!parser.has_more_data());
//! # Ok::<(), asfscope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, ByteIO},
    Error::OutOfBounds,
    Result,
};

/// A cursor over a borrowed byte slice with typed little-endian reads.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Length of the underlying buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the underlying buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true while the position is inside the buffer.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes between the position and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move to an absolute position.
    ///
    /// Seeking to the end of the buffer is allowed, positions past it are not.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is past the end of the buffer.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Skip a single byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the buffer.
    pub fn advance(&mut self) -> Result<()> {
        self.advance_by(1)
    }

    /// Skip `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `step` bytes remain.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        let end = self.position.checked_add(step).ok_or(OutOfBounds)?;
        if end > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = end;
        Ok(())
    }

    /// Skip forward to the next multiple of `alignment`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the aligned position is past the end of the
    /// buffer.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = (alignment - (self.position % alignment)) % alignment;
        self.advance_by(padding)
    }

    /// Current position in bytes.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// The complete underlying buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Look at the byte under the cursor without consuming it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the buffer.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data.get(self.position).copied().ok_or(OutOfBounds)
    }

    /// Read a little-endian primitive and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value does not fit.
    pub fn read_le<T: ByteIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Borrow the next `len` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.position.checked_add(len).ok_or(OutOfBounds)?;
        let bytes = self.data.get(self.position..end).ok_or(OutOfBounds)?;

        self.position = end;
        Ok(bytes)
    }

    /// Read a fixed-width, NUL-padded string record of exactly `len` bytes.
    ///
    /// The returned string ends at the first NUL inside the record, or at the end of the record
    /// if it has none. Invalid UTF-8 is replaced lossily. The cursor always advances by `len`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `len` bytes remain.
    pub fn read_fixed_str(&mut self, len: usize) -> Result<String> {
        let record = self.read_bytes(len)?;
        let text = record
            .iter()
            .position(|&b| b == 0)
            .map_or(record, |nul| &record[..nul]);

        Ok(String::from_utf8_lossy(text).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_reads() {
        let data = [0x01, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_le::<u8>().unwrap(), 1);
        assert_eq!(parser.read_le::<u16>().unwrap(), 2);
        assert_eq!(parser.read_le::<u32>().unwrap(), 3);
        assert_eq!(parser.pos(), 7);
        assert!(!parser.has_more_data());
        assert!(matches!(parser.read_le::<u8>(), Err(OutOfBounds)));
    }

    #[test]
    fn seek_and_peek() {
        let data = [0xAA, 0xBB, 0xCC];
        let mut parser = Parser::new(&data);

        parser.seek(2).unwrap();
        assert_eq!(parser.peek_byte().unwrap(), 0xCC);
        assert_eq!(parser.pos(), 2);

        parser.seek(3).unwrap();
        assert!(parser.peek_byte().is_err());
        assert!(parser.seek(4).is_err());
        assert_eq!(parser.pos(), 3);
    }

    #[test]
    fn advance_bounds() {
        let data = [0u8; 4];
        let mut parser = Parser::new(&data);

        parser.advance().unwrap();
        parser.advance_by(3).unwrap();
        assert!(parser.advance().is_err());
        assert!(parser.advance_by(usize::MAX).is_err());
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn align_to_boundary() {
        let data = [0u8; 8];
        let mut parser = Parser::new(&data);

        parser.advance().unwrap();
        parser.align(4).unwrap();
        assert_eq!(parser.pos(), 4);
        parser.align(4).unwrap();
        assert_eq!(parser.pos(), 4);

        parser.seek(7).unwrap();
        assert!(parser.align(4).is_ok());
        assert_eq!(parser.pos(), 8);
        assert!(!parser.has_more_data());
    }

    #[test]
    fn fixed_strings() {
        let mut data = [0u8; 12];
        data[..5].copy_from_slice(b"hello");
        data[6..].copy_from_slice(b"world!");

        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_fixed_str(6).unwrap(), "hello");
        assert_eq!(parser.pos(), 6);

        // No terminator inside the record
        assert_eq!(parser.read_fixed_str(6).unwrap(), "world!");
        assert!(parser.read_fixed_str(1).is_err());
    }

    #[test]
    fn fixed_string_lossy() {
        let data = [0xFF, b'a', 0x00, 0x00];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_fixed_str(4).unwrap(), "\u{FFFD}a");
    }
}
