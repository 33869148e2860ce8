//! Little-endian primitive reads and writes.
//!
//! Every integer field in an ASF container and every operand inside an instruction stream is
//! stored little-endian. This module provides the [`ByteIO`] trait for the primitive types that
//! occur in those layouts, plus free functions that read or write a value at an explicit offset
//! and advance that offset on success.
//!
//! All functions are bounds-checked and return [`crate::Error::OutOfBounds`] instead of
//! panicking.
//!
//! # Examples
//!
//! ```rust
//! use asfscope::{read_le_at, write_le_at};
//!
//! let mut buffer = [0u8; 6];
//! let mut offset = 0;
//! write_le_at(&mut buffer, &mut offset, 0x0201_u16)?;
//! write_le_at(&mut buffer, &mut offset, 0x0605_0403_u32)?;
//!
//! let mut offset = 0;
//! let first: u16 = read_le_at(&buffer, &mut offset)?;
//! let second: u32 = read_le_at(&buffer, &mut offset)?;
//! assert_eq!((first, second, offset), (0x0201, 0x0605_0403, 6));
//! # Ok::<(), asfscope::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// A fixed-width primitive that can be converted from and to little-endian bytes.
pub trait ByteIO: Sized + Copy {
    /// Encoded width in bytes
    const SIZE: usize;

    /// Decode from exactly [`ByteIO::SIZE`] little-endian bytes.
    ///
    /// Returns `None` if `bytes` has the wrong length.
    fn from_le_slice(bytes: &[u8]) -> Option<Self>;

    /// Encode into `out`, which must be exactly [`ByteIO::SIZE`] bytes long.
    fn write_le_slice(self, out: &mut [u8]);
}

macro_rules! impl_byte_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ByteIO for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_slice(bytes: &[u8]) -> Option<Self> {
                    let bytes: [u8; std::mem::size_of::<$ty>()] = bytes.try_into().ok()?;
                    Some(<$ty>::from_le_bytes(bytes))
                }

                fn write_le_slice(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_byte_io!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Read a value from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than the value.
pub fn read_le<T: ByteIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0;
    read_le_at(data, &mut offset)
}

/// Read a value at `offset` and advance `offset` past it.
///
/// # Arguments
/// * `data` - The buffer to read from
/// * `offset` - Position of the value, updated on success
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit in `data`. The offset is left
/// untouched in that case.
pub fn read_le_at<T: ByteIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let end = offset.checked_add(T::SIZE).ok_or(OutOfBounds)?;
    let bytes = data.get(*offset..end).ok_or(OutOfBounds)?;
    let value = T::from_le_slice(bytes).ok_or(OutOfBounds)?;

    *offset = end;
    Ok(value)
}

/// Write `value` at `offset` and advance `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit in `data`.
pub fn write_le_at<T: ByteIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let end = offset.checked_add(T::SIZE).ok_or(OutOfBounds)?;
    let slot = data.get_mut(*offset..end).ok_or(OutOfBounds)?;
    value.write_le_slice(slot);

    *offset = end;
    Ok(())
}
