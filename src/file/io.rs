//! Endian-aware primitive reads over byte slices.
//!
//! The instruction decoder and the signature parser read operand tokens, switch counts and
//! inline constants through these helpers. Every read checks the remaining length first and
//! fails with [`crate::Error::OutOfBounds`] when the buffer is too short.
//!
//! # Examples
//!
//! ```rust
//! use ilmock::file::io::read_le_at;
//!
//! let data = [0x28, 0x01, 0x00, 0x00, 0x0A];
//! let mut offset = 1;
//! let token: u32 = read_le_at(&data, &mut offset)?;
//! assert_eq!(token, 0x0A00_0001);
//! assert_eq!(offset, 5);
//! # Ok::<(), ilmock::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for primitive types that can be decoded from a fixed-size byte array.
///
/// Each implementation names the byte array it is built from (e.g. `[u8; 4]` for `u32`), so
/// [`read_le_at`] can slice exactly `size_of::<T>()` bytes and convert them.
pub trait CilIO: Sized {
    /// The fixed-size byte array this type is decoded from.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_cil_io {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }
            }
        )*
    };
}

impl_cil_io!(
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
);

/// Reads a little-endian `T` from the start of `data`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`.
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Reads a little-endian `T` at `offset` and advances `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Reads a big-endian `T` at `offset` and advances `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_be_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_be_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_le_widths() {
        assert_eq!(read_le::<u8>(&TEST_BUFFER).unwrap(), 0x01);
        assert_eq!(read_le::<u16>(&TEST_BUFFER).unwrap(), 0x0201);
        assert_eq!(read_le::<u32>(&TEST_BUFFER).unwrap(), 0x0403_0201);
        assert_eq!(read_le::<u64>(&TEST_BUFFER).unwrap(), 0x0807_0605_0403_0201);
        assert_eq!(read_le::<i8>(&[0xFF]).unwrap(), -1);
    }

    #[test]
    fn read_be_at_advances() {
        let mut offset = 2;
        let value: u16 = read_be_at(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(value, 0x0304);
        assert_eq!(offset, 4);
    }

    #[test]
    fn read_le_at_sequence() {
        let mut offset = 0;
        let first: u16 = read_le_at(&TEST_BUFFER, &mut offset).unwrap();
        let second: u32 = read_le_at(&TEST_BUFFER, &mut offset).unwrap();
        assert_eq!(first, 0x0201);
        assert_eq!(second, 0x0605_0403);
        assert_eq!(offset, 6);
    }

    #[test]
    fn errors() {
        let buffer = [0xFF, 0xFF, 0xFF];
        assert!(matches!(read_le::<u32>(&buffer), Err(Error::OutOfBounds)));

        let mut offset = usize::MAX;
        assert!(matches!(
            read_le_at::<u8>(&buffer, &mut offset),
            Err(Error::OutOfBounds)
        ));
        assert_eq!(offset, usize::MAX);
    }
}
