//! Little-endian field access over bytes copied out of the target.
//!
//! Header windows and pixel values are decoded through `ByteBuffer` at
//! explicit offsets; nothing relies on the in-memory layout of a Rust struct.
//! An out-of-window field is a [`Error::LayoutMismatch`].

use crate::error::{Error, Result};

/// Read-only view of a copied window, addressed by field offset.
///
/// # Example
///
/// ```
/// use matwatch_core::process::ByteBuffer;
///
/// // flags = CV_8UC3 | continuous, dims = 2
/// let window = [0x10, 0x40, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00];
/// let buf = ByteBuffer::new(&window);
///
/// assert_eq!(buf.read_i32_at(0).unwrap(), 0x4010);
/// assert_eq!(buf.read_i32_at(4).unwrap(), 2);
/// assert!(buf.read_u64_at(4).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ByteBuffer<'a> {
    data: &'a [u8],
}

macro_rules! le_reader {
    ($(#[$doc:meta])* $name:ident, $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&self, offset: usize) -> Result<$ty> {
            Ok(<$ty>::from_le_bytes(self.array_at(offset)?))
        }
    };
}

impl<'a> ByteBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `len` bytes starting at `offset`, borrowed from the window.
    pub fn slice_at(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        let end = offset.checked_add(len).ok_or_else(|| {
            Error::LayoutMismatch(format!("field at offset {:#x} overflows", offset))
        })?;
        self.data.get(offset..end).ok_or_else(|| {
            Error::LayoutMismatch(format!(
                "field {:#x}..{:#x} lies outside a {}-byte window",
                offset,
                end,
                self.data.len()
            ))
        })
    }

    fn array_at<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.slice_at(offset, N)?);
        Ok(out)
    }

    le_reader!(read_u8_at, u8);
    le_reader!(read_i8_at, i8);
    le_reader!(read_u16_at, u16);
    le_reader!(read_i16_at, i16);
    le_reader!(
        /// Header ints (flags, dims, rows, cols) and 32S pixels.
        read_i32_at,
        i32
    );
    le_reader!(read_u32_at, u32);
    le_reader!(
        /// Header pointers and the row step.
        read_u64_at,
        u64
    );
    le_reader!(read_f32_at, f32);
    le_reader!(read_f64_at, f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_fields_at_offsets() {
        let mut window = vec![0u8; 0x18];
        window[0x08..0x0C].copy_from_slice(&480i32.to_le_bytes());
        window[0x0C..0x10].copy_from_slice(&640i32.to_le_bytes());
        window[0x10..0x18].copy_from_slice(&0x7FF6_1234_0000u64.to_le_bytes());
        let buf = ByteBuffer::new(&window);

        assert_eq!(buf.read_i32_at(0x08).unwrap(), 480);
        assert_eq!(buf.read_i32_at(0x0C).unwrap(), 640);
        assert_eq!(buf.read_u64_at(0x10).unwrap(), 0x7FF6_1234_0000);
        assert_eq!(buf.len(), 0x18);
    }

    #[test]
    fn test_pixel_channels() {
        let mut pixel = Vec::new();
        pixel.extend_from_slice(&1.5f32.to_le_bytes());
        pixel.extend_from_slice(&(-2.25f64).to_le_bytes());
        pixel.extend_from_slice(&[0xFF, 0x00, 0x80]);
        let buf = ByteBuffer::new(&pixel);

        assert_eq!(buf.read_f32_at(0).unwrap(), 1.5);
        assert_eq!(buf.read_f64_at(4).unwrap(), -2.25);
        assert_eq!(buf.read_i8_at(12).unwrap(), -1);
        assert_eq!(buf.read_u8_at(12).unwrap(), 255);
        assert_eq!(buf.read_i16_at(13).unwrap(), i16::MIN);
    }

    #[test]
    fn test_slice_borrows_window() {
        let window = [1u8, 2, 3, 4, 5];
        let buf = ByteBuffer::new(&window);

        assert_eq!(buf.slice_at(1, 3).unwrap(), &[2, 3, 4]);
        assert_eq!(buf.slice_at(5, 0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_field_outside_window_is_layout_mismatch() {
        let window = [0x01, 0x02];
        let buf = ByteBuffer::new(&window);

        assert!(matches!(buf.read_i32_at(0), Err(Error::LayoutMismatch(_))));
        assert!(buf.read_u64_at(usize::MAX - 2).is_err());
        assert!(ByteBuffer::new(&[]).is_empty());
    }
}
