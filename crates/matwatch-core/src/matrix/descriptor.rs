use serde::{Deserialize, Serialize};

use crate::config::{layout, limits};
use crate::error::{Error, Result};
use crate::matrix::MatrixType;

/// Header fields of one remote matrix, as read.
///
/// Addresses are remote; nothing here is dereferenced locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatrixDescriptor {
    pub flags: i32,
    pub dims: i32,
    pub rows: i32,
    pub cols: i32,
    pub data: u64,
    pub data_start: u64,
    pub data_end: u64,
    pub data_limit: u64,
    pub step_addr: u64,
    pub ref_count: u64,
}

impl MatrixDescriptor {
    pub fn matrix_type(&self) -> MatrixType {
        MatrixType::classify(self.flags)
    }

    /// A null data pointer marks a released or never-allocated object.
    pub fn is_absent(&self) -> bool {
        self.data == 0
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub fn has_contiguous_flag(&self) -> bool {
        self.flags & layout::CONTIGUOUS_FLAG != 0
    }

    /// Validated `(rows, cols)`.
    pub fn geometry(&self) -> Result<(usize, usize)> {
        if self.rows < 0 || self.cols < 0 {
            return Err(Error::InvalidGeometry(format!(
                "negative size {}x{}",
                self.cols, self.rows
            )));
        }
        Ok((self.rows as usize, self.cols as usize))
    }

    /// `cols * bytesPerPixel`, checked.
    pub fn expected_step(&self) -> Result<usize> {
        let (_, cols) = self.geometry()?;
        cols.checked_mul(self.matrix_type().bytes_per_pixel())
            .ok_or_else(|| Error::InvalidGeometry(format!("row of {} columns overflows", cols)))
    }
}

/// Packed and actual row lengths of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrideInfo {
    /// `cols * bytesPerPixel`
    pub expected: usize,
    /// Row stride used by the target
    pub actual: usize,
}

impl StrideInfo {
    /// Validate a stride pair against the row count.
    ///
    /// Fails when the target's rows are shorter than the packed row or when
    /// either the packed or the remote region exceeds the frame limit.
    pub fn new(expected: usize, actual: usize, rows: usize) -> Result<Self> {
        if actual < expected {
            return Err(Error::InvalidGeometry(format!(
                "row stride {} shorter than packed row {}",
                actual, expected
            )));
        }
        let remote = rows.checked_mul(actual);
        match remote {
            Some(bytes) if bytes <= limits::MAX_FRAME_BYTES => {}
            _ => {
                return Err(Error::InvalidGeometry(format!(
                    "{} rows of {} bytes exceed the frame limit",
                    rows, actual
                )));
            }
        }
        Ok(Self { expected, actual })
    }

    pub fn is_padded(&self) -> bool {
        self.actual != self.expected
    }

    /// Size of the unpadded local copy.
    pub fn packed_len(&self, rows: usize) -> usize {
        rows * self.expected
    }

    /// Size of the region spanned in the target.
    pub fn remote_len(&self, rows: usize) -> usize {
        rows * self.actual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Depth;

    fn descriptor(flags: i32, rows: i32, cols: i32) -> MatrixDescriptor {
        MatrixDescriptor {
            flags,
            dims: 2,
            rows,
            cols,
            data: 0x2000,
            ..Default::default()
        }
    }

    #[test]
    fn test_expected_step() {
        let d = descriptor(MatrixType::new(Depth::F32, 3).pack(), 2, 5);
        assert_eq!(d.expected_step().unwrap(), 60);
    }

    #[test]
    fn test_negative_geometry_rejected() {
        let d = descriptor(0, -1, 4);
        assert!(matches!(d.expected_step(), Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_absent_and_empty() {
        let mut d = descriptor(0, 0, 4);
        assert!(d.is_empty());
        assert!(!d.is_absent());
        d.data = 0;
        assert!(d.is_absent());
    }

    #[test]
    fn test_stride_shorter_than_row_rejected() {
        assert!(matches!(
            StrideInfo::new(12, 8, 4),
            Err(Error::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_stride_over_limit_rejected() {
        assert!(StrideInfo::new(4, usize::MAX / 2, 4).is_err());
        assert!(StrideInfo::new(4096, 4096, limits::MAX_FRAME_BYTES).is_err());
    }

    #[test]
    fn test_stride_lengths() {
        let stride = StrideInfo::new(4, 8, 4).unwrap();
        assert!(stride.is_padded());
        assert_eq!(stride.packed_len(4), 16);
        assert_eq!(stride.remote_len(4), 32);
    }
}
