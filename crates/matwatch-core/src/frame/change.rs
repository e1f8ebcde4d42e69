//! Continuity and change detection between polls.

use tracing::{debug, warn};

use crate::config::checksum;
use crate::error::Result;
use crate::matrix::{MatrixDescriptor, StrideInfo};
use crate::process::ReadMemory;

/// Rows are back to back only when the header says so and the stride agrees.
pub fn is_contiguous(descriptor: &MatrixDescriptor, stride: &StrideInfo) -> bool {
    descriptor.has_contiguous_flag() && stride.actual == stride.expected
}

/// Cross-check the pointer range against the geometry.
///
/// Advisory: a mismatch is logged by the caller and never fails a refresh.
pub fn pointer_range_consistent(descriptor: &MatrixDescriptor, stride: &StrideInfo) -> bool {
    let Ok((rows, _)) = descriptor.geometry() else {
        return false;
    };
    let span = descriptor.data_end.abs_diff(descriptor.data);
    let expected = (rows as u64).saturating_mul(stride.expected as u64);
    span.abs_diff(expected) <= stride.actual as u64
}

/// Number of leading bytes folded into the content checksum.
pub fn sample_len(total: usize) -> usize {
    let len = (total / checksum::SAMPLE_DIVISOR).min(checksum::MAX_SAMPLE_BYTES);
    if len < checksum::MIN_SAMPLE_BYTES {
        checksum::MIN_SAMPLE_BYTES.min(total)
    } else {
        len
    }
}

/// Rotate-xor fold of `bytes`.
pub fn fold_checksum(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |c, &b| c.rotate_left(1) ^ u32::from(b))
}

/// Checksum of the first [`sample_len`] bytes of a `total`-byte remote frame.
pub fn content_checksum<R: ReadMemory + ?Sized>(
    reader: &R,
    data: u64,
    total: usize,
) -> Result<u32> {
    let sample = reader.read_bytes(data, sample_len(total))?;
    Ok(fold_checksum(&sample))
}

/// Header values that force a re-sample when any of them changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub data: u64,
    pub rows: i32,
    pub cols: i32,
    pub flags: i32,
    pub actual_step: usize,
}

impl Fingerprint {
    pub fn new(descriptor: &MatrixDescriptor, stride: &StrideInfo) -> Self {
        Self {
            data: descriptor.data,
            rows: descriptor.rows,
            cols: descriptor.cols,
            flags: descriptor.flags,
            actual_step: stride.actual,
        }
    }
}

/// Outcome of comparing a poll with the last recorded sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    FirstSample,
    StructureChanged,
    ContentChanged,
    Unchanged,
}

impl Change {
    pub fn needs_resample(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Remembers what the current frame was sampled from.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    fingerprint: Option<Fingerprint>,
    checksum: Option<u32>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the last record. `checksum` is `None` when the content
    /// tier is disabled.
    pub fn assess(&self, fingerprint: &Fingerprint, checksum: Option<u32>) -> Change {
        let Some(previous) = self.fingerprint else {
            return Change::FirstSample;
        };
        if previous != *fingerprint {
            debug!("Structure changed: {:?} -> {:?}", previous, fingerprint);
            return Change::StructureChanged;
        }
        match (self.checksum, checksum) {
            (Some(old), Some(new)) if old != new => {
                debug!("Content changed: {:#010x} -> {:#010x}", old, new);
                Change::ContentChanged
            }
            (None, Some(_)) => Change::ContentChanged,
            _ => Change::Unchanged,
        }
    }

    pub fn record(&mut self, fingerprint: Fingerprint, checksum: Option<u32>) {
        self.fingerprint = Some(fingerprint);
        self.checksum = checksum;
    }

    /// Forget everything; the next assessment is a first sample.
    pub fn reset(&mut self) {
        self.fingerprint = None;
        self.checksum = None;
    }

    pub fn checksum(&self) -> Option<u32> {
        self.checksum
    }
}

pub(crate) fn warn_on_range_mismatch(descriptor: &MatrixDescriptor, stride: &StrideInfo) {
    if !pointer_range_consistent(descriptor, stride) {
        warn!(
            "Data range {:#x}..{:#x} disagrees with {} rows of {} bytes",
            descriptor.data, descriptor.data_end, descriptor.rows, stride.expected
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::layout;
    use crate::process::MockMemoryReader;

    fn descriptor(flags: i32) -> MatrixDescriptor {
        MatrixDescriptor {
            flags,
            dims: 2,
            rows: 4,
            cols: 4,
            data: 0x1000,
            data_start: 0x1000,
            data_end: 0x1010,
            data_limit: 0x1010,
            ..Default::default()
        }
    }

    #[test]
    fn test_contiguity_requires_flag_and_stride() {
        let packed = StrideInfo::new(4, 4, 4).unwrap();
        let padded = StrideInfo::new(4, 8, 4).unwrap();

        assert!(is_contiguous(&descriptor(layout::CONTIGUOUS_FLAG), &packed));
        assert!(!is_contiguous(&descriptor(0), &packed));
        assert!(!is_contiguous(&descriptor(layout::CONTIGUOUS_FLAG), &padded));
    }

    #[test]
    fn test_pointer_range_check() {
        let stride = StrideInfo::new(4, 4, 4).unwrap();
        let mut d = descriptor(0);
        assert!(pointer_range_consistent(&d, &stride));

        d.data_end = 0x1014;
        assert!(pointer_range_consistent(&d, &stride));

        d.data_end = 0x2000;
        assert!(!pointer_range_consistent(&d, &stride));
    }

    #[test]
    fn test_sample_len_bounds() {
        assert_eq!(sample_len(0), 0);
        assert_eq!(sample_len(8), 8);
        assert_eq!(sample_len(100), 16);
        assert_eq!(sample_len(1000), 100);
        assert_eq!(sample_len(1 << 20), 1024);
    }

    #[test]
    fn test_fold_checksum() {
        assert_eq!(fold_checksum(&[]), 0);
        assert_eq!(fold_checksum(&[1]), 1);
        assert_eq!(fold_checksum(&[1, 1]), 3);
        assert_ne!(fold_checksum(&[1, 2]), fold_checksum(&[2, 1]));
    }

    #[test]
    fn test_content_checksum_reads_sample_only() {
        let reader = MockMemoryReader::new(vec![7; 16]);
        // A 160-byte frame samples 16 bytes, which is all the mock holds.
        let value = content_checksum(&reader, 0x1000, 160).unwrap();
        assert_eq!(value, fold_checksum(&[7; 16]));
    }

    #[test]
    fn test_tracker_tiers() {
        let stride = StrideInfo::new(4, 4, 4).unwrap();
        let fp = Fingerprint::new(&descriptor(0), &stride);
        let mut tracker = ChangeTracker::new();

        assert_eq!(tracker.assess(&fp, Some(1)), Change::FirstSample);
        tracker.record(fp, Some(1));
        assert_eq!(tracker.assess(&fp, Some(1)), Change::Unchanged);
        assert_eq!(tracker.assess(&fp, Some(2)), Change::ContentChanged);
        assert_eq!(tracker.assess(&fp, None), Change::Unchanged);

        let moved = Fingerprint { data: 0x3000, ..fp };
        assert_eq!(tracker.assess(&moved, Some(1)), Change::StructureChanged);

        tracker.reset();
        assert!(tracker.assess(&fp, Some(1)).needs_resample());
    }
}
