use tracing::debug;

use crate::error::Result;
use crate::matrix::{MatrixDescriptor, StrideInfo};
use crate::process::ReadMemory;

/// Resolve the row stride of `descriptor`.
///
/// The remote step array holds `step[0]` as an 8-byte little-endian value.
/// Without a step pointer the rows are assumed packed.
pub fn read_stride<R: ReadMemory + ?Sized>(
    reader: &R,
    descriptor: &MatrixDescriptor,
) -> Result<StrideInfo> {
    let (rows, _) = descriptor.geometry()?;
    let expected = descriptor.expected_step()?;

    let actual = if descriptor.step_addr == 0 {
        expected
    } else {
        let raw = reader.read_u64(descriptor.step_addr)?;
        usize::try_from(raw).unwrap_or(usize::MAX)
    };

    if actual != expected {
        debug!("Padded rows: step {} for {} packed bytes", actual, expected);
    }
    StrideInfo::new(expected, actual, rows)
}
