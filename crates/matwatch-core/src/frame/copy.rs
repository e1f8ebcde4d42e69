use tracing::debug;

use crate::error::{Error, Result};
use crate::matrix::StrideInfo;
use crate::process::ReadMemory;

/// Copy `rows` rows starting at remote `data` into an unpadded local buffer.
///
/// The result is always `rows * stride.expected` bytes. Contiguous frames are
/// fetched with one read; otherwise each row is read separately and the
/// target's padding is dropped. Any short read fails the whole copy.
pub fn copy_pixels<R: ReadMemory + ?Sized>(
    reader: &R,
    data: u64,
    rows: usize,
    stride: &StrideInfo,
    contiguous: bool,
) -> Result<Vec<u8>> {
    let mut output = vec![0u8; stride.packed_len(rows)];
    if output.is_empty() {
        return Ok(output);
    }

    if contiguous {
        let remote_len = stride.remote_len(rows);
        if remote_len != output.len() {
            return Err(Error::InvalidGeometry(format!(
                "contiguous frame spans {} bytes, expected {}",
                remote_len,
                output.len()
            )));
        }
        reader.read_exact_into(data, &mut output)?;
        debug!("Bulk copied {} bytes from {:#x}", output.len(), data);
        return Ok(output);
    }

    let row_len = stride.actual.min(stride.expected);
    for (row, chunk) in output.chunks_exact_mut(stride.expected).enumerate() {
        let address = row_address(data, row, stride.actual)?;
        reader.read_exact_into(address, &mut chunk[..row_len])?;
    }
    debug!(
        "Copied {} rows of {} bytes (stride {}) from {:#x}",
        rows, row_len, stride.actual, data
    );
    Ok(output)
}

/// `data + row * step`, checked.
pub(crate) fn row_address(data: u64, row: usize, step: usize) -> Result<u64> {
    (row as u64)
        .checked_mul(step as u64)
        .and_then(|offset| data.checked_add(offset))
        .ok_or_else(|| Error::InvalidGeometry(format!("row {} address overflows", row)))
}
