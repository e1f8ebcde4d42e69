use tracing::debug;

use crate::config::layout;
use crate::error::{Error, Result};
use crate::matrix::MatrixDescriptor;
use crate::process::{ByteBuffer, ReadMemory};

/// Decode the native header at `address` using the fixed 64-bit offset table.
///
/// Reads exactly one header window. A short read yields `PartialRead` and no
/// descriptor.
pub fn decode_header<R: ReadMemory + ?Sized>(reader: &R, address: u64) -> Result<MatrixDescriptor> {
    if address == 0 {
        return Err(Error::InvalidPointer { address });
    }

    let mut window = [0u8; layout::HEADER_SIZE];
    reader.read_exact_into(address, &mut window)?;
    let descriptor = parse_header(&window)?;

    debug!(
        "Header at {:#x}: flags={:#x} {}x{} data={:#x} step_addr={:#x}",
        address,
        descriptor.flags,
        descriptor.cols,
        descriptor.rows,
        descriptor.data,
        descriptor.step_addr
    );
    Ok(descriptor)
}

/// Parse a header window already copied out of the target.
pub fn parse_header(window: &[u8]) -> Result<MatrixDescriptor> {
    let buf = ByteBuffer::new(window);
    Ok(MatrixDescriptor {
        flags: buf.read_i32_at(layout::FLAGS)?,
        dims: buf.read_i32_at(layout::DIMS)?,
        rows: buf.read_i32_at(layout::ROWS)?,
        cols: buf.read_i32_at(layout::COLS)?,
        data: buf.read_u64_at(layout::DATA)?,
        data_start: buf.read_u64_at(layout::DATA_START)?,
        data_end: buf.read_u64_at(layout::DATA_END)?,
        data_limit: buf.read_u64_at(layout::DATA_LIMIT)?,
        ref_count: buf.read_u64_at(layout::REF_COUNT)?,
        step_addr: buf.read_u64_at(layout::STEP_PTR)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{HeaderFixture, MockMemoryBuilder};

    #[test]
    fn test_decode_fixed_header() {
        let header = HeaderFixture::new(16, 3, 5, 0x2000, 15)
            .contiguous()
            .step_ptr(0x1800);
        let reader = MockMemoryBuilder::new().write_header(0, &header).build();

        let d = decode_header(&reader, 0x1000).unwrap();
        assert_eq!(d.flags, 16 | layout::CONTIGUOUS_FLAG);
        assert_eq!(d.dims, 2);
        assert_eq!((d.rows, d.cols), (3, 5));
        assert_eq!(d.data, 0x2000);
        assert_eq!(d.data_end, 0x2000 + 45);
        assert_eq!(d.step_addr, 0x1800);
    }

    #[test]
    fn test_zero_address_is_invalid_pointer() {
        let reader = MockMemoryBuilder::new().with_size(0x100).build();
        assert!(matches!(
            decode_header(&reader, 0),
            Err(Error::InvalidPointer { address: 0 })
        ));
    }

    #[test]
    fn test_short_header_window() {
        let reader = MockMemoryBuilder::new().with_size(layout::HEADER_SIZE - 1).build();

        match decode_header(&reader, 0x1000) {
            Err(Error::PartialRead { requested, read, .. }) => {
                assert_eq!(requested, layout::HEADER_SIZE);
                assert_eq!(read, layout::HEADER_SIZE - 1);
            }
            other => panic!("expected PartialRead, got {:?}", other),
        }
    }
}
