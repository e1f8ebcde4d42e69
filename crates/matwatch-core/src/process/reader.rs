use crate::error::{Error, Result};

/// Byte-level access to a target address space
///
/// `read_into` is the raw boundary: it never fails, it reports how many bytes
/// actually arrived. Everything else is built on top of it and turns short
/// reads into [`Error::PartialRead`].
pub trait ReadMemory {
    /// Copy up to `buf.len()` bytes starting at `address` and return the count copied.
    fn read_into(&self, address: u64, buf: &mut [u8]) -> usize;

    /// Read exactly `buf.len()` bytes
    fn read_exact_into(&self, address: u64, buf: &mut [u8]) -> Result<()> {
        let read = self.read_into(address, buf);
        if read < buf.len() {
            return Err(Error::partial(address, buf.len(), read));
        }
        Ok(())
    }

    /// Read exactly `size` bytes into a fresh buffer
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        self.read_exact_into(address, &mut buffer)?;
        Ok(buffer)
    }

    fn read_i32(&self, address: u64) -> Result<i32> {
        let mut bytes = [0u8; 4];
        self.read_exact_into(address, &mut bytes)?;
        Ok(i32::from_le_bytes(bytes))
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        let mut bytes = [0u8; 4];
        self.read_exact_into(address, &mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Little-endian, like every field of the header window
    fn read_u64(&self, address: u64) -> Result<u64> {
        let mut bytes = [0u8; 8];
        self.read_exact_into(address, &mut bytes)?;
        Ok(u64::from_le_bytes(bytes))
    }

    /// Read a 64-bit pointer from memory
    fn read_pointer(&self, address: u64) -> Result<u64> {
        self.read_u64(address)
    }
}

impl<T: ReadMemory + ?Sized> ReadMemory for &T {
    fn read_into(&self, address: u64, buf: &mut [u8]) -> usize {
        (**self).read_into(address, buf)
    }
}
