//! Synthetic target memory for tests.
//!
//! `MockMemoryReader` answers [`ReadMemory`] from a local buffer, with
//! injectable faults and a liveness switch. `MockProcessProvider` hands those
//! buffers to sessions by pid.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::layout;
use crate::error::{Error, Result};
use crate::process::{ProcessInfo, ProcessProvider, ReadMemory};

#[derive(Debug)]
struct MockState {
    data: Vec<u8>,
    base: u64,
    /// Everything at or above this address reads as unmapped.
    fault_at: Option<u64>,
    alive: bool,
}

/// In-memory stand-in for a target address space.
///
/// Clones share one buffer, so a test can rewrite pixels while a session
/// polls through another clone.
#[derive(Debug, Clone)]
pub struct MockMemoryReader {
    state: Arc<RwLock<MockState>>,
}

impl MockMemoryReader {
    /// `data` mapped at 0x1000.
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_base(data, 0x1000)
    }

    /// `data` mapped at `base`.
    pub fn with_base(data: Vec<u8>, base: u64) -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState {
                data,
                base,
                fault_at: None,
                alive: true,
            })),
        }
    }

    fn state(&self) -> RwLockReadGuard<'_, MockState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, MockState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn base_address(&self) -> u64 {
        self.state().base
    }

    /// Bytes currently backing the mapping
    pub fn len(&self) -> usize {
        self.state().data.len()
    }

    /// True when nothing is mapped
    pub fn is_empty(&self) -> bool {
        self.state().data.is_empty()
    }

    /// Overwrite bytes at an absolute address, growing the buffer if needed
    pub fn write_bytes(&self, address: u64, bytes: &[u8]) {
        let mut state = self.state_mut();
        let offset = address
            .checked_sub(state.base)
            .map(|o| o as usize)
            .unwrap_or_else(|| panic!("address {:#x} below mock base", address));
        let end = offset + bytes.len();
        if state.data.len() < end {
            state.data.resize(end, 0);
        }
        state.data[offset..end].copy_from_slice(bytes);
    }

    pub fn write_i32(&self, address: u64, value: i32) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    pub fn write_u64(&self, address: u64, value: u64) {
        self.write_bytes(address, &value.to_le_bytes());
    }

    /// Make every address at or above `address` unreadable
    pub fn unmap_from(&self, address: u64) {
        self.state_mut().fault_at = Some(address);
    }

    /// Undo [`unmap_from`](Self::unmap_from)
    pub fn remap(&self) {
        self.state_mut().fault_at = None;
    }

    /// Mark the owning mock process as exited or running
    pub fn set_alive(&self, alive: bool) {
        self.state_mut().alive = alive;
    }

    pub fn is_alive(&self) -> bool {
        self.state().alive
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_into(&self, address: u64, buf: &mut [u8]) -> usize {
        let state = self.state();
        let Some(offset) = address.checked_sub(state.base) else {
            return 0;
        };
        let offset = offset as usize;
        if offset >= state.data.len() {
            return 0;
        }

        let mut available = (state.data.len() - offset).min(buf.len());
        if let Some(fault) = state.fault_at {
            let readable = fault.saturating_sub(address) as usize;
            available = available.min(readable);
        }

        buf[..available].copy_from_slice(&state.data[offset..offset + available]);
        available
    }
}

/// Lays out headers, step arrays and pixel rows at offsets from the base.
///
/// Provides a fluent API for constructing memory layouts for testing. Offsets
/// are relative to the base address.
#[derive(Debug, Clone)]
pub struct MockMemoryBuilder {
    data: Vec<u8>,
    base: u64,
}

impl Default for MockMemoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMemoryBuilder {
    /// Empty layout based at 0x1000
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            base: 0x1000,
        }
    }

    /// Address that offset 0 maps to
    pub fn base(mut self, base: u64) -> Self {
        self.base = base;
        self
    }

    /// Zero-fill up to `size` bytes.
    pub fn with_size(mut self, size: usize) -> Self {
        self.data.resize(size, 0);
        self
    }

    pub fn write_i32(self, offset: usize, value: i32) -> Self {
        self.write_bytes(offset, &value.to_le_bytes())
    }

    pub fn write_u32(self, offset: usize, value: u32) -> Self {
        self.write_bytes(offset, &value.to_le_bytes())
    }

    pub fn write_u64(self, offset: usize, value: u64) -> Self {
        self.write_bytes(offset, &value.to_le_bytes())
    }

    /// Write raw bytes at `offset` from the base
    pub fn write_bytes(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.ensure_size(offset + bytes.len());
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Write a native matrix header at the specified offset from base
    pub fn write_header(self, offset: usize, header: &HeaderFixture) -> Self {
        self.write_bytes(offset, &header.encode())
    }

    /// Finish the layout as a shared reader
    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader::with_base(self.data, self.base)
    }

    fn ensure_size(&mut self, required: usize) {
        if self.data.len() < required {
            self.data.resize(required, 0);
        }
    }
}

/// Field values for a synthetic native matrix header.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderFixture {
    pub flags: i32,
    pub dims: i32,
    pub rows: i32,
    pub cols: i32,
    pub data: u64,
    pub data_start: u64,
    pub data_end: u64,
    pub data_limit: u64,
    pub ref_count: u64,
    pub step_ptr: u64,
}

impl HeaderFixture {
    /// A two-dimensional header whose pointer fields agree with `rows * step`.
    pub fn new(type_bits: i32, rows: i32, cols: i32, data: u64, step: usize) -> Self {
        let end = data + rows.max(0) as u64 * step as u64;
        Self {
            flags: type_bits,
            dims: 2,
            rows,
            cols,
            data,
            data_start: data,
            data_end: end,
            data_limit: end,
            ref_count: 0,
            step_ptr: 0,
        }
    }

    pub fn contiguous(mut self) -> Self {
        self.flags |= layout::CONTIGUOUS_FLAG;
        self
    }

    pub fn step_ptr(mut self, address: u64) -> Self {
        self.step_ptr = address;
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; layout::HEADER_SIZE];
        let mut put = |offset: usize, bytes: &[u8]| {
            out[offset..offset + bytes.len()].copy_from_slice(bytes);
        };
        put(layout::FLAGS, &self.flags.to_le_bytes());
        put(layout::DIMS, &self.dims.to_le_bytes());
        put(layout::ROWS, &self.rows.to_le_bytes());
        put(layout::COLS, &self.cols.to_le_bytes());
        put(layout::DATA, &self.data.to_le_bytes());
        put(layout::DATA_START, &self.data_start.to_le_bytes());
        put(layout::DATA_END, &self.data_end.to_le_bytes());
        put(layout::DATA_LIMIT, &self.data_limit.to_le_bytes());
        put(layout::REF_COUNT, &self.ref_count.to_le_bytes());
        put(layout::STEP_PTR, &self.step_ptr.to_le_bytes());
        out
    }
}

/// A mock process: a pid plus a view onto shared mock memory.
#[derive(Debug, Clone)]
pub struct MockProcess {
    pid: u32,
    memory: MockMemoryReader,
}

impl ProcessInfo for MockProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn is_alive(&self) -> bool {
        self.memory.is_alive()
    }
}

impl ReadMemory for MockProcess {
    fn read_into(&self, address: u64, buf: &mut [u8]) -> usize {
        self.memory.read_into(address, buf)
    }
}

/// Provider serving a fixed set of mock processes.
#[derive(Debug, Clone)]
pub struct MockProcessProvider {
    processes: Vec<(u32, MockMemoryReader)>,
    opens: Arc<AtomicUsize>,
}

impl MockProcessProvider {
    pub fn new(pid: u32, memory: MockMemoryReader) -> Self {
        Self {
            processes: vec![(pid, memory)],
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register another process
    pub fn with_process(mut self, pid: u32, memory: MockMemoryReader) -> Self {
        self.processes.push((pid, memory));
        self
    }

    /// Number of successful `open_process` calls so far
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl ProcessProvider for MockProcessProvider {
    type Process = MockProcess;

    fn open_process(&self, pid: u32) -> Result<Self::Process> {
        let memory = self
            .processes
            .iter()
            .find(|(p, _)| *p == pid)
            .map(|(_, memory)| memory.clone())
            .ok_or_else(|| Error::ProcessOpenFailed {
                pid,
                message: "no such mock process".to_string(),
            })?;

        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(MockProcess { pid, memory })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ByteBuffer;

    #[test]
    fn test_mock_reader_with_base() {
        let reader = MockMemoryReader::with_base(vec![0x01, 0x02, 0x03, 0x04], 0x140000000);

        let bytes = reader.read_bytes(0x140000000, 4).unwrap();
        assert_eq!(bytes, vec![0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_mock_reader_below_base() {
        let reader = MockMemoryReader::with_base(vec![0x01, 0x02, 0x03, 0x04], 0x2000);

        assert!(reader.read_bytes(0x1000, 4).is_err());
    }

    #[test]
    fn test_clones_share_mutations() {
        let reader = MockMemoryReader::new(vec![0; 8]);
        let view = reader.clone();

        reader.write_i32(0x1004, 99);
        assert_eq!(view.read_i32(0x1004).unwrap(), 99);
    }

    #[test]
    fn test_unmap_truncates_reads() {
        let reader = MockMemoryReader::new((0..32).collect());
        reader.unmap_from(0x1010);

        let mut buf = [0u8; 32];
        assert_eq!(reader.read_into(0x1000, &mut buf), 16);
        assert_eq!(reader.read_into(0x1010, &mut buf), 0);

        reader.remap();
        assert_eq!(reader.read_into(0x1000, &mut buf), 32);
    }

    #[test]
    fn test_builder_basic() {
        let reader = MockMemoryBuilder::new()
            .write_i32(0, 0x12345678)
            .write_u64(4, 0xDEADBEEFCAFEBABE)
            .build();

        assert_eq!(reader.read_i32(0x1000).unwrap(), 0x12345678);
        assert_eq!(reader.read_u64(0x1004).unwrap(), 0xDEADBEEFCAFEBABE);
    }

    #[test]
    fn test_builder_with_size() {
        let reader = MockMemoryBuilder::new()
            .with_size(100)
            .write_i32(96, 123)
            .build();

        assert_eq!(reader.len(), 100);
        assert_eq!(reader.read_i32(0x1000 + 96).unwrap(), 123);
    }

    #[test]
    fn test_header_fixture_encoding() {
        let header = HeaderFixture::new(16, 4, 4, 0x2000, 12).contiguous();
        let bytes = header.encode();
        let buf = ByteBuffer::new(&bytes);

        assert_eq!(buf.read_i32_at(layout::FLAGS).unwrap(), 16 | 0x4000);
        assert_eq!(buf.read_i32_at(layout::DIMS).unwrap(), 2);
        assert_eq!(buf.read_u64_at(layout::DATA).unwrap(), 0x2000);
        assert_eq!(buf.read_u64_at(layout::DATA_END).unwrap(), 0x2000 + 48);
    }

    #[test]
    fn test_provider_counts_opens_and_tracks_liveness() {
        let memory = MockMemoryReader::new(vec![0; 4]);
        let provider = MockProcessProvider::new(1, memory.clone())
            .with_process(2, MockMemoryReader::new(vec![0; 4]));

        let first = provider.open_process(1).unwrap();
        let _second = provider.open_process(2).unwrap();
        assert_eq!(provider.open_count(), 2);

        memory.set_alive(false);
        assert!(!first.is_alive());
    }
}
