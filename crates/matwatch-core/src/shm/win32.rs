use windows::Win32::Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE};
use windows::Win32::System::Memory::{
    CreateFileMappingW, FILE_MAP_ALL_ACCESS, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile,
    PAGE_READWRITE, UnmapViewOfFile,
};
use windows::core::PCWSTR;

use tracing::warn;

use crate::error::{Error, Result};

pub(super) struct Mapping {
    handle: HANDLE,
    view: MEMORY_MAPPED_VIEW_ADDRESS,
    len: usize,
}

// SAFETY: the view is owned exclusively by this struct and only reached through
// &self / &mut self borrows.
unsafe impl Send for Mapping {}

impl Mapping {
    pub(super) fn create(name: &str, size: usize) -> Result<Self> {
        let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        let size64 = size as u64;

        // SAFETY: INVALID_HANDLE_VALUE requests a pagefile-backed mapping; `wide` is a
        // null-terminated UTF-16 string that outlives the call.
        let handle = unsafe {
            CreateFileMappingW(
                INVALID_HANDLE_VALUE,
                None,
                PAGE_READWRITE,
                (size64 >> 32) as u32,
                size64 as u32,
                PCWSTR::from_raw(wide.as_ptr()),
            )
        }
        .map_err(|e| Error::AllocationFailure(format!("CreateFileMappingW {}: {}", name, e)))?;

        // SAFETY: `handle` is a live mapping of at least `size` bytes.
        let view = unsafe { MapViewOfFile(handle, FILE_MAP_ALL_ACCESS, 0, 0, size) };
        if view.Value.is_null() {
            let err = windows::core::Error::from_win32();
            // SAFETY: `handle` was just created and is not shared.
            let _ = unsafe { CloseHandle(handle) };
            return Err(Error::AllocationFailure(format!(
                "MapViewOfFile {}: {}",
                name, err
            )));
        }

        Ok(Self {
            handle,
            view,
            len: size,
        })
    }

    pub(super) fn as_slice(&self) -> &[u8] {
        // SAFETY: the view maps `len` readable bytes until drop.
        unsafe { std::slice::from_raw_parts(self.view.Value as *const u8, self.len) }
    }

    pub(super) fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: the view maps `len` writable bytes until drop and is borrowed mutably.
        unsafe { std::slice::from_raw_parts_mut(self.view.Value as *mut u8, self.len) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: view and handle were created in `create` and are released exactly once.
        unsafe {
            if let Err(e) = UnmapViewOfFile(self.view) {
                warn!("Failed to unmap segment view: {}", e);
            }
            if let Err(e) = CloseHandle(self.handle) {
                warn!("Failed to close segment handle: {}", e);
            }
        }
    }
}
