#![cfg_attr(
    not(any(target_os = "windows", target_os = "linux")),
    allow(dead_code, unused_variables)
)]

use crate::error::{Error, Result};
use crate::process::provider::ProcessInfo;
use crate::process::reader::ReadMemory;

use tracing::debug;
#[cfg(target_os = "windows")]
use tracing::warn;

#[cfg(target_os = "windows")]
use windows::Win32::Foundation::{CloseHandle, HANDLE};
#[cfg(target_os = "windows")]
use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
#[cfg(target_os = "windows")]
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};

/// Read-only capability over another process's address space.
///
/// Closed on drop. A session replaces its handle when the debugged process id
/// changes instead of reusing it.
#[cfg(target_os = "windows")]
pub struct ProcessHandle {
    handle: HANDLE,
    pid: u32,
}

#[cfg(not(target_os = "windows"))]
pub struct ProcessHandle {
    pid: u32,
}

fn reject_pid_zero(pid: u32) -> Result<()> {
    if pid == 0 {
        return Err(Error::ProcessUnavailable(
            "no process id (debugger not attached?)".to_string(),
        ));
    }
    Ok(())
}

#[cfg(target_os = "windows")]
impl ProcessHandle {
    pub fn open(pid: u32) -> Result<Self> {
        reject_pid_zero(pid)?;

        // SAFETY: OpenProcess is called with valid access flags. The returned handle is owned
        // by this struct and closed in Drop.
        let handle = unsafe {
            OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, false, pid).map_err(|e| {
                debug!("OpenProcess failed for PID {}: {}", pid, e);
                Error::ProcessOpenFailed {
                    pid,
                    message: e.to_string(),
                }
            })?
        };

        debug!("Opened process {}", pid);
        Ok(Self { handle, pid })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Check if the process is still running
    pub fn is_alive(&self) -> bool {
        const STILL_ACTIVE: u32 = 259;

        let mut exit_code: u32 = 0;
        // SAFETY: GetExitCodeProcess is called with a valid process handle obtained from
        // OpenProcess and a properly initialized out parameter.
        unsafe {
            if GetExitCodeProcess(self.handle, &mut exit_code).is_ok() {
                exit_code == STILL_ACTIVE
            } else {
                false
            }
        }
    }

    fn read_into_impl(&self, address: u64, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        let mut bytes_read: usize = 0;

        // SAFETY: ReadProcessMemory is called with a handle opened with PROCESS_VM_READ, a
        // destination buffer of exactly `buf.len()` writable bytes and a valid out pointer.
        // A fault in the remote range is reported through the result, not through UB.
        let result = unsafe {
            ReadProcessMemory(
                self.handle,
                address as *const _,
                buf.as_mut_ptr() as *mut _,
                buf.len(),
                Some(&mut bytes_read),
            )
        };

        // ERROR_PARTIAL_COPY still fills `bytes_read`; the caller decides what a short read means.
        if let Err(e) = result {
            debug!(
                "ReadProcessMemory at {:#x} ({} bytes) stopped after {}: {}",
                address,
                buf.len(),
                bytes_read,
                e
            );
        }
        bytes_read.min(buf.len())
    }
}

#[cfg(target_os = "windows")]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if !self.handle.is_invalid() {
            // SAFETY: self.handle is a valid handle obtained from OpenProcess and has not been
            // closed yet.
            if let Err(e) = unsafe { CloseHandle(self.handle) } {
                warn!("Failed to close process handle: {}", e);
            }
        }
    }
}

#[cfg(target_os = "linux")]
fn probe_pid(pid: u32) -> std::io::Result<()> {
    // SAFETY: kill with signal 0 performs only the existence and permission check.
    let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
    if rc == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    // EPERM: the process exists but belongs to someone else; reads may still be allowed.
    if err.raw_os_error() == Some(libc::EPERM) {
        return Ok(());
    }
    Err(err)
}

#[cfg(target_os = "linux")]
impl ProcessHandle {
    pub fn open(pid: u32) -> Result<Self> {
        reject_pid_zero(pid)?;
        probe_pid(pid).map_err(|e| Error::ProcessOpenFailed {
            pid,
            message: e.to_string(),
        })?;

        debug!("Opened process {}", pid);
        Ok(Self { pid })
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Check if the process is still running
    pub fn is_alive(&self) -> bool {
        probe_pid(self.pid).is_ok()
    }

    fn read_into_impl(&self, address: u64, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        let local = libc::iovec {
            iov_base: buf.as_mut_ptr() as *mut libc::c_void,
            iov_len: buf.len(),
        };
        let remote = libc::iovec {
            iov_base: address as usize as *mut libc::c_void,
            iov_len: buf.len(),
        };

        // SAFETY: `local` describes exactly the writable bytes of `buf`. The remote iovec is
        // only interpreted by the kernel inside the target's address space; faults there are
        // reported as a short count or -1.
        let read = unsafe {
            libc::process_vm_readv(self.pid as libc::pid_t, &local, 1, &remote, 1, 0)
        };

        if read < 0 {
            debug!(
                "process_vm_readv at {:#x} ({} bytes) failed: {}",
                address,
                buf.len(),
                std::io::Error::last_os_error()
            );
            return 0;
        }
        (read as usize).min(buf.len())
    }
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
impl ProcessHandle {
    pub fn open(pid: u32) -> Result<Self> {
        reject_pid_zero(pid)?;
        Err(Error::ProcessUnavailable(
            "process memory access is not supported on this platform".to_string(),
        ))
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Check if the process is still running (stub)
    pub fn is_alive(&self) -> bool {
        false
    }

    fn read_into_impl(&self, _address: u64, _buf: &mut [u8]) -> usize {
        0
    }
}

impl ProcessInfo for ProcessHandle {
    fn pid(&self) -> u32 {
        ProcessHandle::pid(self)
    }

    fn is_alive(&self) -> bool {
        ProcessHandle::is_alive(self)
    }
}

impl ReadMemory for ProcessHandle {
    fn read_into(&self, address: u64, buf: &mut [u8]) -> usize {
        self.read_into_impl(address, buf)
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn test_open_self_and_read_own_memory() {
        let pid = std::process::id();
        let process = ProcessHandle::open(pid).unwrap();
        assert_eq!(process.pid(), pid);
        assert!(process.is_alive());

        let local: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut out = [0u8; 8];
        let read = process.read_into(local.as_ptr() as u64, &mut out);
        // Reading our own address space is permitted without ptrace privileges.
        assert_eq!(read, 8);
        assert_eq!(out, local);
    }

    #[test]
    fn test_unmapped_address_reads_nothing() {
        let process = ProcessHandle::open(std::process::id()).unwrap();
        let mut out = [0u8; 16];

        assert_eq!(process.read_into(0x10, &mut out), 0);
    }

    #[test]
    fn test_open_pid_zero_fails() {
        assert!(matches!(
            ProcessHandle::open(0),
            Err(Error::ProcessUnavailable(_))
        ));
    }
}
