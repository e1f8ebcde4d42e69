//! Opening target processes.
//!
//! Sessions reach the operating system only through [`ProcessProvider`], so
//! the whole refresh path runs against mock memory in tests.

use crate::error::Result;
use crate::process::{ProcessHandle, ReadMemory};

/// Liveness of an opened target.
pub trait ProcessInfo {
    fn pid(&self) -> u32;

    /// False once the target has exited.
    fn is_alive(&self) -> bool;
}

/// Trait for opening processes by id.
///
/// A session asks its provider for a fresh handle whenever the debugged
/// process id changes.
pub trait ProcessProvider {
    /// The handle type returned by this provider.
    type Process: ProcessInfo + ReadMemory;

    /// Open `pid` for reading. Pid zero means no debuggee.
    fn open_process(&self, pid: u32) -> Result<Self::Process>;
}

/// Provider backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessProvider;

impl ProcessProvider for SystemProcessProvider {
    type Process = ProcessHandle;

    fn open_process(&self, pid: u32) -> Result<Self::Process> {
        ProcessHandle::open(pid)
    }
}
