//! OS-backed memory segments holding display frames.
//!
//! On Windows a segment is a named pagefile-backed file mapping that a viewer
//! in another process can open by name. Elsewhere it is an anonymous mapping
//! private to this process.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tracing::debug;

use crate::error::{Error, Result};

#[cfg(target_os = "windows")]
mod win32;
#[cfg(target_os = "windows")]
use self::win32::Mapping;

#[cfg(not(target_os = "windows"))]
mod anon;
#[cfg(not(target_os = "windows"))]
use self::anon::Mapping;

static SEGMENT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique segment name: `<prefix>_<pid>_<timestamp>_<counter>`.
pub fn segment_name(prefix: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        prefix,
        std::process::id(),
        Utc::now().format("%Y%m%d%H%M%S%3f"),
        SEGMENT_COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

/// A mapped read-write segment, unmapped on drop.
pub struct SharedSegment {
    name: String,
    mapping: Mapping,
}

impl SharedSegment {
    /// Create and map a zero-filled segment of `size` bytes.
    pub fn create(name: &str, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::AllocationFailure(format!(
                "segment {} requested with zero size",
                name
            )));
        }
        let mapping = Mapping::create(name, size)?;
        debug!("Mapped segment {} ({} bytes)", name, size);
        Ok(Self {
            name: name.to_string(),
            mapping,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.mapping.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        self.mapping.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.mapping.as_mut_slice()
    }
}

impl std::fmt::Debug for SharedSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSegment")
            .field("name", &self.name)
            .field("len", &self.len())
            .finish()
    }
}
