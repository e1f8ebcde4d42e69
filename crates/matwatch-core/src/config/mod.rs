//! Configuration and layout constants.
//!
//! This module contains:
//! - `SessionOptions` - per-session behaviour switches
//! - Native header layout offsets
//! - Checksum sampling, size limit and polling constants

mod options;

pub use options::*;

/// Byte layout of the native 64-bit matrix header.
///
/// # Structure Layout
///
/// ```text
/// Offset   Field        Size    Description
/// ──────────────────────────────────────────────────────
/// 0x00     flags        4       Type bits, continuity bit, magic
/// 0x04     dims         4       Number of dimensions
/// 0x08     rows         4       Row count
/// 0x0C     cols         4       Column count
/// 0x10     data         8       Pointer to first pixel
/// 0x18     datastart    8       Start of the owning allocation
/// 0x20     dataend      8       One past the last pixel
/// 0x28     datalimit    8       End of the owning allocation
/// 0x30     refcount     8       Allocator bookkeeping
/// 0x38     (u)          8       Shared buffer record
/// 0x40     size.p       8       Pointer to the size array
/// 0x48     step.p       8       Pointer to the step array (step[0] = row stride)
/// ```
pub mod layout {
    pub const FLAGS: usize = 0x00;
    pub const DIMS: usize = 0x04;
    pub const ROWS: usize = 0x08;
    pub const COLS: usize = 0x0C;
    pub const DATA: usize = 0x10;
    pub const DATA_START: usize = 0x18;
    pub const DATA_END: usize = 0x20;
    pub const DATA_LIMIT: usize = 0x28;
    pub const REF_COUNT: usize = 0x30;
    pub const STEP_PTR: usize = 0x48;

    /// Bytes read for one header (through the step pointer).
    pub const HEADER_SIZE: usize = 0x50;

    /// Width of one entry in the remote step array.
    pub const STEP_ENTRY_SIZE: usize = 8;

    /// Set when the rows are stored back to back.
    pub const CONTIGUOUS_FLAG: i32 = 0x4000;

    /// Depth and channel bits of `flags`.
    pub const TYPE_MASK: i32 = 0x0000_0FFF;
}

/// Content checksum sampling.
pub mod checksum {
    /// Upper bound on the number of sampled bytes.
    pub const MAX_SAMPLE_BYTES: usize = 1024;

    /// Lower bound on the number of sampled bytes (when the frame is that large).
    pub const MIN_SAMPLE_BYTES: usize = 16;

    /// Sample size is `total / SAMPLE_DIVISOR` between the bounds above.
    pub const SAMPLE_DIVISOR: usize = 10;
}

/// Sanity limits applied to decoded headers.
pub mod limits {
    /// Largest pixel region that will be copied out of the target (1 GiB).
    pub const MAX_FRAME_BYTES: usize = 1 << 30;

    /// Largest channel count the type bits can express.
    pub const MAX_CHANNELS: u32 = 512;
}

/// Polling constants.
pub mod timing {
    /// Default interval between refreshes in watch mode (ms).
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
}
