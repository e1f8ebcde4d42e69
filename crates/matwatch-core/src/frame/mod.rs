//! Pixel copy, change detection and frame samples.

mod change;
mod copy;
mod pixel;
mod sample;

pub use change::{
    Change, ChangeTracker, Fingerprint, content_checksum, fold_checksum, is_contiguous,
    pointer_range_consistent, sample_len,
};
pub(crate) use change::warn_on_range_mismatch;
pub use copy::copy_pixels;
pub use pixel::{READ_ERROR, f16_to_f32, format_pixel, query_pixel};
pub use sample::{DisplayFrame, FrameSample, FrameSummary, SEGMENT_PREFIX};
