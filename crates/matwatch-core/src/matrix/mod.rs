//! Matrix header model and type classification.

mod descriptor;
mod types;

pub use descriptor::{MatrixDescriptor, StrideInfo};
pub use types::{Depth, MatrixType, bytes_per_channel};
