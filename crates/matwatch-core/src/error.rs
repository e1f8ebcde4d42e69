use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not available: {0}")]
    ProcessUnavailable(String),

    #[error("Failed to open process {pid}: {message}")]
    ProcessOpenFailed { pid: u32, message: String },

    #[error("Invalid pointer: {address:#x}")]
    InvalidPointer { address: u64 },

    #[error("Partial read at {address:#x}: requested {requested} bytes, read {read}")]
    PartialRead {
        address: u64,
        requested: usize,
        read: usize,
    },

    #[error("Layout mismatch: {0}")]
    LayoutMismatch(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Shared memory allocation failed: {0}")]
    AllocationFailure(String),

    #[error("Pseudo-color mapper failed: {0}")]
    MapperFailure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Errors that mean "there is no object to show" rather than "this poll failed".
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            Error::InvalidPointer { .. } | Error::LayoutMismatch(_)
        )
    }

    /// Short-read helper used at every read boundary.
    pub(crate) fn partial(address: u64, requested: usize, read: usize) -> Self {
        Error::PartialRead {
            address,
            requested,
            read,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
