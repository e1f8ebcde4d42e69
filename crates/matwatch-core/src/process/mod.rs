mod bytes;
mod handle;
pub mod provider;
mod reader;

// Mock process memory for testing (always available for unit and integration tests)
#[doc(hidden)]
pub mod mock;

pub use bytes::ByteBuffer;
pub use handle::ProcessHandle;
pub use provider::{ProcessInfo, ProcessProvider, SystemProcessProvider};
pub use reader::ReadMemory;

// Re-export mock for convenient access in tests
#[doc(hidden)]
pub use mock::{
    HeaderFixture, MockMemoryBuilder, MockMemoryReader, MockProcess, MockProcessProvider,
};
