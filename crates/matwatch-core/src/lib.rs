pub mod color;
pub mod config;
pub mod decode;
pub mod error;
pub mod frame;
pub mod matrix;
pub mod process;
pub mod session;
pub mod shm;

pub use color::{Colorizer, Mapping, MapperFactory, PseudoColorMapper, PseudoColorMode, RawFrame};
pub use config::SessionOptions;
pub use decode::{
    ExpressionValue, FieldKind, HeaderDecoder, LayoutTable, TypeMetadata, decode_header,
    load_layout, parse_pointer, save_layout,
};
pub use error::{Error, Result};
pub use frame::{FrameSample, FrameSummary};
pub use matrix::{Depth, MatrixDescriptor, MatrixType, StrideInfo};
pub use process::{ProcessHandle, ReadMemory, SystemProcessProvider};
pub use session::{FrameState, Refresh, Session};
pub use shm::SharedSegment;
