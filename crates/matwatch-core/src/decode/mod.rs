//! Header acquisition.
//!
//! Two strategies produce the same [`MatrixDescriptor`]:
//! - fixed offsets into the native header ([`decode_header`])
//! - field names resolved through runtime metadata ([`ReflectiveDecoder`])

mod fixed;
mod loader;
mod metadata;
mod pointer;
pub mod reflective;
mod stride;

pub use fixed::{decode_header, parse_header};
pub use loader::{load_layout, save_layout};
pub use metadata::{FieldInfo, FieldKind, LayoutTable, TypeMetadata};
pub use pointer::{ExpressionValue, classify_expression, parse_pointer};
pub use reflective::{ReflectiveDecoder, ResolvedFields, resolve_fields};
pub use stride::read_stride;

use crate::error::Result;
use crate::matrix::MatrixDescriptor;
use crate::process::ReadMemory;

/// The header acquisition strategy of a session.
#[derive(Default)]
pub enum HeaderDecoder {
    #[default]
    Fixed,
    Reflective(ReflectiveDecoder),
}

impl HeaderDecoder {
    pub fn reflective(metadata: Box<dyn TypeMetadata>) -> Self {
        Self::Reflective(ReflectiveDecoder::new(metadata))
    }

    pub fn decode<R: ReadMemory + ?Sized>(
        &mut self,
        reader: &R,
        address: u64,
    ) -> Result<MatrixDescriptor> {
        match self {
            Self::Fixed => decode_header(reader, address),
            Self::Reflective(decoder) => decoder.decode(reader, address),
        }
    }

    /// Forget cached field resolutions.
    pub fn invalidate(&mut self) {
        if let Self::Reflective(decoder) = self {
            decoder.invalidate();
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Reflective(_) => "reflective",
        }
    }
}

impl std::fmt::Debug for HeaderDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "Fixed"),
            Self::Reflective(decoder) => write!(f, "Reflective({})", decoder.type_name()),
        }
    }
}
