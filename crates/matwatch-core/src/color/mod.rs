//! Conversion of arbitrary pixel encodings to displayable BGR24.

mod mapper;
mod mode;
#[cfg(feature = "native-mapper")]
pub mod native;
mod pipeline;
pub mod ramp;

pub use mapper::{MapperFactory, PseudoColorMapper, RawFrame, SoftwareMapper, hue_saturation};
pub use mode::PseudoColorMode;
pub use pipeline::{Colorizer, Mapping, display_step};
