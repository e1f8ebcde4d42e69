use serde::Serialize;
use tracing::{debug, warn};

use crate::color::PseudoColorMode;
use crate::color::mapper::{
    MapperFactory, PseudoColorMapper, RawFrame, SoftwareMapper, check_destination,
    hue_saturation,
};
use crate::error::Result;
use crate::matrix::Depth;

/// How a display buffer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "mode", rename_all = "snake_case")]
pub enum Mapping {
    PassThrough,
    HueSaturation,
    External(PseudoColorMode),
    Software(PseudoColorMode),
}

/// Row length of a BGR24 display buffer, padded to four bytes.
pub fn display_step(width: usize) -> usize {
    (width * 3 + 3) & !3
}

/// Chooses and runs the conversion of one frame to BGR24.
pub struct Colorizer {
    factory: Option<Box<dyn MapperFactory>>,
    hsv_two_channel: bool,
}

impl Default for Colorizer {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Colorizer {
    /// Colorizer using the native mapper when it is compiled in.
    pub fn new(hsv_two_channel: bool) -> Self {
        Self {
            factory: default_factory(),
            hsv_two_channel,
        }
    }

    /// Colorizer that never leaves the process.
    pub fn software_only(hsv_two_channel: bool) -> Self {
        Self {
            factory: None,
            hsv_two_channel,
        }
    }

    pub fn with_factory(mut self, factory: Box<dyn MapperFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn set_hsv_two_channel(&mut self, enabled: bool) {
        self.hsv_two_channel = enabled;
    }

    pub fn factory_name(&self) -> &str {
        self.factory.as_ref().map_or("software", |f| f.name())
    }

    /// Convert `frame` into `dst`, rows `dst_step` bytes apart.
    pub fn colorize_into(
        &self,
        frame: &RawFrame<'_>,
        dst: &mut [u8],
        dst_step: usize,
    ) -> Result<Mapping> {
        frame.check()?;
        check_destination(dst, frame.width * 3, dst_step, frame.height)?;
        let ty = frame.matrix_type;

        if ty.depth == Depth::U8 && (ty.channels == 1 || ty.channels == 3) {
            pass_through(frame, dst, dst_step);
            return Ok(Mapping::PassThrough);
        }

        if self.hsv_two_channel && ty.channels == 2 {
            hue_saturation(frame, dst, dst_step)?;
            return Ok(Mapping::HueSaturation);
        }

        let mode = PseudoColorMode::for_depth(ty.depth);
        if let Some(factory) = &self.factory {
            match run_external(factory.as_ref(), mode, frame, dst, dst_step) {
                Ok(()) => return Ok(Mapping::External(mode)),
                Err(e) => warn!(
                    "{} mapper failed on {}x{} {}, using software ramp: {}",
                    factory.name(),
                    frame.width,
                    frame.height,
                    ty,
                    e
                ),
            }
        }

        SoftwareMapper::new(mode).apply(frame, dst, dst_step)?;
        debug!("Software ramp applied ({})", mode);
        Ok(Mapping::Software(mode))
    }

    /// Render the legend strip for `mode` as `width * 3` byte rows.
    pub fn color_bar(&self, mode: PseudoColorMode, width: usize, height: usize) -> Result<Vec<u8>> {
        let mut dst = vec![0u8; width * 3 * height];
        if let Some(factory) = &self.factory {
            let rendered = factory
                .create(mode)
                .and_then(|mut mapper| mapper.color_bar(&mut dst, width, height));
            match rendered {
                Ok(()) => return Ok(dst),
                Err(e) => warn!("{} color bar failed, using software ramp: {}", factory.name(), e),
            }
        }
        SoftwareMapper::new(mode).color_bar(&mut dst, width, height)?;
        Ok(dst)
    }
}

fn run_external(
    factory: &dyn MapperFactory,
    mode: PseudoColorMode,
    frame: &RawFrame<'_>,
    dst: &mut [u8],
    dst_step: usize,
) -> Result<()> {
    let mut mapper: Box<dyn PseudoColorMapper> = factory.create(mode)?;
    if mapper.mode() != mode {
        mapper.set_mode(mode)?;
    }
    mapper.apply(frame, dst, dst_step)
}

fn pass_through(frame: &RawFrame<'_>, dst: &mut [u8], dst_step: usize) {
    let row_len = frame.width * 3;
    for y in 0..frame.height {
        let src = frame.row(y);
        let out = &mut dst[y * dst_step..y * dst_step + row_len];
        if frame.matrix_type.channels == 3 {
            out.copy_from_slice(src);
        } else {
            for (gray, bgr) in src.iter().zip(out.chunks_exact_mut(3)) {
                bgr.fill(*gray);
            }
        }
    }
}

#[cfg(feature = "native-mapper")]
fn default_factory() -> Option<Box<dyn MapperFactory>> {
    Some(Box::new(crate::color::native::NativeMapperFactory))
}

#[cfg(not(feature = "native-mapper"))]
fn default_factory() -> Option<Box<dyn MapperFactory>> {
    None
}
