use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::color::{Colorizer, Mapping, RawFrame, display_step};
use crate::error::Result;
use crate::matrix::{MatrixType, StrideInfo};
use crate::shm::{SharedSegment, segment_name};

/// Prefix of display segment names.
pub const SEGMENT_PREFIX: &str = "MatWatchFrame";

/// BGR24 rendering of a sample, held in shared memory.
#[derive(Debug)]
pub struct DisplayFrame {
    pub segment: SharedSegment,
    pub width: usize,
    pub height: usize,
    /// Row length in bytes, padded to four.
    pub step: usize,
    pub mapping: Mapping,
}

impl DisplayFrame {
    /// Render `frame` into a fresh segment.
    pub fn render(frame: &RawFrame<'_>, colorizer: &Colorizer) -> Result<Self> {
        let step = display_step(frame.width);
        let mut segment = SharedSegment::create(&segment_name(SEGMENT_PREFIX), step * frame.height)?;
        let mapping = colorizer.colorize_into(frame, segment.as_mut_slice(), step)?;
        debug!(
            "Rendered {}x{} {} via {:?} into {}",
            frame.width,
            frame.height,
            frame.matrix_type,
            mapping,
            segment.name()
        );
        Ok(Self {
            segment,
            width: frame.width,
            height: frame.height,
            step,
            mapping,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        self.segment.as_slice()
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.bytes()[y * self.step..y * self.step + self.width * 3]
    }
}

/// One successful reconstruction. Replaced wholesale, never edited.
#[derive(Debug)]
pub struct FrameSample {
    pub width: usize,
    pub height: usize,
    pub matrix_type: MatrixType,
    pub stride: StrideInfo,
    pub contiguous: bool,
    pub checksum: Option<u32>,
    pub captured_at: DateTime<Utc>,
    /// Unpadded copy of the remote pixels.
    pub pixels: Vec<u8>,
    /// `None` for frames with no rows or columns.
    pub display: Option<DisplayFrame>,
}

impl FrameSample {
    /// Assemble a sample, rendering the display buffer unless the frame is empty.
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        width: usize,
        height: usize,
        matrix_type: MatrixType,
        stride: StrideInfo,
        contiguous: bool,
        checksum: Option<u32>,
        pixels: Vec<u8>,
        colorizer: &Colorizer,
    ) -> Result<Self> {
        let display = if width == 0 || height == 0 {
            None
        } else {
            let raw = RawFrame::new(&pixels, width, height, matrix_type);
            Some(DisplayFrame::render(&raw, colorizer)?)
        };

        Ok(Self {
            width,
            height,
            matrix_type,
            stride,
            contiguous,
            checksum,
            captured_at: Utc::now(),
            pixels,
            display,
        })
    }

    pub fn type_description(&self) -> String {
        self.matrix_type.description()
    }

    pub fn summary(&self) -> FrameSummary {
        FrameSummary {
            width: self.width,
            height: self.height,
            type_description: self.type_description(),
            expected_step: self.stride.expected,
            actual_step: self.stride.actual,
            contiguous: self.contiguous,
            checksum: self.checksum,
            captured_at: self.captured_at,
            display_step: self.display.as_ref().map(|d| d.step),
            mapping: self.display.as_ref().map(|d| d.mapping),
            segment: self.display.as_ref().map(|d| d.segment.name().to_string()),
        }
    }
}

/// Serializable description of a sample, without pixel data.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    pub width: usize,
    pub height: usize,
    pub type_description: String,
    pub expected_step: usize,
    pub actual_step: usize,
    pub contiguous: bool,
    pub checksum: Option<u32>,
    pub captured_at: DateTime<Utc>,
    pub display_step: Option<usize>,
    pub mapping: Option<Mapping>,
    pub segment: Option<String>,
}
