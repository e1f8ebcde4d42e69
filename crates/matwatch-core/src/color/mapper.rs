use crate::color::PseudoColorMode;
use crate::color::ramp::{hsv_to_bgr, normalized_channel, ramp_color};
use crate::error::{Error, Result};
use crate::matrix::MatrixType;
use crate::process::ByteBuffer;

/// An unpadded local frame handed to a mapper.
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
    pub matrix_type: MatrixType,
}

impl<'a> RawFrame<'a> {
    pub fn new(data: &'a [u8], width: usize, height: usize, matrix_type: MatrixType) -> Self {
        Self {
            data,
            width,
            height,
            matrix_type,
        }
    }

    pub fn row_len(&self) -> usize {
        self.width * self.matrix_type.bytes_per_pixel()
    }

    pub fn row(&self, y: usize) -> &'a [u8] {
        let len = self.row_len();
        &self.data[y * len..(y + 1) * len]
    }

    /// Fails when `data` is shorter than `height` rows of `row_len` bytes.
    pub(crate) fn check(&self) -> Result<()> {
        let needed = self
            .height
            .checked_mul(self.row_len())
            .ok_or_else(|| Error::InvalidGeometry("frame size overflows".to_string()))?;
        if self.data.len() < needed {
            return Err(Error::InvalidGeometry(format!(
                "frame holds {} bytes, {} needed",
                self.data.len(),
                needed
            )));
        }
        Ok(())
    }
}

/// Converts arbitrary samples to 24-bit BGR.
pub trait PseudoColorMapper {
    fn mode(&self) -> PseudoColorMode;

    fn set_mode(&mut self, mode: PseudoColorMode) -> Result<()>;

    /// Write `frame` as BGR rows of `dst_step` bytes into `dst`.
    fn apply(&mut self, frame: &RawFrame<'_>, dst: &mut [u8], dst_step: usize) -> Result<()>;

    /// Render the legend strip (`width * 3` bytes per row) into `dst`.
    fn color_bar(&mut self, dst: &mut [u8], width: usize, height: usize) -> Result<()>;
}

/// Creates a mapper for one pipeline invocation.
pub trait MapperFactory {
    fn name(&self) -> &str;

    fn create(&self, mode: PseudoColorMode) -> Result<Box<dyn PseudoColorMapper>>;
}

pub(crate) fn check_destination(dst: &[u8], row_len: usize, step: usize, rows: usize) -> Result<()> {
    if step < row_len {
        return Err(Error::InvalidGeometry(format!(
            "destination step {} shorter than {} byte row",
            step, row_len
        )));
    }
    let needed = rows
        .checked_mul(step)
        .ok_or_else(|| Error::InvalidGeometry("destination size overflows".to_string()))?;
    if dst.len() < needed {
        return Err(Error::InvalidGeometry(format!(
            "destination holds {} bytes, {} needed",
            dst.len(),
            needed
        )));
    }
    Ok(())
}

/// Deterministic in-process mapper: channel average through the JET ramp.
///
/// Every mode renders with the same ramp; the mode is only remembered.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareMapper {
    mode: PseudoColorMode,
}

impl SoftwareMapper {
    pub fn new(mode: PseudoColorMode) -> Self {
        Self { mode }
    }

    /// Ramp position of one pixel: the mean of its normalized channels.
    pub fn pixel_level(pixel: &[u8], matrix_type: MatrixType) -> f64 {
        let buf = ByteBuffer::new(pixel);
        let width = matrix_type.bytes_per_channel();
        let channels = matrix_type.channels.max(1) as usize;
        let sum: f64 = (0..channels)
            .map(|c| normalized_channel(&buf, matrix_type.depth, c * width))
            .sum();
        sum / channels as f64 / 255.0
    }
}

impl PseudoColorMapper for SoftwareMapper {
    fn mode(&self) -> PseudoColorMode {
        self.mode
    }

    fn set_mode(&mut self, mode: PseudoColorMode) -> Result<()> {
        self.mode = mode;
        Ok(())
    }

    fn apply(&mut self, frame: &RawFrame<'_>, dst: &mut [u8], dst_step: usize) -> Result<()> {
        frame.check()?;
        check_destination(dst, frame.width * 3, dst_step, frame.height)?;

        let bpp = frame.matrix_type.bytes_per_pixel();
        for y in 0..frame.height {
            let src = frame.row(y);
            let out = &mut dst[y * dst_step..y * dst_step + frame.width * 3];
            for (pixel, bgr) in src.chunks_exact(bpp).zip(out.chunks_exact_mut(3)) {
                bgr.copy_from_slice(&ramp_color(Self::pixel_level(pixel, frame.matrix_type)));
            }
        }
        Ok(())
    }

    fn color_bar(&mut self, dst: &mut [u8], width: usize, height: usize) -> Result<()> {
        let step = width * 3;
        check_destination(dst, step, step, height)?;
        let span = width.saturating_sub(1).max(1) as f64;
        for row in dst.chunks_exact_mut(step).take(height) {
            for (x, bgr) in row.chunks_exact_mut(3).enumerate() {
                bgr.copy_from_slice(&ramp_color(x as f64 / span));
            }
        }
        Ok(())
    }
}

/// Render a two-channel frame as (hue, saturation) at full value.
pub fn hue_saturation(frame: &RawFrame<'_>, dst: &mut [u8], dst_step: usize) -> Result<()> {
    frame.check()?;
    check_destination(dst, frame.width * 3, dst_step, frame.height)?;
    if frame.matrix_type.channels != 2 {
        return Err(Error::InvalidGeometry(format!(
            "hue/saturation needs 2 channels, got {}",
            frame.matrix_type.channels
        )));
    }

    let depth = frame.matrix_type.depth;
    let width = frame.matrix_type.bytes_per_channel();
    let bpp = frame.matrix_type.bytes_per_pixel();
    let unit = |buf: &ByteBuffer<'_>, offset: usize| -> f64 {
        if depth.is_float() {
            match width {
                8 => buf.read_f64_at(offset).unwrap_or(0.0),
                4 => buf.read_f32_at(offset).map(f64::from).unwrap_or(0.0),
                _ => buf
                    .read_u16_at(offset)
                    .map(|bits| f64::from(crate::frame::f16_to_f32(bits)))
                    .unwrap_or(0.0),
            }
        } else {
            normalized_channel(buf, depth, offset) / 255.0
        }
    };

    for y in 0..frame.height {
        let src = frame.row(y);
        let out = &mut dst[y * dst_step..y * dst_step + frame.width * 3];
        for (pixel, bgr) in src.chunks_exact(bpp).zip(out.chunks_exact_mut(3)) {
            let buf = ByteBuffer::new(pixel);
            let hue = unit(&buf, 0) * 360.0;
            let saturation = unit(&buf, width);
            bgr.copy_from_slice(&hsv_to_bgr(hue, saturation, 1.0));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Depth;

    #[test]
    fn test_software_mapper_extremes() {
        let ty = MatrixType::new(Depth::U8, 2);
        let data = [0, 0, 255, 255];
        let frame = RawFrame::new(&data, 2, 1, ty);
        let mut dst = vec![0u8; 8];

        SoftwareMapper::default().apply(&frame, &mut dst, 8).unwrap();
        assert_eq!(&dst[..6], &[255, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn test_channel_average() {
        let ty = MatrixType::new(Depth::U8, 2);
        assert_eq!(SoftwareMapper::pixel_level(&[0, 255], ty), 0.5);
    }

    #[test]
    fn test_float_frame() {
        let ty = MatrixType::new(Depth::F32, 1);
        let data: Vec<u8> = [0.0f32, 1.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        let frame = RawFrame::new(&data, 2, 1, ty);
        let mut dst = vec![0u8; 8];

        SoftwareMapper::new(PseudoColorMode::Hot)
            .apply(&frame, &mut dst, 8)
            .unwrap();
        assert_eq!(&dst[..3], &[255, 0, 0]);
        assert_eq!(&dst[3..6], &[0, 0, 255]);
    }

    #[test]
    fn test_destination_too_small() {
        let ty = MatrixType::new(Depth::U16, 1);
        let data = [0u8; 8];
        let frame = RawFrame::new(&data, 2, 2, ty);
        let mut dst = vec![0u8; 11];

        assert!(SoftwareMapper::default().apply(&frame, &mut dst, 6).is_err());
        assert!(SoftwareMapper::default().apply(&frame, &mut dst, 4).is_err());
    }

    #[test]
    fn test_short_source_rejected() {
        let ty = MatrixType::new(Depth::U8, 3);
        let data = [0u8; 5];
        let frame = RawFrame::new(&data, 2, 1, ty);
        let mut dst = vec![0u8; 8];

        assert!(SoftwareMapper::default().apply(&frame, &mut dst, 8).is_err());
    }

    #[test]
    fn test_color_bar_runs_blue_to_red() {
        let mut dst = vec![0u8; 16 * 3 * 2];
        SoftwareMapper::default().color_bar(&mut dst, 16, 2).unwrap();

        assert_eq!(&dst[..3], &[255, 0, 0]);
        assert_eq!(&dst[45..48], &[0, 0, 255]);
        assert_eq!(&dst[48..51], &[255, 0, 0]);
    }

    #[test]
    fn test_hue_saturation() {
        let ty = MatrixType::new(Depth::F32, 2);
        let data: Vec<u8> = [0.0f32, 1.0, 1.0 / 3.0, 0.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let frame = RawFrame::new(&data, 2, 1, ty);
        let mut dst = vec![0u8; 8];

        hue_saturation(&frame, &mut dst, 8).unwrap();
        assert_eq!(&dst[..3], &[0, 0, 255]);
        assert_eq!(&dst[3..6], &[255, 255, 255]);
    }
}
