//! Point queries against the live remote frame.

use crate::frame::copy::row_address;
use crate::matrix::{Depth, MatrixDescriptor, MatrixType, StrideInfo};
use crate::process::{ByteBuffer, ReadMemory};

pub const READ_ERROR: &str = "Read Pixel Error";

/// Read and format the pixel at `(x, y)`.
///
/// Out-of-range coordinates or an absent frame give an empty string.
pub fn query_pixel<R: ReadMemory + ?Sized>(
    reader: &R,
    descriptor: &MatrixDescriptor,
    stride: &StrideInfo,
    x: i64,
    y: i64,
) -> String {
    if descriptor.is_absent() || x < 0 || y < 0 {
        return String::new();
    }
    let Ok((rows, cols)) = descriptor.geometry() else {
        return String::new();
    };
    let (x, y) = (x as usize, y as usize);
    if x >= cols || y >= rows {
        return String::new();
    }

    let ty = descriptor.matrix_type();
    let bpp = ty.bytes_per_pixel();
    let address = row_address(descriptor.data, y, stride.actual)
        .ok()
        .and_then(|row| row.checked_add((x * bpp) as u64));
    let Some(address) = address else {
        return READ_ERROR.to_string();
    };

    match reader.read_bytes(address, bpp) {
        Ok(bytes) => format_pixel(&bytes, ty),
        Err(_) => READ_ERROR.to_string(),
    }
}

/// Format one pixel's channel values.
///
/// Float depths list channels in memory order; integer depths list them in
/// reverse so BGR storage reads as RGB.
pub fn format_pixel(bytes: &[u8], ty: MatrixType) -> String {
    let buf = ByteBuffer::new(bytes);
    let width = ty.bytes_per_channel();
    let values: Option<Vec<String>> = (0..ty.channels as usize)
        .map(|i| channel_text(&buf, ty.depth, i * width))
        .collect();
    let Some(mut values) = values else {
        return READ_ERROR.to_string();
    };

    if ty.depth.is_integer() {
        values.reverse();
    }
    values.join(", ")
}

fn channel_text(buf: &ByteBuffer<'_>, depth: Depth, offset: usize) -> Option<String> {
    let text = match depth {
        Depth::U8 => buf.read_u8_at(offset).ok()?.to_string(),
        Depth::S8 => buf.read_i8_at(offset).ok()?.to_string(),
        Depth::U16 => buf.read_u16_at(offset).ok()?.to_string(),
        Depth::S16 => buf.read_i16_at(offset).ok()?.to_string(),
        Depth::S32 => buf.read_i32_at(offset).ok()?.to_string(),
        Depth::F32 => buf.read_f32_at(offset).ok()?.to_string(),
        Depth::F64 => buf.read_f64_at(offset).ok()?.to_string(),
        Depth::F16 => f16_to_f32(buf.read_u16_at(offset).ok()?).to_string(),
    };
    Some(text)
}

/// IEEE 754 binary16 to f32.
pub fn f16_to_f32(bits: u16) -> f32 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = ((bits >> 10) & 0x1F) as i32;
    let mantissa = (bits & 0x03FF) as f32;

    match exponent {
        0 => sign * mantissa * 2f32.powi(-24),
        0x1F if mantissa == 0.0 => sign * f32::INFINITY,
        0x1F => f32::NAN,
        _ => sign * (1.0 + mantissa / 1024.0) * 2f32.powi(exponent - 15),
    }
}
