//! Pure pixel conversions used by the software mapper.

use crate::matrix::Depth;
use crate::process::ByteBuffer;

/// Blue-cyan-green-yellow-red ramp for `v` in `[0, 1]` (clamped), as `[b, g, r]`.
pub fn ramp_color(v: f64) -> [u8; 3] {
    let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    let scale = |x: f64| (x * 4.0 * 255.0).clamp(0.0, 255.0) as u8;

    if v < 0.25 {
        [255, scale(v), 0]
    } else if v < 0.5 {
        [scale(0.5 - v), 255, 0]
    } else if v < 0.75 {
        [0, 255, scale(v - 0.5)]
    } else {
        [0, scale(1.0 - v), 255]
    }
}

/// Map a float sample onto `[0, 255]`.
///
/// Values in `[0, 1]` and `[-1, 1]` are treated as normalized data; anything
/// else is clamped to the 8-bit range.
pub fn normalize_float(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else if (0.0..=1.0).contains(&value) {
        value * 255.0
    } else if (-1.0..=1.0).contains(&value) {
        (value + 1.0) / 2.0 * 255.0
    } else {
        value.clamp(0.0, 255.0)
    }
}

/// Read one channel at `offset` and scale it to `[0, 255]` for its depth.
pub fn normalized_channel(buf: &ByteBuffer<'_>, depth: Depth, offset: usize) -> f64 {
    let value = match depth {
        Depth::U8 => buf.read_u8_at(offset).map(f64::from),
        Depth::S8 => buf.read_i8_at(offset).map(|v| f64::from(v) + 128.0),
        Depth::U16 => buf.read_u16_at(offset).map(|v| f64::from(v) / 256.0),
        Depth::S16 => buf
            .read_i16_at(offset)
            .map(|v| (f64::from(v) + 32768.0) / 256.0),
        Depth::S32 => buf
            .read_i32_at(offset)
            .map(|v| (f64::from(v) - f64::from(i32::MIN)) * 255.0 / f64::from(u32::MAX)),
        Depth::F32 => buf.read_f32_at(offset).map(|v| normalize_float(f64::from(v))),
        Depth::F64 => buf.read_f64_at(offset).map(normalize_float),
        Depth::F16 => buf
            .read_u16_at(offset)
            .map(|bits| normalize_float(f64::from(crate::frame::f16_to_f32(bits)))),
    };
    value.unwrap_or(0.0)
}

/// HSV to `[b, g, r]`. Hue in degrees, saturation and value in `[0, 1]`.
pub fn hsv_to_bgr(h: f64, s: f64, v: f64) -> [u8; 3] {
    let h = if h.is_finite() { h.rem_euclid(360.0) } else { 0.0 };
    let s = if s.is_nan() { 0.0 } else { s.clamp(0.0, 1.0) };
    let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };

    let sector = (h / 60.0) as u32 % 6;
    let f = h / 60.0 - f64::from(sector);
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let byte = |x: f64| (x * 255.0) as u8;
    [byte(b), byte(g), byte(r)]
}
