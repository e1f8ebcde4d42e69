use serde::{Deserialize, Serialize};
use strum::{FromRepr, IntoStaticStr};

use crate::config::layout;

/// Element depth encoded in the low three type bits.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    FromRepr,
    IntoStaticStr,
)]
#[repr(u8)]
pub enum Depth {
    #[default]
    #[strum(serialize = "8U")]
    U8 = 0,
    #[strum(serialize = "8S")]
    S8 = 1,
    #[strum(serialize = "16U")]
    U16 = 2,
    #[strum(serialize = "16S")]
    S16 = 3,
    #[strum(serialize = "32S")]
    S32 = 4,
    #[strum(serialize = "32F")]
    F32 = 5,
    #[strum(serialize = "64F")]
    F64 = 6,
    #[strum(serialize = "16F")]
    F16 = 7,
}

impl Depth {
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::from_repr(value)
    }

    pub fn short_name(&self) -> &'static str {
        self.into()
    }

    /// Width of one channel value in bytes.
    pub fn bytes_per_channel(&self) -> usize {
        bytes_per_channel(*self as i32)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64 | Self::F16)
    }

    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Byte width for a raw depth code. Unknown codes count as one byte.
pub fn bytes_per_channel(depth: i32) -> usize {
    match depth {
        0 | 1 => 1,
        2 | 3 | 7 => 2,
        4 | 5 => 4,
        6 => 8,
        _ => 1,
    }
}

/// Depth and channel count decoded from the header flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixType {
    pub depth: Depth,
    pub channels: u32,
}

impl MatrixType {
    pub fn new(depth: Depth, channels: u32) -> Self {
        Self { depth, channels }
    }

    /// Decode `flags & 0xFFF`. Every bit pattern maps to a valid type.
    pub fn classify(flags: i32) -> Self {
        let value = flags & layout::TYPE_MASK;
        let depth = Depth::from_u8((value & 7) as u8).unwrap_or_default();
        let channels = ((value >> 3) + 1) as u32;
        Self { depth, channels }
    }

    /// Inverse of [`classify`](Self::classify) for channels in `1..=512`.
    pub fn pack(&self) -> i32 {
        (self.depth as i32) | ((self.channels.saturating_sub(1) as i32) << 3)
    }

    pub fn bytes_per_channel(&self) -> usize {
        self.depth.bytes_per_channel()
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.channels as usize * self.bytes_per_channel()
    }

    pub fn is_float(&self) -> bool {
        self.depth.is_float()
    }

    /// `CV_8UC3` style name.
    pub fn description(&self) -> String {
        format!("CV_{}C{}", self.depth, self.channels)
    }
}

impl std::fmt::Display for MatrixType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_pack_roundtrip() {
        for depth in 0..=6u8 {
            for channels in 1..=4u32 {
                let ty = MatrixType::new(Depth::from_u8(depth).unwrap(), channels);
                assert_eq!(MatrixType::classify(ty.pack()), ty);
            }
        }
    }

    #[test]
    fn test_classify_ignores_high_bits() {
        let ty = MatrixType::classify(0x4FF6_4010);
        assert_eq!(ty.depth, Depth::U8);
        assert_eq!(ty.channels, 3);
        assert_eq!(ty.description(), "CV_8UC3");
    }

    #[test]
    fn test_max_channels() {
        let ty = MatrixType::classify(0xFFF);
        assert_eq!(ty.depth, Depth::F16);
        assert_eq!(ty.channels, 512);
        assert_eq!(ty.pack(), 0xFFF);
    }

    #[test]
    fn test_bytes_per_channel_table() {
        let widths: Vec<usize> = (0..8).map(bytes_per_channel).collect();
        assert_eq!(widths, vec![1, 1, 2, 2, 4, 4, 8, 2]);
        assert_eq!(bytes_per_channel(42), 1);
        assert_eq!(bytes_per_channel(-1), 1);
    }

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(MatrixType::new(Depth::F32, 3).bytes_per_pixel(), 12);
        assert_eq!(MatrixType::new(Depth::U16, 1).bytes_per_pixel(), 2);
    }

    #[test]
    fn test_float_depths() {
        assert!(Depth::F32.is_float());
        assert!(Depth::F64.is_float());
        assert!(Depth::F16.is_float());
        assert!(Depth::S32.is_integer());
        assert_eq!(MatrixType::new(Depth::F16, 1).description(), "CV_16FC1");
    }
}
