use serde::{Deserialize, Serialize};
use strum::{EnumString, FromRepr, IntoStaticStr};

use crate::matrix::Depth;

/// Color maps understood by the mapper boundary, with their native codes.
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
    EnumString,
)]
#[repr(i32)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PseudoColorMode {
    Gray = 0,
    #[default]
    Jet = 1,
    Hot = 2,
    Cool = 3,
    Hsv = 4,
    Rainbow = 5,
    Custom = 6,
}

impl PseudoColorMode {
    pub fn from_code(code: i32) -> Option<Self> {
        Self::from_repr(code)
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// HOT for floating-point data, JET for everything else.
    pub fn for_depth(depth: Depth) -> Self {
        if depth.is_float() { Self::Hot } else { Self::Jet }
    }
}

impl std::fmt::Display for PseudoColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
