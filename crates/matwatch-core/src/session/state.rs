use std::sync::Arc;

use strum::IntoStaticStr;

use crate::frame::FrameSample;

/// Where a session stands after its last refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoStaticStr)]
pub enum FrameState {
    /// No object to show: null target, released object or unreadable layout.
    #[default]
    Absent,
    Decoding,
    Ready,
    /// The last refresh failed; the previous sample (if any) is still current.
    Failed,
}

impl std::fmt::Display for FrameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &'static str = self.into();
        write!(f, "{}", name)
    }
}

/// Result of one refresh.
#[derive(Debug, Clone)]
pub enum Refresh {
    Absent,
    /// Nothing changed; the current sample is reused as is.
    Stale(Arc<FrameSample>),
    /// A new sample replaced the previous one.
    Ready(Arc<FrameSample>),
}

impl Refresh {
    pub fn sample(&self) -> Option<&Arc<FrameSample>> {
        match self {
            Self::Absent => None,
            Self::Stale(sample) | Self::Ready(sample) => Some(sample),
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}
