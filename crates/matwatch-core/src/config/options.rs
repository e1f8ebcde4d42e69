use serde::{Deserialize, Serialize};

/// Behaviour switches for one watch session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Run the content checksum tier when the header is unchanged.
    pub check_content: bool,
    /// Render two-channel frames as (hue, saturation) instead of through the mapper.
    pub hsv_two_channel: bool,
    /// Log a warning when the data pointer range disagrees with the geometry.
    pub verify_pointer_range: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            check_content: true,
            hsv_two_channel: false,
            verify_pointer_range: true,
        }
    }
}
