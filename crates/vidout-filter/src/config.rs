//! Static configuration of an output filter.

use vidout_core::{VideoFormat, DEFAULT_CACHE_SIZE};

/// Output type created by default.
pub const DEFAULT_OUTPUT_ID: &str = "aja_output";

/// Name given to the output instance the filter owns.
pub const DEFAULT_OUTPUT_NAME: &str = "aja_output_filter";

/// Output property that would let the output start itself.
pub const AUTO_START_PROPERTY: &str = "ui_prop_auto_start_output";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Output type id passed to the host.
    pub output_id: String,
    pub output_name: String,
    /// Pixel format of the frames handed to the output.
    pub format: VideoFormat,
    /// Frame cache depth of the output timeline.
    pub cache_size: u32,
    /// Property hidden from the output's property sheet, since the filter
    /// owns start and stop.
    pub auto_start_property: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            output_id: DEFAULT_OUTPUT_ID.to_string(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            format: VideoFormat::Bgra,
            cache_size: DEFAULT_CACHE_SIZE,
            auto_start_property: AUTO_START_PROPERTY.to_string(),
        }
    }
}
