//! Video timeline types: pixel formats, color description, timeline
//! configuration and the write-locked frame buffer.

use std::sync::Arc;

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

/// Frame cache depth used for secondary timelines.
pub const DEFAULT_CACHE_SIZE: u32 = 16;

/// Raw pixel layout of a timeline's frames.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum VideoFormat {
    None = 0,
    I420 = 1,
    Nv12 = 2,
    Rgba = 6,
    Bgra = 7,
}

impl VideoFormat {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::from_u32(raw)
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive, ToPrimitive)]
pub enum ColorSpace {
    #[default]
    Default = 0,
    Cs601 = 1,
    Cs709 = 2,
    Srgb = 3,
    Cs2100Pq = 4,
    Cs2100Hlg = 5,
}

impl ColorSpace {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::from_u32(raw)
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive, ToPrimitive)]
pub enum VideoRange {
    #[default]
    Default = 0,
    Partial = 1,
    Full = 2,
}

impl VideoRange {
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::from_u32(raw)
    }
}

/// Configuration of a video timeline.
///
/// This is a value handed to [`crate::Host::open_video`]; the opened timeline
/// keeps its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTimelineInfo {
    pub name: String,
    pub format: VideoFormat,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub colorspace: ColorSpace,
    pub range: VideoRange,
    pub cache_size: u32,
}

impl VideoTimelineInfo {
    /// Describe a timeline that runs at the same rate and color description
    /// as `main`, with its own name, size and pixel format.
    pub fn mirroring(
        main: &VideoTimelineInfo,
        name: impl Into<String>,
        width: u32,
        height: u32,
        format: VideoFormat,
        cache_size: u32,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            width,
            height,
            fps_num: main.fps_num,
            fps_den: main.fps_den,
            colorspace: main.colorspace,
            range: main.range,
            cache_size,
        }
    }
}

/// Opaque handle to the host's audio clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioHandle(pub u64);

/// A write-locked, timestamped frame buffer.
///
/// Obtained from [`VideoTimeline::lock_frame`]. Dropping the value releases
/// the lock, so every acquisition is released exactly once.
pub trait LockedFrame {
    /// Presentation timestamp the frame was locked for, in nanoseconds.
    fn timestamp(&self) -> u64;

    /// Row stride of `plane` in bytes. Zero for planes the format lacks.
    fn linesize(&self, plane: usize) -> u32;

    /// Writable bytes of `plane`.
    fn plane_mut(&mut self, plane: usize) -> &mut [u8];
}

/// An independent video timeline with its own frame cache.
///
/// The timeline is closed when the last handle to it is dropped.
pub trait VideoTimeline: Send + Sync {
    fn info(&self) -> &VideoTimelineInfo;

    /// Lock `count` cache slots for writing at `timestamp`.
    ///
    /// Returns `None` when no slot is available (cache full, pipeline
    /// stalled).
    fn lock_frame(&self, count: u32, timestamp: u64) -> Option<Box<dyn LockedFrame + '_>>;

    /// Stop delivering frames to consumers.
    fn stop(&self);
}

/// Shared handle to an open timeline.
pub type VideoHandle = Arc<dyn VideoTimeline>;
