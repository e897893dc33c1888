//! Host protocol for video output filters.
//!
//! A filter sees its host only through the capability traits in [`host`] and
//! [`graphics`]. Value types describing timelines live in [`video`]; the
//! settings blob and property sheets in [`settings`] and [`properties`].

pub mod filter;
pub mod graphics;
pub mod host;
pub mod log;
pub mod properties;
pub mod settings;
pub mod video;

pub use filter::{FilterDescriptor, SourceFilter, SourceType, OUTPUT_AUDIO, OUTPUT_VIDEO};
pub use graphics::{
    BlendType, Graphics, GraphicsScope, MappedSurface, StageSurface, TexRender, TextureHandle,
};
pub use host::{
    EventCallbackId, FilterSource, Frontend, FrontendCallback, FrontendEvent, FrontendSubscription,
    Host, OutputPipeline, RenderCallback, RenderCallbackHandle, RenderCallbackId, UiTask,
};
pub use properties::{Properties, Property, PropertyKind};
pub use settings::Settings;
pub use video::{
    AudioHandle, ColorSpace, LockedFrame, VideoFormat, VideoHandle, VideoRange, VideoTimeline,
    VideoTimelineInfo, DEFAULT_CACHE_SIZE,
};
