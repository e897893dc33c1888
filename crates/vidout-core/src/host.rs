//! Capabilities consumed from the host application.
//!
//! A filter talks to the host only through these traits. Registrations that
//! the host keeps process-wide (render callbacks, frontend event callbacks)
//! are wrapped in RAII handles that deregister on drop.

use std::sync::Arc;

use anyhow::Result;

use crate::graphics::Graphics;
use crate::properties::Properties;
use crate::settings::Settings;
use crate::video::{AudioHandle, VideoHandle, VideoTimelineInfo};

/// Scene-graph view of one filter instance.
pub trait FilterSource: Send + Sync {
    fn name(&self) -> String;

    /// Whether the user has the filter enabled. Owned by the host.
    fn enabled(&self) -> bool;

    /// Current settings of the filter.
    fn settings(&self) -> Settings;

    /// Whether the filter is currently attached to a parent source.
    fn has_parent(&self) -> bool;

    /// Base size of the filter's upstream target, if it has one.
    fn target_size(&self) -> Option<(u32, u32)>;

    /// Render what the filter receives from upstream into the current
    /// target, skipping the filter itself.
    fn skip_video_filter(&self);
}

/// A secondary output (device or file sink) with its own consumer thread.
///
/// Released when dropped.
pub trait OutputPipeline: Send {
    /// Bind the output to a video timeline and an audio clock.
    fn set_media(&mut self, video: VideoHandle, audio: AudioHandle);

    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);
}

/// Per-frame callback run on the render thread with the base canvas size.
pub type RenderCallback = Arc<dyn Fn(u32, u32) + Send + Sync>;

/// Work queued onto the host's UI/control context.
pub type UiTask = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderCallbackId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventCallbackId(pub u64);

/// Coarse application lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontendEvent {
    FinishedLoading,
    ScriptingShutdown,
    Exit,
    Other(u32),
}

pub type FrontendCallback = Arc<dyn Fn(FrontendEvent) + Send + Sync>;

/// Optional host frontend that publishes lifecycle events.
pub trait Frontend: Send + Sync {
    fn add_event_callback(&self, callback: FrontendCallback) -> EventCallbackId;
    fn remove_event_callback(&self, id: EventCallbackId);
}

/// The host runtime.
pub trait Host: Graphics {
    /// Description of the host's primary video pipeline.
    fn main_video_info(&self) -> VideoTimelineInfo;

    /// Timestamp of the frame currently being rendered, in nanoseconds.
    fn video_frame_time(&self) -> u64;

    fn audio(&self) -> AudioHandle;

    fn open_video(&self, info: VideoTimelineInfo) -> Result<VideoHandle>;

    fn create_output(&self, id: &str, name: &str, settings: &Settings) -> Result<Box<dyn OutputPipeline>>;

    /// Property schema of the output type `id`.
    fn output_properties(&self, id: &str) -> Properties;

    fn add_render_callback(&self, callback: RenderCallback) -> RenderCallbackId;

    /// Deregister a render callback. Once this returns the callback is not
    /// running and will not run again.
    fn remove_render_callback(&self, id: RenderCallbackId);

    /// Run `task` later on the UI/control context.
    fn queue_ui_task(&self, task: UiTask);

    fn frontend(&self) -> Option<&dyn Frontend> {
        None
    }
}

/// A registered render callback, removed on drop.
pub struct RenderCallbackHandle {
    host: Arc<dyn Host>,
    id: RenderCallbackId,
}

impl RenderCallbackHandle {
    pub fn register(host: &Arc<dyn Host>, callback: RenderCallback) -> Self {
        let id = host.add_render_callback(callback);
        Self {
            host: host.clone(),
            id,
        }
    }
}

impl Drop for RenderCallbackHandle {
    fn drop(&mut self) {
        self.host.remove_render_callback(self.id);
    }
}

/// A frontend event subscription, removed on drop.
pub struct FrontendSubscription {
    host: Arc<dyn Host>,
    id: EventCallbackId,
}

impl FrontendSubscription {
    /// Subscribe if the host has a frontend; `None` otherwise.
    pub fn subscribe(host: &Arc<dyn Host>, callback: FrontendCallback) -> Option<Self> {
        let id = host.frontend()?.add_event_callback(callback);
        Some(Self {
            host: host.clone(),
            id,
        })
    }
}

impl Drop for FrontendSubscription {
    fn drop(&mut self) {
        if let Some(frontend) = self.host.frontend() {
            frontend.remove_event_callback(self.id);
        }
    }
}
