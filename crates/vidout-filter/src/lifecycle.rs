//! [`OutputLifecycle`]: owns the secondary output pipeline, its timeline and
//! the frame bridge feeding it, and starts or stops them as a unit.
//!
//! ```text
//!            start()                         stop()
//! INACTIVE ──────────► STARTING ──ok──► ACTIVE ──────► STOPPING ──► INACTIVE
//!                          │                                            ▲
//!                          └──── precondition / failure (teardown) ─────┘
//! ```
//!
//! Every acquisition made by `start` is undone by the same teardown `stop`
//! uses, including when `start` fails halfway. The render callback is
//! removed before anything it touches is released.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};
use vidout_bridge::{FrameBridge, PublishOutcome};
use vidout_core::{
    FilterSource, Host, OutputPipeline, RenderCallbackHandle, VideoHandle, VideoTimelineInfo,
};

use crate::config::FilterConfig;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum LifecycleState {
    Inactive = 0,
    Starting = 1,
    Active = 2,
    Stopping = 3,
}

/// Result of a [`OutputLifecycle::start`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// Not inactive; nothing was done.
    AlreadyActive,
    /// The filter is disabled.
    Disabled,
    /// The upstream target has no size yet. Retried on a later tick.
    NoDimensions,
    /// Acquisition or output start failed; everything was released.
    Failed,
}

/// Resources held while the output runs. Each slot is emptied on release.
#[derive(Default)]
struct OutputResources {
    render_callback: Option<RenderCallbackHandle>,
    output: Option<Box<dyn OutputPipeline>>,
    video: Option<VideoHandle>,
    bridge: Option<FrameBridge>,
}

impl OutputResources {
    fn release(&mut self, host: &dyn Host) {
        // Callback first: no capture may begin once teardown starts.
        drop(self.render_callback.take());

        if let Some(mut output) = self.output.take() {
            output.stop();
        }
        if let Some(video) = &self.video {
            video.stop();
        }
        if let Some(bridge) = self.bridge.take() {
            bridge.destroy(host);
        }
        drop(self.video.take());
    }
}

pub struct OutputLifecycle {
    host: Arc<dyn Host>,
    source: Arc<dyn FilterSource>,
    config: FilterConfig,
    state: AtomicU8,
    start_queued: AtomicBool,
    resources: Mutex<OutputResources>,
}

impl OutputLifecycle {
    pub fn new(host: Arc<dyn Host>, source: Arc<dyn FilterSource>, config: FilterConfig) -> Arc<Self> {
        Arc::new(Self {
            host,
            source,
            config,
            state: AtomicU8::new(LifecycleState::Inactive as u8),
            start_queued: AtomicBool::new(false),
            resources: Mutex::new(OutputResources::default()),
        })
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn source(&self) -> &Arc<dyn FilterSource> {
        &self.source
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire)).unwrap_or(LifecycleState::Inactive)
    }

    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    /// Size of the frames being produced, while active.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.resources.lock().bridge.as_ref().map(FrameBridge::size)
    }

    fn transition(&self, from: LifecycleState, to: LifecycleState) -> Result<(), LifecycleState> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|s| LifecycleState::from_u8(s).unwrap_or(LifecycleState::Inactive))
    }

    fn set_state(&self, state: LifecycleState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Start the output. Runs on the UI/control context; never call it from
    /// the render thread, use [`OutputLifecycle::schedule_start`] there.
    pub fn start(self: &Arc<Self>) -> StartOutcome {
        if let Err(state) = self.transition(LifecycleState::Inactive, LifecycleState::Starting) {
            trace!(?state, "start ignored");
            return StartOutcome::AlreadyActive;
        }

        let outcome = self.try_start();
        self.set_state(if outcome == StartOutcome::Started {
            LifecycleState::Active
        } else {
            LifecycleState::Inactive
        });
        outcome
    }

    fn try_start(self: &Arc<Self>) -> StartOutcome {
        if !self.source.enabled() {
            return StartOutcome::Disabled;
        }

        let Some((width, height)) = self.source.target_size().filter(|&(w, h)| w > 0 && h > 0) else {
            debug!("upstream has no size yet, start deferred");
            return StartOutcome::NoDimensions;
        };

        let mut resources = OutputResources::default();
        if let Err(e) = self.acquire(&mut resources, width, height) {
            warn!(output_id = %self.config.output_id, "output start failed: {e:#}");
            resources.release(&*self.host);
            return StartOutcome::Failed;
        }

        let weak = Arc::downgrade(self);
        let mut guard = self.resources.lock();
        *guard = resources;
        guard.render_callback = Some(RenderCallbackHandle::register(
            &self.host,
            Arc::new(move |_cx: u32, _cy: u32| {
                if let Some(lifecycle) = weak.upgrade() {
                    lifecycle.render();
                }
            }),
        ));
        drop(guard);

        info!(output_id = %self.config.output_id, width, height, "output started");
        StartOutcome::Started
    }

    fn acquire(&self, resources: &mut OutputResources, width: u32, height: u32) -> Result<()> {
        let settings = self.source.settings();
        resources.output = Some(
            self.host
                .create_output(&self.config.output_id, &self.config.output_name, &settings)
                .with_context(|| format!("failed to create output `{}`", self.config.output_id))?,
        );

        resources.bridge = Some(FrameBridge::new(&*self.host, width, height, self.config.format)?);

        let info = VideoTimelineInfo::mirroring(
            &self.host.main_video_info(),
            self.source.name(),
            width,
            height,
            self.config.format,
            self.config.cache_size,
        );
        let video = self.host.open_video(info).context("failed to open video timeline")?;
        resources.video = Some(video.clone());

        let output = resources
            .output
            .as_mut()
            .context("output released during start")?;
        output.set_media(video, self.host.audio());
        output.start().context("output refused to start")
    }

    /// Stop the output and release everything it held. Returns `false` if it
    /// wasn't active.
    pub fn stop(&self) -> bool {
        if let Err(state) = self.transition(LifecycleState::Active, LifecycleState::Stopping) {
            trace!(?state, "stop ignored");
            return false;
        }

        // Take everything out first so the render callback, which locks the
        // same mutex, can't block its own removal.
        let mut resources = std::mem::take(&mut *self.resources.lock());
        resources.release(&*self.host);

        self.set_state(LifecycleState::Inactive);
        info!(output_id = %self.config.output_id, "output stopped");
        true
    }

    /// Queue [`OutputLifecycle::start`] onto the UI context. Requests made
    /// while one is already queued are folded into it.
    pub fn schedule_start(self: &Arc<Self>) -> bool {
        if self.start_queued.swap(true, Ordering::AcqRel) {
            trace!("start already queued");
            return false;
        }

        let weak = Arc::downgrade(self);
        self.host.queue_ui_task(Box::new(move || {
            let Some(lifecycle) = weak.upgrade() else {
                return;
            };
            lifecycle.start_queued.store(false, Ordering::Release);
            lifecycle.start();
        }));
        true
    }

    /// Make the render target reusable for the coming frame.
    pub fn reset_render_target(&self) {
        if let Some(bridge) = self.resources.lock().bridge.as_mut() {
            bridge.reset();
        }
    }

    /// Per-frame capture, run from the host's render callback.
    pub fn render(&self) -> Option<PublishOutcome> {
        let mut guard = self.resources.lock();
        let OutputResources {
            bridge: Some(bridge),
            video: Some(video),
            ..
        } = &mut *guard
        else {
            return None;
        };

        let timestamp = self.host.video_frame_time();
        let outcome = bridge.render(&*self.host, &*self.source, &**video, timestamp)?;
        match outcome {
            PublishOutcome::Published { rows } => trace!(timestamp, rows, "frame published"),
            other => trace!(timestamp, ?other, "frame dropped"),
        }
        Some(outcome)
    }
}

impl Drop for OutputLifecycle {
    fn drop(&mut self) {
        let resources = self.resources.get_mut();
        if resources.render_callback.is_some() || resources.output.is_some() {
            error!("output lifecycle dropped while active");
            resources.release(&*self.host);
        }
    }
}
