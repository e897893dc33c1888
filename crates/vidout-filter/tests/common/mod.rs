//! Recording host used by the integration tests.
//!
//! Every resource the filter can acquire bumps a counter on creation and on
//! release, and notable calls are appended to an ordered event log.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use anyhow::Result;
use parking_lot::Mutex;
use vidout_core::{
    AudioHandle, BlendType, EventCallbackId, FilterSource, Frontend, FrontendCallback,
    FrontendEvent, Graphics, Host, LockedFrame, MappedSurface, OutputPipeline, Properties,
    Property, PropertyKind, RenderCallback, RenderCallbackId, Settings, StageSurface, TexRender,
    TextureHandle, UiTask, VideoFormat, VideoHandle, VideoRange, VideoTimeline, VideoTimelineInfo,
    ColorSpace,
};

#[derive(Default)]
pub struct Counters {
    pub texrenders_created: AtomicUsize,
    pub texrenders_destroyed: AtomicUsize,
    pub stagesurfaces_created: AtomicUsize,
    pub stagesurfaces_destroyed: AtomicUsize,
    pub outputs_created: AtomicUsize,
    pub outputs_released: AtomicUsize,
    pub output_starts: AtomicUsize,
    pub output_stops: AtomicUsize,
    pub timelines_opened: AtomicUsize,
    pub timelines_closed: AtomicUsize,
    pub frames_locked: AtomicUsize,
    pub frames_unlocked: AtomicUsize,
    pub maps: AtomicUsize,
    pub unmaps: AtomicUsize,
    pub callbacks_added: AtomicUsize,
    pub callbacks_removed: AtomicUsize,
    pub graphics_depth: AtomicI32,
    events: Mutex<Vec<String>>,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn event(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    pub fn take_events(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn live_texrenders(&self) -> usize {
        Self::get(&self.texrenders_created) - Self::get(&self.texrenders_destroyed)
    }

    pub fn live_stagesurfaces(&self) -> usize {
        Self::get(&self.stagesurfaces_created) - Self::get(&self.stagesurfaces_destroyed)
    }

    pub fn live_outputs(&self) -> usize {
        Self::get(&self.outputs_created) - Self::get(&self.outputs_released)
    }

    pub fn live_timelines(&self) -> usize {
        Self::get(&self.timelines_opened) - Self::get(&self.timelines_closed)
    }

    pub fn live_callbacks(&self) -> usize {
        Self::get(&self.callbacks_added) - Self::get(&self.callbacks_removed)
    }

    /// Nothing is held and every acquisition was paired with a release.
    pub fn assert_balanced(&self) {
        assert_eq!(self.live_texrenders(), 0, "texrenders leaked");
        assert_eq!(self.live_stagesurfaces(), 0, "stagesurfaces leaked");
        assert_eq!(self.live_outputs(), 0, "outputs leaked");
        assert_eq!(self.live_timelines(), 0, "timelines leaked");
        assert_eq!(self.live_callbacks(), 0, "render callbacks leaked");
        assert_eq!(
            Self::get(&self.frames_locked),
            Self::get(&self.frames_unlocked),
            "locked frames leaked"
        );
        assert_eq!(Self::get(&self.maps), Self::get(&self.unmaps), "maps leaked");
        assert_eq!(self.graphics_depth.load(Ordering::SeqCst), 0, "graphics scope leaked");
    }
}

// ---------------------------------------------------------------------------
// Graphics resources
// ---------------------------------------------------------------------------

struct MockTexRender {
    counters: Arc<Counters>,
    rendered: bool,
    size: (u32, u32),
}

impl TexRender for MockTexRender {
    fn reset(&mut self) {
        self.rendered = false;
    }

    fn begin(&mut self, width: u32, height: u32) -> bool {
        if self.rendered {
            return false;
        }
        self.size = (width, height);
        true
    }

    fn end(&mut self) {
        self.rendered = true;
    }

    fn texture(&self) -> Option<TextureHandle> {
        self.rendered.then_some(TextureHandle(1))
    }
}

impl Drop for MockTexRender {
    fn drop(&mut self) {
        assert!(
            self.counters.graphics_depth.load(Ordering::SeqCst) > 0,
            "texrender destroyed outside graphics scope"
        );
        Counters::bump(&self.counters.texrenders_destroyed);
        self.counters.event("destroy texrender");
    }
}

struct MockStageSurface {
    counters: Arc<Counters>,
    width: u32,
    height: u32,
    linesize: u32,
    map_ok: Arc<AtomicBool>,
    pixels: Vec<u8>,
}

struct MockMapped<'a> {
    surface: &'a MockStageSurface,
}

impl MappedSurface for MockMapped<'_> {
    fn data(&self) -> &[u8] {
        &self.surface.pixels
    }

    fn linesize(&self) -> u32 {
        self.surface.linesize
    }
}

impl Drop for MockMapped<'_> {
    fn drop(&mut self) {
        Counters::bump(&self.surface.counters.unmaps);
    }
}

impl StageSurface for MockStageSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> VideoFormat {
        VideoFormat::Bgra
    }

    fn stage(&mut self, _texture: TextureHandle) {}

    fn map(&mut self) -> Option<Box<dyn MappedSurface + '_>> {
        if !self.map_ok.load(Ordering::SeqCst) {
            return None;
        }
        Counters::bump(&self.counters.maps);
        Some(Box::new(MockMapped { surface: self }))
    }
}

impl Drop for MockStageSurface {
    fn drop(&mut self) {
        assert!(
            self.counters.graphics_depth.load(Ordering::SeqCst) > 0,
            "stagesurface destroyed outside graphics scope"
        );
        Counters::bump(&self.counters.stagesurfaces_destroyed);
        self.counters.event("destroy stagesurface");
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

pub struct MockTimeline {
    counters: Arc<Counters>,
    info: VideoTimelineInfo,
    padding: u32,
    lock_ok: Arc<AtomicBool>,
    buffer: Mutex<Vec<u8>>,
}

impl MockTimeline {
    pub fn linesize(&self) -> u32 {
        self.info.width * 4 + self.padding
    }

    pub fn frame(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }
}

struct MockLockedFrame<'a> {
    timeline: &'a MockTimeline,
    buffer: parking_lot::MutexGuard<'a, Vec<u8>>,
    timestamp: u64,
}

impl LockedFrame for MockLockedFrame<'_> {
    fn timestamp(&self) -> u64 {
        self.timestamp
    }

    fn linesize(&self, plane: usize) -> u32 {
        if plane == 0 {
            self.timeline.linesize()
        } else {
            0
        }
    }

    fn plane_mut(&mut self, _plane: usize) -> &mut [u8] {
        &mut self.buffer
    }
}

impl Drop for MockLockedFrame<'_> {
    fn drop(&mut self) {
        Counters::bump(&self.timeline.counters.frames_unlocked);
    }
}

impl VideoTimeline for MockTimeline {
    fn info(&self) -> &VideoTimelineInfo {
        &self.info
    }

    fn lock_frame(&self, _count: u32, timestamp: u64) -> Option<Box<dyn LockedFrame + '_>> {
        if !self.lock_ok.load(Ordering::SeqCst) {
            return None;
        }
        Counters::bump(&self.counters.frames_locked);
        Some(Box::new(MockLockedFrame {
            timeline: self,
            buffer: self.buffer.lock(),
            timestamp,
        }))
    }

    fn stop(&self) {
        self.counters.event("stop timeline");
    }
}

impl Drop for MockTimeline {
    fn drop(&mut self) {
        Counters::bump(&self.counters.timelines_closed);
        self.counters.event("close timeline");
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

pub type StartHook = Box<dyn FnOnce() + Send>;

struct MockOutput {
    counters: Arc<Counters>,
    start_ok: bool,
    start_hook: Arc<Mutex<Option<StartHook>>>,
    video: Option<VideoHandle>,
    pub settings: Settings,
}

impl OutputPipeline for MockOutput {
    fn set_media(&mut self, video: VideoHandle, _audio: AudioHandle) {
        self.video = Some(video);
    }

    fn start(&mut self) -> Result<()> {
        Counters::bump(&self.counters.output_starts);
        let hook = self.start_hook.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        anyhow::ensure!(self.start_ok, "device busy");
        Ok(())
    }

    fn stop(&mut self) {
        Counters::bump(&self.counters.output_stops);
        self.counters.event("stop output");
    }
}

impl Drop for MockOutput {
    fn drop(&mut self) {
        Counters::bump(&self.counters.outputs_released);
        self.counters.event("release output");
    }
}

// ---------------------------------------------------------------------------
// Frontend
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockFrontend {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(EventCallbackId, FrontendCallback)>>,
}

impl MockFrontend {
    pub fn emit(&self, event: FrontendEvent) {
        let callbacks: Vec<_> = self.callbacks.lock().iter().map(|(_, cb)| cb.clone()).collect();
        for cb in callbacks {
            cb(event);
        }
    }

    pub fn subscribers(&self) -> usize {
        self.callbacks.lock().len()
    }
}

impl Frontend for MockFrontend {
    fn add_event_callback(&self, callback: FrontendCallback) -> EventCallbackId {
        let id = EventCallbackId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.callbacks.lock().push((id, callback));
        id
    }

    fn remove_event_callback(&self, id: EventCallbackId) {
        self.callbacks.lock().retain(|(cb_id, _)| *cb_id != id);
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

pub struct MockHost {
    pub counters: Arc<Counters>,
    pub output_start_ok: AtomicBool,
    pub fail_open_video: AtomicBool,
    pub lock_ok: Arc<AtomicBool>,
    pub map_ok: Arc<AtomicBool>,
    /// Extra bytes per row in staging maps.
    pub stage_padding: u32,
    /// Extra bytes per row in locked timeline frames.
    pub frame_padding: u32,
    /// Runs once, from inside the next output start.
    pub output_start_hook: Arc<Mutex<Option<StartHook>>>,
    pub frame_time: AtomicU64,
    pub frontend: Option<MockFrontend>,
    pub stage_sizes: Mutex<Vec<(u32, u32)>>,
    pub output_settings: Mutex<Vec<Settings>>,
    next_callback: AtomicU64,
    callbacks: Mutex<Vec<(RenderCallbackId, RenderCallback)>>,
    ui_tasks: Mutex<Vec<UiTask>>,
    timelines: Mutex<Vec<Weak<MockTimeline>>>,
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None, 0, 0))
    }

    pub fn with_frontend() -> Arc<Self> {
        Arc::new(Self::build(Some(MockFrontend::default()), 0, 0))
    }

    pub fn with_stage_padding(padding: u32) -> Arc<Self> {
        Arc::new(Self::build(None, padding, 0))
    }

    pub fn with_frame_padding(padding: u32) -> Arc<Self> {
        Arc::new(Self::build(None, 0, padding))
    }

    fn build(frontend: Option<MockFrontend>, stage_padding: u32, frame_padding: u32) -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            output_start_ok: AtomicBool::new(true),
            fail_open_video: AtomicBool::new(false),
            lock_ok: Arc::new(AtomicBool::new(true)),
            map_ok: Arc::new(AtomicBool::new(true)),
            stage_padding,
            frame_padding,
            output_start_hook: Arc::new(Mutex::new(None)),
            frame_time: AtomicU64::new(1_000),
            frontend,
            stage_sizes: Mutex::new(Vec::new()),
            output_settings: Mutex::new(Vec::new()),
            next_callback: AtomicU64::new(1),
            callbacks: Mutex::new(Vec::new()),
            ui_tasks: Mutex::new(Vec::new()),
            timelines: Mutex::new(Vec::new()),
        }
    }

    pub fn as_host(self: &Arc<Self>) -> Arc<dyn Host> {
        self.clone()
    }

    /// Run every queued UI task, returning how many ran.
    pub fn run_ui_tasks(&self) -> usize {
        let tasks = std::mem::take(&mut *self.ui_tasks.lock());
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    pub fn queued_ui_tasks(&self) -> usize {
        self.ui_tasks.lock().len()
    }

    /// Invoke the registered render callbacks once, like one host frame.
    pub fn render_frame(&self) {
        let callbacks: Vec<_> = self.callbacks.lock().iter().map(|(_, cb)| cb.clone()).collect();
        for cb in callbacks {
            cb(1920, 1080);
        }
        self.frame_time.fetch_add(16_666_667, Ordering::SeqCst);
    }

    pub fn render_callbacks(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// The most recently opened timeline that is still open.
    pub fn current_timeline(&self) -> Option<Arc<MockTimeline>> {
        self.timelines.lock().iter().rev().find_map(Weak::upgrade)
    }
}

impl Graphics for MockHost {
    fn enter_graphics(&self) {
        self.counters.graphics_depth.fetch_add(1, Ordering::SeqCst);
    }

    fn leave_graphics(&self) {
        self.counters.graphics_depth.fetch_sub(1, Ordering::SeqCst);
    }

    fn create_texrender(&self, _format: VideoFormat) -> Result<Box<dyn TexRender>> {
        Counters::bump(&self.counters.texrenders_created);
        Ok(Box::new(MockTexRender {
            counters: self.counters.clone(),
            rendered: false,
            size: (0, 0),
        }))
    }

    fn create_stagesurface(&self, width: u32, height: u32, _format: VideoFormat) -> Result<Box<dyn StageSurface>> {
        Counters::bump(&self.counters.stagesurfaces_created);
        self.stage_sizes.lock().push((width, height));
        let linesize = width * 4 + self.stage_padding;
        let pixels = (0..linesize as usize * height as usize)
            .map(|i| {
                let (row, col) = (i / linesize as usize, i % linesize as usize);
                if col < width as usize * 4 { (row as u8).wrapping_add(1) } else { 0xEE }
            })
            .collect();
        Ok(Box::new(MockStageSurface {
            counters: self.counters.clone(),
            width,
            height,
            linesize,
            map_ok: self.map_ok.clone(),
            pixels,
        }))
    }

    fn clear(&self, _color: [f32; 4]) {}

    fn ortho(&self, _l: f32, _r: f32, _t: f32, _b: f32, _n: f32, _f: f32) {}

    fn blend_state_push(&self) {}

    fn blend_function(&self, _src: BlendType, _dest: BlendType) {}

    fn blend_state_pop(&self) {}
}

impl Host for MockHost {
    fn main_video_info(&self) -> VideoTimelineInfo {
        VideoTimelineInfo {
            name: "main".into(),
            format: VideoFormat::Nv12,
            width: 1920,
            height: 1080,
            fps_num: 60,
            fps_den: 1,
            colorspace: ColorSpace::Cs709,
            range: VideoRange::Partial,
            cache_size: 4,
        }
    }

    fn video_frame_time(&self) -> u64 {
        self.frame_time.load(Ordering::SeqCst)
    }

    fn audio(&self) -> AudioHandle {
        AudioHandle(1)
    }

    fn open_video(&self, info: VideoTimelineInfo) -> Result<VideoHandle> {
        anyhow::ensure!(!self.fail_open_video.load(Ordering::SeqCst), "video subsystem busy");
        Counters::bump(&self.counters.timelines_opened);
        let len = (info.width * 4 + self.frame_padding) as usize * info.height as usize;
        let timeline = Arc::new(MockTimeline {
            counters: self.counters.clone(),
            info,
            padding: self.frame_padding,
            lock_ok: self.lock_ok.clone(),
            buffer: Mutex::new(vec![0; len]),
        });
        self.timelines.lock().push(Arc::downgrade(&timeline));
        Ok(timeline)
    }

    fn create_output(&self, _id: &str, _name: &str, settings: &Settings) -> Result<Box<dyn OutputPipeline>> {
        Counters::bump(&self.counters.outputs_created);
        self.output_settings.lock().push(settings.clone());
        Ok(Box::new(MockOutput {
            counters: self.counters.clone(),
            start_ok: self.output_start_ok.load(Ordering::SeqCst),
            start_hook: self.output_start_hook.clone(),
            video: None,
            settings: settings.clone(),
        }))
    }

    fn output_properties(&self, _id: &str) -> Properties {
        let mut props = Properties::new();
        props.add(Property::new("ui_prop_device", "Device", PropertyKind::List));
        props.add(Property::new("ui_prop_output", "Output", PropertyKind::List));
        props.add(Property::new("ui_prop_auto_start_output", "Auto start on launch", PropertyKind::Bool));
        props
    }

    fn add_render_callback(&self, callback: RenderCallback) -> RenderCallbackId {
        Counters::bump(&self.counters.callbacks_added);
        let id = RenderCallbackId(self.next_callback.fetch_add(1, Ordering::SeqCst));
        self.callbacks.lock().push((id, callback));
        id
    }

    fn remove_render_callback(&self, id: RenderCallbackId) {
        Counters::bump(&self.counters.callbacks_removed);
        self.counters.event("remove render callback");
        self.callbacks.lock().retain(|(cb_id, _)| *cb_id != id);
    }

    fn queue_ui_task(&self, task: UiTask) {
        self.ui_tasks.lock().push(task);
    }

    fn frontend(&self) -> Option<&dyn Frontend> {
        self.frontend.as_ref().map(|f| f as &dyn Frontend)
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

pub struct MockSource {
    pub enabled: AtomicBool,
    pub parent: AtomicBool,
    pub size: Mutex<Option<(u32, u32)>>,
    pub settings: Mutex<Settings>,
    pub upstream_renders: AtomicUsize,
}

impl MockSource {
    pub fn new(width: u32, height: u32) -> Arc<Self> {
        let mut settings = Settings::new();
        settings.set("ui_prop_device", "io4k");
        Arc::new(Self {
            enabled: AtomicBool::new(true),
            parent: AtomicBool::new(true),
            size: Mutex::new(Some((width, height))),
            settings: Mutex::new(settings),
            upstream_renders: AtomicUsize::new(0),
        })
    }

    pub fn as_source(self: &Arc<Self>) -> Arc<dyn FilterSource> {
        self.clone()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn set_size(&self, width: u32, height: u32) {
        *self.size.lock() = Some((width, height));
    }
}

impl FilterSource for MockSource {
    fn name(&self) -> String {
        "Program Out".into()
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn settings(&self) -> Settings {
        self.settings.lock().clone()
    }

    fn has_parent(&self) -> bool {
        self.parent.load(Ordering::SeqCst)
    }

    fn target_size(&self) -> Option<(u32, u32)> {
        *self.size.lock()
    }

    fn skip_video_filter(&self) {
        self.upstream_renders.fetch_add(1, Ordering::SeqCst);
    }
}
