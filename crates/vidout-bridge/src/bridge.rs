//! [`FrameBridge`]: render-to-texture capture and CPU handoff of one frame per
//! render tick.
//!
//! A bridge owns a reusable render target and a staging surface of the same
//! size. Each tick the filter's upstream content is rendered into the target
//! ([`FrameBridge::capture`]), staged to CPU memory and copied into a
//! write-locked frame of the output timeline ([`FrameBridge::publish`]).
//!
//! Every failure inside a tick drops the frame and leaves the bridge usable
//! for the next one. Locked frames and surface maps are RAII values, so they
//! are released on every path.

use anyhow::{Context, Result};
use tracing::trace;
use vidout_core::{
    BlendType, FilterSource, Graphics, GraphicsScope, StageSurface, TexRender, VideoFormat,
    VideoTimeline,
};

use crate::rows::copy_rows;

/// Orthographic depth range used by the capture pass.
const ORTHO_ZNEAR: f32 = -100.0;
const ORTHO_ZFAR: f32 = 100.0;

/// What happened to the frame handed to [`FrameBridge::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The frame was copied into the timeline.
    Published { rows: u32 },
    /// The timeline had no free slot.
    Backpressure,
    /// The render target has no completed texture.
    NoTexture,
    /// The staging surface could not be mapped.
    MapFailed,
}

pub struct FrameBridge {
    texrender: Box<dyn TexRender>,
    stagesurface: Box<dyn StageSurface>,
}

impl FrameBridge {
    /// Allocate a render target and a `width` x `height` staging surface.
    pub fn new<G: Graphics + ?Sized>(
        graphics: &G,
        width: u32,
        height: u32,
        format: VideoFormat,
    ) -> Result<Self> {
        let _scope = GraphicsScope::enter(graphics);
        let texrender = graphics
            .create_texrender(format)
            .context("failed to create render target")?;
        let stagesurface = graphics
            .create_stagesurface(width, height, format)
            .context("failed to create staging surface")?;
        Ok(Self {
            texrender,
            stagesurface,
        })
    }

    /// Free the GPU resources inside the graphics context.
    pub fn destroy<G: Graphics + ?Sized>(self, graphics: &G) {
        let _scope = GraphicsScope::enter(graphics);
        let Self {
            texrender,
            stagesurface,
        } = self;
        drop(stagesurface);
        drop(texrender);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.stagesurface.width(), self.stagesurface.height())
    }

    /// Make the render target reusable for the coming frame.
    pub fn reset(&mut self) {
        self.texrender.reset();
    }

    /// Render the filter's upstream content into the render target.
    ///
    /// Returns `false` without touching any state if the filter has no
    /// parent or the pass can't begin.
    pub fn capture<G: Graphics + ?Sized>(&mut self, graphics: &G, source: &dyn FilterSource) -> bool {
        let (width, height) = self.size();

        if !source.has_parent() {
            trace!("no parent, skipping capture");
            return false;
        }

        if !self.texrender.begin(width, height) {
            trace!(width, height, "render target refused to begin");
            return false;
        }

        graphics.clear([0.0; 4]);
        graphics.ortho(0.0, width as f32, 0.0, height as f32, ORTHO_ZNEAR, ORTHO_ZFAR);

        graphics.blend_state_push();
        graphics.blend_function(BlendType::One, BlendType::Zero);

        source.skip_video_filter();

        graphics.blend_state_pop();
        self.texrender.end();
        true
    }

    /// Copy the last captured texture into a locked frame of `video`.
    pub fn publish(&mut self, video: &dyn VideoTimeline, timestamp: u64) -> PublishOutcome {
        let Some(mut frame) = video.lock_frame(1, timestamp) else {
            trace!(timestamp, "no free frame slot");
            return PublishOutcome::Backpressure;
        };

        let Some(texture) = self.texrender.texture() else {
            return PublishOutcome::NoTexture;
        };

        self.stagesurface.stage(texture);
        let height = self.stagesurface.height();

        let Some(mapped) = self.stagesurface.map() else {
            trace!("staging surface map failed");
            return PublishOutcome::MapFailed;
        };

        // Both strides cover the same pixel width; either may carry padding.
        let dst_linesize = frame.linesize(0);
        let src_linesize = mapped.linesize();
        let rows = copy_rows(
            frame.plane_mut(0),
            dst_linesize,
            mapped.data(),
            src_linesize,
            dst_linesize.min(src_linesize),
            height,
        );

        drop(mapped);
        drop(frame);

        PublishOutcome::Published { rows }
    }

    /// Capture then publish. `None` if the capture was skipped.
    pub fn render<G: Graphics + ?Sized>(
        &mut self,
        graphics: &G,
        source: &dyn FilterSource,
        video: &dyn VideoTimeline,
        timestamp: u64,
    ) -> Option<PublishOutcome> {
        if !self.capture(graphics, source) {
            return None;
        }
        Some(self.publish(video, timestamp))
    }
}
