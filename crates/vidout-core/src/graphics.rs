//! Graphics capabilities consumed from the host: offscreen render targets,
//! CPU-readable staging surfaces, and the small amount of device state the
//! capture pass touches.

use anyhow::Result;

use crate::video::VideoFormat;

/// Opaque GPU texture handle owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Blend factors for [`Graphics::blend_function`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendType {
    Zero,
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DstColor,
    InvDstColor,
    DstAlpha,
    InvDstAlpha,
}

/// Reusable offscreen render target.
///
/// Destroyed when dropped. Drop it inside a [`GraphicsScope`].
pub trait TexRender: Send {
    /// Mark the target as reusable for the next frame.
    fn reset(&mut self);

    /// Begin a pass of the given size. Returns `false` if a pass can't be
    /// started (already rendered this frame, allocation failure).
    fn begin(&mut self, width: u32, height: u32) -> bool;

    fn end(&mut self);

    /// Texture holding the last completed pass.
    fn texture(&self) -> Option<TextureHandle>;
}

/// A mapped view of a staging surface. Unmaps when dropped.
pub trait MappedSurface {
    fn data(&self) -> &[u8];

    /// Row stride of [`MappedSurface::data`] in bytes.
    fn linesize(&self) -> u32;
}

/// CPU-readable copy target for a GPU texture.
///
/// Destroyed when dropped. Drop it inside a [`GraphicsScope`].
pub trait StageSurface: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn format(&self) -> VideoFormat;

    /// Queue a copy of `texture` into this surface.
    fn stage(&mut self, texture: TextureHandle);

    /// Map the staged pixels. `None` if mapping failed.
    fn map(&mut self) -> Option<Box<dyn MappedSurface + '_>>;
}

/// The host's graphics subsystem.
pub trait Graphics: Send + Sync {
    /// Acquire the graphics context for the calling thread. Pair with
    /// [`Graphics::leave_graphics`]; prefer [`GraphicsScope`].
    fn enter_graphics(&self);
    fn leave_graphics(&self);

    fn create_texrender(&self, format: VideoFormat) -> Result<Box<dyn TexRender>>;
    fn create_stagesurface(
        &self,
        width: u32,
        height: u32,
        format: VideoFormat,
    ) -> Result<Box<dyn StageSurface>>;

    /// Clear the current color target.
    fn clear(&self, color: [f32; 4]);

    fn ortho(&self, left: f32, right: f32, top: f32, bottom: f32, znear: f32, zfar: f32);

    fn blend_state_push(&self);
    fn blend_function(&self, src: BlendType, dest: BlendType);
    fn blend_state_pop(&self);
}

/// Holds the graphics context for as long as it lives.
#[must_use = "the graphics context is released when the scope is dropped"]
pub struct GraphicsScope<'a, G: Graphics + ?Sized> {
    graphics: &'a G,
}

impl<'a, G: Graphics + ?Sized> GraphicsScope<'a, G> {
    pub fn enter(graphics: &'a G) -> Self {
        graphics.enter_graphics();
        Self { graphics }
    }
}

impl<G: Graphics + ?Sized> Drop for GraphicsScope<'_, G> {
    fn drop(&mut self) {
        self.graphics.leave_graphics();
    }
}
