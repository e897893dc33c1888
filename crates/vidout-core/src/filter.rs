//! Filter registration: the descriptor a host reads and the lifecycle hooks
//! it calls.

use std::sync::Arc;

use anyhow::Result;

use crate::host::{FilterSource, Host};
use crate::properties::Properties;
use crate::settings::Settings;

// Output capability flags.
pub const OUTPUT_VIDEO: u32 = 1 << 0;
pub const OUTPUT_AUDIO: u32 = 1 << 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Input,
    Filter,
    Transition,
    Scene,
}

/// Static description of a filter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub id: &'static str,
    pub ty: SourceType,
    pub output_flags: u32,
    /// Display name shown in the host UI.
    pub name: &'static str,
}

impl FilterDescriptor {
    pub fn has_video(&self) -> bool {
        self.output_flags & OUTPUT_VIDEO != 0
    }

    pub fn has_audio(&self) -> bool {
        self.output_flags & OUTPUT_AUDIO != 0
    }
}

/// Lifecycle hooks of a filter instance.
///
/// The host calls [`SourceFilter::create`] when the filter is added and drops
/// the instance (through [`SourceFilter::destroy`]) when it is removed.
pub trait SourceFilter: Send + Sync + Sized + 'static {
    fn descriptor() -> FilterDescriptor;

    fn create(settings: &Settings, source: Arc<dyn FilterSource>, host: Arc<dyn Host>) -> Result<Self>;

    fn destroy(self) {
        drop(self);
    }

    /// Settings changed in the UI.
    fn update(&self, settings: &Settings);

    fn properties(&self) -> Properties;

    /// Called once per frame on the render thread.
    fn video_tick(&self, seconds: f32);
}
