//! [`OutputFilter`]: the filter instance the host drives through its
//! lifecycle hooks.
//!
//! The filter never starts its output from the render thread. Settings
//! changes only raise a restart request; the next tick turns requests and
//! enable/disable changes into a synchronous stop and a start queued onto the
//! UI context.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, trace};
use vidout_core::{
    FilterDescriptor, FilterSource, FrontendEvent, FrontendSubscription, Host, Properties,
    Settings, SourceFilter, SourceType, OUTPUT_VIDEO,
};

use crate::config::FilterConfig;
use crate::lifecycle::{LifecycleState, OutputLifecycle};
use crate::restart::RestartFlag;

pub const FILTER_ID: &str = "vidout_filter";

pub struct OutputFilter {
    lifecycle: Arc<OutputLifecycle>,
    need_restart: RestartFlag,
    frontend: Option<FrontendSubscription>,
}

impl OutputFilter {
    pub fn with_config(source: Arc<dyn FilterSource>, host: Arc<dyn Host>, config: FilterConfig) -> Self {
        let lifecycle = OutputLifecycle::new(host.clone(), source, config);

        let weak = Arc::downgrade(&lifecycle);
        let frontend = FrontendSubscription::subscribe(
            &host,
            Arc::new(move |event: FrontendEvent| {
                let Some(lifecycle) = weak.upgrade() else {
                    return;
                };
                match event {
                    FrontendEvent::FinishedLoading => {
                        lifecycle.start();
                    }
                    FrontendEvent::ScriptingShutdown | FrontendEvent::Exit => {
                        lifecycle.stop();
                    }
                    FrontendEvent::Other(_) => {}
                }
            }),
        );

        Self {
            lifecycle,
            need_restart: RestartFlag::new(),
            frontend,
        }
    }

    pub fn lifecycle(&self) -> &Arc<OutputLifecycle> {
        &self.lifecycle
    }

    pub fn restart_requested(&self) -> bool {
        self.need_restart.is_requested()
    }
}

impl SourceFilter for OutputFilter {
    fn descriptor() -> FilterDescriptor {
        FilterDescriptor {
            id: FILTER_ID,
            ty: SourceType::Filter,
            output_flags: OUTPUT_VIDEO,
            name: "AJAOutput",
        }
    }

    fn create(_settings: &Settings, source: Arc<dyn FilterSource>, host: Arc<dyn Host>) -> Result<Self> {
        vidout_core::log::init_default_subscriber();
        debug!(source = %source.name(), "creating output filter");
        Ok(Self::with_config(source, host, FilterConfig::default()))
    }

    fn update(&self, _settings: &Settings) {
        debug!("settings changed, restart requested");
        self.need_restart.request();
    }

    fn properties(&self) -> Properties {
        let config = self.lifecycle.config();
        let mut props = self.lifecycle.host().output_properties(&config.output_id);
        if !props.set_visible(&config.auto_start_property, false) {
            trace!(property = %config.auto_start_property, "output has no auto-start property");
        }
        props
    }

    fn video_tick(&self, _seconds: f32) {
        self.lifecycle.reset_render_target();

        let restart = self.need_restart.take();
        let mut need_start = restart;
        let mut need_stop = restart;

        let enabled = self.lifecycle.source().enabled();
        match self.lifecycle.state() {
            LifecycleState::Inactive if enabled => need_start = true,
            LifecycleState::Active if !enabled => need_stop = true,
            _ => {}
        }

        if need_stop
            && !self.lifecycle.stop()
            && restart
            && self.lifecycle.state() == LifecycleState::Starting
        {
            // The start in flight read the old settings; restart again once it lands.
            debug!("restart requested during start, deferred to next tick");
            self.need_restart.request();
        }
        if need_start {
            self.lifecycle.schedule_start();
        }
    }
}

impl Drop for OutputFilter {
    fn drop(&mut self) {
        drop(self.frontend.take());
        self.lifecycle.stop();
    }
}
