//! Video output filter.
//!
//! Captures the rendered output of the filter chain it sits in and feeds it,
//! one frame per render tick, into a secondary output pipeline running on its
//! own video timeline.
//!
//! - [`OutputFilter`] is the instance the host drives (create, update,
//!   properties, tick, destroy).
//! - [`OutputLifecycle`] owns the output, its timeline and the
//!   [`vidout_bridge::FrameBridge`], and starts or stops them as a unit.
//! - [`FilterConfig`] selects the output type and frame format.

pub mod config;
pub mod filter;
pub mod lifecycle;
pub mod restart;

pub use config::FilterConfig;
pub use filter::{OutputFilter, FILTER_ID};
pub use lifecycle::{LifecycleState, OutputLifecycle, StartOutcome};
pub use restart::RestartFlag;
