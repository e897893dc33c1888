//! Frame acquisition and handoff.
//!
//! [`FrameBridge`] captures a filter's upstream content into a GPU render
//! target, stages it to CPU memory, and copies it into a write-locked frame
//! of a video timeline. [`rows`] holds the stride-aware copy it uses.
//! The render target and staging surface themselves come from the host's
//! [`vidout_core::Graphics`] implementation.

pub mod bridge;
pub mod rows;

pub use bridge::{FrameBridge, PublishOutcome};
pub use rows::{copy_rows, row_spans, RowSpan};
