//! Restart requests shared between the settings caller and the tick.

use std::sync::atomic::{AtomicBool, Ordering};

/// A test-and-clear flag.
///
/// Any number of [`RestartFlag::request`] calls between two
/// [`RestartFlag::take`] calls are observed exactly once.
#[derive(Debug, Default)]
pub struct RestartFlag(AtomicBool);

impl RestartFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Read and clear the flag in one step.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
