//! Process-wide `tracing` subscriber setup.
//!
//! Hosts load plugins as shared libraries and may already own a global
//! subscriber, so installation is attempted once and failure is ignored.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

/// Environment variable read for the log filter.
pub const LOG_ENV: &str = "VIDOUT_LOG";

static INIT: OnceCell<bool> = OnceCell::new();

/// Install a formatted subscriber filtered by `VIDOUT_LOG` (default `info`).
///
/// Returns `true` if this call (or an earlier one) installed the subscriber,
/// `false` if another global subscriber was already present.
pub fn init_default_subscriber() -> bool {
    *INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .with_target(true)
            .try_init()
            .is_ok()
    })
}
