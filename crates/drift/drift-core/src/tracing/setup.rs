//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Drift tracing/logging system.
///
/// Reads the `DRIFT_LOG` environment variable for per-subsystem log levels.
/// Format: `DRIFT_LOG=drift_analysis::matcher=debug,drift_storage=warn`
///
/// Falls back to `drift=info` if `DRIFT_LOG` is not set or is invalid.
///
/// Calling it more than once is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("DRIFT_LOG")
            .unwrap_or_else(|_| EnvFilter::new("drift=info"));

        // try_init: a host process may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
