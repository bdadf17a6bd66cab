//! Logging setup for the `qlanes` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is left to
//! the application. `RUST_LOG` takes precedence over the configured filter.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor configuration provide one.
pub const DEFAULT_FILTER: &str = "warn";

/// Install a stderr subscriber. Calling this more than once is harmless.
pub fn initialize(filter: &str) {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(filter))
		.unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.with_thread_names(true)
		.try_init();
}
