use std::time::Duration;

/// Number of documents materialized per run unless configured otherwise.
pub const DEFAULT_DISPLAY_LIMIT: usize = 1000;

/// Tunables for a [`Registry`](super::Registry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneConfig {
	/// Maximum documents kept from a single run.
	pub display_limit: usize,
	/// How long [`Registry::close`](super::Registry::close) waits for idle workers to exit.
	pub shutdown_grace: Duration,
}

impl Default for LaneConfig {
	fn default() -> Self {
		Self {
			display_limit: DEFAULT_DISPLAY_LIMIT,
			shutdown_grace: Duration::from_millis(500),
		}
	}
}

impl LaneConfig {
	#[must_use]
	pub fn with_display_limit(mut self, limit: usize) -> Self {
		self.display_limit = limit.max(1);
		self
	}

	#[must_use]
	pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
		self.shutdown_grace = grace;
		self
	}
}
