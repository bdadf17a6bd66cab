use std::path::PathBuf;
use std::time::Duration;

use qlanes::LaneConfig;

mod errors;
mod sources;
mod summary;
mod validation;

pub(crate) use errors::ConfigError;
pub(crate) use sources::{ConfigSources, SettingSource};

/// Application-ready configuration derived from user input, config files and
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
	pub data: Option<PathBuf>,
	pub display_limit: usize,
	pub initial_lanes: usize,
	pub shutdown_grace: Duration,
	pub preview_width: usize,
	pub log_filter: String,
}

impl ResolvedConfig {
	pub(super) fn validate(&self, sources: &ConfigSources) -> Result<(), ConfigError> {
		validation::validate(self, sources)
	}

	pub fn lane_config(&self) -> LaneConfig {
		LaneConfig::default()
			.with_display_limit(self.display_limit)
			.with_shutdown_grace(self.shutdown_grace)
	}

	/// Print a human readable summary of the effective configuration.
	pub fn print_summary(&self) {
		summary::print_summary(self);
	}
}
