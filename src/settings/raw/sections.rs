use std::path::PathBuf;

use serde::Deserialize;

use crate::cli::CliArgs;

/// `[lanes]`: how runs are capped and how long shutdown waits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(in crate::settings) struct LanesSection {
	pub(in crate::settings) display_limit: Option<usize>,
	pub(in crate::settings) initial_lanes: Option<usize>,
	pub(in crate::settings) shutdown_grace_ms: Option<u64>,
}

impl LanesSection {
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(value) = cli.display_limit {
			self.display_limit = Some(value);
		}
		if let Some(value) = cli.lanes {
			self.initial_lanes = Some(value);
		}
	}
}

/// `[engine]`: where documents come from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(in crate::settings) struct EngineSection {
	pub(in crate::settings) data: Option<PathBuf>,
}

impl EngineSection {
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(data) = cli.data.clone() {
			self.data = Some(data);
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(in crate::settings) struct ConsoleSection {
	pub(in crate::settings) preview_width: Option<usize>,
}

impl ConsoleSection {
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(value) = cli.preview_width {
			self.preview_width = Some(value);
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(in crate::settings) struct LogSection {
	pub(in crate::settings) filter: Option<String>,
}

impl LogSection {
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(filter) = cli.log.clone() {
			self.filter = Some(filter);
		}
	}
}
