use std::env;
use std::time::Duration;

use anyhow::{Error, Result};
use qlanes::DEFAULT_DISPLAY_LIMIT;
use qlanes::logging::DEFAULT_FILTER;
use serde::Deserialize;

use crate::cli::CliArgs;

use super::resolved::{ConfigSources, ResolvedConfig, SettingSource};

mod sections;

use sections::{ConsoleSection, EngineSection, LanesSection, LogSection};

const DEFAULT_INITIAL_LANES: usize = 1;
const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 500;
const DEFAULT_PREVIEW_WIDTH: usize = 120;

/// Mirror of the configuration file representation before CLI overrides and
/// validation are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawConfig {
	lanes: LanesSection,
	engine: EngineSection,
	console: ConsoleSection,
	log: LogSection,
}

impl RawConfig {
	/// Apply CLI overrides on top of the raw configuration values.
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		self.lanes.apply_cli_overrides(cli);
		self.engine.apply_cli_overrides(cli);
		self.console.apply_cli_overrides(cli);
		self.log.apply_cli_overrides(cli);
	}

	/// Fill defaults and validate into a [`ResolvedConfig`].
	pub(super) fn resolve(self, cli: &CliArgs) -> Result<ResolvedConfig> {
		let sources = ConfigSources {
			display_limit: detect_source(
				cli.display_limit.is_some(),
				self.lanes.display_limit.is_some(),
				"QLANES__LANES__DISPLAY_LIMIT",
				"--display-limit",
				"lanes.display_limit",
			),
			initial_lanes: detect_source(
				cli.lanes.is_some(),
				self.lanes.initial_lanes.is_some(),
				"QLANES__LANES__INITIAL_LANES",
				"--lanes",
				"lanes.initial_lanes",
			),
			data: detect_source(
				cli.data.is_some(),
				self.engine.data.is_some(),
				"QLANES__ENGINE__DATA",
				"DATA",
				"engine.data",
			),
		};

		let config = ResolvedConfig {
			data: self.engine.data,
			display_limit: self.lanes.display_limit.unwrap_or(DEFAULT_DISPLAY_LIMIT),
			initial_lanes: self.lanes.initial_lanes.unwrap_or(DEFAULT_INITIAL_LANES),
			shutdown_grace: Duration::from_millis(
				self.lanes
					.shutdown_grace_ms
					.unwrap_or(DEFAULT_SHUTDOWN_GRACE_MS),
			),
			preview_width: self.console.preview_width.unwrap_or(DEFAULT_PREVIEW_WIDTH),
			log_filter: self
				.log
				.filter
				.filter(|filter| !filter.trim().is_empty())
				.unwrap_or_else(|| DEFAULT_FILTER.to_string()),
		};

		config.validate(&sources).map_err(Error::new)?;

		Ok(config)
	}
}

fn detect_source(
	cli_present: bool,
	value_present: bool,
	env_var: &'static str,
	cli_flag: &'static str,
	key: &'static str,
) -> Option<SettingSource> {
	if !value_present {
		return None;
	}

	if cli_present {
		return Some(SettingSource::CliFlag(cli_flag));
	}

	if env::var_os(env_var).is_some() {
		return Some(SettingSource::Environment(env_var));
	}

	Some(SettingSource::ConfigKey(key))
}
