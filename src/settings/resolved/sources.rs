use std::fmt;

/// Where a validated setting came from, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SettingSource {
	CliFlag(&'static str),
	Environment(&'static str),
	ConfigKey(&'static str),
}

impl fmt::Display for SettingSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::CliFlag(flag) => write!(f, "CLI argument `{flag}`"),
			Self::Environment(var) => write!(f, "environment variable `{var}`"),
			Self::ConfigKey(key) => write!(f, "configuration key `{key}`"),
		}
	}
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ConfigSources {
	pub(crate) display_limit: Option<SettingSource>,
	pub(crate) initial_lanes: Option<SettingSource>,
	pub(crate) data: Option<SettingSource>,
}

impl ConfigSources {
	pub(crate) fn source_for_display_limit(&self) -> SettingSource {
		self.display_limit
			.clone()
			.unwrap_or(SettingSource::ConfigKey("lanes.display_limit"))
	}

	pub(crate) fn source_for_initial_lanes(&self) -> SettingSource {
		self.initial_lanes
			.clone()
			.unwrap_or(SettingSource::ConfigKey("lanes.initial_lanes"))
	}

	pub(crate) fn source_for_data(&self) -> SettingSource {
		self.data
			.clone()
			.unwrap_or(SettingSource::ConfigKey("engine.data"))
	}
}
