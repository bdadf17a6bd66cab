use super::{ConfigError, ConfigSources, ResolvedConfig};

pub(super) fn validate(
	config: &ResolvedConfig,
	sources: &ConfigSources,
) -> Result<(), ConfigError> {
	if config.display_limit == 0 {
		return Err(ConfigError::invalid(
			"lanes.display_limit",
			config.display_limit.to_string(),
			sources.source_for_display_limit(),
			"must be at least 1",
		));
	}

	if config.initial_lanes == 0 {
		return Err(ConfigError::invalid(
			"lanes.initial_lanes",
			config.initial_lanes.to_string(),
			sources.source_for_initial_lanes(),
			"must be at least 1",
		));
	}

	if let Some(data) = &config.data
		&& !data.is_file()
	{
		return Err(ConfigError::invalid(
			"engine.data",
			data.display().to_string(),
			sources.source_for_data(),
			"file does not exist",
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;
	use std::time::Duration;

	use super::super::SettingSource;
	use super::*;

	fn config() -> ResolvedConfig {
		ResolvedConfig {
			data: None,
			display_limit: 1000,
			initial_lanes: 1,
			shutdown_grace: Duration::from_millis(500),
			preview_width: 120,
			log_filter: "warn".into(),
		}
	}

	#[test]
	fn defaults_are_valid() {
		assert!(validate(&config(), &ConfigSources::default()).is_ok());
	}

	#[test]
	fn error_names_environment_origin() {
		let config = ResolvedConfig {
			initial_lanes: 0,
			..config()
		};
		let sources = ConfigSources {
			initial_lanes: Some(SettingSource::Environment("QLANES__LANES__INITIAL_LANES")),
			..ConfigSources::default()
		};

		let err = validate(&config, &sources).expect_err("zero lanes");
		assert_eq!(err.key, "lanes.initial_lanes");
		assert!(err.to_string().contains("QLANES__LANES__INITIAL_LANES"));
	}

	#[test]
	fn directory_is_not_a_data_file() {
		let config = ResolvedConfig {
			data: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR"))),
			..config()
		};
		let err = validate(&config, &ConfigSources::default()).expect_err("directory");
		assert_eq!(err.origin, SettingSource::ConfigKey("engine.data"));
	}
}
