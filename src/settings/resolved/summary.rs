use super::ResolvedConfig;

pub(super) fn print_summary(config: &ResolvedConfig) {
	println!("Effective configuration:");
	match &config.data {
		Some(path) => println!("  Data file: {}", path.display()),
		None => println!("  Data file: (none, empty store)"),
	}
	println!("  Display limit: {}", config.display_limit);
	println!("  Initial lanes: {}", config.initial_lanes);
	println!(
		"  Shutdown grace: {} ms",
		config.shutdown_grace.as_millis()
	);
	println!("  Preview width: {}", config.preview_width);
	println!("  Log filter: {}", config.log_filter);
}
