use std::path::PathBuf;

use clap::{ArgAction, ColorChoice, Parser};

use super::styles::{cli_styles, long_version};

/// Command-line arguments accepted by the `qlanes` binary.
#[derive(Parser, Debug)]
#[command(
	name = "qlanes",
	version,
	long_version = long_version(),
	about = "Run queries in independent lanes against a JSON document store",
	color = ColorChoice::Auto,
	styles = cli_styles()
)]
pub(crate) struct CliArgs {
	#[arg(
		value_name = "DATA",
		help = "JSON file mapping collection names to arrays of documents (default: empty store)"
	)]
	pub(crate) data: Option<PathBuf>,
	#[arg(
		short,
		long = "config",
		value_name = "FILE",
		env = "QLANES_CONFIG",
		action = ArgAction::Append,
		help = "Additional configuration file to merge (default: none)"
	)]
	pub(crate) config: Vec<PathBuf>,
	#[arg(
		short = 'n',
		long = "no-config",
		help = "Skip loading default configuration files (default: disabled)"
	)]
	pub(crate) no_config: bool,
	#[arg(
		short = 'd',
		long = "display-limit",
		value_name = "N",
		help = "Maximum documents kept per run (default: 1000)"
	)]
	pub(crate) display_limit: Option<usize>,
	#[arg(
		short = 'l',
		long = "lanes",
		value_name = "N",
		help = "Number of lanes opened at start (default: 1)"
	)]
	pub(crate) lanes: Option<usize>,
	#[arg(
		short = 'w',
		long = "preview-width",
		value_name = "N",
		help = "Columns shown per document line (default: 120)"
	)]
	pub(crate) preview_width: Option<usize>,
	#[arg(
		long = "log",
		value_name = "FILTER",
		help = "Log filter directives when RUST_LOG is unset (default: warn)"
	)]
	pub(crate) log: Option<String>,
	#[arg(
		long = "print-config",
		help = "Print the resolved configuration before starting (default: disabled)"
	)]
	pub(crate) print_config: bool,
}
