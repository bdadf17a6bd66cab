mod cli;
mod settings;

use std::io;
use std::sync::Arc;
use std::sync::mpsc;

use anyhow::{Context, Result};
use cli::parse_cli;
use qlanes::console::{self, Console};
use qlanes::engine::{Engine, MemoryEngine};
use qlanes::{Registry, logging};
use settings::ResolvedConfig;
use tracing::info;

fn main() -> Result<()> {
	let cli = parse_cli();
	let resolved = settings::load(&cli)?;

	logging::initialize(&resolved.log_filter);

	if cli.print_config {
		resolved.print_summary();
	}

	run_console(resolved)
}

fn open_engine(settings: &ResolvedConfig) -> Result<MemoryEngine> {
	match &settings.data {
		Some(path) => {
			let engine = MemoryEngine::open(path)
				.with_context(|| format!("failed to load {}", path.display()))?;
			info!(path = %path.display(), collections = engine.len(), "data loaded");
			Ok(engine)
		}
		None => Ok(MemoryEngine::new()),
	}
}

/// Open the configured lanes and hand stdin and lane deliveries to the console.
fn run_console(settings: ResolvedConfig) -> Result<()> {
	let engine: Arc<dyn Engine> = Arc::new(open_engine(&settings)?);
	let registry = Registry::new(Arc::clone(&engine), settings.lane_config());

	let (tx, rx) = mpsc::channel();
	let mut console = Console::new(registry, engine, io::stdout(), settings.preview_width);
	console.start(tx.clone(), settings.initial_lanes)?;
	console::spawn_input_reader(tx).context("failed to start the input reader")?;

	console::run(&mut console, &rx)
}
