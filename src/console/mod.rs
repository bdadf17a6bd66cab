//! Line-oriented consumer for a [`Registry`].
//!
//! The console owns the only "display". Lines typed by the user and lane
//! deliveries both arrive as [`ConsoleEvent`]s on one channel and are handled
//! in order on the console's thread, which is also the only thread that
//! switches the active lane.

mod command;
mod render;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};
use qlanes_engine::Engine;
use tracing::{debug, warn};

pub use command::{Command, CommandError, HELP};

use crate::lanes::{Delivery, DeliveryKind, LaneId, Registry};

/// Input to the console loop.
#[derive(Debug)]
pub enum ConsoleEvent {
	/// A line typed by the user.
	Line(String),
	/// A lane changed state on a worker thread.
	Delivery(Delivery),
	/// Standard input reached end of file.
	InputClosed,
}

impl From<Delivery> for ConsoleEvent {
	fn from(delivery: Delivery) -> Self {
		Self::Delivery(delivery)
	}
}

/// Whether the loop should keep going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
	Continue,
	Quit,
}

pub struct Console<W: Write> {
	registry: Registry,
	engine: Arc<dyn Engine>,
	/// Text being edited for the active lane; flushed into the lane on switch.
	editor: String,
	out: W,
	preview_width: usize,
}

impl<W: Write> Console<W> {
	pub fn new(registry: Registry, engine: Arc<dyn Engine>, out: W, preview_width: usize) -> Self {
		Self {
			registry,
			engine,
			editor: String::new(),
			out,
			preview_width: preview_width.max(8),
		}
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn editor(&self) -> &str {
		&self.editor
	}

	pub fn output(&self) -> &W {
		&self.out
	}

	/// Route deliveries into `events`, then open `lanes` lanes and watch the first.
	pub fn start(&mut self, events: Sender<ConsoleEvent>, lanes: usize) -> Result<()> {
		self.registry.on_outcome_ready(move |delivery| {
			let _ = events.send(ConsoleEvent::from(delivery));
		});

		let first = self.registry.create_lane()?.id();
		for _ in 1..lanes {
			self.registry.create_lane()?;
		}
		self.registry.set_active(first)?;

		writeln!(
			self.out,
			"{} lane(s) ready; type a query or :help",
			self.registry.lanes().len()
		)?;
		Ok(())
	}

	pub fn handle(&mut self, event: ConsoleEvent) -> Result<Flow> {
		match event {
			ConsoleEvent::Line(line) => self.handle_line(&line),
			ConsoleEvent::Delivery(delivery) => {
				self.handle_delivery(delivery)?;
				Ok(Flow::Continue)
			}
			ConsoleEvent::InputClosed => Ok(Flow::Quit),
		}
	}

	fn handle_line(&mut self, line: &str) -> Result<Flow> {
		let command = match Command::parse(line) {
			Ok(command) => command,
			Err(err) => {
				writeln!(self.out, "{err}")?;
				return Ok(Flow::Continue);
			}
		};

		match command {
			Command::Submit(text) => {
				self.editor = text;
				self.run_editor()?;
			}
			Command::Edit(text) => self.editor = text,
			Command::Run => self.run_editor()?,
			Command::New => {
				let lane = self.registry.create_lane()?;
				self.switch_to(lane.id())?;
			}
			Command::Switch(id) => self.switch_to(id)?,
			Command::Lanes => {
				let lanes = self.registry.snapshots();
				render::lane_list(&mut self.out, &lanes, self.registry.active_id())?;
			}
			Command::Show => self.show_active()?,
			Command::Collections => {
				let names = self.engine.collection_names();
				if names.is_empty() {
					writeln!(self.out, "no collections")?;
				}
				for name in names {
					writeln!(self.out, "  SELECT $ FROM {name}")?;
				}
				let system = self.engine.system_collection_names();
				if !system.is_empty() {
					writeln!(self.out, "system:")?;
					for name in system {
						writeln!(self.out, "  SELECT $ FROM {name}")?;
					}
				}
			}
			Command::Help => writeln!(self.out, "{HELP}")?,
			Command::Quit => return Ok(Flow::Quit),
			Command::Empty => {}
		}

		Ok(Flow::Continue)
	}

	fn run_editor(&mut self) -> Result<()> {
		let Some(id) = self.registry.active_id() else {
			writeln!(self.out, "no active lane")?;
			return Ok(());
		};
		self.registry.submit(id, self.editor.clone())?;
		Ok(())
	}

	fn switch_to(&mut self, id: LaneId) -> Result<()> {
		if self.registry.lane(id).is_none() {
			writeln!(self.out, "lane {id} does not exist")?;
			return Ok(());
		}

		if let Some(previous) = self.registry.active() {
			previous.set_pending_input(self.editor.as_str());
		}
		self.registry.set_active(id)?;
		self.editor = self
			.registry
			.active()
			.map(|lane| lane.pending_input())
			.unwrap_or_default();

		writeln!(self.out, "lane {id}")?;
		if !self.editor.is_empty() {
			writeln!(self.out, "  query: {}", self.editor)?;
		}
		self.show_active()
	}

	fn show_active(&mut self) -> Result<()> {
		match self.registry.active() {
			Some(lane) => render::snapshot(&mut self.out, &lane.snapshot(), self.preview_width)?,
			None => writeln!(self.out, "no active lane")?,
		}
		Ok(())
	}

	fn handle_delivery(&mut self, delivery: Delivery) -> Result<()> {
		let out = &mut self.out;
		let width = self.preview_width;
		let mut written = Ok(());

		let rendered = delivery.dispatch(|lane, kind| {
			written = match kind {
				DeliveryKind::Started => render::started(out, lane.id),
				DeliveryKind::Finished => render::snapshot(out, lane, width),
			};
		});
		if !rendered {
			debug!("skipped delivery for a lane that is no longer active");
		}

		written.context("failed to write lane result")
	}

	/// Stop every lane, waiting up to the configured grace period for idle workers.
	pub fn close(&mut self) -> Result<()> {
		if !self.registry.close() {
			let busy = self
				.registry
				.lanes()
				.iter()
				.filter(|lane| lane.is_running())
				.count();
			warn!(busy, "leaving running lanes to finish in the background");
			writeln!(self.out, "{busy} lane(s) still running; not waiting for them")?;
		}
		self.out.flush()?;
		Ok(())
	}
}

/// Forward standard input lines into `events` from a background thread.
pub fn spawn_input_reader(events: Sender<ConsoleEvent>) -> io::Result<thread::JoinHandle<()>> {
	thread::Builder::new()
		.name("console-input".into())
		.spawn(move || {
			let stdin = io::stdin();
			for line in stdin.lock().lines() {
				match line {
					Ok(line) => {
						if events.send(ConsoleEvent::Line(line)).is_err() {
							return;
						}
					}
					Err(err) => {
						warn!(%err, "failed to read standard input");
						break;
					}
				}
			}
			let _ = events.send(ConsoleEvent::InputClosed);
		})
}

/// Handle events until the user quits or input ends, then close the lanes.
pub fn run<W: Write>(console: &mut Console<W>, events: &Receiver<ConsoleEvent>) -> Result<()> {
	while let Ok(event) = events.recv() {
		if console.handle(event)? == Flow::Quit {
			break;
		}
		console.out.flush()?;
	}
	console.close()
}

#[cfg(test)]
mod tests;
