use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use qlanes_engine::{Document, EngineError};

use super::wake::Wake;

/// Identifier of a lane. Assigned from 1 upwards in creation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LaneId(u64);

impl LaneId {
	pub const fn new(raw: u64) -> Self {
		Self(raw)
	}

	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for LaneId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Where a lane worker currently is in its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	/// Parked on the wake primitive.
	Idle,
	/// Woken and inspecting the pending input.
	Deciding,
	/// Inside the engine call.
	Executing,
	/// Exited after shutdown.
	Stopped,
}

/// Documents returned by a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
	pub query: String,
	pub documents: Vec<Document>,
	/// The engine had more documents than the display limit allowed.
	pub truncated: bool,
	pub elapsed: Duration,
}

/// A run that ended with an engine error.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
	pub query: String,
	pub error: EngineError,
	pub elapsed: Duration,
}

/// Result of the most recent run on a lane.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Outcome {
	#[default]
	None,
	Success(Arc<ResultSet>),
	Failure(Arc<Failure>),
}

impl Outcome {
	pub fn is_none(&self) -> bool {
		matches!(self, Self::None)
	}

	pub fn elapsed(&self) -> Option<Duration> {
		match self {
			Self::None => None,
			Self::Success(set) => Some(set.elapsed),
			Self::Failure(failure) => Some(failure.elapsed),
		}
	}

	pub fn documents(&self) -> Option<&[Document]> {
		match self {
			Self::Success(set) => Some(&set.documents),
			_ => None,
		}
	}

	pub fn error(&self) -> Option<&EngineError> {
		match self {
			Self::Failure(failure) => Some(&failure.error),
			_ => None,
		}
	}
}

/// Point-in-time copy of a lane's state for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneSnapshot {
	pub id: LaneId,
	pub pending_input: String,
	pub running: bool,
	pub phase: Phase,
	pub outcome: Outcome,
}

#[derive(Debug)]
struct LaneState {
	pending_input: String,
	running: bool,
	phase: Phase,
	outcome: Outcome,
}

/// State shared between a lane handle and its worker thread.
#[derive(Debug)]
pub(crate) struct LaneShared {
	pub(crate) id: LaneId,
	pub(crate) wake: Wake,
	state: Mutex<LaneState>,
}

impl LaneShared {
	pub(crate) fn new(id: LaneId) -> Self {
		Self {
			id,
			wake: Wake::new(),
			state: Mutex::new(LaneState {
				pending_input: String::new(),
				running: false,
				phase: Phase::Idle,
				outcome: Outcome::None,
			}),
		}
	}

	fn state(&self) -> MutexGuard<'_, LaneState> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub(crate) fn set_pending_input(&self, input: String) {
		self.state().pending_input = input;
	}

	/// Move from `Idle` to `Deciding`.
	pub(crate) fn enter_deciding(&self) {
		self.state().phase = Phase::Deciding;
	}

	/// Read the pending input and, if there is work, mark the run as started.
	///
	/// Blank input returns the lane to `Idle` and leaves the last outcome alone.
	pub(crate) fn begin_run(&self) -> Option<String> {
		let mut state = self.state();
		if state.pending_input.trim().is_empty() {
			state.phase = Phase::Idle;
			return None;
		}
		state.running = true;
		state.phase = Phase::Executing;
		Some(state.pending_input.clone())
	}

	pub(crate) fn finish_run(&self, outcome: Outcome) {
		let mut state = self.state();
		state.outcome = outcome;
		state.running = false;
		state.phase = Phase::Idle;
	}

	pub(crate) fn mark_stopped(&self) {
		let mut state = self.state();
		state.running = false;
		state.phase = Phase::Stopped;
	}

	pub(crate) fn snapshot(&self) -> LaneSnapshot {
		let state = self.state();
		LaneSnapshot {
			id: self.id,
			pending_input: state.pending_input.clone(),
			running: state.running,
			phase: state.phase,
			outcome: state.outcome.clone(),
		}
	}
}

/// Cheap handle onto a lane owned by a [`Registry`](super::Registry).
#[derive(Debug, Clone)]
pub struct Lane {
	pub(crate) shared: Arc<LaneShared>,
}

impl Lane {
	pub(crate) fn new(shared: Arc<LaneShared>) -> Self {
		Self { shared }
	}

	pub fn id(&self) -> LaneId {
		self.shared.id
	}

	pub fn pending_input(&self) -> String {
		self.shared.state().pending_input.clone()
	}

	/// Store edited text without asking the worker to run it.
	pub fn set_pending_input(&self, input: impl Into<String>) {
		self.shared.set_pending_input(input.into());
	}

	pub fn is_running(&self) -> bool {
		self.shared.state().running
	}

	pub fn phase(&self) -> Phase {
		self.shared.state().phase
	}

	pub fn outcome(&self) -> Outcome {
		self.shared.state().outcome.clone()
	}

	pub fn snapshot(&self) -> LaneSnapshot {
		self.shared.snapshot()
	}

	/// Set the pending input and wake the worker.
	pub(crate) fn submit(&self, input: String) {
		self.shared.set_pending_input(input);
		self.shared.wake.signal();
	}

	/// Empty the pending input and wake the worker so it notices shutdown.
	pub(crate) fn release(&self) {
		self.shared.set_pending_input(String::new());
		self.shared.wake.signal();
	}
}
