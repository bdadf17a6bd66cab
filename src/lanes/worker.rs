use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use qlanes_engine::{Document, Engine, EngineError};
use tracing::{debug, trace, warn};

use super::handoff::{ActiveLane, Delivery, DeliveryKind, Handoff};
use super::lane::{Failure, LaneShared, Outcome, ResultSet};
use super::shutdown::StopFlag;

/// Everything a worker needs besides its own lane.
#[derive(Clone)]
pub(crate) struct WorkerContext {
	pub(crate) engine: Arc<dyn Engine>,
	pub(crate) active: ActiveLane,
	pub(crate) handoff: Handoff,
	pub(crate) stop: StopFlag,
	pub(crate) display_limit: usize,
}

/// Launch the dedicated worker thread for `lane`.
pub(crate) fn spawn(lane: Arc<LaneShared>, context: WorkerContext) -> io::Result<JoinHandle<()>> {
	thread::Builder::new()
		.name(format!("lane-{}", lane.id))
		.spawn(move || worker_loop(&lane, &context))
}

fn worker_loop(lane: &Arc<LaneShared>, context: &WorkerContext) {
	loop {
		lane.wake.wait();
		lane.enter_deciding();
		trace!(lane = %lane.id, "worker woke");

		if context.stop.is_raised() {
			break;
		}

		let Some(query) = lane.begin_run() else {
			trace!(lane = %lane.id, "nothing to run");
			continue;
		};

		execute(lane, context, query);
	}

	lane.mark_stopped();
	debug!(lane = %lane.id, "worker stopped");
}

fn execute(lane: &Arc<LaneShared>, context: &WorkerContext, query: String) {
	notify(lane, context, DeliveryKind::Started);
	debug!(lane = %lane.id, %query, "run started");

	let started = Instant::now();
	let result = panic::catch_unwind(AssertUnwindSafe(|| {
		collect(context.engine.as_ref(), &query, context.display_limit)
	}))
	.unwrap_or_else(|payload| Err(EngineError::Execution(panic_message(payload.as_ref()))));
	let elapsed = started.elapsed();

	let outcome = match result {
		Ok((documents, truncated)) => {
			debug!(
				lane = %lane.id,
				documents = documents.len(),
				truncated,
				?elapsed,
				"run finished"
			);
			Outcome::Success(Arc::new(ResultSet {
				query,
				documents,
				truncated,
				elapsed,
			}))
		}
		Err(error) => {
			warn!(lane = %lane.id, %error, ?elapsed, "run failed");
			Outcome::Failure(Arc::new(Failure {
				query,
				error,
				elapsed,
			}))
		}
	};

	lane.finish_run(outcome);
	notify(lane, context, DeliveryKind::Finished);
}

/// Pull at most `limit` documents, plus one look-ahead to learn whether the
/// engine had more. The stream is dropped on return.
fn collect(
	engine: &dyn Engine,
	query: &str,
	limit: usize,
) -> Result<(Vec<Document>, bool), EngineError> {
	let mut stream = engine.run(query)?;
	let mut documents = Vec::new();
	for item in stream.by_ref().take(limit) {
		documents.push(item?);
	}
	let truncated = stream.next().transpose()?.is_some();
	Ok((documents, truncated))
}

fn notify(lane: &Arc<LaneShared>, context: &WorkerContext, kind: DeliveryKind) {
	if context.active.is(lane.id) {
		context.handoff.post(Delivery::new(
			Arc::clone(lane),
			kind,
			context.active.clone(),
		));
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	let detail = payload
		.downcast_ref::<&str>()
		.map(|message| (*message).to_string())
		.or_else(|| payload.downcast_ref::<String>().cloned())
		.unwrap_or_else(|| "unknown panic".to_string());
	format!("engine panicked: {detail}")
}
