use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::lane::{Lane, LaneId};

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Process-wide "stopping" flag. Raised once by the coordinator, read by every worker.
#[derive(Debug, Clone, Default)]
pub(crate) struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
	pub(crate) fn raise(&self) -> bool {
		!self.0.swap(true, Ordering::AcqRel)
	}

	pub(crate) fn is_raised(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}
}

/// Raise the stop flag, then empty and wake every lane.
///
/// Idle workers exit on their next `Deciding` pass. A worker inside the engine
/// call finishes that call first. Returns `false` if shutdown was already underway.
pub(crate) fn begin<'a>(stop: &StopFlag, lanes: impl IntoIterator<Item = &'a Lane>) -> bool {
	if !stop.raise() {
		return false;
	}

	let mut count = 0usize;
	for lane in lanes {
		lane.release();
		count += 1;
	}
	info!(lanes = count, "shutdown requested");
	true
}

/// A lane's worker thread, joined once it has exited.
#[derive(Debug)]
pub(crate) struct WorkerHandle {
	pub(crate) lane: LaneId,
	pub(crate) thread: Option<JoinHandle<()>>,
}

/// Join every worker that finishes within `timeout`. Returns whether all did.
///
/// Workers still busy when the deadline passes stay detached.
pub(crate) fn join_within(workers: &mut [WorkerHandle], timeout: Duration) -> bool {
	let deadline = Instant::now() + timeout;

	loop {
		for worker in workers.iter_mut() {
			if worker
				.thread
				.as_ref()
				.is_some_and(JoinHandle::is_finished)
				&& let Some(thread) = worker.thread.take()
				&& thread.join().is_err()
			{
				warn!(lane = %worker.lane, "lane worker panicked");
			}
		}

		let remaining: Vec<LaneId> = workers
			.iter()
			.filter(|worker| worker.thread.is_some())
			.map(|worker| worker.lane)
			.collect();

		if remaining.is_empty() {
			info!("all lane workers stopped");
			return true;
		}

		if Instant::now() >= deadline {
			warn!(?remaining, "lane workers still running at shutdown");
			return false;
		}

		thread::sleep(JOIN_POLL_INTERVAL);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stop_flag_raises_once() {
		let stop = StopFlag::default();
		assert!(!stop.is_raised());
		assert!(stop.raise());
		assert!(!stop.raise());
		assert!(stop.is_raised());
	}

	#[test]
	fn join_within_reaps_finished_threads() {
		let mut workers = vec![WorkerHandle {
			lane: LaneId::new(1),
			thread: Some(thread::spawn(|| {})),
		}];
		assert!(join_within(&mut workers, Duration::from_secs(1)));
		assert!(workers[0].thread.is_none());
	}

	#[test]
	fn join_within_gives_up_on_busy_threads() {
		let (tx, rx) = std::sync::mpsc::channel::<()>();
		let mut workers = vec![WorkerHandle {
			lane: LaneId::new(2),
			thread: Some(thread::spawn(move || {
				let _ = rx.recv();
			})),
		}];

		assert!(!join_within(&mut workers, Duration::from_millis(20)));
		assert!(workers[0].thread.is_some());

		drop(tx);
		assert!(join_within(&mut workers, Duration::from_secs(1)));
	}
}
