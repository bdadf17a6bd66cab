use std::sync::Arc;
use std::time::Duration;

use qlanes_engine::Engine;
use tracing::info;

use super::config::LaneConfig;
use super::error::LaneError;
use super::handoff::{ActiveLane, Delivery, Handoff};
use super::lane::{Lane, LaneId, LaneShared, LaneSnapshot};
use super::shutdown::{self, StopFlag, WorkerHandle};
use super::worker::{self, WorkerContext};

/// Owns every lane, tracks which one the consumer is watching, and drives shutdown.
///
/// All methods are meant to be called from the consumer's thread. Workers only
/// ever touch their own lane.
pub struct Registry {
	lanes: Vec<Lane>,
	workers: Vec<WorkerHandle>,
	next_id: u64,
	config: LaneConfig,
	context: WorkerContext,
}

impl Registry {
	pub fn new(engine: Arc<dyn Engine>, config: LaneConfig) -> Self {
		let context = WorkerContext {
			engine,
			active: ActiveLane::default(),
			handoff: Handoff::default(),
			stop: StopFlag::default(),
			display_limit: config.display_limit.max(1),
		};

		Self {
			lanes: Vec::new(),
			workers: Vec::new(),
			next_id: 1,
			config,
			context,
		}
	}

	pub fn config(&self) -> &LaneConfig {
		&self.config
	}

	/// Create a lane with the next id and start its worker.
	pub fn create_lane(&mut self) -> Result<Lane, LaneError> {
		if self.is_stopping() {
			return Err(LaneError::ShuttingDown);
		}

		let id = LaneId::new(self.next_id);
		let shared = Arc::new(LaneShared::new(id));
		let thread = worker::spawn(Arc::clone(&shared), self.context.clone())
			.map_err(|source| LaneError::Spawn { id, source })?;

		self.next_id += 1;
		let lane = Lane::new(shared);
		self.lanes.push(lane.clone());
		self.workers.push(WorkerHandle {
			lane: id,
			thread: Some(thread),
		});

		info!(lane = %id, "lane created");
		Ok(lane)
	}

	/// Make `id` the watched lane.
	///
	/// Flushing an in-progress edit of the previously active lane is the
	/// caller's job.
	pub fn set_active(&mut self, id: LaneId) -> Result<(), LaneError> {
		if self.lane(id).is_none() {
			return Err(LaneError::UnknownLane(id));
		}
		self.context.active.set(id);
		Ok(())
	}

	pub fn active_id(&self) -> Option<LaneId> {
		self.context.active.get()
	}

	pub fn active(&self) -> Option<&Lane> {
		self.active_id().and_then(|id| self.lane(id))
	}

	pub fn lane(&self, id: LaneId) -> Option<&Lane> {
		// Ids are dense and start at 1.
		let index = usize::try_from(id.get().checked_sub(1)?).ok()?;
		self.lanes.get(index).filter(|lane| lane.id() == id)
	}

	/// All lanes in creation order.
	pub fn lanes(&self) -> &[Lane] {
		&self.lanes
	}

	pub fn snapshots(&self) -> Vec<LaneSnapshot> {
		self.lanes.iter().map(Lane::snapshot).collect()
	}

	/// Set a lane's pending input and wake its worker.
	///
	/// A submission made while the lane is executing is picked up once the
	/// current run ends; later submissions before then replace it.
	pub fn submit(&self, id: LaneId, query: impl Into<String>) -> Result<(), LaneError> {
		if self.is_stopping() {
			return Err(LaneError::ShuttingDown);
		}
		let lane = self.lane(id).ok_or(LaneError::UnknownLane(id))?;
		lane.submit(query.into());
		Ok(())
	}

	/// Register how deliveries reach the consumer's thread.
	///
	/// `callback` runs on worker threads and must only enqueue; render from the
	/// consumer's loop with [`Delivery::dispatch`]. Replaces any earlier callback.
	pub fn on_outcome_ready(&self, callback: impl Fn(Delivery) + Send + Sync + 'static) {
		self.context.handoff.register(callback);
	}

	pub fn is_stopping(&self) -> bool {
		self.context.stop.is_raised()
	}

	/// Stop accepting work and wake every worker so idle ones exit.
	///
	/// Does not wait; see [`Registry::wait_stopped`].
	pub fn shutdown(&self) {
		shutdown::begin(&self.context.stop, &self.lanes);
	}

	/// Join workers that exit within `timeout`. Returns whether all have stopped.
	pub fn wait_stopped(&mut self, timeout: Duration) -> bool {
		shutdown::join_within(&mut self.workers, timeout)
	}

	/// [`Registry::shutdown`] followed by a wait bounded by the configured grace period.
	pub fn close(&mut self) -> bool {
		self.shutdown();
		let grace = self.config.shutdown_grace;
		self.wait_stopped(grace)
	}
}

impl Drop for Registry {
	fn drop(&mut self) {
		self.shutdown();
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registry")
			.field("lanes", &self.lanes.len())
			.field("active", &self.active_id())
			.field("stopping", &self.is_stopping())
			.finish()
	}
}
