use std::io;

use thiserror::Error;

use super::lane::LaneId;

/// Errors returned by [`Registry`](super::Registry) operations.
#[derive(Debug, Error)]
pub enum LaneError {
	/// The id does not name a lane in this registry.
	#[error("lane {0} does not exist")]
	UnknownLane(LaneId),

	/// The registry has been shut down and accepts no more work.
	#[error("lanes are shutting down")]
	ShuttingDown,

	/// The operating system refused to start the lane's worker thread.
	#[error("failed to start worker for lane {id}")]
	Spawn {
		id: LaneId,
		#[source]
		source: io::Error,
	},
}
