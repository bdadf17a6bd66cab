//! Moving lane results from worker threads to the consumer's thread.
//!
//! Workers never render. When a lane that is currently watched starts or
//! finishes a run, its worker builds a [`Delivery`] and hands it to the
//! callback registered with [`Registry::on_outcome_ready`]. That callback is
//! expected to post the delivery into the consumer's own queue; the consumer
//! later calls [`Delivery::dispatch`] from its loop, which checks again that the
//! lane is still the active one before rendering anything.
//!
//! [`Registry::on_outcome_ready`]: super::Registry::on_outcome_ready

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::lane::{LaneId, LaneShared, LaneSnapshot};

/// The lane the consumer is watching. Zero means none.
#[derive(Debug, Clone, Default)]
pub(crate) struct ActiveLane(Arc<AtomicU64>);

impl ActiveLane {
	pub(crate) fn get(&self) -> Option<LaneId> {
		match self.0.load(Ordering::Acquire) {
			0 => None,
			raw => Some(LaneId::new(raw)),
		}
	}

	pub(crate) fn set(&self, id: LaneId) {
		self.0.store(id.get(), Ordering::Release);
	}

	pub(crate) fn is(&self, id: LaneId) -> bool {
		self.0.load(Ordering::Acquire) == id.get()
	}
}

/// What happened on the lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
	/// The worker entered the engine call.
	Started,
	/// The run completed; the lane's outcome holds the result.
	Finished,
}

/// Notification that a lane's display state changed, waiting to be applied on
/// the consumer's thread.
pub struct Delivery {
	lane: Arc<LaneShared>,
	kind: DeliveryKind,
	active: ActiveLane,
}

impl Delivery {
	pub(crate) fn new(lane: Arc<LaneShared>, kind: DeliveryKind, active: ActiveLane) -> Self {
		Self { lane, kind, active }
	}

	pub fn lane_id(&self) -> LaneId {
		self.lane.id
	}

	pub fn kind(&self) -> DeliveryKind {
		self.kind
	}

	/// Render the delivery if its lane is still the active one.
	///
	/// Must be called on the thread that calls
	/// [`Registry::set_active`](super::Registry::set_active), so the check and
	/// the render cannot interleave with a lane switch. The snapshot handed to
	/// `render` is taken now, not when the worker posted. Returns whether
	/// `render` ran.
	pub fn dispatch(self, render: impl FnOnce(&LaneSnapshot, DeliveryKind)) -> bool {
		if !self.active.is(self.lane.id) {
			debug!(
				lane = %self.lane.id,
				kind = ?self.kind,
				"dropping delivery for inactive lane"
			);
			return false;
		}
		render(&self.lane.snapshot(), self.kind);
		true
	}
}

impl fmt::Debug for Delivery {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Delivery")
			.field("lane", &self.lane.id)
			.field("kind", &self.kind)
			.finish()
	}
}

type Callback = Arc<dyn Fn(Delivery) + Send + Sync>;

/// Slot holding the consumer's callback, shared by every worker.
#[derive(Clone, Default)]
pub(crate) struct Handoff {
	callback: Arc<RwLock<Option<Callback>>>,
}

impl Handoff {
	pub(crate) fn register(&self, callback: impl Fn(Delivery) + Send + Sync + 'static) {
		let mut slot = self
			.callback
			.write()
			.unwrap_or_else(PoisonError::into_inner);
		*slot = Some(Arc::new(callback));
	}

	/// Hand a delivery to the consumer. The callback must not block.
	pub(crate) fn post(&self, delivery: Delivery) {
		let callback = self
			.callback
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone();
		match callback {
			Some(callback) => callback(delivery),
			None => debug!(lane = %delivery.lane_id(), "no consumer registered; delivery dropped"),
		}
	}
}

impl fmt::Debug for Handoff {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let registered = self
			.callback
			.read()
			.map(|slot| slot.is_some())
			.unwrap_or(false);
		f.debug_struct("Handoff")
			.field("registered", &registered)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::mpsc;

	use super::*;

	fn delivery_for(id: u64, active: &ActiveLane) -> Delivery {
		Delivery::new(
			Arc::new(LaneShared::new(LaneId::new(id))),
			DeliveryKind::Finished,
			active.clone(),
		)
	}

	#[test]
	fn active_lane_starts_unset() {
		let active = ActiveLane::default();
		assert_eq!(active.get(), None);
		active.set(LaneId::new(4));
		assert_eq!(active.get(), Some(LaneId::new(4)));
		assert!(active.is(LaneId::new(4)));
	}

	#[test]
	fn dispatch_renders_for_active_lane() {
		let active = ActiveLane::default();
		active.set(LaneId::new(1));

		let mut rendered = None;
		let ran = delivery_for(1, &active).dispatch(|snapshot, kind| {
			rendered = Some((snapshot.id, kind));
		});

		assert!(ran);
		assert_eq!(rendered, Some((LaneId::new(1), DeliveryKind::Finished)));
	}

	#[test]
	fn dispatch_rechecks_at_render_time() {
		let active = ActiveLane::default();
		active.set(LaneId::new(1));
		let delivery = delivery_for(1, &active);

		active.set(LaneId::new(2));
		assert!(!delivery.dispatch(|_, _| panic!("must not render")));
	}

	#[test]
	fn lane_flipping_back_before_render_still_renders() {
		let active = ActiveLane::default();
		active.set(LaneId::new(1));
		let delivery = delivery_for(1, &active);

		active.set(LaneId::new(2));
		active.set(LaneId::new(1));
		assert!(delivery.dispatch(|_, _| {}));
	}

	#[test]
	fn post_without_consumer_is_dropped() {
		let handoff = Handoff::default();
		handoff.post(delivery_for(1, &ActiveLane::default()));
	}

	#[test]
	fn registered_callback_receives_deliveries() {
		let handoff = Handoff::default();
		let (tx, rx) = mpsc::channel();
		handoff.register(move |delivery| {
			let _ = tx.send(delivery);
		});

		handoff.post(delivery_for(9, &ActiveLane::default()));
		let delivery = rx.try_recv().expect("delivery");
		assert_eq!(delivery.lane_id(), LaneId::new(9));
	}

	#[test]
	fn debug_shows_lane_and_kind() {
		let text = format!("{:?}", delivery_for(3, &ActiveLane::default()));
		assert_eq!(text, "Delivery { lane: LaneId(3), kind: Finished }");
	}
}
