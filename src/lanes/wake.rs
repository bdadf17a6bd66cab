use std::sync::{Condvar, Mutex, PoisonError};
#[cfg(test)]
use std::time::{Duration, Instant};

/// Coalescing wake-up flag a lane worker parks on.
///
/// Any number of [`Wake::signal`] calls made before the worker gets to
/// [`Wake::wait`] collapse into a single wake-up. Signalling with nobody
/// waiting leaves the flag set for the next wait.
#[derive(Debug, Default)]
pub(crate) struct Wake {
	pending: Mutex<bool>,
	ready: Condvar,
}

impl Wake {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn signal(&self) {
		let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
		*pending = true;
		self.ready.notify_one();
	}

	/// Block until a signal is pending, then consume it.
	pub(crate) fn wait(&self) {
		let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
		let mut pending = self
			.ready
			.wait_while(pending, |pending| !*pending)
			.unwrap_or_else(PoisonError::into_inner);
		*pending = false;
	}

	/// Like [`Wake::wait`] but gives up after `timeout`. Returns whether a
	/// signal was consumed.
	#[cfg(test)]
	pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
		let deadline = Instant::now() + timeout;
		let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
		while !*pending {
			let remaining = deadline.saturating_duration_since(Instant::now());
			if remaining.is_zero() {
				return false;
			}
			pending = self
				.ready
				.wait_timeout(pending, remaining)
				.unwrap_or_else(PoisonError::into_inner)
				.0;
		}
		*pending = false;
		true
	}

	#[cfg(test)]
	pub(crate) fn is_pending(&self) -> bool {
		*self.pending.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::thread;

	use super::*;

	#[test]
	fn signal_before_wait_is_not_lost() {
		let wake = Wake::new();
		wake.signal();
		assert!(wake.wait_timeout(Duration::from_millis(10)));
	}

	#[test]
	fn repeated_signals_collapse_into_one() {
		let wake = Wake::new();
		wake.signal();
		wake.signal();
		wake.signal();
		assert!(wake.wait_timeout(Duration::from_millis(10)));
		assert!(!wake.is_pending());
		assert!(!wake.wait_timeout(Duration::from_millis(10)));
	}

	#[test]
	fn wait_times_out_without_signal() {
		let wake = Wake::new();
		assert!(!wake.wait_timeout(Duration::from_millis(5)));
	}

	#[test]
	fn signal_from_another_thread_releases_waiter() {
		let wake = Arc::new(Wake::new());
		let waiter = {
			let wake = Arc::clone(&wake);
			thread::spawn(move || wake.wait())
		};

		wake.signal();
		waiter.join().expect("waiter thread");
		assert!(!wake.is_pending());
	}
}
