use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A source of monotonic milliseconds, used for `deadline_ms` and timeout
/// math throughout the executor. Deliberately not wall-clock time: §9 of
/// the design notes flags the real-time clock as unsuitable for this.
pub trait MonotonicClock: Send + Sync {
	fn now_ms(&self) -> u64;
}

/// Production clock, anchored to process start so `now_ms()` fits in a u64
/// for the lifetime of any realistic process.
#[derive(Clone)]
pub struct SystemMonotonicClock {
	epoch: Instant,
}

impl Default for SystemMonotonicClock {
	fn default() -> Self {
		Self { epoch: Instant::now() }
	}
}

impl MonotonicClock for SystemMonotonicClock {
	fn now_ms(&self) -> u64 {
		self.epoch.elapsed().as_millis() as u64
	}
}

/// Test clock with an explicitly advanceable time, so deadline/timeout
/// tests don't depend on real sleeps.
#[derive(Clone, Default)]
pub struct FakeClock {
	millis: Arc<AtomicU64>,
}

impl FakeClock {
	pub fn new(start_ms: u64) -> Self {
		Self { millis: Arc::new(AtomicU64::new(start_ms)) }
	}

	pub fn advance(&self, delta_ms: u64) {
		self.millis.fetch_add(delta_ms, Ordering::SeqCst);
	}

	pub fn set(&self, ms: u64) {
		self.millis.store(ms, Ordering::SeqCst);
	}
}

impl MonotonicClock for FakeClock {
	fn now_ms(&self) -> u64 {
		self.millis.load(Ordering::SeqCst)
	}
}
