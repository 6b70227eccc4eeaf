/// Upstream admission-control feedback, per §4.1.4. Object-safe so the
/// executor can hold it behind `Option<Arc<dyn LoadMonitor>>` without a
/// generic parameter threading through every caller.
pub trait LoadMonitor: Send + Sync {
	/// Signal that downstream capacity looked degraded this call.
	fn incr_penalties(&self);

	/// The monitor's current per-attempt response-time target in
	/// microseconds, used to size the transport timeout (§5). `None`
	/// falls back to the executor's default.
	fn target_latency_us(&self) -> Option<u64>;
}

/// Health feedback independent of the load monitor, per §4.1.5 and §9's
/// note that the two are allowed to disagree — this one tracks whether
/// the *peer* answered coherently at all, not whether it was loaded.
pub trait CommunicationMonitor: Send + Sync {
	fn inform_success(&self, now_ms: u64);
	fn inform_failure(&self, now_ms: u64);
}
