use std::sync::Arc;

use sig_core::metrics::RemoteIpTable;
use sig_core::sampler::InterarrivalSampler;

use crate::transport::DnsOverride;

/// One worker's exclusive view of a single executor's connection state,
/// per §4.2.1. Never shared across workers — no internal locking beyond
/// the process-wide `RemoteIpTable` it delegates to for §4.2.4.
pub struct ConnectionCacheEntry<H> {
	handle: Option<H>,
	deadline_ms: u64,
	sampler: InterarrivalSampler,
	remote_ip: String,
	pending_dns_overrides: Vec<DnsOverride>,
	remote_ip_table: Arc<RemoteIpTable>,
}

impl<H> ConnectionCacheEntry<H> {
	pub fn new(remote_ip_table: Arc<RemoteIpTable>) -> Self {
		Self {
			handle: None,
			deadline_ms: 0,
			sampler: InterarrivalSampler::default(),
			remote_ip: String::new(),
			pending_dns_overrides: Vec::new(),
			remote_ip_table,
		}
	}

	pub fn remote_ip(&self) -> &str {
		&self.remote_ip
	}

	/// `expired? := now_ms > deadline_ms`, per §4.2.2. `deadline_ms == 0`
	/// (never set) is always expired, forcing a fresh connection on the
	/// first use of a new entry.
	pub fn expired(&self, now_ms: u64) -> bool {
		now_ms > self.deadline_ms
	}

	pub fn deadline_ms(&self) -> u64 {
		self.deadline_ms
	}

	/// Recompute the recycle deadline after a successful attempt on a
	/// fresh connection, per §4.2.2's exact arithmetic: a quiet-period
	/// entry resets its deadline off `now_ms`, a busy one advances it by
	/// the sampled interval so the long-run mean interarrival holds.
	pub fn advance_deadline(&mut self, now_ms: u64) {
		let interval = self.sampler.sample_ms();
		if self.deadline_ms == 0 || self.deadline_ms + interval < now_ms {
			self.deadline_ms = now_ms + interval;
		} else {
			self.deadline_ms += interval;
		}
	}

	/// The single mutator from §4.2.4. A no-op if `v` already matches.
	pub fn set_remote_ip(&mut self, v: &str) {
		if v == self.remote_ip {
			return;
		}
		self.remote_ip_table.update(&self.remote_ip, v);
		self.remote_ip = v.to_string();
	}

	/// Take the override(s) left by the previous attempt for removal, and
	/// queue `next` as this attempt's own install — to be removed in turn
	/// on the attempt after this one. Keeps overrides single-call-scoped
	/// per §4.2.3 without any global bookkeeping.
	pub fn rotate_dns_override(&mut self, next: Option<DnsOverride>) -> Vec<DnsOverride> {
		let clear = std::mem::take(&mut self.pending_dns_overrides);
		if let Some(next) = next {
			self.pending_dns_overrides.push(next);
		}
		clear
	}

	pub fn handle_mut(&mut self) -> &mut Option<H> {
		&mut self.handle
	}

	/// Drop the held handle, forcing the next `expired()` caller's
	/// attempt to open a fresh connection regardless of `deadline_ms`.
	/// Used on worker teardown (§5, "resources released on all exit
	/// paths").
	pub fn close(&mut self) {
		self.handle = None;
	}
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
