use std::collections::HashMap;

use parking_lot::Mutex;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use tracing::{event, Level};

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RemoteIpLabel {
	pub remote_ip: String,
}

/// The process-wide SNMP-style remote-IP counter table from §4.2.4 /
/// §9. Modeled as a plain mapping guarded by a single mutex, as the
/// design notes prescribe, with a `Family<_, Gauge>` mirror for
/// Prometheus export. The map is the source of truth; the `Family` only
/// exists so the count is scrapeable the way every other metric in this
/// stack is.
pub struct RemoteIpTable {
	counts: Mutex<HashMap<String, u64>>,
	family: Family<RemoteIpLabel, Gauge>,
}

impl Default for RemoteIpTable {
	fn default() -> Self {
		Self::new()
	}
}

impl RemoteIpTable {
	pub fn new() -> Self {
		Self {
			counts: Mutex::new(HashMap::new()),
			family: Family::default(),
		}
	}

	pub fn register(&self, registry: &mut Registry) {
		registry.register(
			"remote_ip_connections",
			"number of worker connection-cache entries currently pointed at this remote IP",
			self.family.clone(),
		);
	}

	/// The single mutator described in §4.2.4: decrement/remove the row
	/// for `old` (if non-empty), then increment/create the row for `new`
	/// (if non-empty), as one atomic step. A no-op when `old == new`.
	pub fn update(&self, old: &str, new: &str) {
		if old == new {
			return;
		}
		let mut counts = self.counts.lock();
		if !old.is_empty() {
			let remaining = match counts.get_mut(old) {
				Some(v) if *v > 1 => {
					*v -= 1;
					Some(*v)
				},
				Some(_) => None,
				None => None,
			};
			if remaining.is_none() {
				counts.remove(old);
				self.family.remove(&RemoteIpLabel { remote_ip: old.to_string() });
			} else {
				self
					.family
					.get_or_create(&RemoteIpLabel { remote_ip: old.to_string() })
					.dec();
			}
		}
		if !new.is_empty() {
			*counts.entry(new.to_string()).or_insert(0) += 1;
			self
				.family
				.get_or_create(&RemoteIpLabel { remote_ip: new.to_string() })
				.inc();
		}
		event!(target: "remote_ip_table", Level::TRACE, old, new, "remote ip row updated");
	}

	/// Sum of all counter values. Exposed for the §8 invariant tests;
	/// production code has no need to read this back.
	pub fn total(&self) -> u64 {
		self.counts.lock().values().sum()
	}

	pub fn row_count(&self) -> usize {
		self.counts.lock().len()
	}

	pub fn get(&self, remote_ip: &str) -> u64 {
		self.counts.lock().get(remote_ip).copied().unwrap_or(0)
	}
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct AttemptLabel {
	pub outcome: String,
}

/// Per-attempt call metrics from §4.1's ambient addition: how many
/// attempts land in each outcome bucket, and how long each one took.
/// Mirrors the teacher's habit of pairing a `Family<_, Counter>` with a
/// `Histogram` for the same event rather than inventing a bespoke
/// aggregation type.
pub struct Metrics {
	attempts_total: Family<AttemptLabel, Counter>,
	attempt_duration_seconds: Histogram,
}

impl Default for Metrics {
	fn default() -> Self {
		Self::new()
	}
}

impl Metrics {
	pub fn new() -> Self {
		Self {
			attempts_total: Family::default(),
			attempt_duration_seconds: Histogram::new(exponential_buckets(0.001, 2.0, 16)),
		}
	}

	pub fn register(&self, registry: &mut Registry) {
		registry.register("executor_attempts", "outbound attempts, by classification outcome", self.attempts_total.clone());
		registry.register(
			"executor_attempt_duration_seconds",
			"wall-clock time spent on one transport attempt",
			self.attempt_duration_seconds.clone(),
		);
	}

	/// Record one attempt's classification and its wall-clock duration.
	/// `outcome` is the classification bucket name (e.g. `"ok"`,
	/// `"http_503"`, `"connect_failure"`), never a raw status code, so
	/// cardinality stays bounded regardless of what backends return.
	pub fn record_attempt(&self, outcome: &str, duration_seconds: f64) {
		self.attempts_total.get_or_create(&AttemptLabel { outcome: outcome.to_string() }).inc();
		self.attempt_duration_seconds.observe(duration_seconds);
	}

	/// Read back the attempt count for one outcome bucket. Exposed for
	/// tests outside this crate; production code has no need to read
	/// this back, same as `RemoteIpTable::get`.
	pub fn attempts_for(&self, outcome: &str) -> u64 {
		self.attempts_total.get_or_create(&AttemptLabel { outcome: outcome.to_string() }).get()
	}
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
