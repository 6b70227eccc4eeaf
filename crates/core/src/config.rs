//! Plain deserializable config data, per the ambient "configuration
//! loading" addition in §2. No file/CLI loader lives here — a caller
//! parses this out of whatever config source it already has and hands
//! the result to `sig_client::ExecutorConfig::from_config`.

/// Timeout knobs from §4.1/§5: how long an attempt is allowed to run
/// before the executor gives up on it and moves to the next target.
#[derive(serde::Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct TimeoutConfig {
	/// Milliseconds to wait for a fresh TCP/TLS handshake, per §4.1.4.
	pub connect_timeout_ms: u64,
	/// Default target round-trip latency in microseconds, used when no
	/// load monitor is attached or it reports no target, per §4.1.4's
	/// "5x target latency" response-timeout rule.
	pub default_target_latency_us: u64,
}

impl Default for TimeoutConfig {
	fn default() -> Self {
		Self {
			connect_timeout_ms: 500,
			default_target_latency_us: 500_000,
		}
	}
}

/// Worker-pool/retry sizing knobs from §4.1.1/§4.2.
#[derive(serde::Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct PoolConfig {
	/// Upper bound on resolver candidates considered per call, per
	/// §4.1.1's retry budget.
	pub max_candidates: usize,
	/// Whether outbound requests carry `X-XCAP-Asserted-Identity`, per
	/// §3's "connection constructed with `assert_user`".
	pub assert_user: bool,
}

impl Default for PoolConfig {
	fn default() -> Self {
		Self {
			max_candidates: 5,
			assert_user: false,
		}
	}
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
