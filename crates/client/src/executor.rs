use std::sync::Arc;

use sig_core::clock::{MonotonicClock, SystemMonotonicClock};
use sig_core::config::{PoolConfig, TimeoutConfig};
use sig_core::metrics::{Metrics, RemoteIpTable};
use sig_core::trail::new_correlation_id;
use sig_resolver::{ResolverAdapter, Target};
use tracing::{event, Level};

use crate::cache::ConnectionCacheEntry;
use crate::monitor::{CommunicationMonitor, LoadMonitor};
use crate::request::Request;
use crate::response::{apply_header_line, Response};
use crate::transport::{DnsOverride, Transport, TransportAttempt, TransportFailure, TransportOutcome};

/// Static per-executor configuration: the logical backend this executor
/// calls, and the constants §5/§4.1 hang timeouts and header policy off.
#[derive(Clone, Debug)]
pub struct ExecutorConfig {
	pub scheme: String,
	pub host: String,
	pub port: u16,
	/// Append `X-XCAP-Asserted-Identity` when the request carries one,
	/// per §3's "iff the connection was constructed with `assert_user`".
	pub assert_user: bool,
	pub correlation_header: String,
	pub max_candidates: usize,
	pub default_target_latency_us: u64,
	pub connect_timeout_ms: u64,
}

impl ExecutorConfig {
	pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
		Self {
			scheme: scheme.into(),
			host: host.into(),
			port,
			assert_user: false,
			correlation_header: "X-Trail-Correlation-Id".to_string(),
			max_candidates: 5,
			default_target_latency_us: 500_000,
			connect_timeout_ms: 500,
		}
	}

	/// Builds from the `sig-core` deserializable config structs (§2:
	/// "higher layers must be able to construct an executor from parsed
	/// config"), layering `timeouts`/`pool` over the same defaults `new`
	/// uses.
	pub fn from_config(scheme: impl Into<String>, host: impl Into<String>, port: u16, timeouts: TimeoutConfig, pool: PoolConfig) -> Self {
		Self::new(scheme, host, port)
			.with_assert_user(pool.assert_user)
			.with_max_candidates(pool.max_candidates)
			.with_connect_timeout_ms(timeouts.connect_timeout_ms)
			.with_default_target_latency_us(timeouts.default_target_latency_us)
	}

	pub fn with_assert_user(mut self, assert_user: bool) -> Self {
		self.assert_user = assert_user;
		self
	}

	pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
		self.max_candidates = max_candidates;
		self
	}

	pub fn with_connect_timeout_ms(mut self, connect_timeout_ms: u64) -> Self {
		self.connect_timeout_ms = connect_timeout_ms;
		self
	}

	pub fn with_default_target_latency_us(mut self, default_target_latency_us: u64) -> Self {
		self.default_target_latency_us = default_target_latency_us;
		self
	}
}

/// Result of classifying one attempt, per §4.1.2 step 6. Carries just
/// enough of the transport's answer to drive the stopping rule, feedback,
/// and the final status mapping without re-deriving it later.
enum Classification {
	Ok(TransportOutcome),
	Http503(TransportOutcome),
	Http504(TransportOutcome),
	FatalHttp(TransportOutcome),
	NotFoundOrDenied(TransportFailure),
	TimeoutOrIo(TransportFailure),
	ConnectFailure(TransportFailure),
}

fn classify(result: Result<TransportOutcome, TransportFailure>) -> Classification {
	match result {
		Ok(outcome) if outcome.status < 400 => Classification::Ok(outcome),
		Ok(outcome) if outcome.status == 503 => Classification::Http503(outcome),
		Ok(outcome) if outcome.status == 504 => Classification::Http504(outcome),
		Ok(outcome) => Classification::FatalHttp(outcome),
		Err(f @ (TransportFailure::RemoteFileNotFound | TransportFailure::RemoteAccessDenied)) => {
			Classification::NotFoundOrDenied(f)
		},
		Err(f @ (TransportFailure::Timeout | TransportFailure::SendError | TransportFailure::RecvError)) => {
			Classification::TimeoutOrIo(f)
		},
		Err(f) => Classification::ConnectFailure(f),
	}
}

/// The bucket name recorded against `Metrics::record_attempt`. Kept as
/// its own function so the label set stays exactly the `Classification`
/// variants, never a raw status code.
fn classification_label(classification: &Classification) -> &'static str {
	match classification {
		Classification::Ok(_) => "ok",
		Classification::Http503(_) => "http_503",
		Classification::Http504(_) => "http_504",
		Classification::FatalHttp(_) => "fatal_http",
		Classification::NotFoundOrDenied(_) => "not_found_or_denied",
		Classification::TimeoutOrIo(_) => "timeout_or_io",
		Classification::ConnectFailure(_) => "connect_failure",
	}
}

/// Maps a transport failure that never produced a completed HTTP
/// exchange to a final status, per §4.1.6. `remote file not found` and
/// `remote access denied` share a row in the table (both are
/// "not_found_or_denied" at classification time); `could not connect`
/// covers DNS/TCP failure; everything else is 500.
fn failure_to_status(failure: &TransportFailure) -> u16 {
	match failure {
		TransportFailure::UrlMalformed => 400,
		TransportFailure::RemoteFileNotFound | TransportFailure::RemoteAccessDenied => 404,
		TransportFailure::CouldNotConnect => 404,
		TransportFailure::Timeout | TransportFailure::SendError | TransportFailure::RecvError | TransportFailure::Other(_) => 500,
	}
}

/// The request executor from §4.1: a per-call state machine that turns a
/// `Request` plus a worker's `ConnectionCacheEntry` into a `Response`,
/// never failing with an error of its own.
pub struct RequestExecutor<T: Transport, R: ResolverAdapter, C: MonotonicClock = SystemMonotonicClock> {
	transport: Arc<T>,
	resolver: Arc<R>,
	clock: C,
	config: ExecutorConfig,
	remote_ip_table: Arc<RemoteIpTable>,
	load_monitor: Option<Arc<dyn LoadMonitor>>,
	comm_monitor: Option<Arc<dyn CommunicationMonitor>>,
	metrics: Option<Arc<Metrics>>,
}

impl<T: Transport, R: ResolverAdapter> RequestExecutor<T, R, SystemMonotonicClock> {
	pub fn new(transport: Arc<T>, resolver: Arc<R>, config: ExecutorConfig, remote_ip_table: Arc<RemoteIpTable>) -> Self {
		Self::with_clock(transport, resolver, config, remote_ip_table, SystemMonotonicClock::default())
	}
}

impl<T: Transport, R: ResolverAdapter, C: MonotonicClock> RequestExecutor<T, R, C> {
	pub fn with_clock(
		transport: Arc<T>,
		resolver: Arc<R>,
		config: ExecutorConfig,
		remote_ip_table: Arc<RemoteIpTable>,
		clock: C,
	) -> Self {
		Self {
			transport,
			resolver,
			clock,
			config,
			remote_ip_table,
			load_monitor: None,
			comm_monitor: None,
			metrics: None,
		}
	}

	pub fn with_load_monitor(mut self, monitor: Arc<dyn LoadMonitor>) -> Self {
		self.load_monitor = Some(monitor);
		self
	}

	pub fn with_communication_monitor(mut self, monitor: Arc<dyn CommunicationMonitor>) -> Self {
		self.comm_monitor = Some(monitor);
		self
	}

	pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
		self.metrics = Some(metrics);
		self
	}

	/// A cache entry wired to this executor's shared SNMP table, ready to
	/// be handed to `execute` by the worker that owns it.
	pub fn new_cache_entry(&self) -> ConnectionCacheEntry<T::Handle> {
		ConnectionCacheEntry::new(self.remote_ip_table.clone())
	}

	fn response_timeout_ms(&self) -> u64 {
		let target_latency_us = self
			.load_monitor
			.as_ref()
			.and_then(|m| m.target_latency_us())
			.unwrap_or(self.config.default_target_latency_us);
		(target_latency_us.saturating_mul(5) / 1000).max(1)
	}

	fn assemble_targets(&self, cache: &ConnectionCacheEntry<T::Handle>, candidates: Vec<Target>, expired: bool) -> Vec<Target> {
		let mut targets = candidates;
		if !expired && !cache.remote_ip().is_empty() {
			if let Some(pos) = targets.iter().position(|t| t.ip_string() == cache.remote_ip()) {
				let sticky = targets.remove(pos);
				targets.insert(0, sticky);
			}
		}
		if targets.len() == 1 {
			let only = targets[0].clone();
			targets.push(only);
		}
		targets
	}

	/// Headers shared by every attempt of this call: the caller's extras,
	/// `Expect:`, optional asserted identity, optional `Content-Type`.
	/// The correlation header is deliberately left out — §4.1.2 step 3
	/// mints a fresh one per attempt, added by `attempt_headers` below.
	fn build_headers(&self, request: &Request) -> Vec<(String, String)> {
		let mut headers = request.headers.clone();
		headers.push(("Expect".to_string(), String::new()));
		if self.config.assert_user {
			if let Some(identity) = &request.asserted_identity {
				headers.push(("X-XCAP-Asserted-Identity".to_string(), identity.clone()));
			}
		}
		if request.body.is_some() {
			headers.push(("Content-Type".to_string(), "application/json".to_string()));
		}
		headers
	}

	/// Appends this attempt's own correlation id to a clone of the
	/// shared base headers, so each target gets a distinct value.
	fn attempt_headers(&self, base_headers: &[(String, String)], correlation_id: &str) -> Vec<(String, String)> {
		let mut headers = base_headers.to_vec();
		headers.push((self.config.correlation_header.clone(), correlation_id.to_string()));
		headers
	}

	/// Drive one outbound call end to end: resolve candidates, attempt
	/// each in order, classify and react to every outcome, and produce a
	/// final `Response` whose status always encodes what happened (§7).
	pub async fn execute(&self, cache: &mut ConnectionCacheEntry<T::Handle>, request: Request) -> Response {
		// `request.path` was already checked for a leading '/' at
		// `Request::new`, and host/port come from fixed executor config,
		// so the assembled URL can never actually be malformed here —
		// `UrlMalformed`/400 stays reachable only via `failure_to_status`,
		// per the open question about it being an excluded path.
		let url = format!("{}://{}:{}{}", self.config.scheme, self.config.host, self.config.port, request.path);

		let now_ms = self.clock.now_ms();
		let expired = cache.expired(now_ms);

		let candidates = self
			.resolver
			.resolve(&self.config.host, self.config.port, self.config.max_candidates, request.host_state_mask, &request.trail)
			.await;
		if candidates.is_empty() {
			event!(target: "upstream request", Level::DEBUG, trail = %request.trail, "no candidates returned by resolver");
			cache.set_remote_ip("");
			return Response::status_only(404);
		}

		let targets = self.assemble_targets(cache, candidates, expired);
		let headers = self.build_headers(&request);

		let mut count_503: u32 = 0;
		let mut count_504: u32 = 0;
		let mut count_timeout_io: u32 = 0;
		let mut last_http_status: Option<u16> = None;
		let mut last_header_lines: Vec<String> = Vec::new();
		let mut last_body = bytes::Bytes::new();
		let mut last_failure: Option<TransportFailure> = None;
		let mut succeeded = false;
		let mut fatal_stop = false;

		for target in &targets {
			event!(target: "upstream request", Level::DEBUG, trail = %request.trail, peer = %target, "attempting target");

			let dns_override = DnsOverride { host: self.config.host.clone(), port: self.config.port, addr: target.addr };
			let clear_dns_overrides = cache.rotate_dns_override(Some(dns_override.clone()));

			let correlation_id = new_correlation_id().to_string();
			let attempt = TransportAttempt {
				url: url.clone(),
				method: request.method.clone(),
				body: request.body.clone(),
				headers: self.attempt_headers(&headers, &correlation_id),
				clear_dns_overrides,
				dns_override: Some(dns_override),
				force_fresh_connection: expired,
				response_timeout: std::time::Duration::from_millis(self.response_timeout_ms()),
				connect_timeout: std::time::Duration::from_millis(self.config.connect_timeout_ms),
			};

			event!(target: "upstream request", Level::TRACE, trail = %request.trail, correlation_id = %correlation_id, "call start");

			if cache.handle_mut().is_none() {
				*cache.handle_mut() = Some(self.transport.new_handle().await);
			}
			let handle = cache.handle_mut().as_mut().expect("just populated");
			let attempt_start_ms = self.clock.now_ms();
			let result = self.transport.call(handle, attempt).await;
			let attempt_duration_s = (self.clock.now_ms().saturating_sub(attempt_start_ms)) as f64 / 1000.0;

			let classification = classify(result);
			if let Some(metrics) = &self.metrics {
				metrics.record_attempt(classification_label(&classification), attempt_duration_s);
			}

			let mut stop = false;
			match classification {
				Classification::Ok(outcome) => {
					last_http_status = Some(outcome.status);
					last_header_lines = outcome.header_lines;
					last_body = outcome.body;
					succeeded = true;
					if expired {
						cache.advance_deadline(self.clock.now_ms());
					}
					cache.set_remote_ip(&target.ip_string());
					stop = true;
				},
				Classification::Http503(outcome) => {
					last_http_status = Some(outcome.status);
					last_header_lines = outcome.header_lines;
					last_body = outcome.body;
					count_503 += 1;
					stop = count_503 + count_timeout_io >= 2;
				},
				Classification::Http504(outcome) => {
					last_http_status = Some(outcome.status);
					last_header_lines = outcome.header_lines;
					last_body = outcome.body;
					count_504 += 1;
					stop = true;
				},
				Classification::FatalHttp(outcome) => {
					last_http_status = Some(outcome.status);
					last_header_lines = outcome.header_lines;
					last_body = outcome.body;
					fatal_stop = true;
					stop = true;
				},
				Classification::NotFoundOrDenied(failure) => {
					last_failure = Some(failure);
					fatal_stop = true;
					stop = true;
				},
				Classification::TimeoutOrIo(failure) => {
					count_timeout_io += 1;
					stop = count_503 + count_timeout_io >= 2;
					last_failure = Some(failure);
				},
				Classification::ConnectFailure(failure) => {
					if expired {
						event!(target: "upstream request", Level::DEBUG, trail = %request.trail, peer = %target, "blacklisting after connect failure on fresh connection");
						self.resolver.blacklist(target.clone()).await;
					}
					last_failure = Some(failure);
				},
			}

			if stop {
				break;
			}
		}

		if !succeeded {
			let reason = if fatal_stop { "Permanent" } else { "Temporary" };
			event!(target: "upstream request", Level::DEBUG, trail = %request.trail, reason, "retry budget exhausted");
			cache.set_remote_ip("");
		}

		if let Some(monitor) = &self.load_monitor {
			if count_503 >= 2 || count_504 >= 1 {
				monitor.incr_penalties();
			}
		}
		if let Some(monitor) = &self.comm_monitor {
			let now_ms = self.clock.now_ms();
			if succeeded && count_503 < 2 {
				monitor.inform_success(now_ms);
			} else {
				monitor.inform_failure(now_ms);
			}
		}

		let status = last_http_status.unwrap_or_else(|| last_failure.as_ref().map(failure_to_status).unwrap_or(500));
		let mut response = Response::new(status, last_body, indexmap::IndexMap::new());
		for line in &last_header_lines {
			apply_header_line(&mut response.headers, line);
		}
		response
	}
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
