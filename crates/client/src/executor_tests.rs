use std::net::IpAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use sig_core::clock::FakeClock;
use sig_core::config::{PoolConfig, TimeoutConfig};
use sig_core::metrics::RemoteIpTable;
use sig_core::TrailId;
use sig_resolver::{HostStateMask, ParseTargetError, ResolverAdapter, Target, TransportKind};

use super::*;

#[test]
fn classify_buckets_statuses_and_failures_correctly() {
	let ok = TransportOutcome { status: 204, body: Bytes::new(), header_lines: vec![], peer_ip: String::new() };
	assert!(matches!(classify(Ok(ok)), Classification::Ok(_)));

	let s503 = TransportOutcome { status: 503, body: Bytes::new(), header_lines: vec![], peer_ip: String::new() };
	assert!(matches!(classify(Ok(s503)), Classification::Http503(_)));

	let s504 = TransportOutcome { status: 504, body: Bytes::new(), header_lines: vec![], peer_ip: String::new() };
	assert!(matches!(classify(Ok(s504)), Classification::Http504(_)));

	let s500 = TransportOutcome { status: 500, body: Bytes::new(), header_lines: vec![], peer_ip: String::new() };
	assert!(matches!(classify(Ok(s500)), Classification::FatalHttp(_)));

	assert!(matches!(
		classify(Err(TransportFailure::RemoteFileNotFound)),
		Classification::NotFoundOrDenied(_)
	));
	assert!(matches!(
		classify(Err(TransportFailure::RemoteAccessDenied)),
		Classification::NotFoundOrDenied(_)
	));
	assert!(matches!(classify(Err(TransportFailure::Timeout)), Classification::TimeoutOrIo(_)));
	assert!(matches!(classify(Err(TransportFailure::SendError)), Classification::TimeoutOrIo(_)));
	assert!(matches!(classify(Err(TransportFailure::RecvError)), Classification::TimeoutOrIo(_)));
	assert!(matches!(
		classify(Err(TransportFailure::CouldNotConnect)),
		Classification::ConnectFailure(_)
	));
}

#[test]
fn from_config_layers_timeouts_and_pool_settings_over_the_defaults() {
	let timeouts = TimeoutConfig { connect_timeout_ms: 250, default_target_latency_us: 100_000 };
	let pool = PoolConfig { max_candidates: 3, assert_user: true };
	let config = ExecutorConfig::from_config("http", "hss.example.internal", 8080, timeouts, pool);

	assert_eq!(config.connect_timeout_ms, 250);
	assert_eq!(config.default_target_latency_us, 100_000);
	assert_eq!(config.max_candidates, 3);
	assert!(config.assert_user);
}

#[test]
fn failure_to_status_matches_table() {
	assert_eq!(failure_to_status(&TransportFailure::UrlMalformed), 400);
	assert_eq!(failure_to_status(&TransportFailure::RemoteFileNotFound), 404);
	assert_eq!(failure_to_status(&TransportFailure::RemoteAccessDenied), 404);
	assert_eq!(failure_to_status(&TransportFailure::CouldNotConnect), 404);
	assert_eq!(failure_to_status(&TransportFailure::Timeout), 500);
	assert_eq!(failure_to_status(&TransportFailure::Other("x".into())), 500);
}

struct NoopTransport;

#[async_trait]
impl Transport for NoopTransport {
	type Handle = ();

	async fn new_handle(&self) -> Self::Handle {}

	async fn call(&self, _handle: &mut Self::Handle, _attempt: TransportAttempt) -> Result<TransportOutcome, TransportFailure> {
		Err(TransportFailure::CouldNotConnect)
	}
}

struct NoopResolver;

#[async_trait]
impl ResolverAdapter for NoopResolver {
	async fn resolve(&self, _host: &str, _port: u16, _max: usize, _mask: HostStateMask, _trail: &TrailId) -> Vec<Target> {
		Vec::new()
	}

	async fn blacklist(&self, _target: Target) {}

	fn parse_ip_target(&self, literal: &str, port: u16) -> Result<Target, ParseTargetError> {
		literal
			.parse::<IpAddr>()
			.map(|addr| Target::new(addr, port, TransportKind::Tcp))
			.map_err(|_| ParseTargetError::NotALiteral(literal.to_string()))
	}
}

fn test_executor() -> RequestExecutor<NoopTransport, NoopResolver, FakeClock> {
	RequestExecutor::with_clock(
		Arc::new(NoopTransport),
		Arc::new(NoopResolver),
		ExecutorConfig::new("http", "hss.example.internal", 8080),
		Arc::new(RemoteIpTable::new()),
		FakeClock::new(0),
	)
}

fn target(ip: &str) -> Target {
	Target::new(ip.parse().unwrap(), 8080, TransportKind::Tcp)
}

#[test]
fn assemble_targets_duplicates_single_candidate() {
	let executor = test_executor();
	let cache = ConnectionCacheEntry::<()>::new(Arc::new(RemoteIpTable::new()));
	let targets = executor.assemble_targets(&cache, vec![target("10.0.0.1")], true);
	assert_eq!(targets, vec![target("10.0.0.1"), target("10.0.0.1")]);
}

#[test]
fn assemble_targets_moves_sticky_target_to_front_when_not_expired() {
	let executor = test_executor();
	let mut cache = ConnectionCacheEntry::<()>::new(Arc::new(RemoteIpTable::new()));
	cache.set_remote_ip("10.0.0.2");
	let candidates = vec![target("10.0.0.1"), target("10.0.0.2"), target("10.0.0.3")];
	let targets = executor.assemble_targets(&cache, candidates, false);
	assert_eq!(targets[0], target("10.0.0.2"));
	assert_eq!(targets.len(), 3);
}

#[test]
fn assemble_targets_ignores_sticky_hint_when_expired() {
	let executor = test_executor();
	let mut cache = ConnectionCacheEntry::<()>::new(Arc::new(RemoteIpTable::new()));
	cache.set_remote_ip("10.0.0.2");
	let candidates = vec![target("10.0.0.1"), target("10.0.0.2"), target("10.0.0.3")];
	let targets = executor.assemble_targets(&cache, candidates, true);
	assert_eq!(targets[0], target("10.0.0.1"));
}

#[test]
fn build_headers_always_carries_empty_expect_and_no_correlation_id() {
	let executor = test_executor();
	let request = Request::new(http::Method::GET, "/p", TrailId::new("t")).unwrap();
	let headers = executor.build_headers(&request);
	assert!(headers.iter().any(|(k, v)| k == "Expect" && v.is_empty()));
	// The correlation id is minted fresh per attempt by `attempt_headers`,
	// not baked into the shared base headers.
	assert!(!headers.iter().any(|(k, _)| k == executor_correlation_header(&executor)));
	assert!(!headers.iter().any(|(k, _)| k == "Content-Type"));
}

#[test]
fn attempt_headers_mints_a_distinct_correlation_id_each_call() {
	let executor = test_executor();
	let request = Request::new(http::Method::GET, "/p", TrailId::new("t")).unwrap();
	let base = executor.build_headers(&request);
	let header_name = executor_correlation_header(&executor).to_string();

	let first = executor.attempt_headers(&base, &sig_core::trail::new_correlation_id().to_string());
	let second = executor.attempt_headers(&base, &sig_core::trail::new_correlation_id().to_string());

	let first_id = first.iter().find(|(k, _)| *k == header_name).map(|(_, v)| v.clone());
	let second_id = second.iter().find(|(k, _)| *k == header_name).map(|(_, v)| v.clone());
	assert!(first_id.is_some());
	assert_ne!(first_id, second_id);
}

#[test]
fn build_headers_adds_content_type_only_with_a_body() {
	let executor = test_executor();
	let request = Request::new(http::Method::POST, "/p", TrailId::new("t"))
		.unwrap()
		.with_body(Bytes::from_static(b"{}"));
	let headers = executor.build_headers(&request);
	assert!(headers.iter().any(|(k, v)| k == "Content-Type" && v == "application/json"));
}

#[test]
fn build_headers_adds_asserted_identity_only_when_assert_user_is_on() {
	let mut executor = test_executor();
	executor.config = executor.config.clone().with_assert_user(true);
	let request = Request::new(http::Method::GET, "/p", TrailId::new("t"))
		.unwrap()
		.with_asserted_identity("sip:alice@example.com");
	let headers = executor.build_headers(&request);
	assert!(headers
		.iter()
		.any(|(k, v)| k == "X-XCAP-Asserted-Identity" && v == "sip:alice@example.com"));
}

fn executor_correlation_header(executor: &RequestExecutor<NoopTransport, NoopResolver, FakeClock>) -> &str {
	&executor.config.correlation_header
}

#[tokio::test]
async fn resolver_returning_nothing_yields_404_with_no_attempts() {
	let executor = test_executor();
	let mut cache = executor.new_cache_entry();
	let request = Request::new(http::Method::GET, "/p", TrailId::new("t")).unwrap();
	let response = executor.execute(&mut cache, request).await;
	assert_eq!(response.status, 404);
	assert!(cache.remote_ip().is_empty());
}

struct CountingConnectFailureTransport {
	calls: AtomicU32,
}

#[async_trait]
impl Transport for CountingConnectFailureTransport {
	type Handle = ();

	async fn new_handle(&self) -> Self::Handle {}

	async fn call(&self, _handle: &mut Self::Handle, _attempt: TransportAttempt) -> Result<TransportOutcome, TransportFailure> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Err(TransportFailure::CouldNotConnect)
	}
}

struct TwoTargetResolver {
	blacklisted: Mutex<Vec<Target>>,
}

#[async_trait]
impl ResolverAdapter for TwoTargetResolver {
	async fn resolve(&self, _host: &str, _port: u16, _max: usize, _mask: HostStateMask, _trail: &TrailId) -> Vec<Target> {
		vec![target("10.0.0.1"), target("10.0.0.2")]
	}

	async fn blacklist(&self, target: Target) {
		self.blacklisted.lock().unwrap().push(target);
	}

	fn parse_ip_target(&self, literal: &str, port: u16) -> Result<Target, ParseTargetError> {
		literal
			.parse::<IpAddr>()
			.map(|addr| Target::new(addr, port, TransportKind::Tcp))
			.map_err(|_| ParseTargetError::NotALiteral(literal.to_string()))
	}
}

#[tokio::test]
async fn connect_failure_on_fresh_connection_blacklists_every_exhausted_target() {
	let resolver = Arc::new(TwoTargetResolver { blacklisted: Mutex::new(Vec::new()) });
	let executor = RequestExecutor::with_clock(
		Arc::new(CountingConnectFailureTransport { calls: AtomicU32::new(0) }),
		resolver.clone(),
		ExecutorConfig::new("http", "hss.example.internal", 8080),
		Arc::new(RemoteIpTable::new()),
		FakeClock::new(1),
	);
	let mut cache = executor.new_cache_entry();
	let request = Request::new(http::Method::GET, "/p", TrailId::new("t")).unwrap();
	let response = executor.execute(&mut cache, request).await;

	assert_eq!(response.status, 404);
	assert_eq!(resolver.blacklisted.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn metrics_records_one_attempt_per_classified_call() {
	let resolver = Arc::new(TwoTargetResolver { blacklisted: Mutex::new(Vec::new()) });
	let metrics = Arc::new(sig_core::metrics::Metrics::new());
	let executor = RequestExecutor::with_clock(
		Arc::new(CountingConnectFailureTransport { calls: AtomicU32::new(0) }),
		resolver,
		ExecutorConfig::new("http", "hss.example.internal", 8080),
		Arc::new(RemoteIpTable::new()),
		FakeClock::new(1),
	)
	.with_metrics(metrics.clone());
	let mut cache = executor.new_cache_entry();
	let request = Request::new(http::Method::GET, "/p", TrailId::new("t")).unwrap();
	executor.execute(&mut cache, request).await;

	assert_eq!(metrics.attempts_for("connect_failure"), 2);
}
