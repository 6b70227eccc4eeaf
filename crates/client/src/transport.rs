use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

/// A transient `host:port -> ip` override installed for one attempt, per
/// §4.2.3. The executor leaves a removal directive for this override in
/// the cache entry so the next attempt clears it before installing its
/// own, keeping overrides single-call-scoped without global
/// synchronization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsOverride {
	pub host: String,
	pub port: u16,
	pub addr: IpAddr,
}

/// Everything the executor asks the transport to do for one attempt. The
/// transport itself — the byte-level HTTP/1.1 codec, TLS, DNS — is out of
/// scope (§1); this struct is the full callback surface from §6.
#[derive(Clone, Debug)]
pub struct TransportAttempt {
	pub url: String,
	pub method: http::Method,
	pub body: Option<Bytes>,
	/// Ordered request header lines, already fully assembled by the
	/// executor (§4.1.2 step 3): caller extras, `Expect:`, correlation
	/// id, optional asserted identity, optional `Content-Type`.
	pub headers: Vec<(String, String)>,
	/// Overrides to remove before this attempt runs, left over from the
	/// previous attempt on this cache entry.
	pub clear_dns_overrides: Vec<DnsOverride>,
	/// The override this attempt installs for its own target.
	pub dns_override: Option<DnsOverride>,
	pub force_fresh_connection: bool,
	pub response_timeout: Duration,
	pub connect_timeout: Duration,
}

/// A completed HTTP exchange: the transport reached a peer and got an
/// HTTP response, whatever its status.
#[derive(Clone, Debug)]
pub struct TransportOutcome {
	pub status: u16,
	pub body: Bytes,
	/// Raw header lines as the wire sent them, one per line, parsed by
	/// the caller via `response::apply_header_line`.
	pub header_lines: Vec<String>,
	pub peer_ip: String,
}

/// Everything that can go wrong before or during one attempt, per §4.1.2
/// step 6 and §6's transport contract.
#[derive(Clone, Debug, thiserror::Error)]
pub enum TransportFailure {
	#[error("request url was malformed")]
	UrlMalformed,
	#[error("remote file not found")]
	RemoteFileNotFound,
	#[error("remote access denied")]
	RemoteAccessDenied,
	#[error("could not resolve or connect to peer")]
	CouldNotConnect,
	#[error("operation timed out")]
	Timeout,
	#[error("error sending request")]
	SendError,
	#[error("error receiving response")]
	RecvError,
	#[error("transport error: {0}")]
	Other(String),
}

/// The transport boundary the executor drives. Implementors own
/// connection establishment, TLS, and the HTTP/1.1 framing; the executor
/// only ever sees `TransportAttempt` in, `TransportOutcome`/
/// `TransportFailure` out.
#[async_trait]
pub trait Transport: Send + Sync {
	/// The worker-local connection resource the `ConnectionCache` holds
	/// one of per entry (e.g. a pooled client handle). Lazily created.
	type Handle: Send;

	async fn new_handle(&self) -> Self::Handle;

	async fn call(
		&self,
		handle: &mut Self::Handle,
		attempt: TransportAttempt,
	) -> Result<TransportOutcome, TransportFailure>;
}
