use bytes::Bytes;
use sig_core::error::ExecutorError;
use sig_core::TrailId;
use sig_resolver::{all_host_states, HostStateMask};

/// The four verbs this executor knows how to send, per §3. Backed by
/// `http::Method` rather than a bespoke enum so header/verb handling
/// downstream can use the same type the rest of the ecosystem does.
pub const SUPPORTED_METHODS: [http::Method; 4] =
	[http::Method::GET, http::Method::PUT, http::Method::POST, http::Method::DELETE];

/// An immutable value describing one outbound call, per §3.
#[derive(Clone, Debug)]
pub struct Request {
	pub method: http::Method,
	pub path: String,
	pub body: Option<Bytes>,
	pub headers: Vec<(String, String)>,
	pub host_state_mask: HostStateMask,
	pub asserted_identity: Option<String>,
	pub trail: TrailId,
}

impl Request {
	/// `method` must be one of GET/PUT/POST/DELETE and `path` must begin
	/// with `/`; both are executor-level invariants checked once at
	/// construction, not per-attempt.
	pub fn new(method: http::Method, path: impl Into<String>, trail: TrailId) -> Result<Self, ExecutorError> {
		if !SUPPORTED_METHODS.contains(&method) {
			return Err(ExecutorError::UnsupportedMethod(method.to_string()));
		}
		let path = path.into();
		if !path.starts_with('/') {
			return Err(ExecutorError::MalformedPath(path));
		}
		Ok(Self {
			method,
			path,
			body: None,
			headers: Vec::new(),
			host_state_mask: all_host_states(),
			asserted_identity: None,
			trail,
		})
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = Some(body.into());
		self
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));
		self
	}

	pub fn with_host_state_mask(mut self, mask: HostStateMask) -> Self {
		self.host_state_mask = mask;
		self
	}

	pub fn with_asserted_identity(mut self, identity: impl Into<String>) -> Self {
		self.asserted_identity = Some(identity.into());
		self
	}
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
