use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Caller-supplied opaque identifier used to correlate observability events
/// for one logical call across every system it touches. Distinct from the
/// per-attempt correlation id minted below.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrailId(Arc<str>);

impl TrailId {
	pub fn new(id: impl Into<Arc<str>>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TrailId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for TrailId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for TrailId {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

/// Mints a fresh v4 correlation id for a single transport attempt.
/// `Uuid::new_v4` draws from the thread-local RNG already, so unlike the
/// C original there's no separate per-thread generator object to own.
pub fn new_correlation_id() -> Uuid {
	Uuid::new_v4()
}
