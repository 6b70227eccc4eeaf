use std::net::IpAddr;

use async_trait::async_trait;
use hickory_resolver::TokioResolver;

use crate::error::ResolveError;

/// The raw `A`/`AAAA` lookup `HealthAwareResolver` layers health state on
/// top of. Split out as its own trait so tests can script DNS answers
/// without touching a real resolver.
#[async_trait]
pub trait DnsLookup: Send + Sync {
	async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

#[async_trait]
impl DnsLookup for TokioResolver {
	async fn lookup_ip(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
		let lookup = TokioResolver::lookup_ip(self, host)
			.await
			.map_err(|source| ResolveError::Lookup { host: host.to_string(), source })?;
		Ok(lookup.iter().collect())
	}
}
