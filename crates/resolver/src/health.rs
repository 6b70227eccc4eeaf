use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use sig_core::clock::{MonotonicClock, SystemMonotonicClock};
use sig_core::TrailId;
use tracing::{event, Level};

use crate::adapter::{HostState, HostStateMask, ResolverAdapter};
use crate::dns::DnsLookup;
use crate::error::ParseTargetError;
use crate::target::{Target, TransportKind};

#[derive(Clone, Copy, Debug)]
enum RowState {
	Blacklisted { until_ms: u64 },
}

/// DNS-backed `ResolverAdapter` that layers per-address health state and
/// blacklist cooldown on top of plain `A`/`AAAA` lookups. Rows are keyed
/// by address alone, matching §2's "per-address health state" — the
/// resolver does not track health per-hostname.
pub struct HealthAwareResolver<C: MonotonicClock = SystemMonotonicClock> {
	dns: Arc<dyn DnsLookup>,
	clock: C,
	cooldown_ms: u64,
	rows: RwLock<HashMap<IpAddr, RowState>>,
}

impl HealthAwareResolver<SystemMonotonicClock> {
	pub fn new(dns: Arc<dyn DnsLookup>) -> Self {
		Self::with_cooldown(dns, Self::DEFAULT_COOLDOWN_MS)
	}

	pub fn with_cooldown(dns: Arc<dyn DnsLookup>, cooldown_ms: u64) -> Self {
		Self {
			dns,
			clock: SystemMonotonicClock::default(),
			cooldown_ms,
			rows: RwLock::new(HashMap::new()),
		}
	}
}

impl<C: MonotonicClock> HealthAwareResolver<C> {
	/// Default cooldown a blacklisted target sits out for: 30s.
	pub const DEFAULT_COOLDOWN_MS: u64 = 30_000;

	pub fn with_clock(dns: Arc<dyn DnsLookup>, cooldown_ms: u64, clock: C) -> Self {
		Self { dns, clock, cooldown_ms, rows: RwLock::new(HashMap::new()) }
	}

	fn state_of(&self, addr: &IpAddr) -> HostState {
		match self.rows.read().get(addr) {
			None => HostState::Whitelisted,
			Some(RowState::Blacklisted { until_ms }) => {
				if self.clock.now_ms() >= *until_ms {
					HostState::Grey
				} else {
					HostState::Blacklisted
				}
			},
		}
	}

	fn rank(state: HostState) -> u8 {
		match state {
			HostState::Whitelisted => 0,
			HostState::Grey => 1,
			HostState::Blacklisted => 2,
		}
	}
}

#[async_trait]
impl<C: MonotonicClock + Send + Sync> ResolverAdapter for HealthAwareResolver<C> {
	async fn resolve(
		&self,
		host: &str,
		port: u16,
		max: usize,
		mask: HostStateMask,
		trail: &TrailId,
	) -> Vec<Target> {
		let addrs = match self.dns.lookup_ip(host).await {
			Ok(addrs) => addrs,
			Err(error) => {
				event!(
					target: "resolver",
					Level::DEBUG,
					trail = %trail,
					host,
					%error,
					"dns lookup failed"
				);
				return Vec::new();
			},
		};

		let mut candidates: Vec<(u8, Target)> = addrs
			.into_iter()
			.map(|addr| {
				let state = self.state_of(&addr);
				(Self::rank(state), state, Target::new(addr, port, TransportKind::Tcp))
			})
			.filter(|(_, state, _)| mask.contains(*state))
			.map(|(rank, _, target)| (rank, target))
			.collect();
		candidates.sort_by_key(|(rank, _)| *rank);
		candidates.truncate(max);
		candidates.into_iter().map(|(_, target)| target).collect()
	}

	async fn blacklist(&self, target: Target) {
		let until_ms = self.clock.now_ms() + self.cooldown_ms;
		self
			.rows
			.write()
			.insert(target.addr, RowState::Blacklisted { until_ms });
		event!(target: "resolver", Level::DEBUG, peer = %target, "blacklisted");
	}

	fn parse_ip_target(&self, literal: &str, port: u16) -> Result<Target, ParseTargetError> {
		parse_ip_literal(literal, port)
	}
}

pub fn parse_ip_literal(literal: &str, port: u16) -> Result<Target, ParseTargetError> {
	let trimmed = literal.trim();
	let candidate = trimmed
		.strip_prefix('[')
		.and_then(|rest| rest.strip_suffix(']'))
		.unwrap_or(trimmed);
	candidate
		.parse::<IpAddr>()
		.map(|addr| Target::new(addr, port, TransportKind::Tcp))
		.map_err(|_| ParseTargetError::NotALiteral(literal.to_string()))
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
