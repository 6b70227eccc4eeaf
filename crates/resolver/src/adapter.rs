use async_trait::async_trait;
use flagset::{flags, FlagSet};
use sig_core::TrailId;

use crate::error::ParseTargetError;
use crate::target::Target;

flags! {
	/// The resolver's own classification of an address, independent of
	/// whether a caller's mask allows it through.
	pub enum HostState: u8 {
		/// Healthy and not recently blacklisted.
		Whitelisted,
		/// Blacklist cooldown has expired; eligible for retry but not
		/// yet proven healthy again.
		Grey,
		/// Still inside its blacklist cooldown window.
		Blacklisted,
	}
}

pub type HostStateMask = FlagSet<HostState>;

/// The default mask: all lists, per §3 ("default: all lists").
pub fn all_host_states() -> HostStateMask {
	HostState::Whitelisted | HostState::Grey | HostState::Blacklisted
}

/// The contract boundary to the DNS/health-aware resolver, per §4.3.
/// The executor never reorders what `resolve` returns except for the
/// sticky-first and minimum-retry rules layered on top in `sig-client`.
#[async_trait]
pub trait ResolverAdapter: Send + Sync {
	/// Up to `max` candidates for `(host, port)`, filtered to addresses
	/// whose `HostState` is present in `mask`, ordered by the resolver's
	/// own preference (healthy first).
	async fn resolve(
		&self,
		host: &str,
		port: u16,
		max: usize,
		mask: HostStateMask,
		trail: &TrailId,
	) -> Vec<Target>;

	/// Marks `target` as known-bad; subsequent `resolve` calls avoid it
	/// for this resolver's cooldown.
	async fn blacklist(&self, target: Target);

	/// Parses a dotted-quad or bracketed IPv6 literal directly, bypassing
	/// DNS entirely.
	fn parse_ip_target(&self, literal: &str, port: u16) -> Result<Target, ParseTargetError>;
}
