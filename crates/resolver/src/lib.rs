pub mod adapter;
pub mod dns;
pub mod error;
pub mod health;
pub mod target;

pub use adapter::{all_host_states, HostState, HostStateMask, ResolverAdapter};
pub use dns::DnsLookup;
pub use error::{ParseTargetError, ResolveError};
pub use health::HealthAwareResolver;
pub use target::{AddressFamily, Target, TransportKind};
