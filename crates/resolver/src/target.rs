use std::fmt;
use std::net::IpAddr;

/// One `(address_family, address_bytes, port, transport)` candidate
/// produced by the resolver. Equality is by all four fields, per §3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Target {
	pub family: AddressFamily,
	pub addr: IpAddr,
	pub port: u16,
	pub transport: TransportKind,
}

impl Target {
	pub fn new(addr: IpAddr, port: u16, transport: TransportKind) -> Self {
		let family = match addr {
			IpAddr::V4(_) => AddressFamily::Inet,
			IpAddr::V6(_) => AddressFamily::Inet6,
		};
		Self { family, addr, port, transport }
	}

	/// The peer ip printed the way the connection cache's `remote_ip`
	/// field expects: a bare address, no port, no brackets.
	pub fn ip_string(&self) -> String {
		self.addr.to_string()
	}
}

impl fmt::Display for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.addr {
			IpAddr::V4(v4) => write!(f, "{v4}:{}", self.port),
			IpAddr::V6(v6) => write!(f, "[{v6}]:{}", self.port),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressFamily {
	Inet,
	Inet6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TransportKind {
	#[default]
	Tcp,
}
