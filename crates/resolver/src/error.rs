#[derive(thiserror::Error, Debug)]
pub enum ParseTargetError {
	#[error("{0:?} is not a dotted-quad or bracketed IPv6 literal")]
	NotALiteral(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
	#[error("dns lookup for {host:?} failed: {source}")]
	Lookup {
		host: String,
		#[source]
		source: hickory_resolver::ResolveError,
	},
}
