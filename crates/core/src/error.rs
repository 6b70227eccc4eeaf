/// Errors raised by the executor's own machinery, as distinct from a
/// classified remote/transport failure (see `sig_client::transport`).
///
/// These never reach a caller directly; they are mapped to an `HTTPCode`
/// at the executor boundary (malformed input -> 400) and are otherwise
/// only ever logged.
#[derive(thiserror::Error, Debug)]
pub enum ExecutorError {
	#[error("request path {0:?} does not start with '/'")]
	MalformedPath(String),
	#[error("method {0} is not one of GET/PUT/POST/DELETE")]
	UnsupportedMethod(String),
}
