use bytes::Bytes;
use indexmap::IndexMap;

/// The final outcome of one `execute` call. Status `0` means "not yet
/// sent" and must never be observed after a normal return, per §6.
#[derive(Clone, Debug, Default)]
pub struct Response {
	pub status: u16,
	pub body: Bytes,
	pub headers: IndexMap<String, String>,
}

impl Response {
	pub fn new(status: u16, body: Bytes, headers: IndexMap<String, String>) -> Self {
		Self { status, body, headers }
	}

	pub fn status_only(status: u16) -> Self {
		Self { status, body: Bytes::new(), headers: IndexMap::new() }
	}
}

/// Mirrors the transport's header callback: lowercases the key, strips
/// surrounding whitespace, and treats a colon-less line as a key with an
/// empty value. Duplicate keys overwrite — last wins.
pub fn apply_header_line(headers: &mut IndexMap<String, String>, line: &str) {
	let line = line.trim_end_matches(['\r', '\n']);
	if line.is_empty() {
		return;
	}
	match line.split_once(':') {
		Some((key, value)) => {
			headers.insert(key.trim().to_lowercase(), value.trim().to_string());
		},
		None => {
			headers.insert(line.trim().to_lowercase(), String::new());
		},
	}
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
