use super::*;

#[test]
fn lowercases_and_trims_header_name_and_value() {
	let mut headers = IndexMap::new();
	apply_header_line(&mut headers, "Content-Type:  application/json \r\n");
	assert_eq!(headers.get("content-type").unwrap(), "application/json");
}

#[test]
fn colon_less_line_is_key_with_empty_value() {
	let mut headers = IndexMap::new();
	apply_header_line(&mut headers, "HTTP/1.1 200 OK");
	assert_eq!(headers.get("http/1.1 200 ok").unwrap(), "");
}

#[test]
fn duplicate_headers_last_wins() {
	let mut headers = IndexMap::new();
	apply_header_line(&mut headers, "X-A: first");
	apply_header_line(&mut headers, "X-A: second");
	assert_eq!(headers.get("x-a").unwrap(), "second");
}

#[test]
fn blank_line_is_ignored() {
	let mut headers = IndexMap::new();
	apply_header_line(&mut headers, "\r\n");
	assert!(headers.is_empty());
}
