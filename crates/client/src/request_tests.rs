use super::*;

fn trail() -> TrailId {
	TrailId::new("t")
}

#[test]
fn rejects_path_without_leading_slash() {
	let err = Request::new(http::Method::GET, "no-slash", trail()).unwrap_err();
	assert!(matches!(err, ExecutorError::MalformedPath(_)));
}

#[test]
fn rejects_unsupported_method() {
	let err = Request::new(http::Method::PATCH, "/p", trail()).unwrap_err();
	assert!(matches!(err, ExecutorError::UnsupportedMethod(_)));
}

#[test]
fn accepts_absolute_path() {
	let req = Request::new(http::Method::GET, "/xcap/users/1", trail()).unwrap();
	assert_eq!(req.path, "/xcap/users/1");
	assert!(req.body.is_none());
}

#[test]
fn builder_sets_body_and_headers() {
	let req = Request::new(http::Method::POST, "/p", trail())
		.unwrap()
		.with_body(Bytes::from_static(b"{}"))
		.with_header("X-Custom", "1");
	assert_eq!(req.body.as_deref(), Some(&b"{}"[..]));
	assert_eq!(req.headers, vec![("X-Custom".to_string(), "1".to_string())]);
}
