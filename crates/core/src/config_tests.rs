use super::*;

#[test]
fn timeout_config_defaults_match_executor_defaults() {
	let parsed: TimeoutConfig = serde_json::from_str("{}").unwrap();
	assert_eq!(parsed.connect_timeout_ms, 500);
	assert_eq!(parsed.default_target_latency_us, 500_000);
}

#[test]
fn timeout_config_overrides_individual_fields() {
	let parsed: TimeoutConfig = serde_json::from_str(r#"{"connectTimeoutMs": 250}"#).unwrap();
	assert_eq!(parsed.connect_timeout_ms, 250);
	assert_eq!(parsed.default_target_latency_us, 500_000);
}

#[test]
fn pool_config_rejects_unknown_fields() {
	let result: Result<PoolConfig, _> = serde_json::from_str(r#"{"maxCandidates": 3, "bogus": true}"#);
	assert!(result.is_err());
}
