use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_uses_defaults_when_unset() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.kakao_local_base_url, DEFAULT_KAKAO_LOCAL_BASE_URL);
    assert_eq!(cfg.kakao_rest_api_key, None);
    assert_eq!(cfg.token_path, PathBuf::from(DEFAULT_TOKEN_PATH));
    assert_eq!(cfg.timeouts, HttpTimeouts::default());
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("ECOMISSION_API_BASE_URL", "https://api.example.test/"),
        ("KAKAO_REST_API_KEY", "  kakao-key  "),
        ("KAKAO_LOCAL_BASE_URL", "http://127.0.0.1:9999"),
        ("ECOMISSION_TOKEN_PATH", "/tmp/eco/token.json"),
        ("ECOMISSION_REQUEST_TIMEOUT_SECS", "42"),
        ("ECOMISSION_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();

    assert_eq!(cfg.api_base_url, "https://api.example.test");
    assert_eq!(cfg.kakao_rest_api_key.as_deref(), Some("kakao-key"));
    assert_eq!(cfg.kakao_local_base_url, "http://127.0.0.1:9999");
    assert_eq!(cfg.token_path, PathBuf::from("/tmp/eco/token.json"));
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn from_lookup_treats_blank_key_as_missing() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("KAKAO_REST_API_KEY", "   ")])).unwrap();
    assert_eq!(cfg.kakao_rest_api_key, None);
}

#[test]
fn from_lookup_rejects_non_http_base_url() {
    let err = ClientConfig::from_lookup(lookup_from(&[("ECOMISSION_API_BASE_URL", "ftp://nope")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUrl { var: "ECOMISSION_API_BASE_URL", .. }));
}

#[test]
fn invalid_timeouts_fall_back_to_defaults() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("ECOMISSION_REQUEST_TIMEOUT_SECS", "soon"),
        ("ECOMISSION_CONNECT_TIMEOUT_SECS", "0"),
    ]))
    .unwrap();
    assert_eq!(cfg.timeouts, HttpTimeouts::default());
}

#[test]
fn for_base_url_trims_trailing_slash() {
    let cfg = ClientConfig::for_base_url("http://127.0.0.1:3000/");
    assert_eq!(cfg.api_base_url, "http://127.0.0.1:3000");
}
