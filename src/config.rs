//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_KAKAO_LOCAL_BASE_URL: &str = "https://dapi.kakao.com";
pub const DEFAULT_TOKEN_PATH: &str = ".ecomission/token.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value} (expected an http:// or https:// URL)")]
    InvalidUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

impl HttpTimeouts {
    /// Build a `reqwest` client honoring these timeouts.
    ///
    /// # Errors
    ///
    /// Returns the builder error when the TLS backend cannot be initialized.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_secs))
            .connect_timeout(Duration::from_secs(self.connect_secs))
            .build()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub kakao_rest_api_key: Option<String>,
    pub kakao_local_base_url: String,
    pub token_path: PathBuf,
    pub timeouts: HttpTimeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `ECOMISSION_API_BASE_URL`: backend origin, default `http://127.0.0.1:8080`
    /// - `KAKAO_REST_API_KEY`: geocoding disabled when absent or blank
    /// - `KAKAO_LOCAL_BASE_URL`: default `https://dapi.kakao.com`
    /// - `ECOMISSION_TOKEN_PATH`: default `.ecomission/token.json`
    /// - `ECOMISSION_REQUEST_TIMEOUT_SECS`: default 30
    /// - `ECOMISSION_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error when a base URL is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error when a base URL is not http(s).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = parse_base_url(
            "ECOMISSION_API_BASE_URL",
            lookup("ECOMISSION_API_BASE_URL").as_deref(),
            DEFAULT_API_BASE_URL,
        )?;
        let kakao_local_base_url = parse_base_url(
            "KAKAO_LOCAL_BASE_URL",
            lookup("KAKAO_LOCAL_BASE_URL").as_deref(),
            DEFAULT_KAKAO_LOCAL_BASE_URL,
        )?;
        let kakao_rest_api_key = lookup("KAKAO_REST_API_KEY")
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty());
        let token_path = lookup("ECOMISSION_TOKEN_PATH")
            .filter(|path| !path.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH), PathBuf::from);
        let timeouts = HttpTimeouts {
            request_secs: parse_u64(lookup("ECOMISSION_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("ECOMISSION_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_base_url, kakao_rest_api_key, kakao_local_base_url, token_path, timeouts })
    }

    /// Defaults pointed at a specific backend origin.
    #[must_use]
    pub fn for_base_url(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_owned(),
            kakao_rest_api_key: None,
            kakao_local_base_url: DEFAULT_KAKAO_LOCAL_BASE_URL.to_owned(),
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            timeouts: HttpTimeouts::default(),
        }
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn parse_base_url(var: &'static str, raw: Option<&str>, default: &str) -> Result<String, ConfigError> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default);
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl { var, value: value.to_owned() });
    }
    Ok(value.trim_end_matches('/').to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
