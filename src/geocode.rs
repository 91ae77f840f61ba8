//! Reverse geocoding (coordinates to administrative region) via Kakao Local.
//!
//! DESIGN
//! ======
//! Lookups are keyed by `["kakaoMap", "xyToAddress", x, y]` and stay fresh for
//! five minutes. A zero coordinate means "location not chosen yet" and never
//! reaches the network. Region allow-listing is a separate [`RegionPolicy`] so
//! the submission pipeline can reject out-of-region proof before submitting.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::cache::{QueryCache, QueryKey};
use crate::config::ClientConfig;
use crate::error::ErrorCode;

/// How long a resolved address is reused without refetching.
pub const ADDRESS_STALE_TIME: Duration = Duration::from_secs(5 * 60);

const COORD2ADDRESS_PATH: &str = "/v2/local/geo/coord2address.json";

// =============================================================================
// TYPES
// =============================================================================

/// Region names for one coordinate, as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionAddress {
    pub address_name: String,
    /// First-level region, e.g. `경북` or `경상북도`.
    pub region_1depth_name: String,
    #[serde(default)]
    pub region_2depth_name: String,
    #[serde(default)]
    pub region_3depth_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding unavailable: KAKAO_REST_API_KEY is not set")]
    MissingApiKey,

    #[error("geocoding request failed: {0}")]
    Request(String),

    #[error("geocoding provider responded with status {status}")]
    Status { status: u16, body: String },

    #[error("geocoding response parse failed: {0}")]
    Parse(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for GeocodeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "E_GEOCODE_MISSING_API_KEY",
            Self::Request(_) => "E_GEOCODE_REQUEST",
            Self::Status { .. } => "E_GEOCODE_STATUS",
            Self::Parse(_) => "E_GEOCODE_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Status { status, .. } => matches!(status, 429 | 500..=599),
            Self::MissingApiKey | Self::Parse(_) | Self::HttpClientBuild(_) => false,
        }
    }
}

/// Coordinate-to-region lookup.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `(longitude, latitude)`. `Ok(None)` when the provider knows no
    /// address there or either coordinate is zero.
    async fn coord_to_address(&self, longitude: f64, latitude: f64) -> Result<Option<RegionAddress>, GeocodeError>;
}

// =============================================================================
// KAKAO CLIENT
// =============================================================================

pub struct KakaoGeocoder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    cache: Mutex<QueryCache>,
}

impl KakaoGeocoder {
    /// # Errors
    ///
    /// Returns [`GeocodeError::MissingApiKey`] when no REST key is configured.
    pub fn new(config: &ClientConfig) -> Result<Self, GeocodeError> {
        let api_key = config.kakao_rest_api_key.clone().ok_or(GeocodeError::MissingApiKey)?;
        let http = config
            .timeouts
            .http_client()
            .map_err(|e| GeocodeError::HttpClientBuild(e.to_string()))?;
        Ok(Self::with_http(http, &config.kakao_local_base_url, &api_key))
    }

    #[must_use]
    pub fn with_http(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            cache: Mutex::new(QueryCache::new()),
        }
    }

    fn cached(&self, key: &QueryKey) -> Option<Option<RegionAddress>> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let value = cache.get_fresh(key, ADDRESS_STALE_TIME, Instant::now())?;
        serde_json::from_value(value.clone()).ok()
    }

    async fn fetch(&self, longitude: f64, latitude: f64) -> Result<Option<RegionAddress>, GeocodeError> {
        let response = self
            .http
            .get(format!("{}{COORD2ADDRESS_PATH}", self.base_url))
            .query(&[("x", longitude), ("y", latitude)])
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| GeocodeError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(GeocodeError::Status { status, body: text });
        }
        parse_coord2address(&text)
    }
}

#[async_trait::async_trait]
impl Geocoder for KakaoGeocoder {
    async fn coord_to_address(&self, longitude: f64, latitude: f64) -> Result<Option<RegionAddress>, GeocodeError> {
        if longitude.abs() < f64::EPSILON || latitude.abs() < f64::EPSILON {
            return Ok(None);
        }
        let key = QueryKey::xy_to_address(longitude, latitude);
        if let Some(hit) = self.cached(&key) {
            return Ok(hit);
        }

        let address = self.fetch(longitude, latitude).await?;
        tracing::debug!(
            longitude,
            latitude,
            region = address.as_ref().map(|a| a.region_1depth_name.as_str()),
            "resolved coordinates"
        );
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_as(key, &address);
        Ok(address)
    }
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Deserialize)]
struct Coord2AddressResponse {
    #[serde(default)]
    documents: Vec<Coord2AddressDocument>,
}

#[derive(Deserialize)]
struct Coord2AddressDocument {
    #[serde(default)]
    address: Option<RegionAddress>,
}

/// Take the first document's land-lot address, if any.
///
/// # Errors
///
/// Returns [`GeocodeError::Parse`] when the body is not the expected shape.
pub fn parse_coord2address(json: &str) -> Result<Option<RegionAddress>, GeocodeError> {
    let response: Coord2AddressResponse =
        serde_json::from_str(json).map_err(|e| GeocodeError::Parse(e.to_string()))?;
    Ok(response.documents.into_iter().next().and_then(|doc| doc.address))
}

// =============================================================================
// REGION POLICY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("location is outside the allowed region ({region})")]
pub struct OutsideRegion {
    pub region: String,
}

/// Allow-list of first-level region names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPolicy {
    allowed: Vec<String>,
}

impl RegionPolicy {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { allowed: allowed.into_iter().map(Into::into).collect() }
    }

    /// North Gyeongsang province, under both its short and full names.
    #[must_use]
    pub fn gyeongbuk() -> Self {
        Self::new(["경북", "경상북도"])
    }

    #[must_use]
    pub fn allows(&self, address: &RegionAddress) -> bool {
        let region = address.region_1depth_name.trim();
        self.allowed.iter().any(|name| name == region)
    }

    /// # Errors
    ///
    /// Returns the rejected region name when it is not allow-listed.
    pub fn check(&self, address: &RegionAddress) -> Result<(), OutsideRegion> {
        if self.allows(address) {
            Ok(())
        } else {
            Err(OutsideRegion { region: address.region_1depth_name.clone() })
        }
    }
}

impl Default for RegionPolicy {
    fn default() -> Self {
        Self::gyeongbuk()
    }
}

#[cfg(test)]
#[path = "geocode_test.rs"]
mod tests;
