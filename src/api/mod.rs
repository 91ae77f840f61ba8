//! REST wrappers for the missions backend.
//!
//! ARCHITECTURE
//! ============
//! `ApiClient` is a thin reqwest wrapper bound to one [`SessionContext`]. It
//! attaches the bearer token when one is stored, unwraps the backend's
//! `{ "data": T, "message"?: string }` envelope, and routes every HTTP 401
//! through the session so all consumers observe the forced logout.
//!
//! No call is retried automatically. Endpoint groups live in submodules.
//!
//! CACHING
//! =======
//! Reads that the UI revisits (mission lists, feed, badges) go through the
//! session's query cache. A read records the session epoch before sending and
//! only caches its result if no login/logout happened in between.

pub mod auth;
pub mod badges;
pub mod missions;
pub mod uploads;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::QueryKey;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionContext;

/// Success envelope; the optional `message` is informational and ignored.
#[derive(serde::Deserialize)]
struct Envelope<T> {
    data: T,
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: SessionContext) -> Result<Self, ApiError> {
        let http = config
            .timeouts
            .http_client()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self::with_http(http, &config.api_base_url, session))
    }

    /// Wrap an existing reqwest client, e.g. one shared with uploads.
    #[must_use]
    pub fn with_http(http: reqwest::Client, base_url: &str, session: SessionContext) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_owned(), session }
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and return the raw success body.
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let epoch = self.session.epoch();
        let response = builder.send().await.map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let url = response.url().path().to_owned();
        let text = response.text().await.map_err(|e| ApiError::Request(e.to_string()))?;

        if status == 401 {
            tracing::warn!(path = %url, "backend rejected token");
            self.session.handle_unauthorized_since(epoch);
            return Err(ApiError::Unauthorized);
        }
        if !(200..300).contains(&status) {
            tracing::debug!(path = %url, status, "backend request failed");
            return Err(ApiError::from_status(status, text));
        }
        Ok(text)
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let text = self.send(builder).await?;
        parse_envelope(&text)
    }

    /// Send a request whose response body carries nothing the caller needs.
    async fn execute_discard(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send(builder).await.map(|_| ())
    }

    /// Serve `key` from the session cache, or fetch and cache it.
    async fn cached_get<T>(&self, key: QueryKey, builder: RequestBuilder) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
    {
        if let Some(hit) = self.session.cached::<T>(&key) {
            tracing::trace!(key = ?key.segments(), "query cache hit");
            return Ok(hit);
        }
        let epoch = self.session.epoch();
        let value: T = self.execute(builder).await?;
        self.session.store_query(epoch, key, &value);
        Ok(value)
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Unwrap the backend's success envelope.
fn parse_envelope<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(envelope.data)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
