//! Error taxonomy shared by the REST wrappers.
//!
//! Unauthorized responses are kept distinct from every other failure: they
//! force a session reset and are never retried. Everything else is surfaced
//! to the caller as a retry affordance.

// =============================================================================
// ERROR CODE
// =============================================================================

/// Stable machine-readable classification for errors surfaced to front ends.
pub trait ErrorCode {
    /// Short upper-snake code, e.g. `"E_UNAUTHORIZED"`.
    fn error_code(&self) -> &'static str;

    /// Whether the user should be offered a retry.
    fn retryable(&self) -> bool;
}

// =============================================================================
// API ERROR
// =============================================================================

/// Errors produced by backend REST calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend rejected the bearer token (HTTP 401).
    #[error("unauthorized: session expired or token rejected")]
    Unauthorized,

    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend returned a non-success status other than 401.
    #[error("backend responded with status {status}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 401 {
            Self::Unauthorized
        } else {
            Self::Status { status, body }
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Backend-provided message, when the error body is a JSON envelope with one.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .get("message")?
            .as_str()
            .map(ToOwned::to_owned)
    }
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::Request(_) => "E_REQUEST",
            Self::Status { .. } => "E_STATUS",
            Self::Parse(_) => "E_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Unauthorized | Self::HttpClientBuild(_) | Self::Parse(_) => false,
            Self::Request(_) => true,
            Self::Status { status, .. } => matches!(status, 408 | 429 | 500..=599),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
