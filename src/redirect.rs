//! Post-login navigation helpers and the login-page routing gate.
//!
//! Only same-origin absolute paths are accepted as redirect targets:
//! anything not starting with `/`, or starting with `//`, is discarded.

use reqwest::Url;

use crate::token::normalize_token;
use crate::types::User;

pub const LOGIN_REDIRECT_PARAM: &str = "redirectUrl";

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const ONBOARDING_PATH: &str = "/onboarding";

/// Placeholder origin for building and parsing query strings.
const QUERY_ORIGIN: &str = "http://localhost/";

/// Trimmed `value` if it is a same-origin path.
#[must_use]
pub fn normalize_redirect_url(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if !trimmed.starts_with('/') || trimmed.starts_with("//") {
        return None;
    }
    Some(trimmed.to_owned())
}

#[must_use]
pub fn sanitize_redirect_url(value: Option<&str>, fallback: &str) -> String {
    normalize_redirect_url(value).unwrap_or_else(|| fallback.to_owned())
}

/// `"/login?redirectUrl=<form-encoded target>"`.
#[must_use]
pub fn build_login_url(redirect_url: &str) -> String {
    build_login_url_with(redirect_url, LOGIN_PATH)
}

#[must_use]
pub fn build_login_url_with(redirect_url: &str, login_path: &str) -> String {
    let query = Url::parse_with_params(QUERY_ORIGIN, &[(LOGIN_REDIRECT_PARAM, redirect_url)])
        .ok()
        .and_then(|url| url.query().map(ToOwned::to_owned))
        .unwrap_or_else(|| format!("{LOGIN_REDIRECT_PARAM}="));
    format!("{login_path}?{query}")
}

/// Login URL that returns to the page currently shown.
#[must_use]
pub fn login_url_for(pathname: Option<&str>, query: Option<&str>) -> String {
    let current = match (pathname, query.map(|q| q.trim_start_matches('?'))) {
        (None, _) => HOME_PATH.to_owned(),
        (Some(path), Some(q)) if !q.is_empty() => format!("{path}?{q}"),
        (Some(path), _) => path.to_owned(),
    };
    build_login_url(&sanitize_redirect_url(Some(&current), HOME_PATH))
}

/// Users with an incomplete profile go to onboarding first; everyone else
/// goes to the requested page, or home.
#[must_use]
pub fn resolve_post_login_destination(user: &User, redirect_url: Option<&str>) -> String {
    if user.needs_onboarding() {
        return ONBOARDING_PATH.to_owned();
    }
    sanitize_redirect_url(redirect_url, HOME_PATH)
}

/// Read the redirect target from a query string (with or without `?`).
#[must_use]
pub fn extract_redirect_param(query: &str) -> Option<String> {
    let url = Url::parse(QUERY_ORIGIN).ok()?.join(&format!("?{}", query.trim_start_matches('?'))).ok()?;
    let value = url
        .query_pairs()
        .find(|(key, _)| key == LOGIN_REDIRECT_PARAM)
        .map(|(_, value)| value.into_owned());
    normalize_redirect_url(value.as_deref())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Redirect(String),
}

/// Routing-layer check before rendering `path`: the login page is skipped
/// for visitors that already carry a non-blank token cookie.
#[must_use]
pub fn login_gate(path: &str, token_cookie: Option<&str>) -> GateDecision {
    if path == LOGIN_PATH && token_cookie.and_then(normalize_token).is_some() {
        return GateDecision::Redirect(HOME_PATH.to_owned());
    }
    GateDecision::Continue
}

#[cfg(test)]
#[path = "redirect_test.rs"]
mod tests;
