//! Login, logout and profile endpoints.
//!
//! Successful logins are applied to the session here so callers cannot forget
//! to seed the profile or drop the previous user's cached queries.

use reqwest::Method;

use super::ApiClient;
use crate::error::ApiError;
use crate::session::ProfileSource;
use crate::types::{
    DemoLoginRequest, KakaoLoginRequest, KakaoTokenLoginRequest, LoginResponse, UpdateProfileRequest, User,
};

impl ApiClient {
    /// Exchange an OAuth authorization code for a session.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error; the session is untouched.
    pub async fn kakao_login(&self, code: &str, redirect_uri: Option<&str>) -> Result<LoginResponse, ApiError> {
        let body = KakaoLoginRequest { code: code.to_owned(), redirect_uri: redirect_uri.map(ToOwned::to_owned) };
        let request = self.request(Method::POST, "/api/auth/kakao/login").json(&body);
        self.complete_login(request).await
    }

    /// Log in with a provider access token obtained by the OAuth callback.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error; the session is untouched.
    pub async fn kakao_login_with_token(&self, access_token: &str) -> Result<LoginResponse, ApiError> {
        let body = KakaoTokenLoginRequest { access_token: access_token.to_owned() };
        let request = self.request(Method::POST, "/api/auth/kakao/token").json(&body);
        self.complete_login(request).await
    }

    /// # Errors
    ///
    /// Returns the backend or transport error; the session is untouched.
    pub async fn demo_login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = DemoLoginRequest { email: email.to_owned(), password: password.to_owned() };
        let request = self.request(Method::POST, "/api/auth/demo/login").json(&body);
        self.complete_login(request).await
    }

    async fn complete_login(&self, request: reqwest::RequestBuilder) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self.execute(request).await?;
        self.session.login(&response);
        Ok(response)
    }

    /// Notify the backend and clear the local session.
    ///
    /// The local logout happens even when the backend call fails; the backend
    /// error is still returned so callers can log it.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error after the local logout.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.execute_discard(self.request(Method::POST, "/api/auth/logout")).await;
        match &result {
            // The 401 path already cleared the session.
            Err(ApiError::Unauthorized) => {}
            Err(e) => {
                tracing::warn!(error = %e, "backend logout failed; clearing local session anyway");
                self.session.logout();
            }
            Ok(()) => self.session.logout(),
        }
        result
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is missing or rejected.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.execute(self.request(Method::GET, "/api/auth/me")).await
    }

    /// Save profile changes and refresh the session's cached profile.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn update_profile(&self, update: &UpdateProfileRequest) -> Result<User, ApiError> {
        let request = self.request(Method::PATCH, "/api/users/me/profile").json(update);
        let user: User = self.execute(request).await?;
        self.session.profile_updated(&user);
        Ok(user)
    }
}

#[async_trait::async_trait]
impl ProfileSource for ApiClient {
    async fn fetch_current_user(&self) -> Result<User, ApiError> {
        self.current_user().await
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
