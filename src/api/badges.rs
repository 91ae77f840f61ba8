//! Badge catalog and ownership.

use reqwest::Method;

use super::ApiClient;
use crate::cache::QueryKey;
use crate::error::ApiError;
use crate::types::{Badge, UserBadges};

fn user_badges_endpoint(user_id: i64) -> String {
    format!("/api/users/{user_id}/badges")
}

impl ApiClient {
    /// Every badge that can be earned.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn all_badges(&self) -> Result<Vec<Badge>, ApiError> {
        self.cached_get(QueryKey::all_badges(), self.request(Method::GET, "/api/badges")).await
    }

    /// Badges owned by `user_id`, plus their primary badge.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn user_badges(&self, user_id: i64) -> Result<UserBadges, ApiError> {
        let request = self.request(Method::GET, &user_badges_endpoint(user_id));
        self.cached_get(QueryKey::user_badges(user_id), request).await
    }
}

#[cfg(test)]
#[path = "badges_test.rs"]
mod tests;
