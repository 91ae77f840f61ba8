//! Mission catalog, submissions, feed and likes.

use reqwest::Method;

use super::ApiClient;
use crate::cache::QueryKey;
use crate::error::ApiError;
use crate::submit::MissionSink;
use crate::types::{
    LikeResult, MissionCompletion, MissionFeedItem, MissionHistory, MissionHistoryDetail, MissionListItem,
    MissionSubmission,
};

fn submit_endpoint(mission_id: i64) -> String {
    format!("/api/missions/{mission_id}/histories")
}

fn history_endpoint(history_id: i64) -> String {
    format!("/api/missions/histories/{history_id}")
}

fn like_endpoint(history_id: i64) -> String {
    format!("/api/missions/histories/{history_id}/like")
}

impl ApiClient {
    /// Mission catalog, optionally filtered by tag. Cached per tag.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn missions(&self, tag: Option<&str>) -> Result<Vec<MissionListItem>, ApiError> {
        let mut request = self.request(Method::GET, "/api/missions");
        if let Some(tag) = tag {
            request = request.query(&[("tag", tag)]);
        }
        self.cached_get(QueryKey::missions(tag), request).await
    }

    /// Record a completed mission. Invalidates feed and history caches.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn submit_mission(&self, submission: &MissionSubmission) -> Result<MissionCompletion, ApiError> {
        let request = self
            .request(Method::POST, &submit_endpoint(submission.mission_id))
            .json(submission);
        let completion: MissionCompletion = self.execute(request).await?;
        tracing::info!(
            mission_id = submission.mission_id,
            history_id = completion.history_id,
            "mission submitted"
        );
        self.session.invalidate_queries(&QueryKey::feed());
        self.session.invalidate_queries(&QueryKey::my_histories());
        self.session.invalidate_queries(&QueryKey::badges_root());
        Ok(completion)
    }

    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn mission_feed(&self) -> Result<Vec<MissionFeedItem>, ApiError> {
        let request = self.request(Method::GET, "/api/missions/histories/feed");
        self.cached_get(QueryKey::feed(), request).await
    }

    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn mission_history(&self, history_id: i64) -> Result<MissionHistoryDetail, ApiError> {
        let request = self.request(Method::GET, &history_endpoint(history_id));
        self.cached_get(QueryKey::history(history_id), request).await
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] without a valid token.
    pub async fn my_mission_histories(&self) -> Result<Vec<MissionHistory>, ApiError> {
        let request = self.request(Method::GET, "/api/missions/histories/me");
        self.cached_get(QueryKey::my_histories(), request).await
    }

    /// Toggle the caller's like on a history entry.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn toggle_like(&self, history_id: i64) -> Result<LikeResult, ApiError> {
        let result: LikeResult = self.execute(self.request(Method::POST, &like_endpoint(history_id))).await?;
        self.session.invalidate_queries(&QueryKey::feed());
        self.session.invalidate_queries(&QueryKey::history(history_id));
        Ok(result)
    }
}

#[async_trait::async_trait]
impl MissionSink for ApiClient {
    async fn submit(&self, submission: &MissionSubmission) -> Result<MissionCompletion, ApiError> {
        self.submit_mission(submission).await
    }
}

#[cfg(test)]
#[path = "missions_test.rs"]
mod tests;
