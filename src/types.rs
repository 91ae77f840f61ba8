//! Request/response shapes expected from the missions backend.
//!
//! DESIGN
//! ======
//! The backend speaks camelCase JSON. Optional profile and badge fields use
//! `#[serde(default)]` so partially onboarded users still decode.

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// USERS
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Snapshot of the authenticated user's profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub nickname: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default, deserialize_with = "blank_gender_as_none")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub primary_badge_id: Option<i64>,
}

impl User {
    /// Onboarding is incomplete until birth year, gender and address are set.
    /// A birth year of 0 counts as unset.
    #[must_use]
    pub fn needs_onboarding(&self) -> bool {
        self.birth_year.is_none_or(|year| year == 0)
            || self.gender.is_none()
            || self.address.as_deref().is_none_or(|a| a.trim().is_empty())
    }
}

/// The backend sends `""` for a gender that was never chosen.
fn blank_gender_as_none<'de, D>(deserializer: D) -> Result<Option<Gender>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("male") => Ok(Some(Gender::Male)),
        Some("female") => Ok(Some(Gender::Female)),
        Some(other) => Err(serde::de::Error::unknown_variant(other, &["male", "female"])),
    }
}

/// Minimal author info embedded in feed entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub nickname: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

/// OAuth authorization-code login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KakaoLoginRequest {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

/// Login with a provider access token obtained by the OAuth callback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KakaoTokenLoginRequest {
    pub access_token: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub nickname: String,
    pub birth_year: i32,
    pub gender: Gender,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

// =============================================================================
// BADGES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedBadge {
    pub badge_id: i64,
    pub created_at: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBadges {
    #[serde(default)]
    pub primary_badge_id: Option<i64>,
    #[serde(default)]
    pub owned_badges: Vec<OwnedBadge>,
}

// =============================================================================
// MISSIONS
// =============================================================================

/// A predefined eco-friendly activity users can submit proof of.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionListItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub icon: String,
    /// Carbon reduction credited per completion, in kg CO2e.
    #[serde(default)]
    pub reward_carbon_emission: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionFeedItem {
    pub id: i64,
    pub user: UserSummary,
    pub mission: MissionSummary,
    #[serde(default)]
    pub reward_badge: Option<Badge>,
    pub created_at: String,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub is_liked: bool,
}

/// Administrative district a submission was geolocated to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sigungu {
    #[serde(default)]
    pub sigungu_id: Option<String>,
    pub sigungu_name: String,
}

/// One user's completed submission for a mission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionHistory {
    pub id: i64,
    pub user: UserSummary,
    pub mission: MissionSummary,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub sigungu: Option<Sigungu>,
    #[serde(default)]
    pub reward_badge: Option<Badge>,
    pub created_at: String,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub is_liked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionHistoryDetail {
    pub history: MissionHistory,
}

/// Validated, URL-based mission submission body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionSubmission {
    /// Addressed through the request path, not the body.
    #[serde(skip)]
    pub mission_id: i64,
    pub content: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigungu_id: Option<String>,
    pub image_urls: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionCompletion {
    pub history_id: i64,
    #[serde(default)]
    pub reward_badge: Option<Badge>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResult {
    pub history_id: i64,
    pub like_count: u32,
    pub is_liked: bool,
}

// =============================================================================
// UPLOADS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUploadRequest {
    pub file_name: String,
    pub file_type: String,
}

/// Backend-issued upload target: bytes go to `upload_url`, readers use `file_url`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub upload_url: String,
    pub file_url: String,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
