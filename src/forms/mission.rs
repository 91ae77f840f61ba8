//! Mission proof form (URL-based flow: images are uploaded first).

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::ValidationErrors;
use crate::types::MissionSubmission;

pub const MIN_CONTENT_CHARS: usize = 5;
pub const MAX_IMAGES: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionForm {
    pub mission_id: i64,
    pub content: String,
    /// `None` until the user picks a location.
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub sigungu_id: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl MissionForm {
    /// Check every field and build the submission body.
    ///
    /// # Errors
    ///
    /// Returns all field failures at once.
    pub fn validate(&self) -> Result<MissionSubmission, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.mission_id <= 0 {
            errors.add("missionId", "미션을 선택해 주세요.");
        }

        let content = self.content.trim();
        if content.chars().count() < MIN_CONTENT_CHARS {
            errors.add("content", format!("활동 내용은 최소 {MIN_CONTENT_CHARS}자 이상이어야 합니다."));
        }

        let latitude = check_coordinate(&mut errors, "latitude", self.latitude, 90.0, "유효한 위도 형식이 아닙니다.");
        let longitude =
            check_coordinate(&mut errors, "longitude", self.longitude, 180.0, "유효한 경도 형식이 아닙니다.");

        if self.image_urls.len() > MAX_IMAGES {
            errors.add("imageUrls", format!("최대 {MAX_IMAGES}장의 사진만 업로드할 수 있습니다."));
        }
        for (i, url) in self.image_urls.iter().enumerate() {
            if !is_http_url(url) {
                errors.add(format!("imageUrls[{i}]"), "올바른 이미지 주소가 아닙니다.");
            }
        }

        let sigungu_id = self
            .sigungu_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToOwned::to_owned);

        errors.into_result(MissionSubmission {
            mission_id: self.mission_id,
            content: content.to_owned(),
            latitude: latitude.unwrap_or_default(),
            longitude: longitude.unwrap_or_default(),
            sigungu_id,
            image_urls: self.image_urls.clone(),
        })
    }
}

fn check_coordinate(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<f64>,
    limit: f64,
    message: &str,
) -> Option<f64> {
    match value {
        None => {
            errors.add(field, "주소가 설정되지 않았습니다. 현재 위치를 가져와 주세요.");
            None
        }
        Some(v) if !v.is_finite() || !(-limit..=limit).contains(&v) => {
            errors.add(field, message);
            None
        }
        Some(v) => Some(v),
    }
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
}

#[cfg(test)]
#[path = "mission_test.rs"]
mod tests;
