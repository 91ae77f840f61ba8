use super::*;
use serde_json::json;

fn user_json() -> serde_json::Value {
    json!({
        "id": 7,
        "nickname": "forest",
        "birthYear": 1994,
        "gender": "female",
        "address": "경상북도 안동시",
        "badges": [{ "id": 1, "name": "첫 인증" }],
        "primaryBadgeId": 1
    })
}

#[test]
fn user_decodes_camel_case_fields() {
    let user: User = serde_json::from_value(user_json()).unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.birth_year, Some(1994));
    assert_eq!(user.gender, Some(Gender::Female));
    assert_eq!(user.badges.len(), 1);
    assert_eq!(user.primary_badge_id, Some(1));
    assert!(!user.needs_onboarding());
}

#[test]
fn user_without_onboarding_fields_decodes() {
    let user: User = serde_json::from_value(json!({ "id": 1, "nickname": "new" })).unwrap();
    assert!(user.badges.is_empty());
    assert!(user.needs_onboarding());
}

#[test]
fn blank_address_still_needs_onboarding() {
    let mut user: User = serde_json::from_value(user_json()).unwrap();
    user.address = Some("  ".into());
    assert!(user.needs_onboarding());
}

#[test]
fn blank_gender_decodes_as_unset() {
    let mut raw = user_json();
    raw["gender"] = json!("");
    let user: User = serde_json::from_value(raw).unwrap();
    assert_eq!(user.gender, None);
    assert!(user.needs_onboarding());
}

#[test]
fn null_gender_decodes_as_unset() {
    let mut raw = user_json();
    raw["gender"] = json!(null);
    let user: User = serde_json::from_value(raw).unwrap();
    assert_eq!(user.gender, None);
}

#[test]
fn unknown_gender_is_rejected() {
    let mut raw = user_json();
    raw["gender"] = json!("other");
    assert!(serde_json::from_value::<User>(raw).is_err());
}

#[test]
fn zero_birth_year_needs_onboarding() {
    let mut raw = user_json();
    raw["birthYear"] = json!(0);
    let user: User = serde_json::from_value(raw).unwrap();
    assert_eq!(user.birth_year, Some(0));
    assert!(user.needs_onboarding());
}

#[test]
fn mission_submission_body_omits_mission_id() {
    let submission = MissionSubmission {
        mission_id: 3,
        content: "텀블러 사용".into(),
        latitude: 36.5,
        longitude: 128.7,
        sigungu_id: None,
        image_urls: vec!["https://cdn.example.test/a.jpg".into()],
    };
    let body = serde_json::to_value(&submission).unwrap();
    assert!(body.get("missionId").is_none());
    assert!(body.get("sigunguId").is_none());
    assert_eq!(body["imageUrls"][0], "https://cdn.example.test/a.jpg");
}

#[test]
fn update_profile_request_serializes_gender_lowercase() {
    let req = UpdateProfileRequest {
        nickname: "forest".into(),
        birth_year: 1990,
        gender: Gender::Male,
        address: "경북 포항시".into(),
        profile_image_url: None,
    };
    let body = serde_json::to_value(&req).unwrap();
    assert_eq!(body["gender"], "male");
    assert_eq!(body["birthYear"], 1990);
    assert!(body.get("profileImageUrl").is_none());
}

#[test]
fn feed_item_defaults_like_fields() {
    let item: MissionFeedItem = serde_json::from_value(json!({
        "id": 11,
        "user": { "id": 2, "nickname": "river" },
        "mission": { "id": 3, "name": "플로깅" },
        "createdAt": "2025-05-01T10:00:00Z"
    }))
    .unwrap();
    assert_eq!(item.like_count, 0);
    assert!(!item.is_liked);
    assert!(item.reward_badge.is_none());
}
