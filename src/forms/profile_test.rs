use super::*;

fn current() -> User {
    User {
        id: 9,
        nickname: "초록여행자".into(),
        email: None,
        profile_image_url: Some("https://cdn.example.com/me.png".into()),
        birth_year: Some(1988),
        gender: Some(Gender::Male),
        address: Some("경상북도 포항시".into()),
        badges: Vec::new(),
        primary_badge_id: None,
    }
}

#[test]
fn blank_form_keeps_current_profile() {
    let user = current();
    let update = ProfileForm::default().merge(Some(&user), 2025);
    assert_eq!(update.nickname, "초록여행자");
    assert_eq!(update.birth_year, 1988);
    assert_eq!(update.gender, Gender::Male);
    assert_eq!(update.address, "경상북도 포항시");
    assert_eq!(update.profile_image_url.as_deref(), Some("https://cdn.example.com/me.png"));
}

#[test]
fn edits_override_current_profile() {
    let user = current();
    let form = ProfileForm {
        nickname: "  새이름 ".into(),
        birth_year: "1999".into(),
        gender: Some(Gender::Female),
        address: "경상북도 안동시".into(),
        uploaded_image_url: Some("https://cdn.example.com/new.png".into()),
        remove_image: false,
    };
    let update = form.merge(Some(&user), 2025);
    assert_eq!(update.nickname, "새이름");
    assert_eq!(update.birth_year, 1999);
    assert_eq!(update.gender, Gender::Female);
    assert_eq!(update.profile_image_url.as_deref(), Some("https://cdn.example.com/new.png"));
}

#[test]
fn without_current_profile_uses_defaults() {
    let update = ProfileForm::default().merge(None, 2025);
    assert_eq!(update.nickname, "");
    assert_eq!(update.birth_year, 2025);
    assert_eq!(update.gender, Gender::Female);
    assert_eq!(update.address, "");
    assert_eq!(update.profile_image_url, None);
}

#[test]
fn unparseable_birth_year_falls_back() {
    let user = current();
    let form = ProfileForm { birth_year: "nineteen".into(), ..ProfileForm::default() };
    assert_eq!(form.merge(Some(&user), 2025).birth_year, 1988);
}

#[test]
fn remove_image_wins_over_upload() {
    let user = current();
    let form = ProfileForm {
        uploaded_image_url: Some("https://cdn.example.com/new.png".into()),
        remove_image: true,
        ..ProfileForm::default()
    };
    assert_eq!(form.merge(Some(&user), 2025).profile_image_url, None);
}

#[test]
fn from_user_round_trips_through_merge() {
    let user = current();
    let update = ProfileForm::from_user(&user).merge(Some(&user), 2025);
    assert_eq!(update.birth_year, 1988);
    assert_eq!(update.address, "경상북도 포항시");
}

#[test]
fn zero_birth_year_on_profile_falls_back_to_current_year() {
    let mut user = current();
    user.birth_year = Some(0);
    let form = ProfileForm::from_user(&user);
    assert!(form.birth_year.is_empty());
    assert_eq!(form.merge(Some(&user), 2025).birth_year, 2025);
}
