use super::*;

fn user() -> User {
    User {
        id: 1,
        nickname: "forest".to_owned(),
        email: None,
        profile_image_url: None,
        birth_year: None,
        gender: None,
        address: None,
        badges: Vec::new(),
        primary_badge_id: None,
    }
}

#[test]
fn unhydrated_is_loading_and_logged_out() {
    let state = AuthState::unhydrated();
    assert!(state.is_loading);
    assert!(!state.is_logged_in);
    assert_eq!(state.phase(), SessionPhase::Unhydrated);
    assert!(!state.requires_login());
}

#[test]
fn token_with_pending_fetch_counts_as_logged_in() {
    let state = AuthState::derive(None, true, true, true, None);
    assert!(state.is_logged_in);
    assert!(!state.is_authenticated);
    assert_eq!(state.phase(), SessionPhase::Checking);
}

#[test]
fn token_with_profile_is_logged_in() {
    let state = AuthState::derive(Some(user()), true, true, false, None);
    assert!(state.is_logged_in);
    assert!(state.is_authenticated);
    assert_eq!(state.phase(), SessionPhase::LoggedIn);
}

#[test]
fn token_without_profile_after_failure_is_logged_out() {
    let state = AuthState::derive(None, true, true, false, Some("timeout".into()));
    assert!(!state.is_logged_in);
    assert!(!state.is_loading);
    assert!(state.has_token);
    assert_eq!(state.phase(), SessionPhase::LoggedOut);
    assert!(state.requires_login());
}

#[test]
fn no_token_is_never_logged_in() {
    let state = AuthState::derive(Some(user()), true, false, true, None);
    assert!(!state.is_logged_in);
}

#[test]
fn not_hydrated_is_never_logged_in() {
    let state = AuthState::derive(Some(user()), false, true, false, None);
    assert!(!state.is_logged_in);
    assert!(state.is_loading);
}

#[test]
fn logged_in_invariant_holds_for_all_inputs() {
    for hydrated in [false, true] {
        for has_token in [false, true] {
            for fetching in [false, true] {
                for with_user in [false, true] {
                    let state =
                        AuthState::derive(with_user.then(user), hydrated, has_token, fetching, None);
                    assert_eq!(state.is_logged_in, hydrated && has_token && (fetching || with_user));
                }
            }
        }
    }
}
