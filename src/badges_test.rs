use super::*;
use crate::types::OwnedBadge;

fn badge(id: i64, name: &str) -> Badge {
    Badge { id, name: name.to_owned(), description: None, image_url: None }
}

fn owned(badge_id: i64, created_at: &str) -> OwnedBadge {
    OwnedBadge { badge_id, created_at: created_at.to_owned() }
}

fn catalog() -> Vec<Badge> {
    vec![badge(1, "하늘"), badge(2, "가람"), badge(3, "나무"), badge(4, "다래"), badge(5, "바다")]
}

#[test]
fn primary_then_newest_unlock_then_locked_by_name() {
    let user = UserBadges {
        primary_badge_id: Some(3),
        owned_badges: vec![
            owned(1, "2024-01-01T00:00:00Z"),
            owned(3, "2023-05-01T00:00:00Z"),
            owned(5, "2024-04-01T00:00:00Z"),
        ],
    };

    let ids: Vec<i64> = collection(&catalog(), &user).iter().map(|b| b.badge.id).collect();

    assert_eq!(ids, vec![3, 5, 1, 2, 4]);
}

#[test]
fn merge_marks_unlock_state() {
    let user = UserBadges { primary_badge_id: None, owned_badges: vec![owned(2, "2024-02-03T10:00:00Z")] };

    let badges = collection(&catalog(), &user);
    let garam = badges.iter().find(|b| b.badge.id == 2).unwrap();
    let sky = badges.iter().find(|b| b.badge.id == 1).unwrap();

    assert!(garam.unlocked);
    assert_eq!(garam.unlocked_label(), "2024-02-03");
    assert!(!sky.unlocked);
    assert_eq!(sky.unlocked_label(), "--");
}

#[test]
fn owned_badges_missing_from_catalog_are_ignored() {
    let user = UserBadges { primary_badge_id: Some(99), owned_badges: vec![owned(99, "2024-01-01T00:00:00Z")] };
    let badges = collection(&catalog(), &user);
    assert_eq!(badges.len(), 5);
    assert!(badges.iter().all(|b| !b.unlocked && !b.is_primary));
}

#[test]
fn unparseable_unlock_time_sorts_last_among_unlocked() {
    let user = UserBadges {
        primary_badge_id: None,
        owned_badges: vec![owned(1, "garbage"), owned(2, "2024-01-01T00:00:00Z")],
    };
    let ids: Vec<i64> = collection(&catalog(), &user).iter().map(|b| b.badge.id).take(2).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn progress_rounds_percentage() {
    let user = UserBadges {
        primary_badge_id: None,
        owned_badges: vec![owned(1, "2024-01-01T00:00:00Z")],
    };
    let badges = collection(&catalog()[..3], &user);
    assert_eq!(progress(&badges), Progress { unlocked: 1, total: 3, percent: 33 });

    let user = UserBadges {
        primary_badge_id: None,
        owned_badges: vec![owned(1, "2024-01-01T00:00:00Z"), owned(2, "2024-01-02T00:00:00Z")],
    };
    assert_eq!(progress(&collection(&catalog()[..3], &user)).percent, 67);
}

#[test]
fn progress_of_empty_catalog_is_zero() {
    assert_eq!(progress(&[]), Progress { unlocked: 0, total: 0, percent: 0 });
}
