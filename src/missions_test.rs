use super::*;
use crate::test_support::feed_item_json;

fn mission(id: i64, tag: &str) -> MissionListItem {
    MissionListItem {
        id,
        name: format!("mission-{id}"),
        description: String::new(),
        tag: tag.to_owned(),
        icon: String::new(),
        reward_carbon_emission: 0.5,
    }
}

fn feed() -> Vec<MissionFeedItem> {
    vec![
        serde_json::from_value(feed_item_json(1, 4, false)).unwrap(),
        serde_json::from_value(feed_item_json(2, 1, true)).unwrap(),
    ]
}

#[test]
fn unique_tags_keep_first_seen_order() {
    let missions = [mission(1, "교통"), mission(2, "생활"), mission(3, ""), mission(4, "교통"), mission(5, "음식")];
    assert_eq!(unique_tags(&missions), vec!["교통", "생활", "음식"]);
}

#[test]
fn history_id_must_be_positive_integer() {
    assert_eq!(parse_history_id("42"), Some(42));
    assert_eq!(parse_history_id(" 7 "), Some(7));
    assert_eq!(parse_history_id("0"), None);
    assert_eq!(parse_history_id("-3"), None);
    assert_eq!(parse_history_id("1.5"), None);
    assert_eq!(parse_history_id("abc"), None);
}

#[test]
fn optimistic_toggle_flips_state() {
    let mut items = feed();
    assert!(toggle_like_optimistic(&mut items, 1));
    assert!(items[0].is_liked);
    assert_eq!(items[0].like_count, 5);

    assert!(toggle_like_optimistic(&mut items, 2));
    assert!(!items[1].is_liked);
    assert_eq!(items[1].like_count, 0);
}

#[test]
fn optimistic_toggle_unknown_id_is_noop() {
    let mut items = feed();
    assert!(!toggle_like_optimistic(&mut items, 99));
    assert_eq!(items, feed());
}

#[test]
fn backend_result_overrides_local_state() {
    let mut items = feed();
    toggle_like_optimistic(&mut items, 1);
    assert!(apply_like_result(&mut items, &LikeResult { history_id: 1, like_count: 10, is_liked: true }));
    assert_eq!(items[0].like_count, 10);
}
