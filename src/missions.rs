//! Mission list and feed helpers.

use std::collections::HashSet;

use crate::types::{LikeResult, MissionFeedItem, MissionListItem};

/// Non-empty tags in first-seen order.
#[must_use]
pub fn unique_tags(missions: &[MissionListItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    missions
        .iter()
        .map(|m| m.tag.as_str())
        .filter(|tag| !tag.is_empty() && seen.insert(*tag))
        .map(ToOwned::to_owned)
        .collect()
}

/// Parse a history id from a route segment. Only positive integers qualify.
#[must_use]
pub fn parse_history_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Flip the like locally before the backend confirms.
pub fn toggle_like_optimistic(items: &mut [MissionFeedItem], history_id: i64) -> bool {
    let Some(item) = items.iter_mut().find(|i| i.id == history_id) else {
        return false;
    };
    if item.is_liked {
        item.like_count = item.like_count.saturating_sub(1);
    } else {
        item.like_count += 1;
    }
    item.is_liked = !item.is_liked;
    true
}

/// Overwrite local like state with the backend's answer.
pub fn apply_like_result(items: &mut [MissionFeedItem], result: &LikeResult) -> bool {
    let Some(item) = items.iter_mut().find(|i| i.id == result.history_id) else {
        return false;
    };
    item.like_count = result.like_count;
    item.is_liked = result.is_liked;
    true
}

#[cfg(test)]
#[path = "missions_test.rs"]
mod tests;
