//! Badge collection view: every badge merged with what the user owns.

use std::cmp::Ordering;
use std::collections::HashMap;

use time::OffsetDateTime;

use crate::date::{format_unlocked_date, parse_timestamp};
use crate::types::{Badge, UserBadges};

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayBadge {
    pub badge: Badge,
    pub unlocked: bool,
    pub unlocked_at: Option<String>,
    pub is_primary: bool,
}

impl DisplayBadge {
    #[must_use]
    pub fn unlocked_label(&self) -> String {
        format_unlocked_date(self.unlocked_at.as_deref())
    }

    fn unlocked_time(&self) -> Option<OffsetDateTime> {
        self.unlocked_at.as_deref().and_then(parse_timestamp)
    }
}

/// Collection progress summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub unlocked: usize,
    pub total: usize,
    /// Rounded percentage, 0 when there are no badges.
    pub percent: u8,
}

/// Merge the catalog with ownership, sorted for display.
#[must_use]
pub fn collection(all: &[Badge], owned: &UserBadges) -> Vec<DisplayBadge> {
    let unlocks: HashMap<i64, &str> = owned
        .owned_badges
        .iter()
        .map(|o| (o.badge_id, o.created_at.as_str()))
        .collect();

    let mut merged: Vec<DisplayBadge> = all
        .iter()
        .map(|badge| {
            let unlocked_at = unlocks.get(&badge.id).map(|at| (*at).to_owned());
            DisplayBadge {
                badge: badge.clone(),
                unlocked: unlocked_at.is_some(),
                unlocked_at,
                is_primary: owned.primary_badge_id == Some(badge.id),
            }
        })
        .collect();
    merged.sort_by(display_order);
    merged
}

/// Primary first, then unlocked, newest unlock first; locked by name.
fn display_order(a: &DisplayBadge, b: &DisplayBadge) -> Ordering {
    b.is_primary
        .cmp(&a.is_primary)
        .then_with(|| b.unlocked.cmp(&a.unlocked))
        .then_with(|| {
            if a.unlocked && b.unlocked {
                b.unlocked_time().cmp(&a.unlocked_time())
            } else {
                a.badge.name.cmp(&b.badge.name)
            }
        })
}

#[must_use]
pub fn progress(badges: &[DisplayBadge]) -> Progress {
    let total = badges.len();
    let unlocked = badges.iter().filter(|b| b.unlocked).count();
    let percent = if total == 0 { 0 } else { ((unlocked * 200 + total) / (total * 2)).min(100) };
    Progress { unlocked, total, percent: u8::try_from(percent).unwrap_or(100) }
}

#[cfg(test)]
#[path = "badges_test.rs"]
mod tests;
