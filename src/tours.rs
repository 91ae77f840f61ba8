//! Bundled catalog of eco travel routes.

use serde::{Deserialize, Serialize};

const CATALOG_JSON: &str = include_str!("../data/eco_routes.json");

/// Season label meaning "every season".
pub const ALL_SEASONS: &str = "사계절";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CarbonRating {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcoTourRoute {
    pub id: String,
    pub name: String,
    pub location: String,
    pub region: String,
    pub description: String,
    pub detailed_description: String,
    pub main_image: String,
    #[serde(default)]
    pub detail_images: Vec<String>,
    pub carbon_rating: CarbonRating,
    pub view_count: u64,
    pub category: String,
    #[serde(default)]
    pub activities: Vec<String>,
    pub difficulty: Difficulty,
    pub duration: String,
    /// `사계절`, a single season, or several joined with `·`.
    pub season: String,
}

impl EcoTourRoute {
    #[must_use]
    pub fn in_season(&self, season: &str) -> bool {
        self.season == ALL_SEASONS || self.season.split('·').any(|s| s.trim() == season)
    }
}

/// Parse the bundled catalog.
///
/// # Errors
///
/// Returns the parse error if the bundled JSON is malformed.
pub fn catalog() -> Result<Vec<EcoTourRoute>, serde_json::Error> {
    serde_json::from_str(CATALOG_JSON)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteFilter {
    pub region: Option<String>,
    pub category: Option<String>,
    /// Routes rated at or below this are kept.
    pub max_carbon: Option<CarbonRating>,
    pub season: Option<String>,
}

impl RouteFilter {
    #[must_use]
    pub fn matches(&self, route: &EcoTourRoute) -> bool {
        self.region.as_deref().is_none_or(|r| route.region == r || route.location.contains(r))
            && self.category.as_deref().is_none_or(|c| route.category == c)
            && self.max_carbon.is_none_or(|max| route.carbon_rating <= max)
            && self.season.as_deref().is_none_or(|s| route.in_season(s))
    }
}

/// Matching routes, most viewed first.
#[must_use]
pub fn search<'a>(routes: &'a [EcoTourRoute], filter: &RouteFilter) -> Vec<&'a EcoTourRoute> {
    let mut found: Vec<&EcoTourRoute> = routes.iter().filter(|r| filter.matches(r)).collect();
    found.sort_by(|a, b| b.view_count.cmp(&a.view_count).then_with(|| a.id.cmp(&b.id)));
    found
}

#[must_use]
pub fn find<'a>(routes: &'a [EcoTourRoute], id: &str) -> Option<&'a EcoTourRoute> {
    routes.iter().find(|r| r.id == id)
}

#[cfg(test)]
#[path = "tours_test.rs"]
mod tests;
