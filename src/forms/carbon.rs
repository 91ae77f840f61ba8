//! Carbon footprint calculator input.
//!
//! A calculation session has a client-generated UUID, a party size, any
//! number of travel legs and any number of stays. Dates arrive as
//! `YYYY-MM-DD` strings and are checked for a positive stay length.

use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;
use uuid::Uuid;

use super::ValidationErrors;

// =============================================================================
// FORM
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonCalculatorForm {
    pub session_id: String,
    pub personnel: i64,
    #[serde(default)]
    pub routes: Vec<RouteInput>,
    #[serde(default)]
    pub accommodation: Vec<StayInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInput {
    #[serde(default)]
    pub departure_location_id: Option<String>,
    #[serde(default)]
    pub arrival_location_id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub transportation_type_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayInput {
    pub accommodation_type_id: i64,
    pub check_in_date: String,
    pub check_out_date: String,
}

// =============================================================================
// VALIDATED
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarbonCalculation {
    pub session_id: Uuid,
    pub personnel: u32,
    pub routes: Vec<RouteLeg>,
    pub stays: Vec<Stay>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLeg {
    pub departure_location_id: Option<String>,
    pub arrival_location_id: Option<String>,
    pub course_id: Option<String>,
    pub transportation_type_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stay {
    pub accommodation_type_id: i64,
    pub check_in: Date,
    pub check_out: Date,
}

impl Stay {
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).whole_days()
    }
}

impl CarbonCalculation {
    #[must_use]
    pub fn total_nights(&self) -> i64 {
        self.stays.iter().map(Stay::nights).sum()
    }
}

impl CarbonCalculatorForm {
    /// Empty form with a fresh session id and one traveler.
    #[must_use]
    pub fn new_session() -> Self {
        Self { session_id: Uuid::new_v4().to_string(), personnel: 1, ..Self::default() }
    }

    /// # Errors
    ///
    /// Returns every field failure, keyed like `routes[0].transportationTypeId`.
    pub fn validate(&self) -> Result<CarbonCalculation, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let session_id = Uuid::parse_str(self.session_id.trim()).unwrap_or_else(|_| {
            errors.add("sessionId", "유효한 세션 ID가 아닙니다.");
            Uuid::nil()
        });

        let personnel = match u32::try_from(self.personnel) {
            Ok(n) if n >= 1 => n,
            _ => {
                errors.add("personnel", "인원수는 1명 이상이어야 합니다");
                0
            }
        };

        let routes = self
            .routes
            .iter()
            .enumerate()
            .map(|(i, route)| {
                let transportation_type_id = route.transportation_type_id.trim().to_owned();
                if transportation_type_id.is_empty() {
                    errors.add(format!("routes[{i}].transportationTypeId"), "이동 수단을 선택해 주세요.");
                }
                RouteLeg {
                    departure_location_id: non_blank(route.departure_location_id.as_deref()),
                    arrival_location_id: non_blank(route.arrival_location_id.as_deref()),
                    course_id: non_blank(route.course_id.as_deref()),
                    transportation_type_id,
                }
            })
            .collect();

        let mut stays = Vec::with_capacity(self.accommodation.len());
        for (i, stay) in self.accommodation.iter().enumerate() {
            let check_in = parse_date(&mut errors, format!("accommodation[{i}].checkInDate"), &stay.check_in_date);
            let check_out = parse_date(&mut errors, format!("accommodation[{i}].checkOutDate"), &stay.check_out_date);
            if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
                if check_out <= check_in {
                    errors.add(format!("accommodation[{i}].checkOutDate"), "체크아웃은 체크인 이후여야 합니다.");
                } else {
                    stays.push(Stay { accommodation_type_id: stay.accommodation_type_id, check_in, check_out });
                }
            }
        }

        errors.into_result(CarbonCalculation { session_id, personnel, routes, stays })
    }
}

fn parse_date(errors: &mut ValidationErrors, field: String, raw: &str) -> Option<Date> {
    match Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "날짜 형식은 YYYY-MM-DD 입니다.");
            None
        }
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(ToOwned::to_owned)
}

#[cfg(test)]
#[path = "carbon_test.rs"]
mod tests;
