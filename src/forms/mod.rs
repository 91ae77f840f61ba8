//! Client-side form validation.
//!
//! Every form converts into a typed request only after validation succeeds;
//! invalid input is reported per field and never reaches the network.

pub mod carbon;
pub mod mission;
pub mod profile;

use std::collections::BTreeMap;

pub use carbon::{CarbonCalculation, CarbonCalculatorForm};
pub use mission::MissionForm;
pub use profile::ProfileForm;

/// Field name to messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summarize(.fields))]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for `field`; empty when the field is valid.
    #[must_use]
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(value)` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when any field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn summarize(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
