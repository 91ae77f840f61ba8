//! Mission submission pipeline.
//!
//! Order matters: login check, form validation, reverse geocoding, region
//! policy, then the backend call. Anything rejected before the last step
//! never produces a submission request.

use std::sync::Arc;

use crate::error::{ApiError, ErrorCode};
use crate::forms::{MissionForm, ValidationErrors};
use crate::geocode::{GeocodeError, Geocoder, OutsideRegion, RegionPolicy};
use crate::session::SessionContext;
use crate::types::{MissionCompletion, MissionSubmission};

/// Destination for validated submissions.
#[async_trait::async_trait]
pub trait MissionSink: Send + Sync {
    async fn submit(&self, submission: &MissionSubmission) -> Result<MissionCompletion, ApiError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("login required to submit a mission")]
    LoginRequired,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("location lookup failed: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("no address found for the selected location")]
    LocationUnresolved,

    #[error(transparent)]
    OutsideRegion(#[from] OutsideRegion),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ErrorCode for SubmitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::LoginRequired => "E_LOGIN_REQUIRED",
            Self::Validation(_) => "E_VALIDATION",
            Self::Geocode(e) => e.error_code(),
            Self::LocationUnresolved => "E_LOCATION_UNRESOLVED",
            Self::OutsideRegion(_) => "E_OUTSIDE_REGION",
            Self::Api(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Geocode(e) => e.retryable(),
            Self::Api(e) => e.retryable(),
            Self::LoginRequired | Self::Validation(_) | Self::LocationUnresolved | Self::OutsideRegion(_) => false,
        }
    }
}

pub struct MissionSubmitter {
    session: SessionContext,
    geocoder: Arc<dyn Geocoder>,
    sink: Arc<dyn MissionSink>,
    policy: RegionPolicy,
}

impl MissionSubmitter {
    #[must_use]
    pub fn new(session: SessionContext, geocoder: Arc<dyn Geocoder>, sink: Arc<dyn MissionSink>) -> Self {
        Self { session, geocoder, sink, policy: RegionPolicy::default() }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RegionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run the full pipeline for one form.
    ///
    /// # Errors
    ///
    /// Returns the first stage that rejected the submission.
    pub async fn submit(&self, form: &MissionForm) -> Result<MissionCompletion, SubmitError> {
        if !self.session.has_token() {
            return Err(SubmitError::LoginRequired);
        }

        let submission = form.validate()?;

        let address = self
            .geocoder
            .coord_to_address(submission.longitude, submission.latitude)
            .await?
            .ok_or(SubmitError::LocationUnresolved)?;

        if let Err(rejected) = self.policy.check(&address) {
            tracing::info!(region = %rejected.region, mission_id = submission.mission_id, "submission outside allowed region");
            return Err(rejected.into());
        }

        let completion = self.sink.submit(&submission).await?;
        tracing::info!(
            mission_id = submission.mission_id,
            history_id = completion.history_id,
            region = %address.region_1depth_name,
            "mission proof accepted"
        );
        Ok(completion)
    }
}

#[cfg(test)]
#[path = "submit_test.rs"]
mod tests;
