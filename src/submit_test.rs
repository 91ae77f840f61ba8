use super::*;
use crate::geocode::RegionAddress;
use crate::test_support::test_session;
use std::sync::Mutex;

struct FixedGeocoder {
    region: Option<&'static str>,
}

#[async_trait::async_trait]
impl Geocoder for FixedGeocoder {
    async fn coord_to_address(&self, _: f64, _: f64) -> Result<Option<RegionAddress>, GeocodeError> {
        Ok(self.region.map(|region| RegionAddress {
            address_name: format!("{region} 어딘가"),
            region_1depth_name: region.to_owned(),
            region_2depth_name: String::new(),
            region_3depth_name: String::new(),
        }))
    }
}

struct FailingGeocoder;

#[async_trait::async_trait]
impl Geocoder for FailingGeocoder {
    async fn coord_to_address(&self, _: f64, _: f64) -> Result<Option<RegionAddress>, GeocodeError> {
        Err(GeocodeError::Request("timeout".into()))
    }
}

#[derive(Default)]
struct RecordingSink {
    submitted: Mutex<Vec<MissionSubmission>>,
    fail_with_401: bool,
}

#[async_trait::async_trait]
impl MissionSink for RecordingSink {
    async fn submit(&self, submission: &MissionSubmission) -> Result<MissionCompletion, ApiError> {
        if self.fail_with_401 {
            return Err(ApiError::Unauthorized);
        }
        self.submitted.lock().unwrap().push(submission.clone());
        Ok(MissionCompletion { history_id: 501, reward_badge: None })
    }
}

fn form() -> MissionForm {
    MissionForm {
        mission_id: 1,
        content: "플로깅 다녀왔어요".into(),
        latitude: Some(36.0),
        longitude: Some(129.3),
        sigungu_id: None,
        image_urls: vec!["https://cdn.example.com/p.jpg".into()],
    }
}

fn pipeline(token: Option<&str>, geocoder: Arc<dyn Geocoder>) -> (MissionSubmitter, Arc<RecordingSink>) {
    let (session, _) = test_session(token);
    let sink = Arc::new(RecordingSink::default());
    (MissionSubmitter::new(session, geocoder, sink.clone()), sink)
}

#[tokio::test]
async fn in_region_submission_reaches_backend() {
    let (submitter, sink) = pipeline(Some("tok"), Arc::new(FixedGeocoder { region: Some("경상북도") }));

    let completion = submitter.submit(&form()).await.unwrap();

    assert_eq!(completion.history_id, 501);
    assert_eq!(sink.submitted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn out_of_region_is_rejected_before_submit() {
    let (submitter, sink) = pipeline(Some("tok"), Arc::new(FixedGeocoder { region: Some("서울") }));

    let err = submitter.submit(&form()).await.unwrap_err();

    assert!(matches!(&err, SubmitError::OutsideRegion(r) if r.region == "서울"));
    assert_eq!(err.error_code(), "E_OUTSIDE_REGION");
    assert!(sink.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_token_requires_login() {
    let (submitter, sink) = pipeline(None, Arc::new(FixedGeocoder { region: Some("경북") }));

    let err = submitter.submit(&form()).await.unwrap_err();

    assert!(matches!(err, SubmitError::LoginRequired));
    assert!(sink.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_form_never_geocodes_or_submits() {
    let (submitter, sink) = pipeline(Some("tok"), Arc::new(FailingGeocoder));
    let mut bad = form();
    bad.content = "짧음".into();

    let err = submitter.submit(&bad).await.unwrap_err();

    assert!(matches!(err, SubmitError::Validation(ref e) if e.has("content")));
    assert!(sink.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unresolved_location_is_rejected() {
    let (submitter, sink) = pipeline(Some("tok"), Arc::new(FixedGeocoder { region: None }));

    let err = submitter.submit(&form()).await.unwrap_err();

    assert!(matches!(err, SubmitError::LocationUnresolved));
    assert!(sink.submitted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn geocoder_failure_is_retryable() {
    let (submitter, _) = pipeline(Some("tok"), Arc::new(FailingGeocoder));

    let err = submitter.submit(&form()).await.unwrap_err();

    assert!(matches!(err, SubmitError::Geocode(_)));
    assert!(err.retryable());
}

#[tokio::test]
async fn custom_policy_is_honored() {
    let (submitter, sink) = pipeline(Some("tok"), Arc::new(FixedGeocoder { region: Some("서울") }));
    let submitter = submitter.with_policy(RegionPolicy::new(["서울"]));

    submitter.submit(&form()).await.unwrap();

    assert_eq!(sink.submitted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn backend_rejection_surfaces_as_api_error() {
    let (session, _) = test_session(Some("tok"));
    let sink = Arc::new(RecordingSink { fail_with_401: true, ..RecordingSink::default() });
    let submitter = MissionSubmitter::new(session, Arc::new(FixedGeocoder { region: Some("경북") }), sink);

    let err = submitter.submit(&form()).await.unwrap_err();

    assert!(matches!(err, SubmitError::Api(ApiError::Unauthorized)));
    assert_eq!(err.error_code(), "E_UNAUTHORIZED");
}
