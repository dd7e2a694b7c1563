use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use truthguard_client::remote::RemoteClient;
use truthguard_client::{AnalysisClient, AnalysisRequest, MediaUpload};
use truthguard_common::{Result, TruthGuardError};
use truthguard_config::UploadLimits;
use truthguard_controller::{InteractionController, Phase};
use truthguard_core::{ContentType, RawPayload, Verdict};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Backend that answers only once the gate is opened.
struct GatedClient {
    gate: Notify,
}

#[async_trait]
impl AnalysisClient for GatedClient {
    async fn analyze(&self, _request: AnalysisRequest) -> Result<RawPayload> {
        self.gate.notified().await;
        Ok(RawPayload(json!({ "verdict": "Likely Authentic", "confidence": 88 })))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "gated"
    }
}

fn gated() -> (Arc<GatedClient>, Arc<InteractionController>) {
    let client = Arc::new(GatedClient {
        gate: Notify::new(),
    });
    let controller = Arc::new(InteractionController::new(
        client.clone(),
        UploadLimits::default(),
    ));
    (client, controller)
}

async fn wait_for_phase(controller: &InteractionController, phase: Phase) {
    for _ in 0..200 {
        if controller.phase() == phase {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("controller never reached {phase:?}");
}

#[tokio::test]
async fn image_endpoint_failure_returns_to_idle_without_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/image"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let client = RemoteClient::new(&format!("{}/analyze", server.uri()), Duration::from_secs(5))
        .expect("valid base url");
    let controller = InteractionController::new(Arc::new(client), UploadLimits::default());
    controller.select_content_type(ContentType::Image).unwrap();
    controller
        .stage_upload(MediaUpload::new("photo.jpg", "image/jpeg", vec![0xFFu8; 64]))
        .unwrap();

    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, TruthGuardError::Transport { status: Some(502), .. }));
    assert_eq!(controller.phase(), Phase::Idle);
    assert!(controller.result().is_none());
    assert_eq!(controller.last_error(), Some(err.clone()));
    assert_eq!(err.user_message(), "Analysis failed. Please try again.");
}

#[tokio::test]
async fn second_submit_while_analyzing_is_busy() {
    let (client, controller) = gated();
    controller.set_text("Is this headline accurate?").unwrap();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    wait_for_phase(&controller, Phase::Analyzing).await;

    assert_eq!(controller.submit().await.unwrap_err(), TruthGuardError::Busy);
    assert_eq!(
        controller.set_text("changed my mind").unwrap_err(),
        TruthGuardError::Busy
    );

    client.gate.notify_one();
    let result = first.await.unwrap().unwrap();
    assert_eq!(result.verdict(), Verdict::Authentic);
    assert_eq!(controller.phase(), Phase::Resolved);
}

#[tokio::test]
async fn abort_cancels_in_flight_request() {
    let (_client, controller) = gated();
    controller.set_text("Never answered").unwrap();

    let task = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    wait_for_phase(&controller, Phase::Analyzing).await;

    assert!(controller.abort());
    let outcome = tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("submit returns promptly after abort")
        .unwrap();

    assert_eq!(outcome.unwrap_err(), TruthGuardError::Cancelled);
    assert_eq!(controller.phase(), Phase::Idle);
    assert!(controller.result().is_none());
    assert_eq!(controller.last_error(), Some(TruthGuardError::Cancelled));
}

#[tokio::test]
async fn reset_during_analysis_discards_everything() {
    let (_client, controller) = gated();
    controller.select_content_type(ContentType::Video).unwrap();
    controller
        .stage_upload(MediaUpload::new("clip.mov", "video/quicktime", vec![0u8; 128]))
        .unwrap();
    assert_eq!(controller.previews().live_count(), 1);

    let task = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    wait_for_phase(&controller, Phase::Analyzing).await;

    controller.reset();
    let outcome = task.await.unwrap();

    assert_eq!(outcome.unwrap_err(), TruthGuardError::Cancelled);
    assert_eq!(controller.phase(), Phase::Idle);
    assert!(controller.last_error().is_none());
    assert_eq!(controller.previews().live_count(), 0);
    assert!(controller.with_draft(|draft| draft.staged().is_none()));
}

#[tokio::test]
async fn new_submission_replaces_previous_result() {
    let (client, controller) = gated();
    controller.set_text("First claim to check").unwrap();
    client.gate.notify_one();
    let first = controller.submit().await.unwrap();

    controller.set_text("Second claim to check").unwrap();
    client.gate.notify_one();
    let second = controller.submit().await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&controller.result().unwrap(), &second));
}

#[tokio::test]
async fn oversized_video_never_reaches_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = RemoteClient::new(&format!("{}/analyze", server.uri()), Duration::from_secs(5))
        .unwrap();
    let limits = UploadLimits {
        image_max_bytes: 1024,
        video_max_bytes: 2048,
    };
    let controller = InteractionController::new(Arc::new(client), limits);
    controller.select_content_type(ContentType::Video).unwrap();
    controller
        .stage_upload(MediaUpload::new("long.mp4", "video/mp4", vec![0u8; 4096]))
        .unwrap();

    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, TruthGuardError::Validation(_)));
    assert_eq!(controller.phase(), Phase::Idle);
}

#[tokio::test]
async fn failed_resubmission_discards_the_earlier_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/text"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "verdict": "authentic", "confidence": 91 })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/analyze/text"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = RemoteClient::new(&format!("{}/analyze", server.uri()), Duration::from_secs(5))
        .unwrap();
    let controller = InteractionController::new(Arc::new(client), UploadLimits::default());
    controller.set_text("The council approved the budget on Tuesday.").unwrap();
    controller.submit().await.unwrap();
    assert_eq!(controller.phase(), Phase::Resolved);

    let err = controller.submit().await.unwrap_err();
    assert!(matches!(err, TruthGuardError::Transport { status: Some(500), .. }));
    assert_eq!(controller.phase(), Phase::Idle);
    assert!(controller.result().is_none());
}
