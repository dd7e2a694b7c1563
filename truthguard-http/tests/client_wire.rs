use bytes::Bytes;
use serde_json::{Value, json};
use std::time::Duration;
use truthguard_http::{FilePart, HttpClient, HttpError, RequestOpts};
use wiremock::matchers::{body_json, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> HttpClient {
    HttpClient::new(&format!("{}/analyze", server.uri())).expect("valid base")
}

#[tokio::test]
async fn post_json_sends_body_and_decodes_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/text"))
        .and(body_json(json!({ "text": "hello world" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "verdict": "Likely Authentic", "confidence": 91 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let got: Value = client
        .post_json("text", &json!({ "text": "hello world" }), RequestOpts::default())
        .await
        .expect("success");

    assert_eq!(got["verdict"], "Likely Authentic");
    assert_eq!(got["confidence"], 91);
}

#[tokio::test]
async fn post_multipart_uses_form_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/image"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ai_generated_probability": 0.2 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let file = FilePart {
        file_name: "photo.png".into(),
        mime: "image/png".into(),
        bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
    };
    let got: Value = client
        .post_multipart("image", "file", &file, RequestOpts::default())
        .await
        .expect("success");
    assert_eq!(got["ai_generated_probability"], 0.2);

    let received = server.received_requests().await.expect("recording on");
    let body = String::from_utf8_lossy(&received[0].body).to_string();
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"photo.png\""));
}

#[tokio::test]
async fn non_success_status_is_an_api_error_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/video"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "detail": "model loading" })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let file = FilePart {
        file_name: "clip.mp4".into(),
        mime: "video/mp4".into(),
        bytes: Bytes::from_static(b"\0\0\0\x18ftypmp42"),
    };
    let err = client
        .post_multipart::<Value>("video", "file", &file, RequestOpts::default())
        .await
        .expect_err("503 must fail");

    match err {
        HttpError::Api { status, message, .. } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(message, "model loading");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    // Exactly one attempt: no retry policy.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn slow_responses_hit_the_configured_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/text"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(json!({})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server)
        .await
        .with_timeout(Duration::from_millis(50));
    let err = client
        .post_json::<_, Value>("text", &json!({ "text": "x" }), RequestOpts::default())
        .await
        .expect_err("must time out");
    assert!(matches!(err, HttpError::Timeout(d) if d == Duration::from_millis(50)));
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze/text"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .post_json::<_, Value>("text", &json!({ "text": "x" }), RequestOpts::default())
        .await
        .expect_err("html is not json");
    match err {
        HttpError::Decode(_, snippet) => assert!(snippet.contains("oops")),
        other => panic!("expected Decode, got {other:?}"),
    }
}

#[tokio::test]
async fn probe_reports_status_without_failing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/analyze/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let status = client.probe("", RequestOpts::default()).await.expect("reachable");
    assert_eq!(status.as_u16(), 404);
}
