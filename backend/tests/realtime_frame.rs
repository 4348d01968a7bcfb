//! Tests for webcam frame submission at `POST /api/realtime/frame`.

mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use backend::routes::configure_app;
use common::*;
use serde_json::{Value, json};

macro_rules! service {
    ($state:expr) => {{
        let state = $state;
        test::init_service(App::new().configure(move |cfg| configure_app(cfg, state))).await
    }};
}

fn frame_request(mime_type: &str, image: String) -> test::TestRequest {
    test::TestRequest::post().uri("/api/realtime/frame").set_json(json!({
        "session_id": "cam-1",
        "captured_at": "2024-03-01T10:15:00Z",
        "mime_type": mime_type,
        "image": image,
    }))
}

#[actix_web::test]
async fn analyzed_frame_returns_records() {
    let detector = StubDetector::answering(vec![record("VIO-9", "RT4821", &["Lane violation"])]);
    let app = service!(state_with(detector.clone(), small_limits()));

    let req = frame_request("image/jpeg", STANDARD.encode(b"jpeg")).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["results"][0]["plate_number"], "RT4821");

    let seen = detector.last_seen().unwrap();
    assert_eq!(seen.data, b"jpeg");
    assert_eq!(seen.file_name, "cam-1-1709288100000.jpeg");
}

#[actix_web::test]
async fn data_url_frames_are_accepted() {
    let detector = StubDetector::answering(vec![]);
    let app = service!(state_with(detector.clone(), small_limits()));

    let image = format!("data:image/jpeg;base64,{}", STANDARD.encode(b"jpeg"));
    let resp = test::call_service(&app, frame_request("image/jpeg", image).to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(detector.calls(), 1);
}

#[actix_web::test]
async fn non_image_frame_is_415() {
    let detector = StubDetector::answering(vec![]);
    let app = service!(state_with(detector.clone(), small_limits()));

    let req = frame_request("video/mp4", STANDARD.encode(b"mp4")).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(detector.calls(), 0);
}

#[actix_web::test]
async fn oversized_frame_is_413() {
    let detector = StubDetector::answering(vec![]);
    let app = service!(state_with(detector.clone(), small_limits()));

    let req = frame_request("image/jpeg", STANDARD.encode([0u8; 33])).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Frame exceeds the 32 byte limit");
    assert_eq!(detector.calls(), 0);
}

#[actix_web::test]
async fn garbage_frame_is_400() {
    let detector = StubDetector::answering(vec![]);
    let app = service!(state_with(detector.clone(), small_limits()));

    let resp = test::call_service(
        &app,
        frame_request("image/jpeg", "%%%".to_string()).to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detector.calls(), 0);
}

#[actix_web::test]
async fn malformed_json_is_400_with_error_body() {
    let app = service!(state_with(StubDetector::answering(vec![]), small_limits()));

    let req = test::TestRequest::post()
        .uri("/api/realtime/frame")
        .set_json(json!({ "session_id": "cam-1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid frame"));
}
