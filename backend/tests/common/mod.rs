#![allow(dead_code)]

use backend::AppState;
use backend::config::LimitsConfig;
use backend::detector::{DetectionResult, DetectorError, ViolationDetector};
use backend::upload::{FrameUpload, VideoUpload};
use futures::future::BoxFuture;
use shared::ViolationRecord;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "----gateway-test-boundary";

/// One multipart field: name, file name, content type, bytes.
pub struct Field<'a> {
    pub name: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

pub fn video_field(data: &[u8]) -> Field<'_> {
    Field {
        name: "video",
        file_name: "junction.mp4",
        content_type: "video/mp4",
        data,
    }
}

pub fn multipart_body(fields: &[Field<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for field in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field.name, field.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", field.content_type).as_bytes());
        body.extend_from_slice(field.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

pub fn record(id: &str, plate: &str, violations: &[&str]) -> ViolationRecord {
    ViolationRecord {
        id: id.into(),
        timestamp: "2024-03-01T10:15:00Z".parse().unwrap(),
        location: Some("Main St & 5th".into()),
        plate_number: plate.into(),
        vehicle_type: "Motorcycle".into(),
        violations: violations.iter().map(|v| v.to_string()).collect(),
        confidence: 0.94,
        screenshot: "/shots/1.jpg".into(),
    }
}

/// What the stub saw on its last call.
#[derive(Debug, Clone, PartialEq)]
pub struct Seen {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

pub struct StubDetector {
    answer: Box<dyn Fn() -> DetectionResult + Send + Sync>,
    pub calls: AtomicUsize,
    pub last: Mutex<Option<Seen>>,
}

impl StubDetector {
    pub fn answering(records: Vec<ViolationRecord>) -> Arc<Self> {
        Arc::new(Self {
            answer: Box::new(move || Ok(records.clone())),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn failing(make: fn() -> DetectorError) -> Arc<Self> {
        Arc::new(Self {
            answer: Box::new(move || Err(make())),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_seen(&self) -> Option<Seen> {
        self.last.lock().unwrap().clone()
    }

    fn record_call(&self, seen: Seen) -> DetectionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(seen);
        (self.answer)()
    }
}

impl ViolationDetector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect_video<'a>(&'a self, video: &'a VideoUpload) -> BoxFuture<'a, DetectionResult> {
        let result = self.record_call(Seen {
            file_name: video.file_name.clone(),
            mime_type: video.mime_type.clone(),
            data: video.data.clone(),
        });
        Box::pin(async move { result })
    }

    fn detect_frame<'a>(&'a self, frame: &'a FrameUpload) -> BoxFuture<'a, DetectionResult> {
        let result = self.record_call(Seen {
            file_name: frame.file_name(),
            mime_type: frame.mime_type.clone(),
            data: frame.data.clone(),
        });
        Box::pin(async move { result })
    }
}

pub fn state_with(detector: Arc<StubDetector>, limits: LimitsConfig) -> actix_web::web::Data<AppState> {
    actix_web::web::Data::new(AppState::new(limits, detector))
}

pub fn small_limits() -> LimitsConfig {
    LimitsConfig {
        max_upload_bytes: 64,
        max_frame_bytes: 32,
        max_concurrent_jobs: 1,
    }
}
