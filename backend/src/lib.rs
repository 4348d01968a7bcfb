//! HTTP gateway between the dashboard and a traffic-violation detection
//! backend.
//!
//! Accepts one video per request at `POST /api/process-video` (multipart
//! field `video`), enforces the upload limits, hands the footage to a
//! [`detector::ViolationDetector`] and answers with
//! `{"results": [...]}` or `{"error": "..."}`. Webcam frames for real-time
//! detection arrive as JSON at `POST /api/realtime/frame`.

pub mod config;
pub mod detector;
pub mod error;
pub mod routes;
pub mod upload;

use shared::UploadConstraints;
use std::sync::Arc;
use tokio::sync::Semaphore;

use config::LimitsConfig;
use detector::ViolationDetector;

pub struct AppState {
    pub limits: LimitsConfig,
    pub detector: Arc<dyn ViolationDetector>,
    /// Bounds how many detections run at once.
    pub jobs: Semaphore,
}

impl AppState {
    pub fn new(limits: LimitsConfig, detector: Arc<dyn ViolationDetector>) -> Self {
        let jobs = Semaphore::new(limits.max_concurrent_jobs.max(1));
        Self {
            limits,
            detector,
            jobs,
        }
    }

    pub fn upload_constraints(&self) -> UploadConstraints {
        UploadConstraints::with_max_bytes(self.limits.max_upload_bytes)
    }
}
