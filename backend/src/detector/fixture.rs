use futures::future::BoxFuture;
use shared::fixtures;

use super::{DetectionResult, ViolationDetector};
use crate::upload::{FrameUpload, VideoUpload};

/// Answers every request with the canned fixture records.
pub struct FixtureDetector;

impl ViolationDetector for FixtureDetector {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn detect_video<'a>(&'a self, video: &'a VideoUpload) -> BoxFuture<'a, DetectionResult> {
        Box::pin(async move {
            log::debug!("Fixture results for {}", video.file_name);
            Ok(fixtures::sample_results())
        })
    }

    fn detect_frame<'a>(&'a self, frame: &'a FrameUpload) -> BoxFuture<'a, DetectionResult> {
        Box::pin(async move {
            log::debug!("Fixture results for frame of session {}", frame.session_id);
            Ok(fixtures::realtime_results())
        })
    }
}
