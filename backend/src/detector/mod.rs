mod fixture;
mod remote;

pub use fixture::FixtureDetector;
pub use remote::RemoteDetector;

use futures::future::BoxFuture;
use shared::{GatewayError, ViolationRecord};
use std::sync::Arc;

use crate::config::{ConfigError, DetectorConfig, DetectorMode};
use crate::upload::{FrameUpload, VideoUpload};

pub type DetectionResult = Result<Vec<ViolationRecord>, DetectorError>;

/// The external collaborator that turns footage into violation records.
pub trait ViolationDetector: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect_video<'a>(&'a self, video: &'a VideoUpload) -> BoxFuture<'a, DetectionResult>;

    fn detect_frame<'a>(&'a self, frame: &'a FrameUpload) -> BoxFuture<'a, DetectionResult>;
}

/// Display strings are what the gateway's clients see; details go to the log.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Detection backend unavailable")]
    Unavailable(String),
    #[error("Detection backend returned an invalid response")]
    InvalidResponse(String),
    #[error("File processing error")]
    Internal(String),
}

impl From<GatewayError> for DetectorError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::BackendError { status, message } => Self::Rejected { status, message },
            GatewayError::NetworkFailure(detail) => Self::Unavailable(detail),
            GatewayError::ContractViolation(detail) => Self::InvalidResponse(detail),
            other => Self::Internal(other.to_string()),
        }
    }
}

pub fn from_config(config: &DetectorConfig) -> Result<Arc<dyn ViolationDetector>, ConfigError> {
    match config.mode {
        DetectorMode::Remote => {
            let detector = RemoteDetector::new(config)?;
            log::info!("Forwarding detection to {}", config.base_url);
            Ok(Arc::new(detector))
        }
        DetectorMode::Fixture => {
            log::warn!("Detector running in fixture mode: results are canned, not detected");
            Ok(Arc::new(FixtureDetector))
        }
    }
}
